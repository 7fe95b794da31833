use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Table kinds
// ---------------------------------------------------------------------------

/// Kind of a table block found in a reference document.
///
/// Fixed once at detection time. `Unknown` blocks are reported but never
/// tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    TimeSeries,
    SpatialProfile,
    Unknown,
}

impl TableKind {
    /// Canonical schema for rows of this kind.
    pub fn schema(self) -> Option<Schema> {
        match self {
            Self::TimeSeries => Some(Schema::TimeSeries),
            Self::SpatialProfile => Some(Schema::Spatial),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeSeries => write!(f, "time_series"),
            Self::SpatialProfile => write!(f, "spatial_profile"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

const TIME_SERIES_FIELDS: &[&str] = &[
    "time",
    "total_energy",
    "relative_power",
    "alpha",
    "time_step",
    "stability_w",
];

const SPATIAL_FIELDS: &[&str] = &[
    "zone_index",
    "density",
    "radius",
    "velocity",
    "pressure",
    "internal_energy",
    "temperature",
];

/// Named, fixed field layout of a canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    /// `time` keyed history: energy, power, inverse period, step, stability.
    TimeSeries,
    /// `radius` keyed profile of one snapshot.
    Spatial,
}

impl Schema {
    /// All field names, in record order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::TimeSeries => TIME_SERIES_FIELDS,
            Self::Spatial => SPATIAL_FIELDS,
        }
    }

    /// Name of the independent variable.
    pub fn key_field(self) -> &'static str {
        match self {
            Self::TimeSeries => "time",
            Self::Spatial => "radius",
        }
    }

    pub fn key_index(self) -> usize {
        match self {
            Self::TimeSeries => 0,
            Self::Spatial => 2,
        }
    }

    pub fn field_index(self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| *f == name)
    }

    /// Number of numeric values a tokenized source row carries.
    ///
    /// Spatial rows omit the zone index; it is taken from the row label or
    /// assigned positionally.
    pub fn raw_arity(self) -> usize {
        match self {
            Self::TimeSeries => TIME_SERIES_FIELDS.len(),
            Self::Spatial => SPATIAL_FIELDS.len() - 1,
        }
    }

    /// Quantities compared by a full validation run unless configured otherwise.
    pub fn default_quantities(self) -> &'static [&'static str] {
        match self {
            Self::TimeSeries => &["total_energy", "relative_power", "alpha", "stability_w"],
            Self::Spatial => &["density", "pressure", "internal_energy", "temperature"],
        }
    }

    /// The four quantity groups of a regression check, in tolerance order.
    pub fn regression_quantities(self) -> [&'static str; 4] {
        match self {
            Self::TimeSeries => ["total_energy", "relative_power", "alpha", "stability_w"],
            Self::Spatial => ["density", "pressure", "internal_energy", "temperature"],
        }
    }

    pub fn table_kind(self) -> TableKind {
        match self {
            Self::TimeSeries => TableKind::TimeSeries,
            Self::Spatial => TableKind::SpatialProfile,
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeSeries => write!(f, "time_series"),
            Self::Spatial => write!(f, "spatial"),
        }
    }
}
