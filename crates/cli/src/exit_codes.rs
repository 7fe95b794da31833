//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: regression scripts and CI
//! jobs branch on them.
//!
//! | Code | Meaning                                                        |
//! |------|----------------------------------------------------------------|
//! | 0    | Success; validation or regression check passed                 |
//! | 1    | Validation or regression check ran and failed                  |
//! | 2    | CLI usage error (bad arguments)                                |
//! | 3    | Reference, simulation or config file not found                 |
//! | 4    | Cannot compare (empty reference, no overlap, no matched rows)  |
//! | 5    | Config, CSV or dataset parse error                             |
//! | 6    | Cannot write an output file                                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use simrecon_extract::ExtractError;
use simrecon_recon::ReconError;

/// Success - command completed, any comparison passed.
pub const EXIT_SUCCESS: u8 = 0;

/// A comparison ran to completion and at least one quantity or row failed.
/// Like `diff(1)`, exit 1 means "outputs differ."
pub const EXIT_FAILED: u8 = 1;

/// Usage error - bad arguments. Also what clap exits with.
pub const EXIT_USAGE: u8 = 2;

/// An input file does not exist.
pub const EXIT_MISSING_INPUT: u8 = 3;

/// Nothing to compare: distinct from a failing comparison.
pub const EXIT_CANNOT_COMPARE: u8 = 4;

/// Config, CSV or dataset could not be parsed.
pub const EXIT_PARSE: u8 = 5;

/// An output file or directory could not be written.
pub const EXIT_IO_WRITE: u8 = 6;

/// Map a library error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MissingInputFile(_) => EXIT_MISSING_INPUT,
        ReconError::EmptyOverlap { .. } => EXIT_CANNOT_COMPARE,
        ReconError::Io(_) => EXIT_IO_WRITE,
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::MissingColumn { .. }
        | ReconError::Csv(_)
        | ReconError::Dataset(_) => EXIT_PARSE,
    }
}

pub fn extract_exit_code(err: &ExtractError) -> u8 {
    match err {
        ExtractError::NoMatchingBlock(_) => EXIT_CANNOT_COMPARE,
        ExtractError::MalformedNumber { .. }
        | ExtractError::ConfigParse(_)
        | ExtractError::ConfigValidation(_) => EXIT_PARSE,
    }
}
