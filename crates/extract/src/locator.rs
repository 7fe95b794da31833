//! Table block locator.
//!
//! Finds regions between start/end markers and decides each region's kind
//! from the text around its start marker. Kind detection is pluggable: one
//! [`BlockMatcher`] per table kind, tried in order.
//!
//! The kind window never reaches back past the previous block's end marker
//! nor ahead past the block's own end marker, so a header belonging to a
//! neighbouring table cannot decide the kind. Anchors use the full window.

use std::ops::Range;

use serde::Serialize;
use simrecon_core::TableKind;

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

/// Decides whether the text around a block start belongs to one table kind.
pub trait BlockMatcher {
    fn kind(&self) -> TableKind;

    /// `window` is the upper-cased detection window, lines joined by `\n`.
    fn matches(&self, window: &str) -> bool;
}

/// Matches when every keyword occurs in the window (case-insensitive).
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    kind: TableKind,
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<I, S>(kind: TableKind, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            kind,
            keywords: keywords.into_iter().map(|k| k.as_ref().to_uppercase()).collect(),
        }
    }
}

impl BlockMatcher for KeywordMatcher {
    fn kind(&self) -> TableKind {
        self.kind
    }

    fn matches(&self, window: &str) -> bool {
        !self.keywords.is_empty() && self.keywords.iter().all(|k| window.contains(k.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// A located block. Line numbers are 1-based; `end_line` is the end marker,
/// or the last document line when the block is unterminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableBlock {
    pub kind: TableKind,
    pub start_line: usize,
    pub end_line: usize,
    pub terminated: bool,
}

impl TableBlock {
    /// 0-based indices of the lines between the markers.
    pub fn body(&self) -> Range<usize> {
        let end = if self.terminated { self.end_line - 1 } else { self.end_line };
        self.start_line..end.max(self.start_line)
    }

    /// Stable label used for snapshot file names and reports.
    pub fn label(&self) -> String {
        format!("lines_{}_{}", self.start_line, self.end_line)
    }
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

pub struct BlockLocator {
    start_marker: String,
    end_marker: String,
    lookback: usize,
    lookahead: usize,
    anchors: Vec<String>,
    matchers: Vec<Box<dyn BlockMatcher>>,
}

impl BlockLocator {
    pub fn new(start_marker: impl Into<String>, end_marker: impl Into<String>) -> Self {
        Self {
            start_marker: start_marker.into(),
            end_marker: end_marker.into(),
            lookback: 10,
            lookahead: 5,
            anchors: Vec::new(),
            matchers: Vec::new(),
        }
    }

    pub fn window(mut self, lookback: usize, lookahead: usize) -> Self {
        self.lookback = lookback;
        self.lookahead = lookahead;
        self
    }

    /// Keywords that must occur in the window for any kind to match.
    pub fn anchors<I, S>(mut self, anchors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.anchors = anchors.into_iter().map(|a| a.as_ref().to_uppercase()).collect();
        self
    }

    pub fn with_matcher(mut self, matcher: impl BlockMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    pub fn locate(&self, text: &str) -> Vec<TableBlock> {
        let lines: Vec<&str> = text.lines().collect();
        let mut blocks = Vec::new();
        let mut i = 0;
        // First line after the previous block
        let mut floor = 0;

        while i < lines.len() {
            if !lines[i].contains(self.start_marker.as_str()) {
                i += 1;
                continue;
            }
            let start = i;
            let end = lines[start + 1..]
                .iter()
                .position(|l| l.contains(self.end_marker.as_str()))
                .map(|p| start + 1 + p);

            let last = end.unwrap_or(lines.len() - 1);
            let kind = self.detect(&lines, start, floor..last + 1);
            let block = TableBlock {
                kind,
                start_line: start + 1,
                end_line: end.map_or(lines.len(), |e| e + 1),
                terminated: end.is_some(),
            };
            log::debug!("{} block at lines {}..{}", block.kind, block.start_line, block.end_line);
            blocks.push(block);

            // Start markers inside the block are ignored
            i = last + 1;
            floor = i;
        }

        blocks
    }

    /// `bounds` limits the kind window: from the line after the previous block
    /// through this block's end marker.
    fn detect(&self, lines: &[&str], start: usize, bounds: Range<usize>) -> TableKind {
        let from = start.saturating_sub(self.lookback);
        let to = (start + self.lookahead + 1).min(lines.len());
        let text = |range: Range<usize>| lines[range].join("\n").to_uppercase();

        if !self.anchors.is_empty() {
            let anchor_window = text(from..to);
            if !self.anchors.iter().all(|a| anchor_window.contains(a.as_str())) {
                return TableKind::Unknown;
            }
        }

        let window = text(from.max(bounds.start)..to.min(bounds.end));
        self.matchers
            .iter()
            .find(|m| m.matches(&window))
            .map_or(TableKind::Unknown, |m| m.kind())
    }
}
