// src/models.rs

use std::fmt;

use crate::grid::Grid;

/// Outcome of a single lookup for one coordinate string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceResult {
    /// Non-empty nucleotide string (header line dropped, remaining lines joined).
    Sequence(String),
    /// The service answered but no sequence body could be extracted.
    Empty,
    /// Network-level failure after the retry budget was spent.
    TransportFailure,
}

/// Fixed diagnostic strings written when no sequence was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    InputAbsent,
    FormatInvalid,
    FetchFailed,
    ProcessingError,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::InputAbsent,
        Placeholder::FormatInvalid,
        Placeholder::FetchFailed,
        Placeholder::ProcessingError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Placeholder::InputAbsent => "空值",
            Placeholder::FormatInvalid => "格式错误",
            Placeholder::FetchFailed => "获取失败",
            Placeholder::ProcessingError => "处理出错",
        }
    }

    /// True if `text` is one of the four placeholder literals.
    pub fn is_placeholder(text: &str) -> bool {
        Self::ALL.iter().any(|p| p.as_str() == text)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value written into an output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOutcome {
    Sequence(String),
    Placeholder(Placeholder),
}

impl CellOutcome {
    pub fn text(&self) -> &str {
        match self {
            CellOutcome::Sequence(s) => s,
            CellOutcome::Placeholder(p) => p.as_str(),
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, CellOutcome::Sequence(_))
    }
}

/// An (input column, output column) mapping, 1-indexed like spreadsheet columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPair {
    pub input: usize,
    pub output: usize,
}

impl ColumnPair {
    pub const fn new(input: usize, output: usize) -> Self {
        Self { input, output }
    }
}

/// K → L and O → P.
pub const TRACKED_PAIRS: [ColumnPair; 2] = [ColumnPair::new(11, 12), ColumnPair::new(15, 16)];

/// Per-category counts of written output cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub sequences: usize,
    pub input_absent: usize,
    pub format_invalid: usize,
    pub fetch_failed: usize,
    pub processing_error: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &CellOutcome) {
        match outcome {
            CellOutcome::Sequence(_) => self.sequences += 1,
            CellOutcome::Placeholder(Placeholder::InputAbsent) => self.input_absent += 1,
            CellOutcome::Placeholder(Placeholder::FormatInvalid) => self.format_invalid += 1,
            CellOutcome::Placeholder(Placeholder::FetchFailed) => self.fetch_failed += 1,
            CellOutcome::Placeholder(Placeholder::ProcessingError) => self.processing_error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.sequences
            + self.input_absent
            + self.format_invalid
            + self.fetch_failed
            + self.processing_error
    }
}

/// Progress event emitted after each visited row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowProgress {
    /// 1-indexed row just finished.
    pub row: usize,
    pub total_rows: usize,
    pub success_count: usize,
}

/// Aggregate result of one run.
#[derive(Debug, Clone)]
pub struct ProcessingReport {
    /// Rows the run intended to visit (sheet height, capped by `max_rows`).
    pub total_rows: usize,
    pub rows_processed: usize,
    /// Output cells holding a fetched sequence, across both tracked pairs.
    pub success_count: usize,
    pub tally: OutcomeTally,
    pub cancelled: bool,
    /// Set when the row loop died unexpectedly; the grid still holds everything written.
    pub aborted: Option<String>,
    pub grid: Grid,
}

impl ProcessingReport {
    pub fn new(total_rows: usize, grid: Grid) -> Self {
        Self {
            total_rows,
            rows_processed: 0,
            success_count: 0,
            tally: OutcomeTally::default(),
            cancelled: false,
            aborted: None,
            grid,
        }
    }

    pub fn record(&mut self, outcome: &CellOutcome) {
        if outcome.is_sequence() {
            self.success_count += 1;
        }
        self.tally.record(outcome);
    }

    pub fn into_parts(self) -> (usize, Grid) {
        (self.success_count, self.grid)
    }
}
