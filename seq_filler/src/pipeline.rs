// src/pipeline.rs
// -----------------------------------------------------------------------------
// Row driver. Walks the sheet top to bottom, and for each tracked column pair reads
// the coordinate, validates it, asks the fetcher, and writes exactly one value into
// the output cell. Strictly sequential: one request in flight, paced by a fixed delay.
// Partial output is saved every `checkpoint_every` rows and once more at the end,
// whatever way the loop ended.
// -----------------------------------------------------------------------------

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api_handler::ReqwestTransport;
use crate::checkpoint::{GridSink, XlsxFileSink};
use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::fetcher::{HttpSequenceFetcher, SequenceFetcher};
use crate::grid::{read_grid_from_bytes, read_grid_from_path, CellValue, Grid};
use crate::models::{
    CellOutcome, ColumnPair, Placeholder, ProcessingReport, RowProgress, SequenceResult,
    TRACKED_PAIRS,
};

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub pairs: Vec<ColumnPair>,
    /// Sleep after each pair that issued a lookup. Pairs short-circuited to `空值` or
    /// `格式错误` send no request and are not paced, unlike the original tool, which
    /// slept after every pair.
    pub pacing_delay: Duration,
    pub checkpoint_every: usize,
    pub max_rows: Option<usize>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self::from(&RunConfig::default())
    }
}

impl From<&RunConfig> for ProcessOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            pairs: TRACKED_PAIRS.to_vec(),
            pacing_delay: config.pacing_delay(),
            checkpoint_every: config.checkpoint_every.max(1),
            max_rows: config.max_rows,
        }
    }
}

/// Cooperative stop flag, checked between rows.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Decides whether a cell is worth a lookup. `Ok` carries the trimmed coordinate.
pub fn classify_cell(value: &CellValue) -> Result<String, Placeholder> {
    if value.is_absent() {
        return Err(Placeholder::InputAbsent);
    }
    let coordinate = value.to_string().trim().to_string();
    if coordinate.contains(':') && coordinate.contains('-') {
        Ok(coordinate)
    } else {
        Err(Placeholder::FormatInvalid)
    }
}

pub struct RowProcessor<'a> {
    options: ProcessOptions,
    cancel: CancelToken,
    progress: Option<Box<dyn FnMut(RowProgress) + 'a>>,
}

impl<'a> RowProcessor<'a> {
    pub fn new(options: ProcessOptions) -> Self {
        Self {
            options,
            cancel: CancelToken::default(),
            progress: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, callback: impl FnMut(RowProgress) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Runs the whole grid. The final save is attempted on every exit path; only a
    /// failing final save turns into `Err`.
    pub fn process(
        &mut self,
        grid: Grid,
        fetcher: &mut dyn SequenceFetcher,
        sink: &mut dyn GridSink,
    ) -> Result<ProcessingReport, PipelineError> {
        let total = match self.options.max_rows {
            Some(cap) => grid.height().min(cap),
            None => grid.height(),
        };
        let mut report = ProcessingReport::new(total, grid);
        info!(
            "Processing {} rows of sheet '{}' (pacing {:?}, checkpoint every {} rows)",
            total, report.grid.sheet_name, self.options.pacing_delay, self.options.checkpoint_every
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_rows(&mut report, &mut *fetcher, &mut *sink)
        }));
        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            error!(
                "Processing stopped after row {}: {}",
                report.rows_processed, message
            );
            report.aborted = Some(message);
        }

        sink.persist(&report.grid).map_err(PipelineError::Persist)?;
        info!(
            "Finished: {}/{} rows visited, {} sequences fetched",
            report.rows_processed, report.total_rows, report.success_count
        );
        Ok(report)
    }

    /// Parses xlsx bytes, runs them, and returns the report with the serialised result.
    pub fn process_bytes(
        &mut self,
        input: &[u8],
        fetcher: &mut dyn SequenceFetcher,
        sink: &mut dyn GridSink,
    ) -> Result<(ProcessingReport, Vec<u8>), PipelineError> {
        let grid = read_grid_from_bytes(input).map_err(PipelineError::GridRead)?;
        let report = self.process(grid, fetcher, sink)?;
        let bytes = report.grid.serialize().map_err(PipelineError::Persist)?;
        Ok((report, bytes))
    }

    fn run_rows(
        &mut self,
        report: &mut ProcessingReport,
        fetcher: &mut dyn SequenceFetcher,
        sink: &mut dyn GridSink,
    ) {
        for row in 1..=report.total_rows {
            if self.cancel.is_cancelled() {
                info!("Cancelled before row {}", row);
                report.cancelled = true;
                break;
            }
            debug!("Row {}/{}", row, report.total_rows);

            for pair in &self.options.pairs {
                let value = report.grid.cell(row, pair.input).clone();
                let (outcome, fetched) = process_cell(fetcher, &value, row, pair);
                report.grid.set_cell(row, pair.output, outcome.text());
                report.record(&outcome);
                if fetched && !self.options.pacing_delay.is_zero() {
                    thread::sleep(self.options.pacing_delay);
                }
            }
            report.rows_processed += 1;

            if report.rows_processed % self.options.checkpoint_every == 0 {
                match sink.persist(&report.grid) {
                    Ok(()) => info!("Checkpoint saved after row {}", row),
                    Err(e) => warn!("Checkpoint after row {} failed: {}", row, e),
                }
            }

            if let Some(callback) = self.progress.as_mut() {
                callback(RowProgress {
                    row,
                    total_rows: report.total_rows,
                    success_count: report.success_count,
                });
            }
        }
    }
}

/// One cell, fully guarded. The flag says whether a lookup was attempted.
fn process_cell(
    fetcher: &mut dyn SequenceFetcher,
    value: &CellValue,
    row: usize,
    pair: &ColumnPair,
) -> (CellOutcome, bool) {
    let coordinate = match classify_cell(value) {
        Ok(c) => c,
        Err(placeholder) => return (CellOutcome::Placeholder(placeholder), false),
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| fetcher.fetch(&coordinate)));
    let outcome = match result {
        Ok(Ok(SequenceResult::Sequence(seq))) => CellOutcome::Sequence(seq),
        Ok(Ok(SequenceResult::Empty)) | Ok(Ok(SequenceResult::TransportFailure)) => {
            CellOutcome::Placeholder(Placeholder::FetchFailed)
        }
        Ok(Err(e)) => {
            error!("Row {} column {}: {}", row, pair.input, e);
            CellOutcome::Placeholder(Placeholder::ProcessingError)
        }
        Err(payload) => {
            error!(
                "Row {} column {}: fetch panicked: {}",
                row,
                pair.input,
                panic_message(payload.as_ref())
            );
            CellOutcome::Placeholder(Placeholder::ProcessingError)
        }
    };
    (outcome, true)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Reads `input`, fetches over HTTP, and saves checkpoints and the result to `output`.
pub fn process_workbook(
    input: &Path,
    output: &Path,
    config: &RunConfig,
    cancel: CancelToken,
    progress: impl FnMut(RowProgress),
) -> Result<ProcessingReport, PipelineError> {
    config.validate()?;
    let grid = read_grid_from_path(input).map_err(PipelineError::GridRead)?;
    let transport = ReqwestTransport::new(config)?;
    let mut fetcher = HttpSequenceFetcher::new(transport, config.retry_policy());
    let mut sink = XlsxFileSink::new(output);

    RowProcessor::new(ProcessOptions::from(config))
        .with_cancel(cancel)
        .with_progress(progress)
        .process(grid, &mut fetcher, &mut sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_handler::TransportError;
    use crate::checkpoint::MemorySink;
    use crate::config::RetryPolicy;
    use crate::error::{FetchError, GridError};
    use crate::fetcher::tests::ScriptedTransport;
    use crate::grid::read_grid_from_path;

    const K: usize = 11;
    const L: usize = 12;
    const O: usize = 15;
    const P: usize = 16;

    /// Deterministic fetcher: the sequence is derived from the coordinate text.
    #[derive(Default)]
    struct StubFetcher {
        calls: Vec<String>,
        cancel_on: Option<(String, CancelToken)>,
    }

    impl SequenceFetcher for StubFetcher {
        fn fetch(&mut self, coordinate: &str) -> Result<SequenceResult, FetchError> {
            self.calls.push(coordinate.to_string());
            if let Some((trigger, token)) = &self.cancel_on {
                if trigger == coordinate {
                    token.cancel();
                }
            }
            if coordinate.contains("panic") {
                panic!("stub blew up on {coordinate}");
            }
            if coordinate.contains("error") {
                return Err(FetchError::Unexpected("stub error".into()));
            }
            if coordinate.contains("missing") {
                return Ok(SequenceResult::Empty);
            }
            if coordinate.contains("down") {
                return Ok(SequenceResult::TransportFailure);
            }
            let n = coordinate.len() % 4 + 1;
            Ok(SequenceResult::Sequence("ACGT".repeat(n)))
        }
    }

    struct FailingSink;

    impl GridSink for FailingSink {
        fn persist(&mut self, _grid: &Grid) -> Result<(), GridError> {
            Err(GridError::NoWorksheet("nowhere".into()))
        }
    }

    /// Fails the first `fail_first` saves.
    struct FlakySink {
        saves: usize,
        fail_first: usize,
    }

    impl GridSink for FlakySink {
        fn persist(&mut self, _grid: &Grid) -> Result<(), GridError> {
            self.saves += 1;
            if self.saves <= self.fail_first {
                Err(GridError::NoWorksheet("flaky".into()))
            } else {
                Ok(())
            }
        }
    }

    fn options() -> ProcessOptions {
        ProcessOptions {
            pacing_delay: Duration::ZERO,
            ..ProcessOptions::default()
        }
    }

    fn grid_of(rows: &[(&str, &str)]) -> Grid {
        let mut grid = Grid::new("Sheet1");
        for (i, (k, o)) in rows.iter().enumerate() {
            let row = i + 1;
            grid.set_cell(row, 1, format!("row{row}"));
            if !k.is_empty() {
                grid.set_cell(row, K, *k);
            }
            if !o.is_empty() {
                grid.set_cell(row, O, *o);
            }
        }
        grid
    }

    fn coordinate_grid(rows: usize) -> Grid {
        let mut grid = Grid::new("Sheet1");
        for row in 1..=rows {
            grid.set_cell(row, K, format!("chr1:{row}-{}", row + 10));
            grid.set_cell(row, O, format!("chr2:{row}-{}", row + 20));
        }
        grid
    }

    fn run(grid: Grid, fetcher: &mut dyn SequenceFetcher) -> ProcessingReport {
        let mut sink = MemorySink::default();
        RowProcessor::new(options())
            .process(grid, fetcher, &mut sink)
            .unwrap()
    }

    #[test]
    fn every_visited_output_cell_is_written() {
        let grid = grid_of(&[
            ("chr4B:425000640-425000640", ""),
            ("", "notacoordinate"),
            ("chr1:1-5 missing", "chr1:1-5 down"),
            ("chr1:1-5 error", "chr1:1-5 panic"),
            ("   ", "chr3A:10-20"),
        ]);
        let mut fetcher = StubFetcher::default();
        let report = run(grid, &mut fetcher);

        assert_eq!(report.rows_processed, 5);
        for row in 1..=5 {
            for col in [L, P] {
                let text = report.grid.cell(row, col).as_text().unwrap_or_default();
                assert!(!text.is_empty(), "row {row} col {col} left empty");
            }
        }
        assert_eq!(report.grid.cell(1, P).as_text(), Some("空值"));
        assert_eq!(report.grid.cell(2, L).as_text(), Some("空值"));
        assert_eq!(report.grid.cell(2, P).as_text(), Some("格式错误"));
        assert_eq!(report.grid.cell(3, L).as_text(), Some("获取失败"));
        assert_eq!(report.grid.cell(3, P).as_text(), Some("获取失败"));
        assert_eq!(report.grid.cell(4, L).as_text(), Some("处理出错"));
        assert_eq!(report.grid.cell(4, P).as_text(), Some("处理出错"));
        assert_eq!(report.grid.cell(5, L).as_text(), Some("格式错误"));
        assert!(report.aborted.is_none());
    }

    #[test]
    fn success_count_matches_sequence_cells() {
        let grid = grid_of(&[
            ("chr1:1-2", "chr1:3-4"),
            ("", "bad"),
            ("chr1:1-2 down", "chr9:100-200"),
        ]);
        let mut fetcher = StubFetcher::default();
        let report = run(grid, &mut fetcher);

        let sequences = (1..=report.grid.height())
            .flat_map(|row| [L, P].map(|col| (row, col)))
            .filter(|&(row, col)| {
                let text = report.grid.cell(row, col).as_text().unwrap_or_default();
                !text.is_empty() && !Placeholder::is_placeholder(text)
            })
            .count();
        assert_eq!(report.success_count, 3);
        assert_eq!(report.success_count, sequences);
        assert_eq!(report.tally.sequences, 3);
        assert_eq!(report.tally.total(), 6);
    }

    #[test]
    fn malformed_input_is_never_fetched() {
        let grid = grid_of(&[("notacoordinate", "")]);
        let mut fetcher = StubFetcher::default();
        let report = run(grid, &mut fetcher);
        assert_eq!(report.grid.cell(1, L).as_text(), Some("格式错误"));
        assert_eq!(report.grid.cell(1, P).as_text(), Some("空值"));
        assert!(fetcher.calls.is_empty());
    }

    #[test]
    fn zero_and_false_inputs_count_as_empty() {
        let mut grid = Grid::new("Sheet1");
        grid.set_cell(1, K, CellValue::Int(0));
        grid.set_cell(1, O, CellValue::Bool(false));
        grid.set_cell(2, K, CellValue::Number(0.0));
        grid.set_cell(2, O, "chr1:1-2");
        let mut fetcher = StubFetcher::default();
        let report = run(grid, &mut fetcher);
        assert_eq!(report.grid.cell(1, L).as_text(), Some("空值"));
        assert_eq!(report.grid.cell(1, P).as_text(), Some("空值"));
        assert_eq!(report.grid.cell(2, L).as_text(), Some("空值"));
        assert_eq!(fetcher.calls, vec!["chr1:1-2".to_string()]);
        assert_eq!(report.tally.input_absent, 3);
    }

    #[test]
    fn cancelled_before_start_still_saves() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut fetcher = StubFetcher::default();
        let mut sink = MemorySink::default();
        let report = RowProcessor::new(options())
            .with_cancel(cancel)
            .process(coordinate_grid(5), &mut fetcher, &mut sink)
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.rows_processed, 0);
        assert!(fetcher.calls.is_empty());
        assert_eq!(sink.snapshots.len(), 1);
    }

    #[test]
    fn empty_input_is_never_fetched() {
        let mut grid = Grid::new("Sheet1");
        grid.set_cell(1, 1, "only a label");
        grid.set_cell(1, K, "");
        let mut fetcher = StubFetcher::default();
        let report = run(grid, &mut fetcher);
        assert_eq!(report.grid.cell(1, L).as_text(), Some("空值"));
        assert_eq!(report.grid.cell(1, P).as_text(), Some("空值"));
        assert!(fetcher.calls.is_empty());
    }

    #[test]
    fn exhausted_retries_write_fetch_failed() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Connection(
            "connection refused".into(),
        ))]);
        let mut fetcher = HttpSequenceFetcher::new(transport, RetryPolicy::immediate(3));
        let grid = grid_of(&[("chr4B:425000640-425000640", "")]);
        let report = run(grid, &mut fetcher);

        assert_eq!(report.grid.cell(1, L).as_text(), Some("获取失败"));
        assert_eq!(fetcher.transport().calls.get(), 3);
        assert_eq!(report.success_count, 0);
    }

    #[test]
    fn scraped_sequence_lands_in_output_column() {
        let transport = ScriptedTransport::new(vec![Ok(crate::api_handler::LookupResponse::ok(
            "<pre id=\"seq\">&gt;header line\nACGT\nACGT</pre>",
        ))]);
        let mut fetcher = HttpSequenceFetcher::new(transport, RetryPolicy::immediate(3));
        let grid = grid_of(&[("chr4B:425000640-425000640", "")]);
        let report = run(grid, &mut fetcher);
        assert_eq!(report.grid.cell(1, L).as_text(), Some("ACGTACGT"));
        assert_eq!(report.success_count, 1);
    }

    #[test]
    fn numeric_and_padded_values_are_coerced() {
        let mut grid = Grid::new("Sheet1");
        grid.set_cell(1, K, CellValue::Int(425000640));
        grid.set_cell(1, O, "  chr7D:1-9  ");
        let mut fetcher = StubFetcher::default();
        let report = run(grid, &mut fetcher);
        assert_eq!(report.grid.cell(1, L).as_text(), Some("格式错误"));
        assert_eq!(fetcher.calls, vec!["chr7D:1-9".to_string()]);
        assert!(report.grid.cell(1, P).as_text().unwrap().starts_with("ACGT"));
    }

    #[test]
    fn first_row_is_processed_like_any_other() {
        let grid = grid_of(&[("Position K", "Position O"), ("chr1:1-2", "chr1:3-4")]);
        let mut fetcher = StubFetcher::default();
        let report = run(grid, &mut fetcher);
        assert_eq!(report.grid.cell(1, L).as_text(), Some("格式错误"));
        assert_eq!(report.grid.cell(1, P).as_text(), Some("格式错误"));
        assert_eq!(report.success_count, 2);
    }

    #[test]
    fn repeated_runs_produce_identical_grids() {
        let grid = grid_of(&[
            ("chr1:1-2", "nope"),
            ("", "chr2:5-50"),
            ("chr3:7-70 down", "chr4:1-1"),
        ]);
        let first = run(grid.clone(), &mut StubFetcher::default());
        let second = run(grid, &mut StubFetcher::default());
        assert_eq!(first.grid, second.grid);
        assert_eq!(first.success_count, second.success_count);
    }

    #[test]
    fn row_cap_leaves_later_rows_untouched() {
        let mut fetcher = StubFetcher::default();
        let mut sink = MemorySink::default();
        let report = RowProcessor::new(ProcessOptions {
            max_rows: Some(3),
            ..options()
        })
        .process(coordinate_grid(5), &mut fetcher, &mut sink)
        .unwrap();

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.rows_processed, 3);
        assert_eq!(fetcher.calls.len(), 6);
        assert_eq!(report.grid.cell(4, L), &CellValue::Empty);
        assert_eq!(report.grid.cell(5, P), &CellValue::Empty);
    }

    #[test]
    fn checkpoints_hold_only_rows_already_visited() {
        let cancel = CancelToken::new();
        let mut fetcher = StubFetcher {
            calls: Vec::new(),
            cancel_on: Some(("chr2:20-40".to_string(), cancel.clone())),
        };
        let mut sink = MemorySink::default();
        let report = RowProcessor::new(options())
            .with_cancel(cancel)
            .process(coordinate_grid(25), &mut fetcher, &mut sink)
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.rows_processed, 20);
        // rows 10 and 20, then the final save
        assert_eq!(sink.snapshots.len(), 3);

        let at_twenty = &sink.snapshots[1];
        for row in 1..=20 {
            assert!(at_twenty.cell(row, L).as_text().unwrap().starts_with("ACGT"));
            assert!(at_twenty.cell(row, P).as_text().unwrap().starts_with("ACGT"));
        }
        for row in 21..=25 {
            assert_eq!(at_twenty.cell(row, L), &CellValue::Empty);
            assert_eq!(at_twenty.cell(row, P), &CellValue::Empty);
        }
        assert_eq!(sink.snapshots[2], *at_twenty);

        let at_ten = &sink.snapshots[0];
        assert_eq!(at_ten.cell(11, L), &CellValue::Empty);
    }

    #[test]
    fn checkpoint_file_survives_abort_after_row_twenty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.xlsx");
        let mut sink = XlsxFileSink::new(&path);
        let mut fetcher = StubFetcher::default();

        let report = RowProcessor::new(options())
            .with_progress(|p: RowProgress| {
                if p.row == 20 {
                    panic!("simulated crash after row 20");
                }
            })
            .process(coordinate_grid(25), &mut fetcher, &mut sink)
            .unwrap();

        assert!(report.aborted.is_some());
        assert_eq!(report.rows_processed, 20);

        let saved = read_grid_from_path(&path).unwrap();
        for row in 1..=20 {
            assert!(saved.cell(row, L).as_text().unwrap().starts_with("ACGT"));
            assert!(saved.cell(row, P).as_text().unwrap().starts_with("ACGT"));
        }
        for row in 21..=25 {
            assert_eq!(saved.cell(row, L), &CellValue::Empty);
            assert_eq!(saved.cell(row, P), &CellValue::Empty);
            assert!(saved.cell(row, K).as_text().is_some());
        }
    }

    #[test]
    fn failed_checkpoint_does_not_stop_the_run() {
        let mut fetcher = StubFetcher::default();
        let mut sink = FlakySink {
            saves: 0,
            fail_first: 1,
        };
        let report = RowProcessor::new(ProcessOptions {
            checkpoint_every: 2,
            ..options()
        })
        .process(coordinate_grid(3), &mut fetcher, &mut sink)
        .unwrap();
        assert_eq!(report.rows_processed, 3);
        assert_eq!(report.success_count, 6);
        assert_eq!(sink.saves, 2);
    }

    #[test]
    fn failed_final_save_is_a_run_error() {
        let mut fetcher = StubFetcher::default();
        let result = RowProcessor::new(options()).process(
            coordinate_grid(2),
            &mut fetcher,
            &mut FailingSink,
        );
        assert!(matches!(result, Err(PipelineError::Persist(_))));
    }

    #[test]
    fn unreadable_bytes_fail_before_any_fetch() {
        let mut fetcher = StubFetcher::default();
        let mut sink = MemorySink::default();
        let result = RowProcessor::new(options()).process_bytes(
            b"PK\x03\x04 truncated",
            &mut fetcher,
            &mut sink,
        );
        assert!(matches!(result, Err(PipelineError::GridRead(_))));
        assert!(fetcher.calls.is_empty());
        assert!(sink.snapshots.is_empty());
    }

    #[test]
    fn bytes_in_bytes_out() {
        let input = coordinate_grid(2).serialize().unwrap();
        let mut fetcher = StubFetcher::default();
        let mut sink = MemorySink::default();
        let (report, output) = RowProcessor::new(options())
            .process_bytes(&input, &mut fetcher, &mut sink)
            .unwrap();
        assert_eq!(report.success_count, 4);

        let back = read_grid_from_bytes(&output).unwrap();
        assert!(back.cell(2, P).as_text().unwrap().starts_with("ACGT"));
        assert_eq!(back.cell(1, K).as_text(), Some("chr1:1-11"));
    }

    #[test]
    fn progress_reports_every_row() {
        let mut seen = Vec::new();
        let mut fetcher = StubFetcher::default();
        let mut sink = MemorySink::default();
        RowProcessor::new(options())
            .with_progress(|p| seen.push((p.row, p.total_rows)))
            .process(coordinate_grid(3), &mut fetcher, &mut sink)
            .unwrap();
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn classify_cell_covers_each_branch() {
        assert_eq!(classify_cell(&CellValue::Empty), Err(Placeholder::InputAbsent));
        assert_eq!(
            classify_cell(&CellValue::from("chr1A")),
            Err(Placeholder::FormatInvalid)
        );
        assert_eq!(
            classify_cell(&CellValue::from(" chr1A:5-6 ")),
            Ok("chr1A:5-6".to_string())
        );
    }
}
