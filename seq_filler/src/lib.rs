// src/lib.rs

pub mod api_handler;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod grid;
pub mod html;
pub mod models;
pub mod pipeline;

pub use api_handler::{LookupResponse, LookupTransport, ReqwestTransport, TransportError};
pub use checkpoint::{GridSink, MemorySink, XlsxFileSink};
pub use config::{RetryPolicy, RunConfig};
pub use error::{ConfigError, FetchError, GridError, PipelineError};
pub use fetcher::{HttpSequenceFetcher, SequenceFetcher};
pub use grid::{default_output_path, read_grid_from_bytes, read_grid_from_path, CellValue, Grid};
pub use models::{
    CellOutcome, ColumnPair, OutcomeTally, Placeholder, ProcessingReport, RowProgress,
    SequenceResult, TRACKED_PAIRS,
};
pub use pipeline::{classify_cell, process_workbook, CancelToken, ProcessOptions, RowProcessor};
