// src/main.rs

use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use seq_filler::config::clamp_cli_delay;
use seq_filler::{
    default_output_path, process_workbook, CancelToken, Grid, ProcessingReport, RunConfig,
    TRACKED_PAIRS,
};

const PREVIEW_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "seq_filler")]
#[command(about = "Fill sequence columns of a spreadsheet from genomic coordinates (K→L, O→P)", long_about = None)]
struct Cli {
    /// Input workbook (.xlsx)
    input: PathBuf,

    /// Output workbook; defaults to `<input>_序列获取后.xlsx` next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON run configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to wait after each lookup (0.5 to 5.0)
    #[arg(long)]
    delay: Option<f64>,

    /// Stop after this many rows
    #[arg(long)]
    max_rows: Option<usize>,

    /// Save partial output every N rows
    #[arg(long)]
    checkpoint_every: Option<usize>,

    /// Attempts per coordinate, first try included
    #[arg(long)]
    attempts: Option<u32>,

    /// Lookup endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Print the first N processed rows when done (0 to skip)
    #[arg(long, default_value_t = 10)]
    preview: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    if !cli.input.exists() {
        bail!("input file {} not found", cli.input.display());
    }
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    info!(
        "Fetching sequences for {} -> {}",
        cli.input.display(),
        output.display()
    );

    let cancel = CancelToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let report = process_workbook(&cli.input, &output, &config, cancel, |p| {
        if p.row % 10 == 0 || p.row == p.total_rows {
            info!(
                "Row {}/{} done, {} sequences so far",
                p.row, p.total_rows, p.success_count
            );
        }
    })
    .with_context(|| format!("processing {}", cli.input.display()))?;

    if let Some(reason) = &report.aborted {
        warn!("Run stopped early: {}", reason);
    }
    print_summary(&report, &output);
    if cli.preview > 0 {
        print_preview(&report.grid, cli.preview);
    }
    Ok(())
}

/// First Ctrl-C stops the run after the current row (the final save still happens);
/// a second one exits immediately.
fn cancel_on_ctrl_c(cancel: CancelToken) {
    let spawned = thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    warn!("Cannot listen for Ctrl-C: {}", e);
                    return;
                }
            };
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                warn!("Interrupted; stopping after the current row and saving");
                cancel.cancel();
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted again; exiting without waiting");
                    std::process::exit(130);
                }
            });
        });
    if let Err(e) = spawned {
        warn!("Cannot start Ctrl-C listener: {}", e);
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(delay) = cli.delay {
        let clamped = clamp_cli_delay(delay);
        if clamped != delay {
            warn!("Delay {}s out of range, using {}s", delay, clamped);
        }
        config.pacing_delay_secs = clamped;
    }
    if let Some(n) = cli.max_rows {
        config.max_rows = Some(n);
    }
    if let Some(n) = cli.checkpoint_every {
        config.checkpoint_every = n;
    }
    if let Some(n) = cli.attempts {
        config.max_attempts = n;
    }
    if let Some(url) = &cli.endpoint {
        config.endpoint = url.clone();
    }
    config.validate().context("invalid run configuration")?;
    Ok(config)
}

fn print_summary(report: &ProcessingReport, output: &std::path::Path) {
    let t = &report.tally;
    println!(
        "Processed {}/{} rows{}",
        report.rows_processed,
        report.total_rows,
        if report.cancelled { " (cancelled)" } else { "" }
    );
    println!("Sequences fetched: {}", report.success_count);
    println!(
        "Empty: {}  Format errors: {}  Fetch failed: {}  Processing errors: {}",
        t.input_absent, t.format_invalid, t.fetch_failed, t.processing_error
    );
    println!("Result saved to {}", output.display());
}

fn print_preview(grid: &Grid, rows: usize) {
    println!();
    for row in 1..=grid.height().min(rows) {
        let cells: Vec<String> = TRACKED_PAIRS
            .iter()
            .flat_map(|pair| [pair.input, pair.output])
            .map(|col| clip(&grid.cell(row, col).to_string()))
            .collect();
        println!("{:>4} | {}", row, cells.join(" | "));
    }
}

fn clip(text: &str) -> String {
    if text.chars().count() <= PREVIEW_WIDTH {
        text.to_string()
    } else {
        let head: String = text.chars().take(PREVIEW_WIDTH - 1).collect();
        format!("{head}…")
    }
}
