use anyhow::{Context, Result};
use clap::Parser;
use eligreport::{
    config::{OutputFormat, ReportConfig},
    dataset::EligibilityTable,
    report::ReportBuilder,
};
use std::{io, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Per-state Medicaid eligibility summary: membership, missing age data, age bands"
)]
struct Args {
    /// YAML config; any field left out keeps its built-in default
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Parquet file or directory of Parquet files
    #[arg(short, long)]
    dataset: Option<PathBuf>,
    /// Comma-separated state codes to report on, e.g. CA,NY
    #[arg(short, long, value_delimiter = ',')]
    states: Option<Vec<String>>,
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    // ─── 2) resolve config: defaults < file < flags ──────────────────
    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => ReportConfig::from_yaml_file(path)?,
        None => ReportConfig::default(),
    };
    if let Some(dataset) = args.dataset {
        cfg.dataset = dataset;
    }
    if let Some(states) = args.states {
        cfg.states = states.into_iter().map(|s| s.trim().to_uppercase()).collect();
    }
    if let Some(format) = args.format {
        cfg.format = format;
    }
    cfg.validate().context("invalid report config")?;
    info!(dataset = %cfg.dataset.display(), states = cfg.states.len(), "startup");

    // ─── 3) load the extract ─────────────────────────────────────────
    let start = Instant::now();
    let table = EligibilityTable::load(&cfg.dataset, &cfg.columns)
        .with_context(|| format!("loading dataset {}", cfg.dataset.display()))?;
    info!(elapsed = ?start.elapsed(), "dataset loaded");

    // ─── 4) summarize and print ──────────────────────────────────────
    let report = ReportBuilder::new(&table).build(&cfg.states, &cfg.state_names)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report.render(cfg.format, &mut out)?;

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
