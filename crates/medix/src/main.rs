use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use medix_library::MedixConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "medix")]
#[command(about = "Summarize a folder of images and audio files into a CSV report and charts")]
#[command(version)]
struct Args {
    /// Folder to analyze (not recursive)
    dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "MEDIX_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write the CSV report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Folder for the PNG charts
    #[arg(long)]
    chart_dir: Option<PathBuf>,

    /// Sort rows by file name
    #[arg(long)]
    sort: bool,

    /// Don't open the charts in the system viewer
    #[arg(long)]
    no_show: bool,

    /// Skip the charts
    #[arg(long)]
    no_charts: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn apply(&self, cfg: &mut MedixConfig) {
        if let Some(dir) = &self.dir {
            cfg.input_dir = dir.clone();
        }
        if let Some(output) = &self.output {
            cfg.report_path = output.clone();
        }
        if let Some(chart_dir) = &self.chart_dir {
            cfg.chart_dir = chart_dir.clone();
        }
        if self.sort {
            cfg.sort_by_name = true;
        }
        if self.no_show {
            cfg.charts.show = false;
        }
        if self.no_charts {
            cfg.charts.enabled = false;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => MedixConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => MedixConfig::from_env().context("failed to load configuration")?,
    };
    args.apply(&mut cfg);

    if args.print_config {
        print!("{}", cfg.to_toml_string()?);
        return Ok(());
    }

    let out = medix_library::run(&cfg)
        .with_context(|| format!("failed to summarize {}", cfg.input_dir.display()))?;

    if !out.failures.is_empty() {
        warn!(count = out.failures.len(), "some files could not be analyzed");
    }
    info!(
        rows = out.table.len(),
        report = %out.report_path.display(),
        charts = out.charts.len(),
        "done"
    );

    Ok(())
}
