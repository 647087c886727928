pub mod chart;
pub mod error;
pub mod extensions;
pub mod library_config;
pub mod report;
pub mod scanner;
pub mod table;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use tracing::{error, info};

pub use chart::Visualizer;
pub use error::{ChartError, ConfigError, LibraryError};
pub use extensions::{Classification, ExtensionTable, SupportedExtension};
pub use library_config::{ChartConfig, ChartConfigBuilder, MedixConfig, MedixConfigBuilder};
pub use scanner::{ScanFailure, ScanOutcome, Scanner};
pub use table::SummaryTable;

/// Everything one run produced.
#[derive(Debug)]
pub struct RunReport {
    pub table: SummaryTable,
    pub failures: Vec<ScanFailure>,
    pub report_path: PathBuf,
    pub charts: Vec<PathBuf>,
    /// Set when the charts couldn't be written; the CSV report exists regardless.
    pub chart_error: Option<ChartError>,
}

/// Scan → CSV → charts. Only a failed scan of the directory or a failed report write
/// aborts the run.
pub fn run(config: &MedixConfig) -> Result<RunReport, LibraryError> {
    let scanner = Scanner::new(config.extension_table());
    let ScanOutcome {
        mut table, failures, ..
    } = scanner.scan(&config.input_dir)?;

    if config.sort_by_name {
        table.sort_by_name();
    }

    report::write_csv(&table, &config.report_path)?;
    info!(path = %config.report_path.display(), rows = table.len(), "report written");

    let mut charts = Vec::new();
    let mut chart_error = None;
    if config.charts.enabled {
        match Visualizer::new(config.charts.clone()).render(&table, &config.chart_dir) {
            Ok(written) => charts = written,
            Err(e) => {
                error!(error = %e, "failed to render charts");
                chart_error = Some(e);
            }
        }
    }

    Ok(RunReport {
        table,
        failures,
        report_path: config.report_path.clone(),
        charts,
        chart_error,
    })
}
