use crate::config::PipelineConfig;
use crate::data::columns::{ColumnResolution, resolve_columns};
use crate::data::evaluate::evaluate_record;
use crate::data::model::{Dataset, DroppedRow, NormalizationReport, RawTable};
use crate::data::normalize::normalize_record;
use crate::error::PipelineError;

/// Runs resolution → normalization → evaluation over a loaded table.
///
/// Holds its own configuration, so independent pipelines can coexist.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve the table's headers against the alias table and metrics.
    pub fn resolve(&self, headers: &[String]) -> Result<ColumnResolution, PipelineError> {
        resolve_columns(headers, &self.config.aliases, &self.config.metrics)
    }

    /// Build the evaluated dataset.
    ///
    /// Only missing required columns fail the batch. Rows with no subject or
    /// an unreadable date are dropped and recorded in the dataset's report.
    pub fn run(&self, table: &RawTable) -> Result<Dataset, PipelineError> {
        log::info!("Detected columns: {}", table.headers.join(", "));

        let resolution = self.resolve(&table.headers)?;
        for (field, header) in &resolution.fields {
            log::debug!("{field} <- {header:?}");
        }
        for metric in &self.config.metrics {
            match resolution.metrics.get(&metric.name) {
                Some(header) => log::debug!("metric {:?} <- {header:?}", metric.name),
                None => log::info!("metric {:?} not present in export", metric.name),
            }
        }

        let mut report = NormalizationReport {
            total_rows: table.records.len(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(table.records.len());

        for (i, raw) in table.records.iter().enumerate() {
            match normalize_record(raw, &resolution, &self.config.default_category) {
                Ok(rec) => {
                    report.unresolved_cells +=
                        rec.metrics.values().filter(|v| !v.is_resolved()).count();
                    records.push(evaluate_record(rec, &self.config.metrics));
                }
                Err(reason) => {
                    log::debug!("dropping row {}: {reason}", i + 1);
                    report.dropped.push(DroppedRow { row: i + 1, reason });
                }
            }
        }

        if !report.dropped.is_empty() {
            log::warn!(
                "Dropped {} of {} rows (missing subject or unreadable date)",
                report.dropped.len(),
                report.total_rows
            );
        }
        if report.unresolved_cells > 0 {
            log::info!("{} metric cells could not be read as numbers", report.unresolved_cells);
        }

        Ok(Dataset::from_records(
            records,
            self.config.metric_names(),
            report,
        ))
    }
}
