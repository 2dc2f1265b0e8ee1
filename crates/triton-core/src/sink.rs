//! Buffered, append-only consolidated report.

use crate::common::constants::{REPORT_FILE_SUFFIX, REPORT_HEADER};
use crate::domain::{ResultRow, TritonError, TritonResult};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Empty,
    Written(usize),
}

/// Collects result rows in memory and appends them to the report on flush.
///
/// The report path is fixed when the sink is created; every flush of a
/// batch appends to the same file and the header is written only once.
#[derive(Debug)]
pub struct ResultSink {
    output_path: PathBuf,
    pending: Vec<ResultRow>,
}

impl ResultSink {
    pub fn new(output_dir: &Path) -> TritonResult<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::with_timestamp(output_dir, now)
    }

    pub fn with_timestamp(output_dir: &Path, timestamp: OffsetDateTime) -> TritonResult<Self> {
        let stamp = timestamp
            .format(format_description!("[year]-[month]-[day]T[hour]-[minute]"))
            .map_err(|source| {
                TritonError::internal(
                    "SYS.REPORT_TIMESTAMP",
                    format!("failed to format report timestamp: {}", source),
                )
            })?;

        Ok(Self {
            output_path: output_dir.join(format!("{}-{}", stamp, REPORT_FILE_SUFFIX)),
            pending: Vec::new(),
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn add(&mut self, rows: impl IntoIterator<Item = ResultRow>) {
        self.pending.extend(rows);
    }

    /// Appends every pending row to the report and clears the buffer.
    ///
    /// Pending rows are kept when the write fails.
    pub fn flush(&mut self) -> TritonResult<FlushOutcome> {
        if self.pending.is_empty() {
            warn!("No new results to save");
            return Ok(FlushOutcome::Empty);
        }

        let write_header = !self.output_path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .map_err(|source| self.write_error(source))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if write_header {
            writer
                .write_record(REPORT_HEADER)
                .map_err(|source| self.write_error(source))?;
        }
        for row in &self.pending {
            writer
                .write_record([
                    row.location.as_str(),
                    row.model.as_str(),
                    row.scenario.as_str(),
                    row.metric_key.as_str(),
                    row.label.as_str(),
                    row.value.to_string().as_str(),
                    row.unit.as_str(),
                ])
                .map_err(|source| self.write_error(source))?;
        }
        writer.flush().map_err(|source| self.write_error(source))?;

        let written = self.pending.len();
        self.pending.clear();
        info!(
            "Saved {} result row(s) to '{}'",
            written,
            self.output_path.display()
        );
        Ok(FlushOutcome::Written(written))
    }

    fn write_error(&self, source: impl std::fmt::Display) -> TritonError {
        TritonError::io_system(
            "IO.REPORT_WRITE",
            format!(
                "failed to write report '{}': {}",
                self.output_path.display(),
                source
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{FlushOutcome, ResultSink};
    use crate::domain::{Metric, ResultRow, TritonErrorCategory};
    use std::fs;
    use tempfile::TempDir;
    use time::macros::datetime;

    fn row(location: &str, metric: Metric, value: f64) -> ResultRow {
        ResultRow {
            location: location.to_string(),
            model: "ACCESS-CM2".to_string(),
            scenario: "SSP245".to_string(),
            metric_key: metric.key().to_string(),
            label: "Potencial de economia (%)".to_string(),
            value,
            unit: metric.unit().to_string(),
        }
    }

    #[test]
    fn report_name_comes_from_creation_timestamp() {
        let temp = TempDir::new().expect("tempdir should be created");
        let sink = ResultSink::with_timestamp(temp.path(), datetime!(2024-03-07 9:05 UTC))
            .expect("sink should be created");
        assert_eq!(
            sink.output_path(),
            temp.path().join("2024-03-07T09-05-consolidated.csv")
        );
    }

    #[test]
    fn flushing_an_empty_batch_writes_nothing() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut sink = ResultSink::new(temp.path()).expect("sink should be created");

        assert_eq!(sink.flush().expect("empty flush"), FlushOutcome::Empty);
        assert!(!sink.output_path().exists());
    }

    #[test]
    fn header_is_written_once_across_flushes() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut sink = ResultSink::with_timestamp(temp.path(), datetime!(2024-03-07 9:05 UTC))
            .expect("sink should be created");

        sink.add([
            row("Curitiba", Metric::PotentialSavings, 9.2),
            row("Curitiba", Metric::AverageRainwaterConsumption, 55.4734),
        ]);
        assert_eq!(sink.pending(), 2);
        assert_eq!(sink.flush().expect("first flush"), FlushOutcome::Written(2));
        assert_eq!(sink.pending(), 0);

        sink.add([row("Florianópolis", Metric::PeriodWhenDemandIsFullyMet, 0.0)]);
        assert_eq!(sink.flush().expect("second flush"), FlushOutcome::Written(1));

        let report = fs::read_to_string(sink.output_path()).expect("report should be readable");
        let lines = report.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "location,model,scenario,metric_key,label,value,unit",
                "Curitiba,ACCESS-CM2,SSP245,potential_savings,Potencial de economia (%),9.2,%",
                "Curitiba,ACCESS-CM2,SSP245,average_rainwater_consumption,Potencial de economia (%),55.4734,liters/day",
                "Florianópolis,ACCESS-CM2,SSP245,period_when_demand_is_fully_met,Potencial de economia (%),0,days",
            ]
        );
    }

    #[test]
    fn failed_flush_keeps_pending_rows() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut sink = ResultSink::new(&temp.path().join("missing").join("dir"))
            .expect("sink should be created");
        sink.add([row("Curitiba", Metric::PotentialSavings, 9.2)]);

        let error = sink.flush().expect_err("flush into missing dir should fail");
        assert_eq!(error.category(), TritonErrorCategory::IoSystem);
        assert_eq!(sink.pending(), 1);
    }
}
