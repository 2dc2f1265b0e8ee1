//! Result table exported by the simulator.
//!
//! The export is a Windows-1252, `;`-delimited table: a free-form header
//! block followed by seven `label;number` rows. The rows are bound to
//! [`Metric::ALL`](crate::domain::Metric::ALL) by position.

use super::encoding::decode_windows_1252;
use super::locale::parse_locale_number;
use super::{ExportFormat, ResultsLocator};
use crate::common::constants::RESULT_ROW_COUNT;
use crate::domain::{ParserResult, SimulationResultSet, TritonError};
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn parse_results(path: &Path, format: &ExportFormat) -> ParserResult<SimulationResultSet> {
    let bytes = fs::read(path).map_err(|source| {
        TritonError::io_system(
            "IO.EXPORT_READ",
            format!("failed to read export '{}': {}", path.display(), source),
        )
    })?;

    parse_results_bytes(&bytes, format).map_err(|error| {
        TritonError::new(
            error.category(),
            error.code(),
            format!("{}: {}", path.display(), error.message()),
        )
    })
}

pub fn parse_results_bytes(
    bytes: &[u8],
    format: &ExportFormat,
) -> ParserResult<SimulationResultSet> {
    let text = decode_windows_1252(bytes);
    let records = match &format.locator {
        ResultsLocator::SkipRows(count) => read_records(skip_lines(&text, *count), format)?,
        ResultsLocator::Sentinel(label) => {
            let records = read_records(&text, format)?;
            let position = records
                .iter()
                .position(|record| record.iter().any(|cell| cell.trim() == label))
                .ok_or_else(|| {
                    TritonError::malformed_output(
                        "OUTPUT.SENTINEL_NOT_FOUND",
                        format!("results sentinel '{}' not found", label),
                    )
                })?;
            records.into_iter().skip(position + 1).collect()
        }
    };

    let results = bind_rows(&records)?;
    for (metric, variable) in results.iter() {
        debug!(
            "Bound '{}' = {} {} to {}",
            variable.label,
            variable.value,
            variable.unit,
            metric.key()
        );
    }
    Ok(results)
}

/// Drops `count` raw lines. `\r\n`, `\n` and a bare `\r` all end a line, and
/// blank lines count.
fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        let Some(index) = rest.find(['\r', '\n']) else {
            return "";
        };
        let terminator = if rest[index..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[index + terminator..];
    }
    rest
}

fn read_records(text: &str, format: &ExportFormat) -> ParserResult<Vec<StringRecord>> {
    ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes())
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| {
            TritonError::malformed_output(
                "OUTPUT.TABLE",
                format!("export is not a readable table: {}", source),
            )
        })
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

fn bind_rows(records: &[StringRecord]) -> ParserResult<SimulationResultSet> {
    let mut rows = Vec::with_capacity(RESULT_ROW_COUNT);
    for record in records.iter().filter(|record| !is_blank(record)) {
        if rows.len() == RESULT_ROW_COUNT {
            break;
        }
        let position = rows.len() + 1;

        let label = record.get(0).map(str::trim).unwrap_or_default();
        if label.is_empty() {
            return Err(TritonError::malformed_output(
                "OUTPUT.EMPTY_LABEL",
                format!("result row {} has an empty label", position),
            ));
        }

        let raw = record
            .get(1)
            .filter(|cell| !cell.trim().is_empty())
            .ok_or_else(|| {
                TritonError::malformed_output(
                    "OUTPUT.MISSING_COLUMN",
                    format!("result row {} ('{}') has no value column", position, label),
                )
            })?;
        let value = parse_locale_number(raw).map_err(|error| {
            TritonError::malformed_output(
                "OUTPUT.INVALID_NUMBER",
                format!("result row {} ('{}'): {}", position, label, error.message()),
            )
        })?;

        rows.push((label.to_string(), value));
    }

    let found = rows.len();
    let rows: [(String, f64); RESULT_ROW_COUNT] = rows.try_into().map_err(|_| {
        TritonError::malformed_output(
            "OUTPUT.TOO_FEW_ROWS",
            format!(
                "expected {} result rows, found {}",
                RESULT_ROW_COUNT, found
            ),
        )
    })?;
    Ok(SimulationResultSet::from_ordered(rows))
}
