//! Parsers for the simulator's export tables and precipitation file names.

pub mod encoding;
pub mod filename;
pub mod locale;
pub mod output;

pub use encoding::decode_windows_1252;
pub use filename::extract_metadata;
pub use locale::parse_locale_number;
pub use output::{parse_results, parse_results_bytes};

use crate::common::constants::{EXPORT_DELIMITER, EXPORT_HEADER_ROWS};

/// How the start of the results section is found inside an export table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsLocator {
    /// Results begin on the row after the first row holding this cell.
    Sentinel(String),
    /// Results begin after this many raw lines.
    SkipRows(usize),
}

impl Default for ResultsLocator {
    fn default() -> Self {
        Self::SkipRows(EXPORT_HEADER_ROWS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFormat {
    pub delimiter: u8,
    pub locator: ResultsLocator,
}

impl ExportFormat {
    pub fn with_locator(locator: ResultsLocator) -> Self {
        Self {
            locator,
            ..Self::default()
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self {
            delimiter: EXPORT_DELIMITER,
            locator: ResultsLocator::default(),
        }
    }
}
