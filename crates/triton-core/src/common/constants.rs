//! Constants tied to the Netuno 4 simulator and its export format.

use std::time::Duration;

pub const LOSS_COEFFICIENT_MIN: f64 = 0.1;
pub const LOSS_COEFFICIENT_MAX: f64 = 1.0;
pub const RAINWATER_REPLACEMENT_PERCENT_MIN: u32 = 10;
pub const RAINWATER_REPLACEMENT_PERCENT_MAX: u32 = 100;

pub const SIMULATOR_SETTLE_TIME: Duration = Duration::from_secs(1);

pub const EXPORT_DELIMITER: u8 = b';';
pub const EXPORT_HEADER_ROWS: usize = 22;
pub const EXPORT_SUFFIX: &str = "out.csv";
pub const RESULT_ROW_COUNT: usize = 7;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
pub const DEFAULT_RESULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const REPORT_FILE_SUFFIX: &str = "consolidated.csv";
pub const REPORT_HEADER: [&str; 7] = [
    "location",
    "model",
    "scenario",
    "metric_key",
    "label",
    "value",
    "unit",
];

pub const INPUT_FILE_GLOB: &str = "*.csv";

/// Scenario start dates typed into the simulator's date field.
pub const SCENARIO_START_DATES: [(&str, &str); 3] = [
    ("Histórico", "1980-01-01"),
    ("SSP245", "2015-01-01"),
    ("SSP585", "2015-01-01"),
];
pub const FALLBACK_START_DATE: &str = "2015-01-01";

#[cfg(test)]
mod tests {
    use super::{
        LOSS_COEFFICIENT_MAX, LOSS_COEFFICIENT_MIN, RAINWATER_REPLACEMENT_PERCENT_MAX,
        RAINWATER_REPLACEMENT_PERCENT_MIN, REPORT_HEADER, SCENARIO_START_DATES,
    };

    #[test]
    fn bounds_are_ordered() {
        assert!(LOSS_COEFFICIENT_MIN < LOSS_COEFFICIENT_MAX);
        assert!(RAINWATER_REPLACEMENT_PERCENT_MIN < RAINWATER_REPLACEMENT_PERCENT_MAX);
    }

    #[test]
    fn report_header_lists_identifiers_before_measurements() {
        assert_eq!(&REPORT_HEADER[..3], &["location", "model", "scenario"]);
        assert_eq!(REPORT_HEADER[5], "value");
    }

    #[test]
    fn scenario_dates_use_iso_format() {
        for (scenario, date) in SCENARIO_START_DATES {
            assert_eq!(date.len(), 10, "{scenario}");
            assert_eq!(date.as_bytes()[4], b'-');
        }
    }
}
