use crate::domain::{ParserResult, TritonError};

/// Parses a number written with `.` as thousands separator and `,` as the
/// decimal mark, e.g. `10.553,14`.
pub fn parse_locale_number(raw: &str) -> ParserResult<f64> {
    let normalized = raw.trim().replace('.', "").replace(',', ".");
    let value = normalized.parse::<f64>().map_err(|_| {
        TritonError::numeric_parse(
            "PARSE.LOCALE_NUMBER",
            format!("'{}' is not a locale-formatted number", raw),
        )
    })?;

    if !value.is_finite() {
        return Err(TritonError::numeric_parse(
            "PARSE.LOCALE_NUMBER",
            format!("'{}' does not describe a finite number", raw),
        ));
    }
    Ok(value)
}
