//! Location, climate model and scenario encoded in precipitation file names.
//!
//! Expected shape: `[(annotation)]location_model_scenario.ext`. Only the
//! trailing extension is stripped, so dots inside fields survive. Underscores
//! only separate fields, so a model that itself contains underscores is
//! rejoined with hyphens.

use crate::domain::{InputFileMetadata, ParserResult, TritonError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

const ANNOTATION_PATTERN: &str = r"^\(.*?\)";

static ANNOTATION: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(ANNOTATION_PATTERN));

pub fn extract_metadata(path: &Path) -> ParserResult<InputFileMetadata> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            TritonError::malformed_filename(
                "INPUT.FILE_NAME",
                format!("'{}' has no readable file name", path.display()),
            )
        })?;

    let annotation = ANNOTATION.as_ref().map_err(|source| {
        TritonError::internal(
            "SYS.FILE_NAME_PATTERN",
            format!("invalid annotation pattern: {}", source),
        )
    })?;

    let mut parts = stem.split('_').map(str::trim).collect::<Vec<_>>();
    if let Some(first) = parts.first_mut() {
        let field: &str = *first;
        if let Some(found) = annotation.find(field) {
            *first = &field[found.end()..];
        }
    }

    if parts.len() < 3 || parts.iter().any(|part| part.is_empty()) {
        return Err(TritonError::malformed_filename(
            "INPUT.FILE_NAME",
            format!(
                "'{}' does not follow the location_model_scenario naming",
                path.display()
            ),
        ));
    }

    let location = parts[0];
    let scenario = parts[parts.len() - 1];
    let model = parts[1..parts.len() - 1].join("-");
    Ok(InputFileMetadata::new(location, model, scenario))
}

#[cfg(test)]
mod tests {
    use super::extract_metadata;
    use crate::domain::{InputFileMetadata, TritonErrorCategory};
    use std::path::Path;

    #[test]
    fn extracts_plain_and_annotated_names() {
        let cases = [
            (
                "Curitiba_ACCESS-CM2_Histórico.csv",
                ("Curitiba", "ACCESS-CM2", "Histórico"),
            ),
            (
                "(Netuno)Curitiba_ACCESS-CM2_SSP585.csv",
                ("Curitiba", "ACCESS-CM2", "SSP585"),
            ),
            (
                "(Netuno)Curitiba_AC_CE_SS_CM2_Histórico.csv",
                ("Curitiba", "AC-CE-SS-CM2", "Histórico"),
            ),
            (
                "(Netuno)São Paulo_GFDL-CM4_SSP245.csv",
                ("São Paulo", "GFDL-CM4", "SSP245"),
            ),
        ];

        for (name, (location, model, scenario)) in cases {
            let metadata = extract_metadata(Path::new(name)).expect("name should parse");
            assert_eq!(metadata, InputFileMetadata::new(location, model, scenario), "{name}");
        }
    }

    #[test]
    fn strips_only_the_trailing_extension() {
        let metadata = extract_metadata(Path::new(
            "/data/rain/Brasília_MIROC6_SSP245.v2.csv",
        ))
        .expect("name should parse");
        assert_eq!(metadata, InputFileMetadata::new("Brasília", "MIROC6", "SSP245.v2"));

        let metadata = extract_metadata(Path::new("St.Louis_ACCESS-CM2_SSP245.csv"))
            .expect("dotted location should parse");
        assert_eq!(metadata, InputFileMetadata::new("St.Louis", "ACCESS-CM2", "SSP245"));

        let metadata = extract_metadata(Path::new("(v1.2)Curitiba_ACCESS-CM2_SSP585.csv"))
            .expect("dotted annotation should parse");
        assert_eq!(metadata, InputFileMetadata::new("Curitiba", "ACCESS-CM2", "SSP585"));
    }

    #[test]
    fn rejects_names_with_too_few_fields() {
        for name in ["Curitiba_SSP245.csv", "(Netuno)_MIROC6_SSP245.csv", "rain.csv"] {
            let error = extract_metadata(Path::new(name)).expect_err("name should be rejected");
            assert_eq!(error.category(), TritonErrorCategory::MalformedFilename, "{name}");
        }
    }
}
