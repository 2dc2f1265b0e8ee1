use super::CliError;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use triton_core::domain::{SimulationParameters, TritonError};

pub(super) fn log_level(quiet: u8, verbose: bool) -> Level {
    match (verbose, quiet) {
        (true, _) => Level::DEBUG,
        (false, 0) => Level::INFO,
        (false, 1) => Level::WARN,
        (false, _) => Level::ERROR,
    }
}

/// Logs to stderr at the level picked by `-q`/`-v`; `RUST_LOG` wins when set.
pub(super) fn init_logging(quiet: u8, verbose: bool) {
    let level = log_level(quiet, verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

/// A parameters file that cannot be read or decoded is a validation error,
/// reported before anything is launched.
pub(super) fn load_parameters(path: Option<&Path>) -> Result<SimulationParameters, CliError> {
    let Some(path) = path else {
        return Ok(SimulationParameters::default());
    };
    read_parameters(path).map_err(|error| {
        CliError::from(TritonError::validation(
            "INPUT.PARAMETERS",
            format!("{error:#}"),
        ))
    })
}

fn read_parameters(path: &Path) -> anyhow::Result<SimulationParameters> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read simulation parameters '{}'", path.display()))?;
    serde_json::from_str::<SimulationParameters>(&content)
        .with_context(|| format!("failed to parse simulation parameters '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{load_parameters, log_level};
    use std::fs;
    use tempfile::TempDir;
    use tracing::Level;

    #[test]
    fn verbosity_flags_map_to_levels() {
        assert_eq!(log_level(0, false), Level::INFO);
        assert_eq!(log_level(1, false), Level::WARN);
        assert_eq!(log_level(2, false), Level::ERROR);
        assert_eq!(log_level(5, false), Level::ERROR);
        assert_eq!(log_level(2, true), Level::DEBUG);
    }

    #[test]
    fn parameters_default_without_file_and_load_with_clamping() {
        assert_eq!(
            load_parameters(None).expect("defaults should load"),
            triton_core::domain::SimulationParameters::default()
        );

        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("parameters.json");
        fs::write(&path, r#"{ "residents": 4, "rainwater_replacement_percentage": 250 }"#)
            .expect("parameters should be written");
        let parameters = load_parameters(Some(&path)).expect("parameters should load");
        assert_eq!(parameters.residents(), 4);
        assert_eq!(parameters.rainwater_replacement_percentage(), 100);
    }

    #[test]
    fn unreadable_or_invalid_parameters_are_validation_errors() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("absent.json");
        let error = load_parameters(Some(&path)).expect_err("missing file should fail");
        assert!(error.to_string().contains("absent.json"), "{error}");
        assert_eq!(error.exit_code(), 2);

        let path = temp.path().join("parameters.json");
        fs::write(&path, r#"{ "residents": "four" }"#).expect("parameters should be written");
        let error = load_parameters(Some(&path)).expect_err("invalid value should fail");
        assert!(error.to_string().contains("INPUT.PARAMETERS"), "{error}");
        assert_eq!(error.exit_code(), 2);
    }
}
