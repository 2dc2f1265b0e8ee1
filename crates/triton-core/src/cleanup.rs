//! Removal of transient simulator exports.

use crate::domain::{TritonError, TritonResult};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Deletes every regular file in `results_dir`. Returns whether any existed.
pub fn clear_results_files(results_dir: &Path) -> TritonResult<bool> {
    let entries = match fs::read_dir(results_dir) {
        Ok(entries) => entries,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(source) => return Err(cleanup_error(results_dir, source)),
    };

    let mut deleted = 0_usize;
    for entry in entries {
        let path = entry.map_err(|source| cleanup_error(results_dir, source))?.path();
        if path.is_file() {
            fs::remove_file(&path).map_err(|source| cleanup_error(&path, source))?;
            deleted += 1;
        }
    }

    if deleted > 0 {
        debug!(
            "Deleted {} results file(s) at '{}'",
            deleted,
            results_dir.display()
        );
    }
    Ok(deleted > 0)
}

/// Removes the (empty) results directory. A non-empty or missing directory
/// is left alone with a warning.
pub fn remove_results_dir(results_dir: &Path) -> bool {
    match fs::remove_dir(results_dir) {
        Ok(()) => {
            info!(
                "Deleted results directory at '{}'",
                results_dir.display()
            );
            true
        }
        Err(source) => {
            warn!(
                "Could not delete results directory '{}', probably because it is not empty: {}",
                results_dir.display(),
                source
            );
            false
        }
    }
}

fn cleanup_error(path: &Path, source: io::Error) -> TritonError {
    TritonError::io_system(
        "IO.RESULTS_CLEANUP",
        format!("failed to clean '{}': {}", path.display(), source),
    )
}

#[cfg(test)]
mod tests {
    use super::{clear_results_files, remove_results_dir};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn clearing_deletes_files_and_reports_presence() {
        let temp = TempDir::new().expect("tempdir should be created");
        let results = temp.path().join("netuno-results");
        fs::create_dir_all(&results).expect("results dir should exist");
        assert!(!clear_results_files(&results).expect("empty dir clears"));

        fs::write(results.join("a.out.csv"), b"1").expect("export should be written");
        fs::write(results.join("b.out.csv"), b"2").expect("export should be written");
        assert!(clear_results_files(&results).expect("files should be cleared"));
        assert_eq!(fs::read_dir(&results).expect("dir should list").count(), 0);
    }

    #[test]
    fn clearing_a_missing_dir_is_a_no_op() {
        let temp = TempDir::new().expect("tempdir should be created");
        assert!(!clear_results_files(&temp.path().join("absent")).expect("missing dir"));
    }

    #[test]
    fn removal_only_succeeds_for_empty_dirs() {
        let temp = TempDir::new().expect("tempdir should be created");
        let results = temp.path().join("netuno-results");
        fs::create_dir_all(&results).expect("results dir should exist");
        fs::write(results.join("left.out.csv"), b"1").expect("export should be written");

        assert!(!remove_results_dir(&results));
        assert!(results.is_dir());

        clear_results_files(&results).expect("files should be cleared");
        assert!(remove_results_dir(&results));
        assert!(!results.exists());
    }
}
