use crate::common::config::{input_file_matcher, is_input_file};
use crate::domain::{TritonError, TritonResult};
use globset::GlobMatcher;
use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

/// Lazily yields the precipitation files of a directory in `read_dir` order.
pub struct InputFiles {
    dir: PathBuf,
    entries: ReadDir,
    matcher: GlobMatcher,
}

impl InputFiles {
    pub fn new(dir: &Path) -> TritonResult<Self> {
        let entries = fs::read_dir(dir).map_err(|source| {
            TritonError::io_system(
                "IO.INPUT_DIR",
                format!("failed to list '{}': {}", dir.display(), source),
            )
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
            matcher: input_file_matcher()?,
        })
    }
}

impl Iterator for InputFiles {
    type Item = TritonResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.entries.by_ref() {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(source) => {
                    return Some(Err(TritonError::io_system(
                        "IO.INPUT_DIR",
                        format!("failed to list '{}': {}", self.dir.display(), source),
                    )));
                }
            };
            if is_input_file(&self.matcher, &path) {
                return Some(Ok(path));
            }
        }
        None
    }
}
