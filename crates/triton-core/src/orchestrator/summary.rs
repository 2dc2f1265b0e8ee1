use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub restarts: usize,
    pub fresh_runs: usize,
    pub warm_runs: usize,
    pub flushes: usize,
    pub report_path: PathBuf,
}

impl BatchSummary {
    pub(super) fn new(report_path: PathBuf) -> Self {
        Self {
            processed: 0,
            skipped: 0,
            restarts: 0,
            fresh_runs: 0,
            warm_runs: 0,
            flushes: 0,
            report_path,
        }
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed {} file(s), skipped {}, {} restart(s) ({} fresh / {} warm run(s)), {} save(s) to '{}'",
            self.processed,
            self.skipped,
            self.restarts,
            self.fresh_runs,
            self.warm_runs,
            self.flushes,
            self.report_path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::BatchSummary;
    use std::path::PathBuf;

    #[test]
    fn summary_renders_counters() {
        let summary = BatchSummary {
            processed: 5,
            skipped: 1,
            restarts: 1,
            fresh_runs: 2,
            warm_runs: 3,
            flushes: 3,
            report_path: PathBuf::from("out/2024-03-07T09-05-consolidated.csv"),
        };
        assert_eq!(
            summary.to_string(),
            "processed 5 file(s), skipped 1, 1 restart(s) (2 fresh / 3 warm run(s)), 3 save(s) to 'out/2024-03-07T09-05-consolidated.csv'"
        );
    }
}
