//! Blocking poll-until-ready primitives.
//!
//! Every wait in a batch goes through this module: the settle delay after a
//! launch and the wait for the simulator's export to become readable.

use crate::common::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_RESULT_TIMEOUT};
use crate::domain::{TritonError, TritonResult};
use std::fs::File;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub tick: Duration,
    pub timeout: Duration,
}

impl WaitPolicy {
    pub const fn new(tick: Duration, timeout: Duration) -> Self {
        Self { tick, timeout }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_RESULT_TIMEOUT)
    }
}

/// Polls `predicate` every `tick` until it returns `true`.
///
/// Fails with a timeout error once `timeout` has elapsed without success.
pub fn wait_until<F>(mut predicate: F, tick: Duration, timeout: Duration) -> TritonResult<()>
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    loop {
        if predicate() {
            return Ok(());
        }
        if started.elapsed() >= timeout {
            return Err(TritonError::timeout(timeout));
        }
        thread::sleep(tick);
    }
}

/// Waits until `path` can be opened for reading.
///
/// Every open error is treated as "not yet available"; the simulator may
/// still be creating or holding the file.
pub fn wait_for_readable(path: &Path, policy: WaitPolicy) -> TritonResult<()> {
    wait_until(
        || match File::open(path) {
            Ok(_) => true,
            Err(source) => {
                trace!("'{}' not readable yet: {}", path.display(), source);
                false
            }
        },
        policy.tick,
        policy.timeout,
    )
    .map_err(|error| {
        TritonError::new(
            error.category(),
            error.code(),
            format!("'{}' {}", path.display(), error.message()),
        )
    })
}

pub fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
