//! Traffic threshold shared between the command path and scheduled builds.

use std::sync::atomic::{AtomicU64, Ordering};

use linkwatch_types::kilobytes_to_rate;
use serde_json::Value;

use crate::error::CommandError;

/// Minimum rate (bytes/sec) a link's load must strictly exceed to be
/// highlighted. Zero highlights every link with any load at all.
///
/// Reads and writes are last-writer-wins; a build running concurrently with
/// an update may use either value.
#[derive(Debug, Default)]
pub struct Threshold {
    rate: AtomicU64,
}

impl Threshold {
    pub fn new(rate: u64) -> Self {
        Self {
            rate: AtomicU64::new(rate),
        }
    }

    pub fn from_kilobytes(kilobytes: u64) -> Self {
        Self::new(kilobytes_to_rate(kilobytes))
    }

    /// Current threshold in bytes/sec.
    pub fn get(&self) -> u64 {
        self.rate.load(Ordering::Relaxed)
    }

    pub fn set(&self, rate: u64) {
        self.rate.store(rate, Ordering::Relaxed);
    }

    pub fn set_kilobytes(&self, kilobytes: u64) {
        self.set(kilobytes_to_rate(kilobytes));
    }
}

/// Decode the `threshold` field of a threshold update, in kilobytes/sec.
///
/// Missing, `null` and blank values decode to `Ok(None)` and leave the
/// threshold unchanged. Anything other than a non-negative integer (as a JSON
/// number or a string) is rejected.
pub fn parse_kilobytes(value: Option<&Value>) -> Result<Option<u64>, CommandError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<u64>()
                .map(Some)
                .map_err(|_| CommandError::InvalidThreshold(s.to_string()))
        }
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| CommandError::InvalidThreshold(n.to_string())),
        Some(other) => Err(CommandError::InvalidThreshold(other.to_string())),
    }
}
