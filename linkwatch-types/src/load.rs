//! Port load samples.

/// Measured transfer rate at a single port, at a single sampling instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Load {
    /// Transfer rate in bytes per second.
    pub rate: u64,

    /// Bytes observed in the most recent sampling period.
    #[cfg_attr(feature = "serde", serde(default))]
    pub latest: u64,

    /// Unix timestamp in milliseconds when the sample was taken.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp_ms: u64,
}

impl Load {
    /// A load with the given rate (bytes/sec).
    pub fn new(rate: u64) -> Self {
        Self {
            rate,
            ..Default::default()
        }
    }

    pub fn latest(mut self, bytes: u64) -> Self {
        self.latest = bytes;
        self
    }

    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}
