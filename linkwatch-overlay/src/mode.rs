//! Display mode of an overlay session.

use std::fmt;

/// Whether the overlay is periodically building highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Not monitoring. Initial state.
    #[default]
    Idle,
    /// Building and emitting highlights on every tick.
    Monitor,
}

impl Mode {
    /// Decode the `mode` field of a display-start request.
    ///
    /// Anything other than `"monitor"`, including a missing value, is `Idle`.
    pub fn from_request(mode: Option<&str>) -> Self {
        match mode.map(str::trim) {
            Some("monitor") => Mode::Monitor,
            _ => Mode::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Monitor => "monitor",
        }
    }

    pub fn is_monitoring(&self) -> bool {
        matches!(self, Mode::Monitor)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_decodes() {
        assert_eq!(Mode::from_request(Some("monitor")), Mode::Monitor);
    }

    #[test]
    fn anything_else_is_idle() {
        assert_eq!(Mode::from_request(Some("idle")), Mode::Idle);
        assert_eq!(Mode::from_request(Some("MONITOR")), Mode::Idle);
        assert_eq!(Mode::from_request(Some("")), Mode::Idle);
        assert_eq!(Mode::from_request(None), Mode::Idle);
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(Mode::default(), Mode::Idle);
        assert!(!Mode::Idle.is_monitoring());
    }
}
