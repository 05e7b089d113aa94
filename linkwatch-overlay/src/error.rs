//! Error types for the overlay engine.

use thiserror::Error;

/// Errors raised by topology or load collaborators.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The endpoint is not known to the collaborator.
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// Statistics could not be read for the endpoint.
    #[error("Statistics unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while building or emitting highlights.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The builder was missing a required collaborator.
    #[error("Overlay is missing a {0} source")]
    MissingSource(&'static str),

    /// A scheduled build panicked.
    #[error("Highlight build panicked: {0}")]
    BuildPanicked(String),

    /// Writing a message to the output failed.
    #[error("Failed to emit highlights: {0}")]
    Emit(#[from] std::io::Error),
}

/// Errors raised by the command surface.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No handler is registered for the event name.
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// The threshold was not a non-negative integer.
    #[error("Invalid threshold: {0:?}")]
    InvalidThreshold(String),

    /// The inbound request was not valid JSON.
    #[error("Malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The overlay failed to carry out the command.
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}
