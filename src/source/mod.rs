//! Topology and load sources for the server.
//!
//! The overlay engine only sees the [`TopologySource`] and [`LoadSource`]
//! traits; this module provides the file-backed implementation the server
//! runs with.
//!
//! [`TopologySource`]: linkwatch_overlay::TopologySource
//! [`LoadSource`]: linkwatch_overlay::LoadSource

mod document;
mod file;

pub use document::{LinkEntry, TopologyDocument};
pub use file::FileTopology;
