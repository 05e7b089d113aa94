//! # linkwatch-overlay
//!
//! Traffic aggregation and highlighting engine for live network topology
//! overlays.
//!
//! The overlay periodically samples per-port load across a network's links,
//! merges both directions of every link (including synthetic host edge
//! links) into one traffic link, keeps the links whose load exceeds a
//! configurable threshold, and emits the result as a highlight snapshot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use linkwatch_overlay::{MemoryTopology, Mode, Output, Overlay};
//! use linkwatch_types::{ConnectPoint, Load};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let topology = Arc::new(MemoryTopology::new());
//!     let a = ConnectPoint::device("of:0001", 1);
//!     topology.add_bidirectional(a.clone(), ConnectPoint::device("of:0002", 1));
//!     topology.set_load(a, Load::new(64 * 1024));
//!
//!     let (output, mut rx) = Output::channel(16);
//!     let overlay = Overlay::builder()
//!         .topology(topology.clone())
//!         .loads(topology)
//!         .output(output)
//!         .threshold_kbps(10)
//!         .build()?;
//!
//!     // Emits a clear, then a build, then one build every 200ms
//!     overlay.start(Mode::Monitor).await?;
//!
//!     while let Some(message) = rx.recv().await {
//!         for link in message.payload.iter() {
//!             println!("{} {}", link.id, link.label);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Components
//!
//! - [`TrafficLinkMap`]: one [`TrafficLink`] per unordered endpoint pair
//! - [`HighlightBuilder`]: load resolution and threshold classification
//! - [`Scheduler`]: single idempotent repeating tick task
//! - [`Overlay`]: mode state machine tying it together for one session
//! - [`command`]: event name to handler dispatch table

mod aggregate;
pub mod command;
mod error;
mod highlight;
mod mode;
mod output;
mod overlay;
mod scheduler;
mod source;
mod threshold;

pub use aggregate::{TrafficLink, TrafficLinkMap};
pub use command::{dispatch, Request};
pub use error::{CommandError, OverlayError, SourceError};
pub use highlight::{has_traffic, max_load, HighlightBuilder};
pub use mode::Mode;
pub use output::Output;
pub use overlay::{Overlay, OverlayBuilder, DEFAULT_PERIOD};
pub use scheduler::Scheduler;
pub use source::{LoadSource, MemoryTopology, TopologySource};
pub use threshold::{parse_kilobytes, Threshold};

// Re-export types for convenience
pub use linkwatch_types::{
    ConnectPoint, DirectionalLink, HighlightMessage, Highlights, Host, LinkHighlight, Load,
};
