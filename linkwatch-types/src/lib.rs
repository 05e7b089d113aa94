//! # linkwatch-types
//!
//! Core types for live link-traffic overlays. This crate defines the shared
//! vocabulary between topology/statistics providers, the overlay engine and
//! the visualization client that renders highlight snapshots.
//!
//! ## Design Goals
//!
//! - **Small**: plain data types, no runtime or I/O
//! - **Optional serialization**: enable the `serde` feature for the wire format
//! - **Ordered keys**: endpoints are totally ordered so a link pair has exactly
//!   one canonical key regardless of direction
//! - **Ergonomic builders**: fluent API for constructing highlight snapshots
//!
//! ## Features
//!
//! - `serde`: JSON/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use linkwatch_types::{ConnectPoint, DirectionalLink, Highlights, LinkHighlight, Load};
//!
//! let link = DirectionalLink::direct(
//!     ConnectPoint::device("of:0001", 2),
//!     ConnectPoint::device("of:0002", 1),
//! );
//!
//! let snapshot = Highlights::builder()
//!     .link(LinkHighlight::port_stats(&link, &Load::new(1_600)))
//!     .build();
//!
//! assert_eq!(snapshot.len(), 1);
//! assert_eq!(snapshot.links[0].label, "12.50 Kbps");
//! ```

mod element;
mod highlight;
mod link;
mod load;
mod rate;

pub use element::*;
pub use highlight::*;
pub use link::*;
pub use load::*;
pub use rate::*;
