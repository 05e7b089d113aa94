//! # linkwatch
//!
//! A live link-traffic overlay server for network topology views.
//!
//! Clients connect over TCP and exchange newline-delimited JSON. A client
//! starts monitoring with a `linkwatchDisplayStart` request and then
//! receives a `showHighlights` message with every link whose load exceeds
//! its threshold, once immediately and then every 200ms until it stops.
//!
//! ```text
//!  topology.json ──▶ FileTopology ──┬──▶ Overlay (client A) ──▶ socket A
//!                                   └──▶ Overlay (client B) ──▶ socket B
//! ```
//!
//! - **[`settings`]**: layered configuration (file, environment, flags)
//! - **[`source`]**: the file-backed [`FileTopology`] source
//! - **[`session`]**: the TCP [`Server`] and per-client session loop
//!
//! The overlay engine itself lives in the `linkwatch-overlay` crate and the
//! shared data types in `linkwatch-types`.
//!
//! ## Usage
//!
//! ```bash
//! # Serve topology.json on the default address
//! linkwatch --topology topology.json
//!
//! # Write one highlight snapshot and exit
//! linkwatch --topology topology.json --export highlights.json
//! ```

pub mod session;
pub mod settings;
pub mod source;

pub use session::{Server, SessionOptions};
pub use settings::Settings;
pub use source::{FileTopology, TopologyDocument};
