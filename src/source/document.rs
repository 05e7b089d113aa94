//! On-disk topology document format.

use std::collections::HashMap;

use linkwatch_types::{ConnectPoint, DirectionalLink, Host, Load};
use serde::Deserialize;

/// A topology and port load snapshot.
///
/// ```json
/// {
///   "links": [
///     { "src": "of:0001/1", "dst": "of:0002/1" },
///     { "src": "of:0002/1", "dst": "of:0001/1", "active": false }
///   ],
///   "hosts": [ { "id": "h1", "location": "of:0001/3" } ],
///   "loads": { "of:0001/1": { "rate": 20480 } }
/// }
/// ```
///
/// Links are directional; list both directions of a bidirectional link.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub links: Vec<LinkEntry>,
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub loads: HashMap<ConnectPoint, Load>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkEntry {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl LinkEntry {
    pub fn link(&self) -> DirectionalLink {
        DirectionalLink::direct(self.src.clone(), self.dst.clone())
    }
}

impl TopologyDocument {
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
