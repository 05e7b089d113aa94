//! Collaborator interfaces consumed by the overlay.
//!
//! The overlay never discovers topology or collects port statistics itself.
//! It queries a [`TopologySource`] for links and hosts and a [`LoadSource`]
//! for per-port load. Both are called synchronously from the highlight
//! build and are expected to answer with bounded latency.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use linkwatch_types::{ConnectPoint, DirectionalLink, EdgeDirection, Host, Load};
use parking_lot::RwLock;

use crate::error::SourceError;

/// Supplies the current topology.
pub trait TopologySource: Send + Sync + Debug {
    /// Links currently reported as active. Used for the diagnostic snapshot
    /// captured when monitoring starts.
    fn active_links(&self) -> Vec<DirectionalLink>;

    /// All known infrastructure links, both directions listed separately.
    fn links(&self) -> Vec<DirectionalLink>;

    /// All known end hosts.
    fn hosts(&self) -> Vec<Host>;

    /// Synthesize the edge link between a host and its attachment device.
    fn edge_link(&self, host: &Host, direction: EdgeDirection) -> DirectionalLink {
        DirectionalLink::edge(host, direction)
    }
}

/// Supplies the current load at a link endpoint.
pub trait LoadSource: Send + Sync + Debug {
    /// Returns `Ok(None)` if no statistics exist yet for the endpoint.
    fn load_at(&self, point: &ConnectPoint) -> Result<Option<Load>, SourceError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    links: Vec<(DirectionalLink, bool)>,
    hosts: Vec<Host>,
    loads: HashMap<ConnectPoint, Load>,
    failing: HashSet<ConnectPoint>,
}

/// Thread-safe in-memory topology and load store.
///
/// Useful for embedding the overlay in a process that already tracks its
/// own topology, and for driving the overlay in tests.
///
/// # Example
///
/// ```rust
/// use linkwatch_overlay::{LoadSource, MemoryTopology, TopologySource};
/// use linkwatch_types::{ConnectPoint, Load};
///
/// let topo = MemoryTopology::new();
/// let a = ConnectPoint::device("of:0001", 1);
/// let b = ConnectPoint::device("of:0002", 1);
/// topo.add_bidirectional(a.clone(), b);
/// topo.set_load(a.clone(), Load::new(2048));
///
/// assert_eq!(topo.links().len(), 2);
/// assert_eq!(topo.load_at(&a).unwrap(), Some(Load::new(2048)));
/// ```
#[derive(Debug, Default)]
pub struct MemoryTopology {
    state: RwLock<MemoryState>,
}

impl MemoryTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active directional link.
    pub fn add_link(&self, link: DirectionalLink) {
        self.state.write().links.push((link, true));
    }

    /// Add a link that is known but not currently active.
    pub fn add_inactive_link(&self, link: DirectionalLink) {
        self.state.write().links.push((link, false));
    }

    /// Add both directions of an infrastructure link.
    pub fn add_bidirectional(&self, a: ConnectPoint, b: ConnectPoint) {
        let mut state = self.state.write();
        state
            .links
            .push((DirectionalLink::direct(a.clone(), b.clone()), true));
        state.links.push((DirectionalLink::direct(b, a), true));
    }

    pub fn add_host(&self, host: Host) {
        self.state.write().hosts.push(host);
    }

    /// Set the current load at an endpoint.
    pub fn set_load(&self, point: ConnectPoint, load: Load) {
        self.state.write().loads.insert(point, load);
    }

    /// Forget the load at an endpoint, as if no statistics had been collected.
    pub fn clear_load(&self, point: &ConnectPoint) {
        self.state.write().loads.remove(point);
    }

    /// Make load queries for an endpoint fail until [`recover`](Self::recover).
    pub fn fail_load(&self, point: ConnectPoint) {
        self.state.write().failing.insert(point);
    }

    pub fn recover(&self, point: &ConnectPoint) {
        self.state.write().failing.remove(point);
    }
}

impl TopologySource for MemoryTopology {
    fn active_links(&self) -> Vec<DirectionalLink> {
        self.state
            .read()
            .links
            .iter()
            .filter(|(_, active)| *active)
            .map(|(link, _)| link.clone())
            .collect()
    }

    fn links(&self) -> Vec<DirectionalLink> {
        self.state
            .read()
            .links
            .iter()
            .map(|(link, _)| link.clone())
            .collect()
    }

    fn hosts(&self) -> Vec<Host> {
        self.state.read().hosts.clone()
    }
}

impl LoadSource for MemoryTopology {
    fn load_at(&self, point: &ConnectPoint) -> Result<Option<Load>, SourceError> {
        let state = self.state.read();
        if state.failing.contains(point) {
            return Err(SourceError::Unavailable(point.to_string()));
        }
        Ok(state.loads.get(point).copied())
    }
}
