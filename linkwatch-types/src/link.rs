//! Directional links and their canonical unordered keys.

use std::fmt;

use crate::{ConnectPoint, Host};

/// Where a directional link comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinkKind {
    /// Infrastructure link between two device ports.
    #[default]
    Direct,
    /// Synthetic link between a host and its attachment device.
    Edge,
}

/// Direction of a synthetic host edge link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    /// Host to device: traffic entering the network.
    Ingress,
    /// Device to host: traffic leaving the network.
    Egress,
}

/// A one-way edge between two topology endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionalLink {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: LinkKind,
}

impl DirectionalLink {
    pub fn new(src: ConnectPoint, dst: ConnectPoint, kind: LinkKind) -> Self {
        Self { src, dst, kind }
    }

    /// An infrastructure link.
    pub fn direct(src: ConnectPoint, dst: ConnectPoint) -> Self {
        Self::new(src, dst, LinkKind::Direct)
    }

    /// Synthesize the edge link between a host and its attachment device.
    pub fn edge(host: &Host, direction: EdgeDirection) -> Self {
        let host_point = host.connect_point();
        let device_point = host.location.clone();
        match direction {
            EdgeDirection::Ingress => Self::new(host_point, device_point, LinkKind::Edge),
            EdgeDirection::Egress => Self::new(device_point, host_point, LinkKind::Edge),
        }
    }

    /// The canonical key shared by both directions of this link.
    pub fn key(&self) -> LinkKey {
        LinkKey::new(self.src.clone(), self.dst.clone())
    }

    /// True if `other` runs between the same endpoints in the opposite direction.
    pub fn is_reverse_of(&self, other: &DirectionalLink) -> bool {
        self.src == other.dst && self.dst == other.src
    }

    /// Stable display id, `<src>-<dst>`.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DirectionalLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.src, self.dst)
    }
}

/// Unordered pair of endpoints; `a <= b` always holds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
    a: ConnectPoint,
    b: ConnectPoint,
}

impl LinkKey {
    pub fn new(x: ConnectPoint, y: ConnectPoint) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn a(&self) -> &ConnectPoint {
        &self.a
    }

    pub fn b(&self) -> &ConnectPoint {
        &self.b
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.a, self.b)
    }
}
