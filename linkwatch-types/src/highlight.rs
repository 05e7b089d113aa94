//! Highlight snapshots - the overlay's output for a single cycle.

use crate::{format_bit_rate, DirectionalLink, LinkKind, Load, KILO};

/// Event name of the outbound highlight message.
pub const SHOW_HIGHLIGHTS: &str = "showHighlights";

/// Which statistics a highlight was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StatsType {
    /// Per-port load statistics.
    PortStats,
}

/// Magnitude band of a link's traffic, used by clients to pick a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrafficClass {
    /// Below 10 Mbps.
    Green,
    /// Below 100 Mbps.
    Yellow,
    /// Below 1 Gbps.
    Orange,
    /// 1 Gbps and above.
    Red,
}

impl TrafficClass {
    /// Classify a byte rate.
    pub fn for_rate(bytes_per_sec: u64) -> Self {
        let bits = bytes_per_sec.saturating_mul(8);
        let mega = KILO * KILO;
        if bits < 10 * mega {
            TrafficClass::Green
        } else if bits < 100 * mega {
            TrafficClass::Yellow
        } else if bits < KILO * mega {
            TrafficClass::Orange
        } else {
            TrafficClass::Red
        }
    }

    /// Style class name used by visualization clients.
    pub fn css(&self) -> &'static str {
        match self {
            TrafficClass::Green => "port-traffic-green",
            TrafficClass::Yellow => "port-traffic-yellow",
            TrafficClass::Orange => "port-traffic-orange",
            TrafficClass::Red => "port-traffic-red",
        }
    }
}

/// A link marked as currently carrying significant traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkHighlight {
    /// Id of the link's canonical direction, `<src>-<dst>`.
    pub id: String,
    pub kind: LinkKind,
    pub stats: StatsType,
    pub class: TrafficClass,
    /// Resolved rate in bytes per second.
    pub rate: u64,
    /// Human readable bit rate.
    pub label: String,
}

impl LinkHighlight {
    /// Highlight a link from its resolved port load.
    pub fn port_stats(link: &DirectionalLink, load: &Load) -> Self {
        Self {
            id: link.id(),
            kind: link.kind,
            stats: StatsType::PortStats,
            class: TrafficClass::for_rate(load.rate),
            rate: load.rate,
            label: format_bit_rate(load.rate),
        }
    }
}

/// A point-in-time set of highlighted links.
///
/// An empty snapshot tells the client to clear any displayed highlights.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Highlights {
    /// Unix timestamp in milliseconds when this snapshot was built.
    pub timestamp_ms: u64,
    pub links: Vec<LinkHighlight>,
}

impl Highlights {
    /// An empty snapshot stamped with the current time.
    pub fn clear() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> HighlightsBuilder {
        HighlightsBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Find the highlight for a link id.
    pub fn get(&self, id: &str) -> Option<&LinkHighlight> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkHighlight> {
        self.links.iter()
    }
}

impl Default for Highlights {
    fn default() -> Self {
        Self::clear()
    }
}

/// Builder for constructing `Highlights` instances.
#[derive(Debug, Default)]
pub struct HighlightsBuilder {
    timestamp_ms: Option<u64>,
    links: Vec<LinkHighlight>,
}

impl HighlightsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    pub fn link(mut self, highlight: LinkHighlight) -> Self {
        self.links.push(highlight);
        self
    }

    pub fn push(&mut self, highlight: LinkHighlight) {
        self.links.push(highlight);
    }

    pub fn build(self) -> Highlights {
        Highlights {
            timestamp_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            links: self.links,
        }
    }
}

/// Outbound message carrying a highlight snapshot to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighlightMessage {
    pub event: String,
    pub payload: Highlights,
}

impl HighlightMessage {
    pub fn new(payload: Highlights) -> Self {
        Self {
            event: SHOW_HIGHLIGHTS.to_string(),
            payload,
        }
    }

    /// True if this message clears the client's display.
    pub fn is_clear(&self) -> bool {
        self.payload.is_empty()
    }
}

impl From<Highlights> for HighlightMessage {
    fn from(payload: Highlights) -> Self {
        Self::new(payload)
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
