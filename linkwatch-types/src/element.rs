//! Topology elements and the ports links attach to.

use std::fmt;
use std::str::FromStr;

/// Prefix used in the textual form of host element ids.
const HOST_PREFIX: &str = "host:";

/// Port number on a topology element.
pub type PortNumber = u64;

/// Port used for a host's single synthetic attachment point.
pub const HOST_PORT: PortNumber = 0;

/// Identity of a topology element: an infrastructure device or an end host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementId {
    /// Infrastructure device (switch, router).
    Device(String),
    /// End host attached at the network edge.
    Host(String),
}

impl ElementId {
    /// The raw id without the kind prefix.
    pub fn as_str(&self) -> &str {
        match self {
            ElementId::Device(id) | ElementId::Host(id) => id,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, ElementId::Host(_))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Device(id) => write!(f, "{}", id),
            ElementId::Host(id) => write!(f, "{}{}", HOST_PREFIX, id),
        }
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        match s.strip_prefix(HOST_PREFIX) {
            Some(id) => ElementId::Host(id.to_string()),
            None => ElementId::Device(s.to_string()),
        }
    }
}

/// A port on a topology element; the endpoint of a directional link.
///
/// The textual form is `<element>/<port>`, e.g. `of:0001/2` for a device
/// port or `host:h1/0` for a host attachment point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectPoint {
    pub element: ElementId,
    pub port: PortNumber,
}

impl ConnectPoint {
    pub fn new(element: ElementId, port: PortNumber) -> Self {
        Self { element, port }
    }

    /// A port on an infrastructure device.
    pub fn device(id: impl Into<String>, port: PortNumber) -> Self {
        Self::new(ElementId::Device(id.into()), port)
    }

    /// The attachment point of a host.
    pub fn host(id: impl Into<String>) -> Self {
        Self::new(ElementId::Host(id.into()), HOST_PORT)
    }
}

impl fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.element, self.port)
    }
}

/// Error returned when a connect point string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConnectPointError(String);

impl fmt::Display for ParseConnectPointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid connect point: {}", self.0)
    }
}

impl std::error::Error for ParseConnectPointError {}

impl FromStr for ConnectPoint {
    type Err = ParseConnectPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (element, port) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseConnectPointError(s.to_string()))?;
        if element.is_empty() {
            return Err(ParseConnectPointError(s.to_string()));
        }
        let port = port
            .parse::<PortNumber>()
            .map_err(|_| ParseConnectPointError(s.to_string()))?;
        Ok(Self::new(ElementId::from(element), port))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ConnectPoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ConnectPoint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An end host and the device port it is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Host {
    pub id: String,
    pub location: ConnectPoint,
}

impl Host {
    pub fn new(id: impl Into<String>, location: ConnectPoint) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }

    /// The host side of the host's edge link.
    pub fn connect_point(&self) -> ConnectPoint {
        ConnectPoint::host(self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_device_port() {
        let cp: ConnectPoint = "of:0001/2".parse().unwrap();
        assert_eq!(cp, ConnectPoint::device("of:0001", 2));
        assert_eq!(cp.to_string(), "of:0001/2");
    }

    #[test]
    fn parse_host_point() {
        let cp: ConnectPoint = "host:h1/0".parse().unwrap();
        assert_eq!(cp, ConnectPoint::host("h1"));
        assert!(cp.element.is_host());
        assert_eq!(cp.element.as_str(), "h1");
    }

    #[test]
    fn parse_rejects_missing_port() {
        assert!("of:0001".parse::<ConnectPoint>().is_err());
        assert!("of:0001/x".parse::<ConnectPoint>().is_err());
        assert!("/3".parse::<ConnectPoint>().is_err());
    }

    #[test]
    fn devices_order_before_hosts() {
        let device = ConnectPoint::device("zz", 9);
        let host = ConnectPoint::host("aa");
        assert!(device < host);
    }

    #[test]
    fn host_connect_point_uses_host_port() {
        let host = Host::new("h7", ConnectPoint::device("of:0003", 4));
        assert_eq!(host.connect_point().port, HOST_PORT);
        assert_eq!(host.connect_point().to_string(), "host:h7/0");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn connect_point_serializes_as_string() {
        let cp = ConnectPoint::device("of:0001", 2);
        assert_eq!(serde_json::to_string(&cp).unwrap(), "\"of:0001/2\"");

        let parsed: ConnectPoint = serde_json::from_str("\"host:h2/0\"").unwrap();
        assert_eq!(parsed, ConnectPoint::host("h2"));
    }
}
