//! Building highlight snapshots from topology and port load.

use linkwatch_types::{EdgeDirection, Highlights, LinkHighlight, Load};
use tracing::{debug, warn};

use crate::aggregate::{TrafficLink, TrafficLinkMap};
use crate::error::SourceError;
use crate::source::{LoadSource, TopologySource};

/// The larger of two loads by rate. A missing load yields the other one.
pub fn max_load(a: Option<Load>, b: Option<Load>) -> Option<Load> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(a), Some(b)) => Some(if a.rate > b.rate { a } else { b }),
    }
}

/// True if the load's rate strictly exceeds the threshold (bytes/sec).
pub fn has_traffic(load: Option<&Load>, threshold: u64) -> bool {
    load.is_some_and(|load| load.rate > threshold)
}

/// Builds one highlight snapshot from the current topology, loads and
/// threshold. Holds no state between builds.
#[derive(Debug, Clone, Copy)]
pub struct HighlightBuilder<'a> {
    topology: &'a dyn TopologySource,
    loads: &'a dyn LoadSource,
    threshold: u64,
}

impl<'a> HighlightBuilder<'a> {
    pub fn new(
        topology: &'a dyn TopologySource,
        loads: &'a dyn LoadSource,
        threshold: u64,
    ) -> Self {
        Self {
            topology,
            loads,
            threshold,
        }
    }

    /// Aggregate infrastructure links and both edge links of every host.
    pub fn aggregate(&self) -> TrafficLinkMap {
        let mut map: TrafficLinkMap = self.topology.links().into_iter().collect();
        for host in self.topology.hosts() {
            map.add(self.topology.edge_link(&host, EdgeDirection::Ingress));
            map.add(self.topology.edge_link(&host, EdgeDirection::Egress));
        }
        map
    }

    /// Resolve a traffic link's load from the endpoints of its canonical
    /// direction only.
    pub fn resolve_load(&self, link: &TrafficLink) -> Result<Option<Load>, SourceError> {
        let one = link.one();
        let src = self.loads.load_at(&one.src)?;
        let dst = self.loads.load_at(&one.dst)?;
        Ok(max_load(src, dst))
    }

    /// Build the snapshot. Links whose load cannot be resolved are skipped.
    pub fn build(&self) -> Highlights {
        let map = self.aggregate();
        let mut highlights = Highlights::builder();

        for link in map.iter() {
            let load = match self.resolve_load(link) {
                Ok(load) => load,
                Err(e) => {
                    warn!("Skipping link {}: {}", link.one(), e);
                    continue;
                }
            };

            if let Some(load) = load.filter(|l| has_traffic(Some(l), self.threshold)) {
                highlights.push(LinkHighlight::port_stats(link.one(), &load));
            }
        }

        let highlights = highlights.build();
        debug!(
            "Built {} highlights from {} links (threshold {} B/s)",
            highlights.len(),
            map.len(),
            self.threshold
        );
        highlights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryTopology;
    use linkwatch_types::{kilobytes_to_rate, ConnectPoint, Host, LinkKind, TrafficClass};

    fn a() -> ConnectPoint {
        ConnectPoint::device("of:0001", 1)
    }

    fn b() -> ConnectPoint {
        ConnectPoint::device("of:0002", 1)
    }

    fn pair() -> MemoryTopology {
        let topo = MemoryTopology::new();
        topo.add_bidirectional(a(), b());
        topo
    }

    #[test]
    fn max_load_picks_higher_rate() {
        let got = max_load(Some(Load::new(50)), Some(Load::new(80)));
        assert_eq!(got, Some(Load::new(80)));

        let got = max_load(Some(Load::new(80)), Some(Load::new(50)));
        assert_eq!(got, Some(Load::new(80)));
    }

    #[test]
    fn max_load_treats_missing_as_identity() {
        assert_eq!(max_load(None, Some(Load::new(50))), Some(Load::new(50)));
        assert_eq!(max_load(Some(Load::new(50)), None), Some(Load::new(50)));
        assert_eq!(max_load(None, None), None);
    }

    #[test]
    fn has_traffic_is_strict() {
        let threshold = kilobytes_to_rate(10);
        assert!(!has_traffic(Some(&Load::new(kilobytes_to_rate(8))), threshold));
        assert!(!has_traffic(Some(&Load::new(threshold)), threshold));
        assert!(has_traffic(Some(&Load::new(kilobytes_to_rate(12))), threshold));
        assert!(!has_traffic(None, 0));
    }

    #[test]
    fn zero_threshold_needs_nonzero_load() {
        assert!(!has_traffic(Some(&Load::new(0)), 0));
        assert!(has_traffic(Some(&Load::new(1)), 0));
    }

    #[test]
    fn resolves_max_of_canonical_endpoints() {
        let topo = pair();
        topo.set_load(a(), Load::new(50));
        topo.set_load(b(), Load::new(80));

        let builder = HighlightBuilder::new(&topo, &topo, 0);
        let map = builder.aggregate();
        let link = map.iter().next().unwrap();
        assert_eq!(builder.resolve_load(link).unwrap(), Some(Load::new(80)));
    }

    #[test]
    fn threshold_filters_links() {
        let topo = MemoryTopology::new();
        let c = ConnectPoint::device("of:0003", 1);
        let d = ConnectPoint::device("of:0004", 1);
        topo.add_bidirectional(a(), b());
        topo.add_bidirectional(c.clone(), d);
        topo.set_load(a(), Load::new(kilobytes_to_rate(8)));
        topo.set_load(c, Load::new(kilobytes_to_rate(12)));

        let highlights = HighlightBuilder::new(&topo, &topo, kilobytes_to_rate(10)).build();

        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights.links[0].id, "of:0003/1-of:0004/1");
        assert_eq!(highlights.links[0].class, TrafficClass::Green);
    }

    #[test]
    fn links_without_load_are_omitted() {
        let topo = pair();
        let highlights = HighlightBuilder::new(&topo, &topo, 0).build();
        assert!(highlights.is_empty());
    }

    #[test]
    fn host_edge_links_are_highlighted() {
        let topo = MemoryTopology::new();
        let host = Host::new("h1", ConnectPoint::device("of:0001", 3));
        topo.set_load(host.location.clone(), Load::new(4096));
        topo.add_host(host);

        let highlights = HighlightBuilder::new(&topo, &topo, 0).build();

        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights.links[0].kind, LinkKind::Edge);
        assert_eq!(highlights.links[0].id, "host:h1/0-of:0001/3");
    }

    #[test]
    fn failing_endpoint_skips_only_its_link() {
        let topo = MemoryTopology::new();
        let c = ConnectPoint::device("of:0003", 1);
        let d = ConnectPoint::device("of:0004", 1);
        topo.add_bidirectional(a(), b());
        topo.add_bidirectional(c.clone(), d);
        topo.set_load(a(), Load::new(500));
        topo.set_load(c.clone(), Load::new(500));
        topo.fail_load(b());

        let highlights = HighlightBuilder::new(&topo, &topo, 0).build();

        assert_eq!(highlights.len(), 1);
        assert!(highlights.get("of:0003/1-of:0004/1").is_some());
    }
}
