//! Aggregation of directional links into bidirectional traffic links.

use std::collections::BTreeMap;

use linkwatch_types::{DirectionalLink, LinkKey};

/// A bidirectional link: up to two directional links sharing an unordered
/// endpoint pair.
///
/// The first directional link seen for a pair becomes the canonical
/// direction and is the one whose endpoints are sampled for load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLink {
    key: LinkKey,
    one: DirectionalLink,
    two: Option<DirectionalLink>,
}

impl TrafficLink {
    fn new(key: LinkKey, one: DirectionalLink) -> Self {
        Self { key, one, two: None }
    }

    pub fn key(&self) -> &LinkKey {
        &self.key
    }

    /// The canonical direction. Always present.
    pub fn one(&self) -> &DirectionalLink {
        &self.one
    }

    /// The reverse direction, if it was seen.
    pub fn two(&self) -> Option<&DirectionalLink> {
        self.two.as_ref()
    }

    pub fn is_bidirectional(&self) -> bool {
        self.two.is_some()
    }

    /// Attach the reverse direction. Returns false if `link` is not the
    /// reverse of the canonical direction or a reverse is already attached.
    fn attach(&mut self, link: DirectionalLink) -> bool {
        if self.two.is_some() || !link.is_reverse_of(&self.one) {
            return false;
        }
        self.two = Some(link);
        true
    }
}

/// Deduplicating map of traffic links, one per unordered endpoint pair.
///
/// # Example
///
/// ```rust
/// use linkwatch_overlay::TrafficLinkMap;
/// use linkwatch_types::{ConnectPoint, DirectionalLink};
///
/// let a = ConnectPoint::device("of:0001", 1);
/// let b = ConnectPoint::device("of:0002", 1);
///
/// let mut map = TrafficLinkMap::new();
/// map.add(DirectionalLink::direct(a.clone(), b.clone()));
/// map.add(DirectionalLink::direct(b, a));
///
/// assert_eq!(map.len(), 1);
/// assert!(map.iter().all(|link| link.is_bidirectional()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrafficLinkMap {
    links: BTreeMap<LinkKey, TrafficLink>,
}

impl TrafficLinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directional link, merging it into the existing traffic link for
    /// its endpoint pair if there is one.
    pub fn add(&mut self, link: DirectionalLink) {
        let key = link.key();
        match self.links.get_mut(&key) {
            Some(existing) => {
                existing.attach(link);
            }
            None => {
                self.links.insert(key.clone(), TrafficLink::new(key, link));
            }
        }
    }

    pub fn get(&self, key: &LinkKey) -> Option<&TrafficLink> {
        self.links.get(key)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrafficLink> {
        self.links.values()
    }
}

impl Extend<DirectionalLink> for TrafficLinkMap {
    fn extend<I: IntoIterator<Item = DirectionalLink>>(&mut self, iter: I) {
        for link in iter {
            self.add(link);
        }
    }
}

impl FromIterator<DirectionalLink> for TrafficLinkMap {
    fn from_iter<I: IntoIterator<Item = DirectionalLink>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl IntoIterator for TrafficLinkMap {
    type Item = TrafficLink;
    type IntoIter = std::collections::btree_map::IntoValues<LinkKey, TrafficLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkwatch_types::{ConnectPoint, EdgeDirection, Host, LinkKind};

    fn a() -> ConnectPoint {
        ConnectPoint::device("of:0001", 1)
    }

    fn b() -> ConnectPoint {
        ConnectPoint::device("of:0002", 1)
    }

    #[test]
    fn same_link_twice_is_idempotent() {
        let mut map = TrafficLinkMap::new();
        map.add(DirectionalLink::direct(a(), b()));
        map.add(DirectionalLink::direct(a(), b()));

        assert_eq!(map.len(), 1);
        let link = map.iter().next().unwrap();
        assert!(!link.is_bidirectional());
    }

    #[test]
    fn opposite_directions_merge() {
        let mut map = TrafficLinkMap::new();
        map.add(DirectionalLink::direct(a(), b()));
        map.add(DirectionalLink::direct(b(), a()));

        assert_eq!(map.len(), 1);
        let link = map.get(&LinkKey::new(a(), b())).unwrap();
        assert_eq!(link.one(), &DirectionalLink::direct(a(), b()));
        assert_eq!(link.two(), Some(&DirectionalLink::direct(b(), a())));
    }

    #[test]
    fn first_seen_direction_is_canonical() {
        let map: TrafficLinkMap = vec![
            DirectionalLink::direct(b(), a()),
            DirectionalLink::direct(a(), b()),
        ]
        .into_iter()
        .collect();

        let link = map.iter().next().unwrap();
        assert_eq!(link.one().src, b());
    }

    #[test]
    fn third_insertion_is_noop() {
        let mut map = TrafficLinkMap::new();
        map.add(DirectionalLink::direct(a(), b()));
        map.add(DirectionalLink::direct(b(), a()));
        map.add(DirectionalLink::new(b(), a(), LinkKind::Edge));
        map.add(DirectionalLink::direct(a(), b()));

        assert_eq!(map.len(), 1);
        let link = map.iter().next().unwrap();
        assert_eq!(link.two().unwrap().kind, LinkKind::Direct);
    }

    #[test]
    fn host_edges_merge_into_one_link() {
        let host = Host::new("h1", ConnectPoint::device("of:0001", 3));
        let mut map = TrafficLinkMap::new();
        map.add(DirectionalLink::edge(&host, EdgeDirection::Ingress));
        map.add(DirectionalLink::edge(&host, EdgeDirection::Egress));

        assert_eq!(map.len(), 1);
        let link = map
            .get(&LinkKey::new(host.connect_point(), host.location.clone()))
            .unwrap();
        assert!(link.is_bidirectional());
        assert_eq!(link.one().kind, LinkKind::Edge);
    }

    #[test]
    fn distinct_pairs_stay_separate() {
        let c = ConnectPoint::device("of:0003", 1);
        let map: TrafficLinkMap = vec![
            DirectionalLink::direct(a(), b()),
            DirectionalLink::direct(b(), c.clone()),
            DirectionalLink::direct(c, b()),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert_eq!(map.into_iter().filter(|l| l.is_bidirectional()).count(), 1);
    }
}
