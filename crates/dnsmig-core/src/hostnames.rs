//! Live hostname set
//!
//! Hostnames declared by cluster resources, stored trailing-dot-normalized.
//! Each hostname remembers the first kind of resource that declared it so
//! that skip decisions can say why a record was kept.

use crate::record::normalize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of cluster resource a hostname was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostnameSource {
    /// `spec.rules[].host` of an Ingress
    Ingress,
    /// ``Host(`...`)`` in a Traefik IngressRoute match rule
    IngressRoute,
    /// external-dns annotation value on a Service
    Service,
}

impl HostnameSource {
    /// Human-readable reason used when a record is kept
    pub fn reason(&self) -> &'static str {
        match self {
            HostnameSource::Ingress => "found in Ingress rules hosts",
            HostnameSource::IngressRoute => "found in IngressRoute rule hosts",
            HostnameSource::Service => "found in Service as external-DNS hostname link",
        }
    }
}

impl fmt::Display for HostnameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostnameSource::Ingress => "Ingress",
            HostnameSource::IngressRoute => "IngressRoute",
            HostnameSource::Service => "Service",
        };
        f.write_str(name)
    }
}

/// Set of hostnames currently declared live in the cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostnameSet {
    hosts: BTreeMap<String, HostnameSource>,
}

impl HostnameSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hostname; empty names are ignored
    ///
    /// Returns `true` if the hostname was not present yet.
    pub fn insert(&mut self, hostname: &str, source: HostnameSource) -> bool {
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return false;
        }
        let key = normalize(&hostname.to_ascii_lowercase());
        if self.hosts.contains_key(&key) {
            return false;
        }
        self.hosts.insert(key, source);
        true
    }

    /// Add many hostnames from one source
    pub fn extend<I, S>(&mut self, hostnames: I, source: HostnameSource)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for hostname in hostnames {
            self.insert(hostname.as_ref(), source);
        }
    }

    /// Union of two sets; on overlap the source already present wins
    pub fn merge(&mut self, other: HostnameSet) {
        for (host, source) in other.hosts {
            self.hosts.entry(host).or_insert(source);
        }
    }

    /// Whether `hostname` is live, ignoring a trailing dot and case
    pub fn contains(&self, hostname: &str) -> bool {
        self.source_of(hostname).is_some()
    }

    /// The source that declared `hostname`, if it is live
    pub fn source_of(&self, hostname: &str) -> Option<HostnameSource> {
        self.hosts
            .get(&normalize(&hostname.to_ascii_lowercase()))
            .copied()
    }

    /// Normalized hostnames in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, HostnameSource)> for HostnameSet {
    fn from_iter<T: IntoIterator<Item = (S, HostnameSource)>>(iter: T) -> Self {
        let mut set = HostnameSet::new();
        for (hostname, source) in iter {
            set.insert(hostname.as_ref(), source);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_ignores_trailing_dot_and_case() {
        let mut set = HostnameSet::new();
        set.insert("Foo.Example.com", HostnameSource::Ingress);
        assert!(set.contains("foo.example.com."));
        assert!(set.contains("foo.example.com"));
        assert!(!set.contains("bar.example.com"));
    }

    #[test]
    fn duplicates_keep_first_source() {
        let mut set = HostnameSet::new();
        assert!(set.insert("foo.example.com", HostnameSource::Service));
        assert!(!set.insert("foo.example.com.", HostnameSource::Ingress));
        assert_eq!(set.len(), 1);
        assert_eq!(set.source_of("foo.example.com"), Some(HostnameSource::Service));
    }

    #[test]
    fn blank_hostnames_are_ignored() {
        let mut set = HostnameSet::new();
        set.extend(["", "  "], HostnameSource::Ingress);
        assert!(set.is_empty());
    }

    #[test]
    fn merge_unions_sets() {
        let mut a: HostnameSet = [("a.example.com", HostnameSource::Ingress)].into_iter().collect();
        let b: HostnameSet = [
            ("a.example.com", HostnameSource::Service),
            ("b.example.com", HostnameSource::IngressRoute),
        ]
        .into_iter()
        .collect();
        a.merge(b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec!["a.example.com.", "b.example.com."]);
        assert_eq!(a.source_of("a.example.com"), Some(HostnameSource::Ingress));
    }
}
