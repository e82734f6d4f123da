//! Provider-neutral DNS record model
//!
//! Every adapter projects its native record sets onto [`Record`]. Names are
//! kept exactly as the provider returned them; all comparisons go through
//! [`normalize`] so that `foo.example.com` and `foo.example.com.` are the
//! same logical record.

use serde::{Deserialize, Serialize};

/// The TXT record type, the only type that carries ownership markers
pub const TXT: &str = "TXT";

/// Append a trailing dot to a DNS name if it is missing
///
/// Idempotent: `normalize(normalize(h)) == normalize(h)`.
pub fn normalize(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Compare two DNS names ignoring a trailing dot and ASCII case
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

/// A DNS resource record set as seen by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Fully-qualified record name, as returned by the provider
    pub name: String,

    /// Record type ("A", "CNAME", "TXT", ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Time-to-live in seconds
    pub ttl: u32,

    /// Value entries; TXT record sets may carry several
    pub values: Vec<String>,

    /// Provider-specific record identifier, if the provider has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Provider-specific attributes carried through unchanged (proxy flags,
    /// alias targets, ...)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl Record {
    /// Create a record with no provider-specific data
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: u32,
        values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            ttl,
            values,
            id: None,
            extra: serde_json::Value::Null,
        }
    }

    /// Attach a provider-specific identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach provider-specific attributes
    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = extra;
        self
    }

    /// The record name with a trailing dot
    pub fn normalized_name(&self) -> String {
        normalize(&self.name)
    }

    /// Whether this is a TXT record
    pub fn is_txt(&self) -> bool {
        self.record_type.eq_ignore_ascii_case(TXT)
    }

    /// Whether this record answers for `hostname`
    pub fn has_name(&self, hostname: &str) -> bool {
        same_name(&self.name, hostname)
    }

    /// Identity used to avoid touching the same record twice within a run
    ///
    /// Includes the provider id: Cloudflare keeps one record per TXT value
    /// and Route53 routing policies keep one set per set identifier, so
    /// several records may share a name and type.
    pub(crate) fn key(&self) -> (String, String, Option<String>) {
        (
            self.normalized_name().to_ascii_lowercase(),
            self.record_type.to_ascii_uppercase(),
            self.id.clone(),
        )
    }

    /// A copy of this record with its value entries replaced
    ///
    /// TTL, identifier and provider-specific attributes are kept.
    pub fn with_values(&self, values: Vec<String>) -> Self {
        Self {
            values,
            ..self.clone()
        }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Type: {}", self.name, self.record_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        assert_eq!(normalize("foo.example.com"), "foo.example.com.");
        assert_eq!(normalize("foo.example.com."), "foo.example.com.");
        assert_eq!(normalize(&normalize("foo.example.com")), "foo.example.com.");
    }

    #[test]
    fn names_differing_by_trailing_dot_are_the_same() {
        let record = Record::new("foo.example.com", "A", 300, vec!["1.2.3.4".into()]);
        assert!(record.has_name("foo.example.com."));
        assert!(record.has_name("foo.example.com"));
        assert!(!record.has_name("bar.example.com."));
        assert_eq!(record.normalized_name(), "foo.example.com.");
    }

    #[test]
    fn names_compare_case_insensitively() {
        let record = Record::new("Foo.Example.COM.", "A", 300, vec!["1.2.3.4".into()]);
        assert!(record.has_name("foo.example.com"));
        assert!(same_name("WWW.example.com", "www.EXAMPLE.com."));
        assert_eq!(
            record.key(),
            Record::new("foo.example.com", "a", 60, vec![]).key()
        );
    }

    #[test]
    fn with_values_keeps_provider_attributes() {
        let record = Record::new("ext-foo.example.com.", "TXT", 120, vec!["old".into()])
            .with_id("rec-1")
            .with_extra(serde_json::json!({ "proxied": false }));

        let updated = record.with_values(vec!["new".into()]);
        assert_eq!(updated.values, vec!["new".to_string()]);
        assert_eq!(updated.ttl, 120);
        assert_eq!(updated.id.as_deref(), Some("rec-1"));
        assert_eq!(updated.extra["proxied"], false);
    }

    #[test]
    fn txt_detection_is_case_insensitive() {
        assert!(Record::new("a.", "txt", 1, vec![]).is_txt());
        assert!(!Record::new("a.", "CNAME", 1, vec![]).is_txt());
    }
}
