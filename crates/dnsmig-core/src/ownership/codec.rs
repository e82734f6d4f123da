//! Ownership marker codec
//!
//! external-dns writes one marker per TXT value entry:
//!
//! ```text
//! heritage=external-dns,external-dns/owner=<id>,external-dns/resource=<kind>/<namespace>/<name>
//! ```
//!
//! [`OwnershipMarker`] keeps every comma-separated segment in its original
//! order so that rendering a parsed marker reproduces the input byte for
//! byte. Only the owner value is ever changed.

use crate::error::{Error, Result};
use std::fmt;

/// Key carrying the owner identifier
pub const OWNER_KEY: &str = "external-dns/owner";

/// Key carrying the source resource reference
pub const RESOURCE_KEY: &str = "external-dns/resource";

/// Key/value written first by external-dns
pub const HERITAGE_KEY: &str = "heritage";
pub const HERITAGE_VALUE: &str = "external-dns";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `key=value`, split on the first `=`
    Pair { key: String, value: String },
    /// A segment without `=`, kept verbatim
    Bare(String),
}

/// Parsed content of one TXT value entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipMarker {
    segments: Vec<Segment>,
    /// Route53 and Cloud DNS hand back TXT data wrapped in double quotes
    quoted: bool,
}

impl OwnershipMarker {
    /// Build a marker in the exact layout external-dns writes
    pub fn new(owner: &str, resource: &str) -> Self {
        let pair = |key: &str, value: &str| Segment::Pair {
            key: key.to_string(),
            value: value.to_string(),
        };
        Self {
            segments: vec![
                pair(HERITAGE_KEY, HERITAGE_VALUE),
                pair(OWNER_KEY, owner),
                pair(RESOURCE_KEY, resource),
            ],
            quoted: false,
        }
    }

    /// Parse a TXT value entry
    ///
    /// Parsing never fails: unknown keys and segments without `=` are kept
    /// as they are.
    pub fn parse(entry: &str) -> Self {
        let (body, quoted) = match entry.strip_prefix('"').and_then(|e| e.strip_suffix('"')) {
            Some(inner) => (inner, true),
            None => (entry, false),
        };

        let segments = body
            .split(',')
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => Segment::Pair {
                    key: key.to_string(),
                    value: value.to_string(),
                },
                None => Segment::Bare(segment.to_string()),
            })
            .collect();

        Self { segments, quoted }
    }

    /// Value of the first segment with the given key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Pair { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// The owner identifier, if the entry carries one
    pub fn owner(&self) -> Option<&str> {
        self.get(OWNER_KEY)
    }

    /// The `external-dns/resource` reference, if present
    pub fn resource(&self) -> Option<&str> {
        self.get(RESOURCE_KEY)
    }

    /// Whether the entry was written by external-dns
    pub fn is_external_dns(&self) -> bool {
        self.get(HERITAGE_KEY) == Some(HERITAGE_VALUE)
    }

    /// Replace the owner value in place
    ///
    /// Fails with [`Error::OwnerKeyMissing`] when no owner segment exists;
    /// the marker is left untouched in that case.
    pub fn set_owner(&mut self, new_owner: &str) -> Result<()> {
        let slot = self.segments.iter_mut().find_map(|segment| match segment {
            Segment::Pair { key, value } if key == OWNER_KEY => Some(value),
            _ => None,
        });

        match slot {
            Some(value) => {
                *value = new_owner.to_string();
                Ok(())
            }
            None => Err(Error::OwnerKeyMissing(self.to_string())),
        }
    }

    /// Keys in their original order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Pair { key, .. } => Some(key.as_str()),
            Segment::Bare(_) => None,
        })
    }
}

impl fmt::Display for OwnershipMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            f.write_str("\"")?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match segment {
                Segment::Pair { key, value } => write!(f, "{}={}", key, value)?,
                Segment::Bare(raw) => f.write_str(raw)?,
            }
        }
        if self.quoted {
            f.write_str("\"")?;
        }
        Ok(())
    }
}

/// Extract the owner identifier from a TXT value entry
///
/// Returns [`Error::OwnerNotFound`] if the entry has no owner segment.
pub fn parse_owner(entry: &str) -> Result<String> {
    OwnershipMarker::parse(entry)
        .owner()
        .map(str::to_string)
        .ok_or_else(|| Error::OwnerNotFound(entry.to_string()))
}

/// Rewrite the owner identifier of a TXT value entry
///
/// All other segments keep their bytes and order. Returns
/// [`Error::OwnerKeyMissing`] if the entry has no owner segment.
pub fn rewrite_owner(entry: &str, new_owner: &str) -> Result<String> {
    let mut marker = OwnershipMarker::parse(entry);
    marker
        .set_owner(new_owner)
        .map_err(|_| Error::OwnerKeyMissing(entry.to_string()))?;
    Ok(marker.to_string())
}

/// Whether a TXT value entry names `owner` as its owner
pub fn claims(entry: &str, owner: &str) -> bool {
    OwnershipMarker::parse(entry).owner() == Some(owner)
}
