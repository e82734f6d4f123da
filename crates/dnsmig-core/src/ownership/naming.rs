//! TXT registry naming
//!
//! external-dns stores the ownership marker for `host` in TXT records named
//! after the host, optionally qualified with the managed record's type:
//!
//! ```text
//! {prefix}-{host}.              plain
//! {prefix}-{type}-{host}.       type-suffixed, type lowercased
//! ```

use crate::record::{normalize, same_name};

/// `{prefix}-{normalize(hostname)}`
pub fn plain_name(prefix: &str, hostname: &str) -> String {
    format!("{}-{}", prefix, normalize(hostname))
}

/// `{prefix}-{lowercase(record_type)}-{normalize(hostname)}`
pub fn typed_name(prefix: &str, record_type: &str, hostname: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        record_type.to_ascii_lowercase(),
        normalize(hostname)
    )
}

/// Both candidate TXT names for a hostname managed with `record_type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtNames {
    pub plain: String,
    pub typed: String,
}

impl TxtNames {
    pub fn new(prefix: &str, record_type: &str, hostname: &str) -> Self {
        Self {
            plain: plain_name(prefix, hostname),
            typed: typed_name(prefix, record_type, hostname),
        }
    }

    /// Which candidate a record name matches, if any
    ///
    /// Trailing dot and ASCII case are ignored. `Some(true)` means the
    /// type-suffixed name matched.
    pub fn matches(&self, name: &str) -> Option<bool> {
        if same_name(name, &self.typed) {
            Some(true)
        } else if same_name(name, &self.plain) {
            Some(false)
        } else {
            None
        }
    }
}
