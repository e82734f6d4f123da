//! Traefik router rule parsing
//!
//! Only ``Host(...)`` matchers are of interest. A rule may carry several of
//! them combined with `||`/`&&`, and one matcher may list several hosts
//! (Traefik v2 syntax):
//!
//! ```text
//! Host(`a.example.com`) || (Host(`b.example.com`, `c.example.com`) && PathPrefix(`/api`))
//! ```
//!
//! `HostRegexp`, `HostSNI` and `HostHeader` are different matchers and are
//! ignored.

use regex::Regex;
use std::sync::LazyLock;

/// One ``Host(...)`` matcher; group 2 is empty when the matcher is unterminated
static HOST_MATCHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bHost\(([^)]*)(\)?)").expect("Host matcher pattern is valid")
});

/// One backtick- or double-quoted matcher argument
static QUOTED_ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"`([^`]*)`|"([^"]*)""#).expect("quoted argument pattern is valid")
});

/// Extract every hostname of the ``Host(...)`` matchers in a router rule
///
/// Returns `None` when the rule holds no usable ``Host(...)`` matcher or a
/// matcher is malformed (unterminated, empty, or with an unquoted argument).
pub fn extract_hosts(rule: &str) -> Option<Vec<String>> {
    let mut hosts = Vec::new();
    for matcher in HOST_MATCHER.captures_iter(rule) {
        if matcher[2].is_empty() {
            return None;
        }
        hosts.extend(matcher_arguments(&matcher[1])?);
    }

    if hosts.is_empty() { None } else { Some(hosts) }
}

/// Unquoted, non-empty arguments of one matcher
///
/// Anything between the quoted arguments other than commas and whitespace
/// makes the matcher malformed.
fn matcher_arguments(args: &str) -> Option<Vec<String>> {
    let separators = QUOTED_ARGUMENT.replace_all(args, "");
    if !separators.chars().all(|c| c == ',' || c.is_whitespace()) {
        return None;
    }

    let hosts: Vec<String> = QUOTED_ARGUMENT
        .captures_iter(args)
        .filter_map(|arg| arg.get(1).or_else(|| arg.get(2)))
        .map(|host| host.as_str().trim())
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect();

    if hosts.is_empty() { None } else { Some(hosts) }
}
