//! Line classification for blocklist and whitelist documents.
//!
//! A fetched document is split on `\n` and each line goes through an ordered
//! list of rejection rules. A line that no rule rejects is normalized into a
//! domain entry: a hosts-file IPv4 prefix (`0.0.0.0 example.com`) and a
//! trailing carriage return are stripped.
//!
//! Classification never looks at neighbouring lines.

use std::collections::HashSet;
use thiserror::Error;

/// Why a line was not turned into a domain entry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("contains a colon")]
    Colon,
    #[error("contains a bracket or pipe character")]
    Bracket,
    #[error("contains a comment marker")]
    Comment,
    #[error("references localhost")]
    Localhost,
    #[error("ends with a 'local' hostname")]
    LocalSuffix,
    #[error("is empty")]
    Empty,
    #[error("contains no lowercase letter")]
    NoLowercase,
    #[error("is empty after normalization")]
    EmptyAfterStrip,
}

/// A single rejection predicate.
struct Rule {
    reason: Rejection,
    matches: fn(&str) -> bool,
}

/// Rejection rules, checked in order. The first match decides the reason;
/// no rule depends on another having run before it.
const RULES: &[Rule] = &[
    Rule {
        reason: Rejection::Colon,
        matches: has_colon,
    },
    Rule {
        reason: Rejection::Bracket,
        matches: has_bracket,
    },
    Rule {
        reason: Rejection::Comment,
        matches: has_comment,
    },
    Rule {
        reason: Rejection::Localhost,
        matches: has_localhost,
    },
    Rule {
        reason: Rejection::LocalSuffix,
        matches: has_local_suffix,
    },
    Rule {
        reason: Rejection::Empty,
        matches: str::is_empty,
    },
    Rule {
        reason: Rejection::NoLowercase,
        matches: lacks_lowercase,
    },
];

/// IPv6 literals and URLs.
fn has_colon(line: &str) -> bool {
    line.contains(':')
}

/// Brackets, and the pipe used by adblock-style `||domain^` rules.
fn has_bracket(line: &str) -> bool {
    line.contains(['[', ']', '|'])
}

/// Any `#`, including trailing inline comments.
fn has_comment(line: &str) -> bool {
    line.contains('#')
}

fn has_localhost(line: &str) -> bool {
    line.contains("localhost")
}

/// Hosts entries such as `127.0.0.1 local`.
fn has_local_suffix(line: &str) -> bool {
    line.strip_suffix("local")
        .and_then(|head| head.chars().next_back())
        .is_some_and(char::is_whitespace)
}

fn lacks_lowercase(line: &str) -> bool {
    !line.bytes().any(|b| b.is_ascii_lowercase())
}

/// Strip a leading `d+.d+.d+.d+[ \t]+` prefix, if present.
fn strip_ipv4_prefix(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut pos = 0;

    for octet in 0..4 {
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == start {
            return line;
        }
        if octet < 3 {
            if bytes.get(pos) != Some(&b'.') {
                return line;
            }
            pos += 1;
        }
    }

    let blank_start = pos;
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    if pos == blank_start {
        return line;
    }

    // Only ASCII was consumed, so `pos` is a char boundary
    &line[pos..]
}

/// Strip a trailing `\r` (or `\n\r`) left over from Windows line endings.
fn strip_carriage_return(line: &str) -> &str {
    match line.strip_suffix('\r') {
        Some(head) => head.strip_suffix('\n').unwrap_or(head),
        None => line,
    }
}

/// Classify a raw line, returning the domain entry it carries.
///
/// ```
/// use sinkhole::classifier::{classify, Rejection};
/// assert_eq!(classify("0.0.0.0 ads.example.com"), Ok("ads.example.com"));
/// assert_eq!(classify("127.0.0.1 localhost"), Err(Rejection::Localhost));
/// ```
pub fn classify(line: &str) -> Result<&str, Rejection> {
    if let Some(rule) = RULES.iter().find(|rule| (rule.matches)(line)) {
        return Err(rule.reason);
    }

    let entry = strip_carriage_return(strip_ipv4_prefix(line));
    if entry.is_empty() {
        return Err(Rejection::EmptyAfterStrip);
    }

    Ok(entry)
}

/// Classify every line of a document and collect the unique domain entries.
pub fn parse_domains(content: &str) -> HashSet<String> {
    content
        .split('\n')
        .filter_map(|line| classify(line).ok())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosts_line_is_stripped() {
        assert_eq!(classify("0.0.0.0 example.com"), Ok("example.com"));
        assert_eq!(classify("127.0.0.1\tads.example.com"), Ok("ads.example.com"));
        assert_eq!(classify("0.0.0.0 \t  tracker.net"), Ok("tracker.net"));
    }

    #[test]
    fn test_carriage_return_is_stripped() {
        assert_eq!(classify("example.com\r"), Ok("example.com"));
        assert_eq!(classify("0.0.0.0 example.com\r"), Ok("example.com"));
        assert_eq!(classify("example.com\n\r"), Ok("example.com"));
    }

    #[test]
    fn test_plain_domain_unchanged() {
        assert_eq!(classify("bad.com"), Ok("bad.com"));
        assert_eq!(classify("*.ads.example.com"), Ok("*.ads.example.com"));
        assert_eq!(classify(".tracker.com"), Ok(".tracker.com"));
    }

    #[test]
    fn test_rejects_colon() {
        assert_eq!(classify("::1 ip6-loopback"), Err(Rejection::Colon));
        assert_eq!(classify("https://example.com"), Err(Rejection::Colon));
    }

    #[test]
    fn test_rejects_brackets_and_pipe() {
        assert_eq!(classify("[Adblock Plus 2.0]"), Err(Rejection::Bracket));
        assert_eq!(classify("example.com]"), Err(Rejection::Bracket));
        assert_eq!(classify("||ads.example.com^"), Err(Rejection::Bracket));
    }

    #[test]
    fn test_rejects_any_comment_marker() {
        assert_eq!(classify("# comment"), Err(Rejection::Comment));
        assert_eq!(classify("0.0.0.0 ads.com # inline"), Err(Rejection::Comment));
    }

    #[test]
    fn test_rejects_localhost() {
        assert_eq!(classify("127.0.0.1 localhost"), Err(Rejection::Localhost));
        assert_eq!(
            classify("127.0.0.1 localhost.localdomain"),
            Err(Rejection::Localhost)
        );
    }

    #[test]
    fn test_rejects_local_suffix() {
        assert_eq!(classify("0.0.0.0 local"), Err(Rejection::LocalSuffix));
        assert_eq!(classify("255.255.255.255\tlocal"), Err(Rejection::LocalSuffix));
        // Only a whitespace-separated `local` counts
        assert_eq!(classify("printer.local"), Ok("printer.local"));
        assert_eq!(classify("local"), Ok("local"));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(classify(""), Err(Rejection::Empty));
    }

    #[test]
    fn test_rejects_without_lowercase() {
        assert_eq!(classify("0.0.0.0"), Err(Rejection::NoLowercase));
        assert_eq!(classify("EXAMPLE.COM"), Err(Rejection::NoLowercase));
        assert_eq!(classify("   "), Err(Rejection::NoLowercase));
    }

    #[test]
    fn test_partial_ip_prefix_is_kept() {
        // Three octets is not an address prefix
        assert_eq!(classify("1.2.3 example.com"), Ok("1.2.3 example.com"));
        // No whitespace after the address
        assert_eq!(classify("1.2.3.4example.com"), Ok("1.2.3.4example.com"));
    }

    #[test]
    fn test_strip_ipv4_prefix_requires_blank() {
        assert_eq!(strip_ipv4_prefix("10.0.0.1 a"), "a");
        assert_eq!(strip_ipv4_prefix("10.0.0.1"), "10.0.0.1");
        assert_eq!(strip_ipv4_prefix("10..0.1 a"), "10..0.1 a");
    }

    #[test]
    fn test_first_matching_rule_reports() {
        // A line rejected by several rules is reported by the first one
        assert_eq!(classify("[::1] localhost"), Err(Rejection::Colon));
    }

    #[test]
    fn test_parse_domains_hosts_document() {
        let content = "# StevenBlack hosts\r\n\
                       127.0.0.1 localhost\r\n\
                       ::1 localhost\r\n\
                       0.0.0.0 0.0.0.0\r\n\
                       \r\n\
                       0.0.0.0 ads.example.com\r\n\
                       0.0.0.0 tracker.example.org\r\n\
                       0.0.0.0 ads.example.com\r\n";
        let domains = parse_domains(content);
        assert_eq!(domains.len(), 2);
        assert!(domains.contains("ads.example.com"));
        assert!(domains.contains("tracker.example.org"));
    }

    #[test]
    fn test_parse_domains_empty_document() {
        assert!(parse_domains("").is_empty());
        assert!(parse_domains("# only\n# comments\n").is_empty());
    }
}
