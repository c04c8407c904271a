//! Output backends (pdnsd, dnscrypt-proxy, unbound).
//!
//! Every backend is described by an [`Emitter`]: its output file, the
//! comment syntax of its header (if it writes one) and one line template per
//! [`PatternClass`]. A missing template means domains of that class are not
//! emitted for the backend. The generation pipeline is the same for all of
//! them.

mod dnscrypt;
mod pdnsd;
mod unbound;

use chrono::{DateTime, Local};

use crate::config::BackendKind;

/// Placeholder replaced by the domain entry in line templates
const DOMAIN: &str = "{domain}";

/// Shape of a domain entry, derived each time it is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternClass {
    /// `example.com`
    Exact,
    /// `*.example.com`, or any other entry containing `*`
    WildcardContains,
    /// `.example.com`, the domain and all of its subdomains
    LeadingDot,
}

impl PatternClass {
    /// Classify a domain entry. A leading dot wins over a wildcard.
    pub fn of(domain: &str) -> Self {
        if domain.starts_with('.') {
            Self::LeadingDot
        } else if domain.contains('*') {
            Self::WildcardContains
        } else {
            Self::Exact
        }
    }
}

/// Rendering rules for one backend
#[derive(Clone, Copy)]
pub struct Emitter {
    pub kind: BackendKind,
    /// Final file name inside the output directory
    pub file_name: &'static str,
    /// Comment marker for the generated header; `None` writes no header
    pub comment: Option<&'static str>,
    pub leading_dot: Option<&'static str>,
    pub wildcard: Option<&'static str>,
    pub exact: Option<&'static str>,
    /// How to wire the generated file into the daemon's configuration
    pub install_hint: fn(&str) -> String,
}

impl Emitter {
    /// Render the configuration line for a domain, if this backend has one
    /// for the domain's pattern class.
    pub fn render(&self, domain: &str) -> Option<String> {
        let template = match PatternClass::of(domain) {
            PatternClass::LeadingDot => self.leading_dot,
            PatternClass::WildcardContains => self.wildcard,
            PatternClass::Exact => self.exact,
        }?;
        Some(template.replace(DOMAIN, domain))
    }

    /// File header stamped with the build time
    pub fn header(&self, built_at: &DateTime<Local>) -> Option<String> {
        self.comment.map(|c| {
            format!(
                "{c} Auto-generated list, build date {}\n\
                 {c} No addresses of these domains must be resolved\n\n",
                built_at.format("%Y-%m-%d %H:%M:%S")
            )
        })
    }
}

/// Emitter for a configured backend
pub fn emitter(kind: BackendKind) -> Emitter {
    match kind {
        BackendKind::Pdnsd => pdnsd::EMITTER,
        BackendKind::Dnscrypt => dnscrypt::EMITTER,
        BackendKind::Unbound => unbound::EMITTER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pattern_class() {
        assert_eq!(PatternClass::of("bad.com"), PatternClass::Exact);
        assert_eq!(PatternClass::of("*.ads.example.com"), PatternClass::WildcardContains);
        assert_eq!(PatternClass::of("ads*.example.com"), PatternClass::WildcardContains);
        assert_eq!(PatternClass::of(".tracker.com"), PatternClass::LeadingDot);
        // First match wins
        assert_eq!(PatternClass::of(".*.tracker.com"), PatternClass::LeadingDot);
    }

    #[test]
    fn test_emitter_lookup() {
        for kind in BackendKind::ALL {
            assert_eq!(emitter(kind).kind, kind);
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(emitter(BackendKind::Pdnsd).file_name, "pdnsd.sinkhole");
        assert_eq!(emitter(BackendKind::Dnscrypt).file_name, "dnscrypt.cloaking.txt");
        assert_eq!(emitter(BackendKind::Unbound).file_name, "blacklist.conf");
    }

    #[test]
    fn test_exact_domain_all_backends() {
        assert_eq!(
            emitter(BackendKind::Pdnsd).render("bad.com").as_deref(),
            Some("rr { name=bad.com; a=0.0.0.0; }")
        );
        assert_eq!(
            emitter(BackendKind::Dnscrypt).render("bad.com").as_deref(),
            Some("bad.com 0.0.0.0")
        );
        assert_eq!(
            emitter(BackendKind::Unbound).render("bad.com").as_deref(),
            Some("local-zone: \"bad.com\" always_refuse")
        );
    }

    #[test]
    fn test_header_uses_backend_comment() {
        let built_at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 0).unwrap();

        let pdnsd = emitter(BackendKind::Pdnsd).header(&built_at).unwrap();
        assert_eq!(
            pdnsd,
            "// Auto-generated list, build date 2024-03-09 07:05:00\n\
             // No addresses of these domains must be resolved\n\n"
        );

        let dnscrypt = emitter(BackendKind::Dnscrypt).header(&built_at).unwrap();
        assert!(dnscrypt.starts_with("# Auto-generated list, build date 2024-03-09 07:05:00\n"));

        assert!(emitter(BackendKind::Unbound).header(&built_at).is_none());
    }
}
