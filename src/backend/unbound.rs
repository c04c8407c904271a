//! unbound `local-zone` statements.

use super::Emitter;
use crate::config::BackendKind;

/// unbound has no wildcard syntax for `local-zone`, so only exact names are
/// emitted. The file carries no header.
pub(super) const EMITTER: Emitter = Emitter {
    kind: BackendKind::Unbound,
    file_name: "blacklist.conf",
    comment: None,
    leading_dot: None,
    wildcard: None,
    exact: Some("local-zone: \"{domain}\" always_refuse"),
    install_hint,
};

fn install_hint(file_name: &str) -> String {
    format!(
        "Move it to /etc/unbound/ and add the following to the server: clause\n\
         of /etc/unbound/unbound.conf:\n\n\
         include: \"/etc/unbound/{file_name}\"\n\n\
         Reload unbound with 'unbound-control reload'."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_exact() {
        assert_eq!(
            EMITTER.render("bad.com").as_deref(),
            Some("local-zone: \"bad.com\" always_refuse")
        );
    }

    #[test]
    fn test_patterns_are_dropped() {
        assert!(EMITTER.render("*.ads.example.com").is_none());
        assert!(EMITTER.render(".tracker.com").is_none());
    }

    #[test]
    fn test_no_header() {
        assert!(EMITTER.comment.is_none());
    }
}
