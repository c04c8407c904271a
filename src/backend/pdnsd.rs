//! pdnsd sinkhole records.
//!
//! Exact names become `rr` records resolving to `0.0.0.0`; wildcard and
//! leading-dot entries become `neg` records covering the whole domain.

use super::Emitter;
use crate::config::BackendKind;

pub(super) const EMITTER: Emitter = Emitter {
    kind: BackendKind::Pdnsd,
    file_name: "pdnsd.sinkhole",
    comment: Some("//"),
    leading_dot: Some("neg { name=*{domain}; types = domain; }"),
    wildcard: Some("neg { name={domain}; types = domain; }"),
    exact: Some("rr { name={domain}; a=0.0.0.0; }"),
    install_hint,
};

fn install_hint(file_name: &str) -> String {
    format!(
        "Move it to /etc/ and add the following to /etc/pdnsd.conf:\n\n\
         //Blacklisted domains\n\
         include {{ file = \"/etc/{file_name}\"; }}\n\n\
         Restart pdnsd with 'systemctl restart pdnsd'.\n\
         You may need to delete your pdnsd.cache file before the rules apply."
    )
}
