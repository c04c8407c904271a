//! dnscrypt-proxy cloaking rules.
//!
//! Cloaking rules map a name to an address. Only exact names are emitted;
//! wildcard and leading-dot entries have no line in this backend.

use super::Emitter;
use crate::config::BackendKind;

pub(super) const EMITTER: Emitter = Emitter {
    kind: BackendKind::Dnscrypt,
    file_name: "dnscrypt.cloaking.txt",
    comment: Some("#"),
    leading_dot: None,
    wildcard: None,
    exact: Some("{domain} 0.0.0.0"),
    install_hint,
};

fn install_hint(file_name: &str) -> String {
    format!(
        "Move it to /etc/dnscrypt-proxy/ and add the following to\n\
         /etc/dnscrypt-proxy/dnscrypt-proxy.toml:\n\n\
         cloaking_rules = '/etc/dnscrypt-proxy/{file_name}'\n\n\
         Restart dnscrypt-proxy with 'systemctl restart dnscrypt-proxy'."
    )
}
