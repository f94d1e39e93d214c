//! Per-certificate trust classification.

use super::classify::{is_in_ccadb, is_in_trust_store, is_in_whitelist, is_interception};
use super::trust_store::TrustStores;
use crate::chain::CertRecord;
use crate::dn::parse_dn;
use crate::fields::{CertStatus, LeafKind};
use regex::Regex;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::LazyLock;

/// Longest host name accepted as an FQDN, excluding a leading `*.`.
const MAX_FQDN_LEN: usize = 253;

/// Two or more LDH labels of 1-63 characters, none starting or ending with
/// a hyphen, with an optional trailing dot.
static FQDN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+\.?$",
    )
    .ok()
});

/// Whether `s` parses as an IPv4 or IPv6 address.
///
/// IPv6 addresses may carry a `%zone` scope suffix.
pub fn is_ip_address(s: &str) -> bool {
    match s.split_once('%') {
        Some((addr, zone)) => !zone.is_empty() && addr.parse::<Ipv6Addr>().is_ok(),
        None => s.parse::<IpAddr>().is_ok(),
    }
}

/// Whether `s` is a fully-qualified domain name, optionally with a `*.` wildcard label.
pub fn is_fqdn(s: &str) -> bool {
    let host = s.strip_prefix("*.").unwrap_or(s);
    if host.is_empty() || host.len() > MAX_FQDN_LEN {
        return false;
    }
    FQDN_RE.as_ref().is_some_and(|re| re.is_match(host))
}

/// Classifies single certificates against a [`TrustStores`] bundle.
#[derive(Debug, Clone, Copy)]
pub struct CertValidator<'a> {
    stores: &'a TrustStores,
}

impl<'a> CertValidator<'a> {
    pub fn new(stores: &'a TrustStores) -> Self {
        CertValidator { stores }
    }

    pub fn stores(&self) -> &'a TrustStores {
        self.stores
    }

    /// Compute the trust status of one certificate.
    ///
    /// Public/private status is taken from the issuer. The certificate is a
    /// leaf candidate when its subject CN is a host name or IP address, and
    /// the leaf is public exactly when the issuer is.
    pub fn validate(&self, cert: &CertRecord) -> CertStatus {
        let issuer = parse_dn(cert.issuer());
        let subject = parse_dn(cert.subject());
        let stores = self.stores;

        let is_subject_cn_fqdn = subject
            .cn()
            .is_some_and(|cn| is_ip_address(cn) || is_fqdn(cn));
        let is_public = is_in_ccadb(&issuer, stores.ccadb())
            || is_in_trust_store(&issuer, stores.truststore())
            || is_in_whitelist(&issuer, stores.whitelist());

        let leaf = match (is_subject_cn_fqdn, is_public) {
            (false, _) => LeafKind::NotLeaf,
            (true, true) => LeafKind::PublicLeaf,
            (true, false) => LeafKind::PrivateLeaf,
        };

        let status = CertStatus {
            is_self_signed: cert.is_self_signed(),
            is_subject_cn_fqdn,
            is_interception: is_interception(&issuer, stores.interception()),
            is_public,
            is_issuer_cross_signed: stores.is_cross_signed(cert.issuer()),
            is_subject_cross_signed: stores.is_cross_signed(cert.subject()),
            leaf,
        };
        tracing::debug!(
            subject = cert.subject(),
            issuer = cert.issuer(),
            ?status,
            "certificate validation status"
        );
        status
    }
}
