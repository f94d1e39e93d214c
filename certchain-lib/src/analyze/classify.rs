//! Trust-store predicates over parsed DN attributes.
//!
//! The authoritative stores (CCADB, root programs) are matched exactly so
//! that an organization whose name is a fragment of a CA's name is not
//! taken for that CA. The whitelist and interception lists are matched by
//! substring against lower-cased values, since the names they model show up
//! with varying suffixes.

use crate::fields::DnAttributes;
use std::collections::HashSet;

/// O value of a government CA whose DN carries escaped non-ASCII octets.
/// Kept as the literal escaped text the DN parser produces.
pub(crate) const ESCAPED_GOV_ORG: &str = r"\E8\A1\8C\E6\94\BF\E9\99\A2";

/// Names shared by several unrelated issuers. They only count as public
/// when qualified by the US federal PKI marker.
pub(crate) const AMBIGUOUS_CA_NAMES: &[&str] = &["Certification Authorities"];

/// Whether the DN names a CA listed in the Common CA Database.
///
/// A handful of known issuers are recognized by organization before the
/// set lookup. An ambiguous shared name is rejected outright unless O
/// carries the federal PKI marker. Otherwise CN or OU must equal a CCADB
/// entry exactly.
pub fn is_in_ccadb(attrs: &DnAttributes, ccadb: &HashSet<String>) -> bool {
    let cn = attrs.cn();
    let o = attrs.o();
    let ou = attrs.ou();

    if cn.is_some_and(|cn| cn.contains("- G1")) && o.is_some_and(|o| o.contains(ESCAPED_GOV_ORG)) {
        return true;
    }
    if o.is_some_and(|o| o.contains("Entrust")) {
        return true;
    }
    if o.is_some_and(|o| o.contains("U.S. Government")) {
        return true;
    }

    let ambiguous = |name: Option<&str>| name.is_some_and(|n| AMBIGUOUS_CA_NAMES.contains(&n));
    if ambiguous(cn) || ambiguous(ou) {
        let qualified = o.is_some_and(|o| o.contains("US FPKI") && o.contains("FPKI"));
        if !qualified {
            return false;
        }
    }

    cn.is_some_and(|cn| ccadb.contains(cn)) || ou.is_some_and(|ou| ccadb.contains(ou))
}

/// Whether CN, O or OU exactly equals a root-program entry.
pub fn is_in_trust_store(attrs: &DnAttributes, truststore: &HashSet<String>) -> bool {
    attrs
        .names()
        .into_iter()
        .flatten()
        .any(|name| truststore.contains(name))
}

/// Whether any whitelist entry occurs in the lower-cased CN, O or OU.
pub fn is_in_whitelist(attrs: &DnAttributes, whitelist: &HashSet<String>) -> bool {
    contains_any_entry(attrs, whitelist)
}

/// Whether any interception-product entry occurs in the lower-cased CN, O or OU.
pub fn is_interception(attrs: &DnAttributes, interception: &HashSet<String>) -> bool {
    contains_any_entry(attrs, interception)
}

/// Substring match of store entries against lower-cased name attributes.
///
/// Entries are compared as given, so stores are expected to hold lower-case text.
fn contains_any_entry(attrs: &DnAttributes, entries: &HashSet<String>) -> bool {
    let lowered: Vec<String> = attrs
        .names()
        .into_iter()
        .flatten()
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
        .collect();

    entries
        .iter()
        .any(|entry| lowered.iter().any(|value| value.contains(entry.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dn::parse_dn;

    fn set(entries: &[&str]) -> HashSet<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ccadb_matches_cn_or_ou_exactly() {
        let ccadb = set(&["DigiCert Global Root G2", "Starfield Class 2 Certification Authority"]);
        assert!(is_in_ccadb(&parse_dn("CN=DigiCert Global Root G2, O=DigiCert Inc, C=US"), &ccadb));
        assert!(is_in_ccadb(
            &parse_dn("OU=Starfield Class 2 Certification Authority, O=Starfield Technologies, C=US"),
            &ccadb
        ));
        assert!(!is_in_ccadb(&parse_dn("CN=DigiCert Global Root, O=DigiCert Inc"), &ccadb));
    }

    #[test]
    fn ccadb_ignores_organization_substrings() {
        let ccadb = set(&["DigiCert Global Root G2"]);
        let attrs = parse_dn("CN=internal-proxy, O=DigiCert");
        assert!(!is_in_ccadb(&attrs, &ccadb));
        // O is not consulted for exact matches either
        let attrs = parse_dn("CN=internal-proxy, O=DigiCert Global Root G2");
        assert!(!is_in_ccadb(&attrs, &ccadb));
    }

    #[test]
    fn ccadb_known_organizations() {
        let empty = HashSet::new();
        assert!(is_in_ccadb(&parse_dn("CN=Entrust Root Certification Authority - G2, O=Entrust\\, Inc."), &empty));
        assert!(is_in_ccadb(&parse_dn("CN=Federal Bridge CA, O=U.S. Government, C=US"), &empty));
        assert!(is_in_ccadb(
            &parse_dn("CN=Government TLS CA - G1, O=\\E8\\A1\\8C\\E6\\94\\BF\\E9\\99\\A2, C=TW"),
            &empty
        ));
        assert!(!is_in_ccadb(&parse_dn("CN=Government TLS CA - G2, O=\\E8\\A1\\8C\\E6\\94\\BF\\E9\\99\\A2"), &empty));
        assert!(!is_in_ccadb(&parse_dn("CN=Something - G1, O=Other"), &empty));
    }

    #[test]
    fn ambiguous_name_requires_fpki_marker() {
        let ccadb = set(&["Certification Authorities"]);
        assert!(!is_in_ccadb(&parse_dn("CN=Certification Authorities, O=Federal PKI"), &ccadb));
        assert!(!is_in_ccadb(&parse_dn("OU=Certification Authorities, O=Acme"), &ccadb));
        assert!(!is_in_ccadb(&parse_dn("CN=Certification Authorities"), &ccadb));
        assert!(is_in_ccadb(
            &parse_dn("OU=Certification Authorities, O=US FPKI Partners"),
            &ccadb
        ));
    }

    #[test]
    fn ambiguous_name_with_marker_still_needs_listing() {
        let ccadb = set(&["Other CA"]);
        assert!(!is_in_ccadb(
            &parse_dn("CN=Certification Authorities, O=US FPKI"),
            &ccadb
        ));
    }

    #[test]
    fn known_organization_beats_ambiguous_name() {
        let attrs = parse_dn("OU=Certification Authorities, O=Entrust");
        assert!(is_in_ccadb(&attrs, &HashSet::new()));
    }

    #[test]
    fn trust_store_matches_cn_o_ou_exactly() {
        let truststore = set(&["GlobalSign", "ISRG Root X1", "Root Program OU"]);
        assert!(is_in_trust_store(&parse_dn("CN=ISRG Root X1, O=Internet Security Research Group"), &truststore));
        assert!(is_in_trust_store(&parse_dn("CN=GlobalSign Atlas, O=GlobalSign"), &truststore));
        assert!(is_in_trust_store(&parse_dn("OU=Root Program OU"), &truststore));
        assert!(!is_in_trust_store(&parse_dn("CN=GlobalSign Atlas, O=GlobalSign nv-sa"), &truststore));
        assert!(!is_in_trust_store(&parse_dn(""), &truststore));
    }

    #[test]
    fn whitelist_matches_lowercased_substrings() {
        let whitelist = set(&["google", "microsoft corporation"]);
        assert!(is_in_whitelist(&parse_dn("CN=GTS CA 1C3, O=Google Trust Services LLC"), &whitelist));
        assert!(is_in_whitelist(&parse_dn("CN=Microsoft Corporation TLS CA 05"), &whitelist));
        assert!(is_in_whitelist(&parse_dn("OU=Internal google proxy"), &whitelist));
        assert!(!is_in_whitelist(&parse_dn("CN=Goog1e CA"), &whitelist));
    }

    #[test]
    fn whitelist_entries_are_not_lowercased() {
        let whitelist = set(&["Google"]);
        assert!(!is_in_whitelist(&parse_dn("O=Google Trust Services"), &whitelist));
    }

    #[test]
    fn interception_uses_substring_semantics() {
        let interception = set(&["fortinet", "zscaler"]);
        assert!(is_interception(&parse_dn("CN=FortiGate CA, O=Fortinet, C=US"), &interception));
        assert!(is_interception(&parse_dn("CN=Zscaler Intermediate Root CA (zscaler.net)"), &interception));
        assert!(!is_interception(&parse_dn("CN=R3, O=Let's Encrypt"), &interception));
    }

    #[test]
    fn empty_stores_never_match() {
        let attrs = parse_dn("CN=anything, O=Anyone, OU=Anywhere");
        let empty = HashSet::new();
        assert!(!is_in_trust_store(&attrs, &empty));
        assert!(!is_in_whitelist(&attrs, &empty));
        assert!(!is_interception(&attrs, &empty));
        assert!(!is_in_ccadb(&attrs, &empty));
    }

    #[test]
    fn empty_attribute_values_never_match() {
        let blank = set(&[""]);
        let attrs = parse_dn("CN=, O=, OU=");
        assert!(!is_in_whitelist(&attrs, &blank));
        assert!(!is_interception(&attrs, &blank));

        let stores = crate::analyze::TrustStores::builder().whitelist([""]).build();
        let status = crate::analyze::CertValidator::new(&stores)
            .validate(&crate::chain::CertRecord::new("CN=", "CN=www.example.com"));
        assert!(!status.is_public);
    }
}
