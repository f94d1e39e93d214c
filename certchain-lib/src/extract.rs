//! Building chains from PEM bundles.
//!
//! Issuer and subject names are rendered the way
//! `openssl x509 -nameopt RFC2253` prints them, which is the text form the
//! DN parser expects: RDNs in reverse order, `,` between RDNs, special
//! characters backslash-escaped and non-ASCII bytes as `\XY` hex pairs.

use crate::chain::{CertRecord, Chain};
use crate::oid;
use crate::CertchainError;
use std::fmt::Write;
use x509_parser::pem::Pem;
use x509_parser::prelude::*;

/// Check whether input looks like PEM text rather than a JSON chain.
pub fn is_pem(input: &[u8]) -> bool {
    input.windows(11).any(|w| w == b"-----BEGIN ")
}

/// Parse a PEM bundle (leaf first, as sent in a TLS handshake) into a [`Chain`].
///
/// Non-certificate PEM blocks are skipped. Trailing garbage after at least
/// one certificate is ignored.
pub fn chain_from_pem(input: &[u8]) -> Result<Chain, CertchainError> {
    let mut chain = Chain::new();

    for pem_result in Pem::iter_from_buffer(input) {
        let pem = match pem_result {
            Ok(pem) => pem,
            Err(e) => {
                if !chain.is_empty() {
                    break;
                }
                return Err(CertchainError::PemError(format!(
                    "failed to parse PEM: {}",
                    e
                )));
            }
        };
        if pem.label != "CERTIFICATE" && pem.label != "TRUSTED CERTIFICATE" {
            continue;
        }

        let (_, x509) = X509Certificate::from_der(&pem.contents)
            .map_err(|e| CertchainError::DerError(format!("{}", e)))?;
        chain.push(CertRecord::new(
            format_rfc2253(x509.issuer()),
            format_rfc2253(x509.subject()),
        ));
    }

    if chain.is_empty() {
        return Err(CertchainError::PemError(
            "no certificates found in PEM input".into(),
        ));
    }
    Ok(chain)
}

/// Format an X.509 name as an RFC 2253 string.
pub fn format_rfc2253(name: &X509Name) -> String {
    let mut rdns: Vec<String> = name
        .iter()
        .map(|rdn| {
            rdn.iter()
                .map(|attr| {
                    let key = oid::short_name(&attr.attr_type().to_id_string());
                    let value = match attr.as_str() {
                        Ok(s) => escape_rfc2253(s),
                        Err(_) => hex_value(attr.attr_value().data),
                    };
                    format!("{}={}", key, value)
                })
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect();
    rdns.reverse();
    rdns.join(",")
}

/// Escape an attribute value per RFC 2253, with non-ASCII bytes as `\XY`.
fn escape_rfc2253(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);

    for (i, ch) in value.chars().enumerate() {
        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' => {
                out.push('\\');
                out.push(ch);
            }
            '#' if i == 0 => out.push_str("\\#"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "\\{:02X}", b);
                }
            }
        }
    }
    out
}

/// Non-string values are printed as `#` followed by the hex of their encoding.
fn hex_value(data: &[u8]) -> String {
    let mut out = String::with_capacity(1 + data.len() * 2);
    out.push('#');
    for b in data {
        let _ = write!(out, "{:02X}", b);
    }
    out
}
