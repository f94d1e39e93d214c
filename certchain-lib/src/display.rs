//! Human-readable and JSON formatting of chains and analysis reports.

use crate::analyze::ChainReport;
use crate::chain::Chain;
use crate::fields::{CertStatus, ChainOrder};
use crate::CertchainError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write;

/// Format a chain, one certificate per block, in the requested order.
///
/// Certificates are numbered by chain position (0 = leaf) in both orders.
pub fn display_chain(chain: &Chain, order: ChainOrder) -> String {
    let mut out = String::new();
    let entries: Vec<_> = match order {
        ChainOrder::FromLeaf => chain.iter().enumerate().collect(),
        ChainOrder::FromRoot => chain.iter().enumerate().rev().collect(),
    };

    for (idx, cert) in entries {
        let _ = writeln!(out, "Cert # {}:", idx);
        let _ = writeln!(out, "  Subject: {}", cert.subject());
        let _ = writeln!(out, "  Issuer: {}", cert.issuer());
        out.push_str("  --->\n");
    }
    out.push_str("***End of Chain***\n");
    out
}

/// Summary of adjacent-pair consistency.
pub fn display_mismatches(report: &ChainReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total certificates: {}", report.length);
    let _ = writeln!(out, "Total pairs: {}", report.total_pairs);
    let _ = writeln!(out, "Mismatched pairs: {}", report.mismatches);
    if report.is_fully_valid() {
        out.push_str("The chain is fully valid!\n");
    } else {
        let _ = writeln!(
            out,
            "The chain has {} (out of {}) mismatched pair(s).",
            report.mismatches, report.total_pairs
        );
    }
    out
}

/// Valid subchain count and positions.
pub fn display_subchains(report: &ChainReport) -> String {
    let subchains: Vec<String> = report
        .subchains
        .subchains
        .iter()
        .map(format_indices)
        .collect();
    format!(
        "Total valid subchains: {}, Subchain index: [{}]\n",
        report.subchains.count,
        subchains.join(", ")
    )
}

/// Public and private leaf counts and positions.
pub fn display_leaf_counts(report: &ChainReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total Public Leaf Certificates: {}",
        report.leaves.public.count
    );
    let _ = writeln!(
        out,
        "Public Leaf Certificate index: {}",
        format_indices(&report.leaves.public.indices)
    );
    let _ = writeln!(
        out,
        "Total Private Leaf Certificates: {}",
        report.leaves.private.count
    );
    let _ = writeln!(
        out,
        "Private Leaf Certificate index: {}",
        format_indices(&report.leaves.private.indices)
    );
    out
}

/// Per-certificate status flags, one block per chain position.
pub fn display_statuses(statuses: &[CertStatus]) -> String {
    let mut out = String::new();
    for (idx, status) in statuses.iter().enumerate() {
        let _ = writeln!(out, "Cert # {}:", idx);
        for (name, value) in [
            ("isSelfSigned", status.is_self_signed),
            ("isSubjectCNFQDN", status.is_subject_cn_fqdn),
            ("isInterception", status.is_interception),
            ("isPublic", status.is_public),
            ("isIssuerCrossSigned", status.is_issuer_cross_signed),
            ("isSubjectCrossSigned", status.is_subject_cross_signed),
            ("isPubLeaf", status.is_pub_leaf()),
            ("isPrivLeaf", status.is_priv_leaf()),
        ] {
            let _ = writeln!(out, "  {}: {}", name, value);
        }
    }
    out
}

/// Full text report for one chain.
pub fn display_report(report: &ChainReport) -> String {
    let mut out = String::new();
    out.push_str(&display_mismatches(report));
    let _ = writeln!(
        out,
        "Cross-signed pairs: {}, Cross-signed index: {}",
        report.cross_signs.count,
        format_indices(&report.cross_signs.indices)
    );
    out.push_str(&display_subchains(report));
    out.push_str(&display_leaf_counts(report));
    let _ = writeln!(out, "Leaf total: {}", report.leaf_total);
    let _ = writeln!(out, "Category: {}", report.category);
    let _ = writeln!(out, "Complete chain: {}", report.complete_chain);
    match report.contains_complete_chain {
        Some(n) => {
            let _ = writeln!(out, "Subchains with a single leaf: {}", n);
        }
        None => out.push_str("Subchains with a single leaf: n/a\n"),
    }
    if report.only_self_signed {
        out.push_str("Only a self-signed certificate was presented.\n");
    }
    if report.statuses.iter().any(|s| s.is_interception) {
        out.push_str("Interception issuer detected.\n");
    }
    out
}

/// Serialize a report (or any other value) as pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CertchainError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn format_indices(indices: &BTreeSet<usize>) -> String {
    let items: Vec<String> = indices.iter().map(usize::to_string).collect();
    format!("{{{}}}", items.join(", "))
}
