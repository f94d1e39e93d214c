//! certchain-lib: trust classification for observed TLS certificate chains.
//!
//! Takes chains of issuer/subject distinguished names (leaf first), as
//! collected from live TLS handshakes, and classifies each certificate and
//! each chain against a bundle of trust stores: public vs. private issuers,
//! interception products, cross-signed bridges, chain consistency, valid
//! subchains and leaf certificates.
//!
//! This is text-based classification only. Signatures, validity dates, key
//! usage and revocation are never checked.

pub mod analyze;
mod chain;
mod display;
mod dn;
mod extract;
mod fields;
mod oid;

pub use analyze::summary::{
    contain_complete_chain, correct_leaf_count, count_certs_in_subchains, get_chain_category,
    is_complete_chain, issuer_tags, issuer_tags_from_json, leaf_in_subchains, update_leafs,
};
pub use analyze::{
    find_store_dir, load_set, CertValidator, ChainReport, ChainValidator, IndexedCount,
    LeafCounts, StorePaths, SubchainCount, TrustStores, TrustStoresBuilder,
};
pub use chain::{CertRecord, Chain};
pub use display::{
    display_chain, display_leaf_counts, display_mismatches, display_report, display_statuses,
    display_subchains, to_json,
};
pub use dn::parse_dn;
pub use extract::{chain_from_pem, format_rfc2253, is_pem};
pub use fields::{CertStatus, ChainCategory, ChainOrder, DnAttributes, IssuerTag, LeafKind};

/// Errors returned by certchain-lib.
///
/// Classification itself never fails; these cover ingestion of trust
/// stores, chain files and PEM bundles.
#[derive(Debug, thiserror::Error)]
pub enum CertchainError {
    #[error("Invalid PEM format: {0}")]
    PemError(String),

    #[error("Invalid DER format: {0}")]
    DerError(String),

    #[error("Trust store error: {0}")]
    StoreError(String),

    #[error("Invalid chain input: {0}")]
    InputError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
