//! Trust classification and consistency analysis of observed chains.
//!
//! [`CertValidator`] classifies single certificates; [`ChainValidator`]
//! walks a chain pairwise (leaf to root) to find mismatched links,
//! cross-signed links, valid subchains and leaf certificates, and
//! [`ChainValidator::analyze`] bundles everything into a [`ChainReport`].
//!
//! Two adjacent certificates are consistent when the issuer of the one
//! closer to the leaf equals the subject of the next, or when both names are
//! listed in the same cross-signed store.

mod classify;
pub mod summary;
mod trust_store;
mod validator;

use crate::chain::{CertRecord, Chain};
use crate::fields::{CertStatus, ChainCategory, LeafKind};
use serde::Serialize;
use std::collections::BTreeSet;

pub use classify::{is_in_ccadb, is_in_trust_store, is_in_whitelist, is_interception};
pub use trust_store::{
    find_store_dir, load_set, StorePaths, TrustStores, TrustStoresBuilder, STORES_ENV,
};
pub use validator::{is_fqdn, is_ip_address, CertValidator};

use summary::{
    contain_complete_chain, correct_leaf_count, count_certs_in_subchains, get_chain_category,
    is_complete_chain, issuer_tags, leaf_in_subchains, update_leafs,
};

/// A count together with the chain positions it refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexedCount {
    pub count: usize,
    pub indices: BTreeSet<usize>,
}

/// Valid subchains found in a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubchainCount {
    /// Number of valid runs started.
    pub count: usize,
    /// Positions of each run holding at least one consistent pair.
    pub subchains: Vec<BTreeSet<usize>>,
}

/// Public and private leaf certificates found in a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeafCounts {
    pub public: IndexedCount,
    pub private: IndexedCount,
}

impl LeafCounts {
    pub fn total(&self) -> usize {
        self.public.count + self.private.count
    }

    fn from_statuses(statuses: &[CertStatus]) -> Self {
        let mut leafs = LeafCounts::default();
        for (idx, status) in statuses.iter().enumerate() {
            let bucket = match status.leaf {
                LeafKind::PublicLeaf => &mut leafs.public,
                LeafKind::PrivateLeaf => &mut leafs.private,
                LeafKind::NotLeaf => continue,
            };
            bucket.count += 1;
            bucket.indices.insert(idx);
        }
        leafs
    }
}

/// Everything known about one chain after analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    /// Number of certificates.
    pub length: usize,
    /// Number of adjacent pairs (`length - 1`, or 0 for an empty chain).
    pub total_pairs: usize,
    /// Adjacent pairs that are neither matching nor cross-signed.
    pub mismatches: usize,
    pub cross_signs: IndexedCount,
    pub subchains: SubchainCount,
    pub leaves: LeafCounts,
    /// Union of public and private leaf positions.
    pub leaf_indices: BTreeSet<usize>,
    /// Per subchain, whether each member is a leaf.
    pub leaf_in_subchains: Vec<Vec<bool>>,
    pub certs_in_subchains: usize,
    pub only_self_signed: bool,
    pub complete_chain: bool,
    /// Subchains holding exactly one leaf; `None` when there are no subchains.
    pub contains_complete_chain: Option<usize>,
    /// Leaf count, raised to one for a complete chain with no recognized leaf.
    pub leaf_total: usize,
    pub category: ChainCategory,
    /// Per-certificate status, leaf first.
    pub statuses: Vec<CertStatus>,
}

impl ChainReport {
    /// Whether every adjacent pair is consistent.
    pub fn is_fully_valid(&self) -> bool {
        self.mismatches == 0
    }
}

/// Walks chains pairwise using a [`CertValidator`] for single certificates.
#[derive(Debug, Clone, Copy)]
pub struct ChainValidator<'a> {
    cert_validator: CertValidator<'a>,
}

impl<'a> ChainValidator<'a> {
    pub fn new(stores: &'a TrustStores) -> Self {
        ChainValidator {
            cert_validator: CertValidator::new(stores),
        }
    }

    pub fn from_cert_validator(cert_validator: CertValidator<'a>) -> Self {
        ChainValidator { cert_validator }
    }

    pub fn cert_validator(&self) -> &CertValidator<'a> {
        &self.cert_validator
    }

    /// Whether `issuer` and `next_subject` are both in the peer list or both
    /// in the strict list.
    pub fn is_cross_signed_pair(&self, issuer: &str, next_subject: &str) -> bool {
        self.cert_validator
            .stores()
            .is_cross_signed_pair(issuer, next_subject)
    }

    /// Whether `next` can have issued `current`.
    fn is_consistent_pair(&self, current: &CertRecord, next: &CertRecord) -> bool {
        current.issuer() == next.subject()
            || self.is_cross_signed_pair(current.issuer(), next.subject())
    }

    /// Number of adjacent pairs that are not consistent.
    pub fn count_mismatches(&self, chain: &Chain) -> usize {
        chain
            .pairs()
            .filter(|(_, current, next)| !self.is_consistent_pair(current, next))
            .count()
    }

    /// Adjacent pairs linked through a cross-signed store, with the
    /// positions of both certificates of each such pair.
    pub fn count_cross_signs(&self, chain: &Chain) -> IndexedCount {
        let mut cross_signs = IndexedCount::default();
        for (i, current, next) in chain.pairs() {
            if self.is_cross_signed_pair(current.issuer(), next.subject()) {
                cross_signs.count += 1;
                cross_signs.indices.insert(i);
                cross_signs.indices.insert(i + 1);
            }
        }
        cross_signs
    }

    /// Find maximal runs of consistent adjacent pairs.
    ///
    /// `count` is incremented each time a run starts; a run is kept in
    /// `subchains` only when it spans more than one certificate.
    pub fn count_subchains(&self, chain: &Chain) -> SubchainCount {
        let mut result = SubchainCount::default();
        let mut in_valid_run = false;
        let mut run = BTreeSet::new();

        for (i, current, next) in chain.pairs() {
            if self.is_consistent_pair(current, next) {
                tracing::trace!(pair = i, "consistent pair");
                run.insert(i);
                run.insert(i + 1);
                if !in_valid_run {
                    in_valid_run = true;
                    result.count += 1;
                }
            } else {
                tracing::trace!(pair = i, "mismatched pair ends run");
                in_valid_run = false;
                let finished = std::mem::take(&mut run);
                if finished.len() > 1 {
                    result.subchains.push(finished);
                }
            }
        }
        if run.len() > 1 {
            result.subchains.push(run);
        }
        result
    }

    /// Status of every certificate in the chain, leaf first.
    pub fn cert_statuses(&self, chain: &Chain) -> Vec<CertStatus> {
        chain
            .iter()
            .map(|cert| self.cert_validator.validate(cert))
            .collect()
    }

    /// Count public and private leaf certificates and record their positions.
    pub fn count_leafs(&self, chain: &Chain) -> LeafCounts {
        LeafCounts::from_statuses(&self.cert_statuses(chain))
    }

    /// True only for a single self-signed certificate.
    pub fn is_only_self_signed(&self, chain: &Chain) -> bool {
        match chain.records() {
            [only] => self.cert_validator.validate(only).is_self_signed,
            _ => false,
        }
    }

    /// Run every chain-level analysis and derive the aggregates.
    pub fn analyze(&self, chain: &Chain) -> ChainReport {
        let statuses = self.cert_statuses(chain);
        let mismatches = self.count_mismatches(chain);
        let cross_signs = self.count_cross_signs(chain);
        let subchains = self.count_subchains(chain);
        let leaves = LeafCounts::from_statuses(&statuses);

        let leaf_indices = update_leafs(&leaves.public.indices, &leaves.private.indices);
        let leaf_in_subchains = leaf_in_subchains(&subchains.subchains, &leaf_indices);
        let complete_chain = is_complete_chain(subchains.count, mismatches == 0);
        let contains_complete_chain = contain_complete_chain(&leaf_in_subchains, subchains.count);
        let leaf_total = correct_leaf_count(complete_chain, leaves.total());
        let category = get_chain_category(&issuer_tags(&statuses));
        let only_self_signed = matches!(statuses.as_slice(), [only] if only.is_self_signed);

        tracing::debug!(
            length = chain.len(),
            mismatches,
            subchains = subchains.count,
            leaf_total,
            %category,
            "chain analyzed"
        );

        ChainReport {
            length: chain.len(),
            total_pairs: chain.len().saturating_sub(1),
            mismatches,
            certs_in_subchains: count_certs_in_subchains(&subchains.subchains),
            cross_signs,
            subchains,
            leaves,
            leaf_indices,
            leaf_in_subchains,
            only_self_signed,
            complete_chain,
            contains_complete_chain,
            leaf_total,
            category,
            statuses,
        }
    }
}
