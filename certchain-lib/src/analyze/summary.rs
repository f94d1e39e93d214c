//! Chain-level aggregates computed from [`ChainValidator`](super::ChainValidator) outputs.

use crate::fields::{CertStatus, ChainCategory, IssuerTag};
use crate::CertchainError;
use serde::Deserialize;
use std::collections::BTreeSet;

/// A chain is complete when it reduces to a single valid subchain and
/// every adjacent pair matched.
pub fn is_complete_chain(subchain_count: usize, all_certs_match: bool) -> bool {
    subchain_count == 1 && all_certs_match
}

/// A complete chain ends in exactly one leaf even when no subject was
/// recognized as a host name, so a zero count is raised to one.
pub fn correct_leaf_count(is_complete_chain: bool, leaf_total: usize) -> usize {
    if is_complete_chain && leaf_total == 0 {
        1
    } else {
        leaf_total
    }
}

#[derive(Deserialize)]
struct PublicFlag {
    #[serde(rename = "isPublic")]
    is_public: bool,
}

/// Read issuer tags from a JSON array of objects carrying an `isPublic` flag,
/// such as serialized [`CertStatus`] values.
pub fn issuer_tags_from_json(json: &str) -> Result<Vec<IssuerTag>, CertchainError> {
    let flags: Vec<PublicFlag> = serde_json::from_str(json)?;
    Ok(flags
        .into_iter()
        .map(|f| if f.is_public { IssuerTag::Pub } else { IssuerTag::Priv })
        .collect())
}

/// Issuer tag of each certificate, in chain order.
pub fn issuer_tags(statuses: &[CertStatus]) -> Vec<IssuerTag> {
    statuses
        .iter()
        .map(|s| if s.is_public { IssuerTag::Pub } else { IssuerTag::Priv })
        .collect()
}

/// For each subchain, whether each of its certificates (in index order) is a leaf.
pub fn leaf_in_subchains(
    subchains: &[BTreeSet<usize>],
    leaf_indices: &BTreeSet<usize>,
) -> Vec<Vec<bool>> {
    subchains
        .iter()
        .map(|subchain| {
            subchain
                .iter()
                .map(|idx| leaf_indices.contains(idx))
                .collect()
        })
        .collect()
}

/// Total number of certificates covered by the subchains.
pub fn count_certs_in_subchains(subchains: &[BTreeSet<usize>]) -> usize {
    subchains.iter().map(BTreeSet::len).sum()
}

/// Number of subchains holding exactly one leaf.
///
/// Returns `None` when there are no subchains, in which case the count is
/// not meaningful.
pub fn contain_complete_chain(leaf_in_subchains: &[Vec<bool>], subchain_count: usize) -> Option<usize> {
    if subchain_count < 1 {
        return None;
    }
    Some(
        leaf_in_subchains
            .iter()
            .filter(|flags| flags.iter().filter(|&&is_leaf| is_leaf).count() == 1)
            .count(),
    )
}

/// Union of public and private leaf positions.
pub fn update_leafs(pub_leafs: &BTreeSet<usize>, priv_leafs: &BTreeSet<usize>) -> BTreeSet<usize> {
    pub_leafs.union(priv_leafs).copied().collect()
}

/// Categorize a chain by its issuer tags.
///
/// An empty tag list is [`ChainCategory::Unknown`].
pub fn get_chain_category(tags: &[IssuerTag]) -> ChainCategory {
    if tags.is_empty() {
        ChainCategory::Unknown
    } else if tags.iter().all(|t| *t == IssuerTag::Pub) {
        ChainCategory::AllPub
    } else if tags.iter().all(|t| *t == IssuerTag::Priv) {
        ChainCategory::AllPriv
    } else {
        ChainCategory::Hybrid
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn idx(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn complete_chain_needs_one_subchain_and_no_mismatch() {
        assert!(is_complete_chain(1, true));
        assert!(!is_complete_chain(1, false));
        assert!(!is_complete_chain(2, true));
        assert!(!is_complete_chain(0, true));
    }

    #[test]
    fn leaf_count_correction() {
        assert_eq!(correct_leaf_count(true, 0), 1);
        assert_eq!(correct_leaf_count(true, 3), 3);
        assert_eq!(correct_leaf_count(false, 0), 0);
        assert_eq!(correct_leaf_count(false, 2), 2);
    }

    #[test]
    fn categories() {
        use IssuerTag::{Priv, Pub};
        assert_eq!(get_chain_category(&[Pub, Pub]), ChainCategory::AllPub);
        assert_eq!(get_chain_category(&[Pub, Priv]), ChainCategory::Hybrid);
        assert_eq!(get_chain_category(&[Priv]), ChainCategory::AllPriv);
        assert_eq!(get_chain_category(&[]), ChainCategory::Unknown);
    }

    #[test]
    fn tags_from_json() {
        let tags = issuer_tags_from_json(
            r#"[{"isPublic": true, "isSelfSigned": false}, {"isPublic": false}]"#,
        )
        .unwrap();
        assert_eq!(tags, vec![IssuerTag::Pub, IssuerTag::Priv]);
        assert!(issuer_tags_from_json(r#"[{"isSelfSigned": true}]"#).is_err());
        assert!(issuer_tags_from_json("{").is_err());
    }

    #[test]
    fn tags_from_serialized_statuses() {
        let statuses = vec![
            CertStatus {
                is_public: true,
                ..CertStatus::default()
            },
            CertStatus::default(),
        ];
        let json = serde_json::to_string(&statuses).unwrap();
        assert_eq!(issuer_tags_from_json(&json).unwrap(), issuer_tags(&statuses));
    }

    #[test]
    fn leaf_membership_per_subchain() {
        let subchains = vec![idx(&[0, 1]), idx(&[2, 3, 4])];
        let leafs = idx(&[0, 3, 4]);
        assert_eq!(
            leaf_in_subchains(&subchains, &leafs),
            vec![vec![true, false], vec![false, true, true]]
        );
        assert_eq!(count_certs_in_subchains(&subchains), 5);
        assert_eq!(count_certs_in_subchains(&[]), 0);
    }

    #[test]
    fn complete_chain_containment() {
        let flags = vec![vec![true, false], vec![false, true, true], vec![false, false]];
        assert_eq!(contain_complete_chain(&flags, 3), Some(1));
        assert_eq!(contain_complete_chain(&flags, 0), None);
        assert_eq!(contain_complete_chain(&[], 0), None);
        assert_eq!(contain_complete_chain(&[], 2), Some(0));
    }

    #[test]
    fn leaf_union() {
        assert_eq!(update_leafs(&idx(&[0]), &idx(&[0, 3])), idx(&[0, 3]));
        assert!(update_leafs(&idx(&[]), &idx(&[])).is_empty());
    }
}
