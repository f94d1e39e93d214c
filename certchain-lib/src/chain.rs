//! Observed certificate chains.
//!
//! A [`Chain`] is an append-only, leaf-first sequence of [`CertRecord`]s.
//! Records are stored in a `Vec`, so position 0 is always the leaf and the
//! sequence cannot contain cycles.

use crate::CertchainError;
use serde::{Deserialize, Serialize};

/// Identity text of one certificate as observed in a chain.
///
/// In JSON the fields are named `Issuer` and `Subject` (lower-case names
/// are accepted too). A missing field reads as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertRecord {
    #[serde(rename = "Issuer", alias = "issuer", default)]
    issuer: String,
    #[serde(rename = "Subject", alias = "subject", default)]
    subject: String,
}

impl CertRecord {
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>) -> Self {
        CertRecord {
            issuer: issuer.into(),
            subject: subject.into(),
        }
    }

    /// Raw, unparsed issuer DN.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Raw, unparsed subject DN.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issuer and subject text are byte-for-byte identical.
    pub fn is_self_signed(&self) -> bool {
        self.issuer == self.subject
    }
}

impl std::fmt::Display for CertRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subject: {}\nIssuer: {}", self.subject, self.issuer)
    }
}

/// An ordered certificate chain, leaf first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    records: Vec<CertRecord>,
}

impl Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Chain {
            records: Vec::new(),
        }
    }

    /// Build a chain from `(issuer, subject)` pairs, leaf first.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut chain = Chain::new();
        for (issuer, subject) in pairs {
            chain.push(CertRecord::new(issuer, subject));
        }
        chain
    }

    /// Parse a JSON array of `{"Issuer": ..., "Subject": ...}` objects, leaf first.
    pub fn from_json(input: &[u8]) -> Result<Self, CertchainError> {
        let records: Vec<CertRecord> = serde_json::from_slice(input)?;
        Ok(Chain { records })
    }

    /// Append the next certificate toward the root.
    pub fn push(&mut self, record: CertRecord) {
        self.records.push(record);
    }

    /// Number of certificates in the chain.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Certificate at `index` (0 = leaf).
    pub fn get(&self, index: usize) -> Option<&CertRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[CertRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CertRecord> {
        self.records.iter()
    }

    /// Adjacent `(index, cert, next)` pairs, where `next` is one step closer to the root.
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (usize, &CertRecord, &CertRecord)> {
        self.records
            .windows(2)
            .enumerate()
            .filter_map(|(i, w)| match w {
                [current, next] => Some((i, current, next)),
                _ => None,
            })
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a CertRecord;
    type IntoIter = std::slice::Iter<'a, CertRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<CertRecord> for Chain {
    fn from_iter<I: IntoIterator<Item = CertRecord>>(iter: I) -> Self {
        Chain {
            records: iter.into_iter().collect(),
        }
    }
}
