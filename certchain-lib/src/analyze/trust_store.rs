//! Trust-store bundle used by every classification call.
//!
//! Provides [`TrustStores`], six read-only name sets loaded once per run
//! from plain-text files (one entry per line), and the lookup of the
//! directory holding those files.

use crate::CertchainError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming the trust-store directory.
pub const STORES_ENV: &str = "CERTCHAIN_STORES";

/// Directory checked when neither a path nor [`STORES_ENV`] is given.
pub(crate) const DEFAULT_STORE_DIR: &str = "stores";

/// Locations of the six trust-store files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Common CA Database names, matched exactly against CN/OU.
    pub ccadb: PathBuf,
    /// Lower-case substrings of large known organizations.
    pub whitelist: PathBuf,
    /// Root program names, matched exactly against CN/O/OU.
    pub truststore: PathBuf,
    /// Lower-case substrings of known interception products.
    pub interception: PathBuf,
    /// Raw DNs of peer cross-signed CAs. Optional.
    pub peer_cross_signed: PathBuf,
    /// Raw DNs of strictly cross-signed CAs. Optional.
    pub strict_cross_signed: PathBuf,
}

impl StorePaths {
    /// Default file names inside a store directory.
    pub fn in_dir(dir: &Path) -> Self {
        StorePaths {
            ccadb: dir.join("ccadb.txt"),
            whitelist: dir.join("whitelist.txt"),
            truststore: dir.join("truststore.txt"),
            interception: dir.join("interception.txt"),
            peer_cross_signed: dir.join("peer_cross_signed.txt"),
            strict_cross_signed: dir.join("strict_cross_signed.txt"),
        }
    }
}

/// Find the trust-store directory.
///
/// Checks, in order:
/// 1. `CERTCHAIN_STORES` environment variable
/// 2. `./stores` relative to the working directory
pub fn find_store_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(STORES_ENV) {
        let p = PathBuf::from(&path);
        if p.is_dir() {
            return Some(p);
        }
    }

    let p = PathBuf::from(DEFAULT_STORE_DIR);
    if p.is_dir() {
        return Some(p);
    }
    None
}

/// Load a set of names from a file, one per line.
///
/// Lines are trimmed and blank lines skipped; an empty entry would match
/// every value in the substring-based stores.
pub fn load_set(path: &Path) -> Result<HashSet<String>, CertchainError> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        CertchainError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Like [`load_set`], but a missing file yields an empty set.
fn load_optional_set(path: &Path) -> Result<HashSet<String>, CertchainError> {
    if path.exists() {
        load_set(path)
    } else {
        tracing::debug!(path = %path.display(), "optional trust store not found, using empty set");
        Ok(HashSet::new())
    }
}

/// The read-only name sets consulted during classification.
///
/// Shared by reference across any number of concurrent chain analyses.
#[derive(Clone, Default)]
pub struct TrustStores {
    ccadb: HashSet<String>,
    whitelist: HashSet<String>,
    truststore: HashSet<String>,
    interception: HashSet<String>,
    peer_cross_signed: HashSet<String>,
    strict_cross_signed: HashSet<String>,
}

impl std::fmt::Debug for TrustStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustStores")
            .field("ccadb", &self.ccadb.len())
            .field("whitelist", &self.whitelist.len())
            .field("truststore", &self.truststore.len())
            .field("interception", &self.interception.len())
            .field("peer_cross_signed", &self.peer_cross_signed.len())
            .field("strict_cross_signed", &self.strict_cross_signed.len())
            .finish()
    }
}

impl TrustStores {
    /// Create a bundle where every store is empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> TrustStoresBuilder {
        TrustStoresBuilder::default()
    }

    /// Load all stores from explicit file paths.
    ///
    /// The four classification stores are required. The two cross-signed
    /// lists default to empty when their files are absent.
    pub fn from_paths(paths: &StorePaths) -> Result<Self, CertchainError> {
        let stores = TrustStores {
            ccadb: load_set(&paths.ccadb)?,
            whitelist: load_set(&paths.whitelist)?,
            truststore: load_set(&paths.truststore)?,
            interception: load_set(&paths.interception)?,
            peer_cross_signed: load_optional_set(&paths.peer_cross_signed)?,
            strict_cross_signed: load_optional_set(&paths.strict_cross_signed)?,
        };
        tracing::debug!(?stores, "loaded trust stores");
        Ok(stores)
    }

    /// Load all stores from the default file names inside `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, CertchainError> {
        if !dir.is_dir() {
            return Err(CertchainError::StoreError(format!(
                "{}: not a directory",
                dir.display()
            )));
        }
        Self::from_paths(&StorePaths::in_dir(dir))
    }

    /// Load from the directory found by [`find_store_dir`].
    pub fn discover() -> Result<Self, CertchainError> {
        let dir = find_store_dir().ok_or_else(|| {
            CertchainError::StoreError(format!(
                "no trust store directory found (set {} or create ./{})",
                STORES_ENV, DEFAULT_STORE_DIR
            ))
        })?;
        Self::from_dir(&dir)
    }

    pub fn ccadb(&self) -> &HashSet<String> {
        &self.ccadb
    }

    pub fn whitelist(&self) -> &HashSet<String> {
        &self.whitelist
    }

    pub fn truststore(&self) -> &HashSet<String> {
        &self.truststore
    }

    pub fn interception(&self) -> &HashSet<String> {
        &self.interception
    }

    pub fn peer_cross_signed(&self) -> &HashSet<String> {
        &self.peer_cross_signed
    }

    pub fn strict_cross_signed(&self) -> &HashSet<String> {
        &self.strict_cross_signed
    }

    /// Whether a raw DN appears in either cross-signed list.
    pub fn is_cross_signed(&self, dn: &str) -> bool {
        self.peer_cross_signed.contains(dn) || self.strict_cross_signed.contains(dn)
    }

    /// Whether an issuer and the next certificate's subject are a known
    /// cross-signed pair. Both names must be in the same list.
    pub fn is_cross_signed_pair(&self, issuer: &str, next_subject: &str) -> bool {
        (self.peer_cross_signed.contains(issuer) && self.peer_cross_signed.contains(next_subject))
            || (self.strict_cross_signed.contains(issuer)
                && self.strict_cross_signed.contains(next_subject))
    }
}

/// In-memory construction of a [`TrustStores`] bundle.
#[derive(Debug, Default)]
pub struct TrustStoresBuilder {
    stores: TrustStores,
}

fn to_set<I, S>(entries: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    entries.into_iter().map(Into::into).collect()
}

impl TrustStoresBuilder {
    pub fn ccadb<I: IntoIterator<Item = S>, S: Into<String>>(mut self, entries: I) -> Self {
        self.stores.ccadb = to_set(entries);
        self
    }

    pub fn whitelist<I: IntoIterator<Item = S>, S: Into<String>>(mut self, entries: I) -> Self {
        self.stores.whitelist = to_set(entries);
        self
    }

    pub fn truststore<I: IntoIterator<Item = S>, S: Into<String>>(mut self, entries: I) -> Self {
        self.stores.truststore = to_set(entries);
        self
    }

    pub fn interception<I: IntoIterator<Item = S>, S: Into<String>>(mut self, entries: I) -> Self {
        self.stores.interception = to_set(entries);
        self
    }

    pub fn peer_cross_signed<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        entries: I,
    ) -> Self {
        self.stores.peer_cross_signed = to_set(entries);
        self
    }

    pub fn strict_cross_signed<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        entries: I,
    ) -> Self {
        self.stores.strict_cross_signed = to_set(entries);
        self
    }

    pub fn build(self) -> TrustStores {
        self.stores
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn write_store(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn load_set_trims_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        write_store(dir.path(), "set.txt", "  DigiCert  \n\n\tISRG Root X1\n   \n");
        let set = load_set(&dir.path().join("set.txt")).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("DigiCert"));
        assert!(set.contains("ISRG Root X1"));
    }

    #[test]
    fn load_set_missing_file_names_path() {
        let err = load_set(Path::new("/nonexistent/certchain/ccadb.txt")).unwrap_err();
        assert!(format!("{}", err).contains("/nonexistent/certchain/ccadb.txt"));
    }

    #[test]
    fn from_dir_cross_signed_files_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        write_store(dir.path(), "ccadb.txt", "Root A\n");
        write_store(dir.path(), "whitelist.txt", "google\n");
        write_store(dir.path(), "truststore.txt", "Root B\n");
        write_store(dir.path(), "interception.txt", "fortinet\n");
        let stores = TrustStores::from_dir(dir.path()).unwrap();
        assert!(stores.ccadb().contains("Root A"));
        assert!(stores.peer_cross_signed().is_empty());
        assert!(stores.strict_cross_signed().is_empty());
    }

    #[test]
    fn from_dir_requires_classification_stores() {
        let dir = tempfile::tempdir().unwrap();
        write_store(dir.path(), "ccadb.txt", "Root A\n");
        assert!(TrustStores::from_dir(dir.path()).is_err());
    }

    #[test]
    fn from_dir_rejects_missing_directory() {
        let err = TrustStores::from_dir(Path::new("/nonexistent/certchain")).unwrap_err();
        assert!(matches!(err, CertchainError::StoreError(_)));
    }

    #[test]
    fn cross_signed_pair_requires_same_list() {
        let stores = TrustStores::builder()
            .peer_cross_signed(["CN=A", "CN=B"])
            .strict_cross_signed(["CN=C"])
            .build();
        assert!(stores.is_cross_signed_pair("CN=A", "CN=B"));
        assert!(!stores.is_cross_signed_pair("CN=A", "CN=C"));
        assert!(!stores.is_cross_signed_pair("CN=C", "CN=A"));
        assert!(stores.is_cross_signed("CN=C"));
        assert!(!stores.is_cross_signed("CN=D"));
    }

    #[test]
    fn debug_shows_sizes_only() {
        let stores = TrustStores::builder().ccadb(["x", "y"]).build();
        let dbg = format!("{:?}", stores);
        assert!(dbg.contains("ccadb: 2"));
        assert!(!dbg.contains("\"x\""));
    }
}
