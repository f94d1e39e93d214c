//! Value types shared by the parser, the classifiers and the reports.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// The attributes of a distinguished name that trust classification looks at.
///
/// Attributes missing from the DN are `None`. Anything other than CN, O, OU
/// and C is dropped at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DnAttributes {
    #[serde(rename = "CN", skip_serializing_if = "Option::is_none")]
    pub cn: Option<String>,
    #[serde(rename = "O", skip_serializing_if = "Option::is_none")]
    pub o: Option<String>,
    #[serde(rename = "OU", skip_serializing_if = "Option::is_none")]
    pub ou: Option<String>,
    #[serde(rename = "C", skip_serializing_if = "Option::is_none")]
    pub c: Option<String>,
}

impl DnAttributes {
    /// Common Name, if present.
    pub fn cn(&self) -> Option<&str> {
        self.cn.as_deref()
    }

    /// Organization, if present.
    pub fn o(&self) -> Option<&str> {
        self.o.as_deref()
    }

    /// Organizational Unit, if present.
    pub fn ou(&self) -> Option<&str> {
        self.ou.as_deref()
    }

    /// Country, if present.
    pub fn c(&self) -> Option<&str> {
        self.c.as_deref()
    }

    /// The name-bearing attributes (CN, O, OU) that the trust stores are matched against.
    pub(crate) fn names(&self) -> [Option<&str>; 3] {
        [self.cn(), self.o(), self.ou()]
    }

    /// Whether no recognized attribute was found.
    pub fn is_empty(&self) -> bool {
        self.cn.is_none() && self.o.is_none() && self.ou.is_none() && self.c.is_none()
    }
}

/// Leaf classification of a single certificate.
///
/// A certificate is a leaf candidate only when its subject CN looks like a
/// host name or IP address. Public vs. private follows the issuer.
///
/// Serializes as the `isPubLeaf`/`isPrivLeaf` flag pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeafKind {
    #[default]
    NotLeaf,
    PublicLeaf,
    PrivateLeaf,
}

impl Serialize for LeafKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut flags = serializer.serialize_struct("LeafKind", 2)?;
        flags.serialize_field("isPubLeaf", &(*self == LeafKind::PublicLeaf))?;
        flags.serialize_field("isPrivLeaf", &(*self == LeafKind::PrivateLeaf))?;
        flags.end()
    }
}

/// Trust status of one certificate, derived from its issuer and subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CertStatus {
    /// Raw issuer text equals raw subject text.
    #[serde(rename = "isSelfSigned")]
    pub is_self_signed: bool,
    /// Subject CN is an IP address or a fully-qualified domain name.
    #[serde(rename = "isSubjectCNFQDN")]
    pub is_subject_cn_fqdn: bool,
    /// Issuer matches a known TLS interception product.
    #[serde(rename = "isInterception")]
    pub is_interception: bool,
    /// Issuer is a recognized public CA.
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    #[serde(rename = "isIssuerCrossSigned")]
    pub is_issuer_cross_signed: bool,
    #[serde(rename = "isSubjectCrossSigned")]
    pub is_subject_cross_signed: bool,
    #[serde(flatten)]
    pub leaf: LeafKind,
}

impl CertStatus {
    pub fn is_pub_leaf(&self) -> bool {
        self.leaf == LeafKind::PublicLeaf
    }

    pub fn is_priv_leaf(&self) -> bool {
        self.leaf == LeafKind::PrivateLeaf
    }
}

/// Public/private tag of a certificate's issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssuerTag {
    Pub,
    Priv,
}

impl std::fmt::Display for IssuerTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssuerTag::Pub => write!(f, "Pub"),
            IssuerTag::Priv => write!(f, "Priv"),
        }
    }
}

/// Chain category derived from the issuer tags of all its certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChainCategory {
    /// Every issuer is public.
    AllPub,
    /// Every issuer is private.
    AllPriv,
    /// A mix of public and private issuers.
    Hybrid,
    /// No issuer tags at all (empty chain).
    Unknown,
}

impl std::fmt::Display for ChainCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChainCategory::AllPub => "AllPub",
            ChainCategory::AllPriv => "AllPriv",
            ChainCategory::Hybrid => "Hybrid",
            ChainCategory::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Order in which a chain is listed for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChainOrder {
    /// Leaf (index 0) first.
    #[default]
    FromLeaf,
    /// Root-most certificate first.
    FromRoot,
}
