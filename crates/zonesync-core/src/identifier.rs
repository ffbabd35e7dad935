// # Record Identifiers
//
// The backend keeps records only as zone-file text and assigns no ids.
// Identifiers are therefore derived from the record itself:
//
// - hash: first 7 hex characters of sha256("TYPE/NAME/CONTENT"), e.g. `30fa112`
// - raw:  the triple itself, e.g. `TXT/example.com./challengetoken` or
//         `SRV/example.com./0 0 443 msx.example.com.`
//
// Hash identifiers are lossy. Two distinct triples may share a prefix; the
// first record matching during a list scan wins. This mirrors the backend's
// lack of native ids and is accepted as a practical risk.

use sha2::{Digest, Sha256};

/// Length of a hash-form identifier
pub const HASH_ID_LEN: usize = 7;

/// Build the hash-form identifier of a record
///
/// `name` is the absolute owner name, `content` the raw (user-facing) content.
pub fn build_identifier(rtype: &str, name: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}/", rtype).as_bytes());
    hasher.update(format!("{}/", name).as_bytes());
    hasher.update(content.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..HASH_ID_LEN].to_string()
}

/// A record triple named by a raw identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    /// Record type
    pub rtype: String,
    /// Owner name as written in the identifier
    pub name: String,
    /// Raw content
    pub content: String,
}

impl RecordKey {
    /// Hash-form identifier of this triple
    pub fn hash_id(&self) -> String {
        build_identifier(&self.rtype, &self.name, &self.content)
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.rtype, self.name, self.content)
    }
}

/// A parsed record identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordIdentifier {
    /// Digest prefix; resolving it needs a scan over the listed records
    Hash(String),
    /// Self-describing triple
    Raw(RecordKey),
}

impl RecordIdentifier {
    /// Parse an identifier
    ///
    /// Identifiers longer than 7 characters are raw triples split at the first
    /// two `/`; the content keeps any further `/`. Returns `None` for a raw
    /// identifier with fewer than three parts or an empty part.
    pub fn parse(identifier: &str) -> Option<Self> {
        if identifier.len() <= HASH_ID_LEN {
            return Some(RecordIdentifier::Hash(identifier.to_string()));
        }

        let mut parts = identifier.splitn(3, '/');
        let rtype = parts.next().filter(|s| !s.is_empty())?;
        let name = parts.next().filter(|s| !s.is_empty())?;
        let content = parts.next().filter(|s| !s.is_empty())?;

        Some(RecordIdentifier::Raw(RecordKey {
            rtype: rtype.to_ascii_uppercase(),
            name: name.to_string(),
            content: content.to_string(),
        }))
    }

    /// The triple for a raw identifier; hash identifiers need a lookup first
    pub fn raw(&self) -> Option<&RecordKey> {
        match self {
            RecordIdentifier::Raw(key) => Some(key),
            RecordIdentifier::Hash(_) => None,
        }
    }
}
