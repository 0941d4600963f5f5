use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// SHA-256 fingerprint of an uploaded document, kept with its segments for
/// traceability. The index does not deduplicate on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileHash(String);

impl FileHash {
    pub fn of(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        Self(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FileHash {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Not a SHA-256 hex digest: {}", value));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for FileHash {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FileHash> for String {
    fn from(hash: FileHash) -> Self {
        hash.0
    }
}

impl std::fmt::Display for FileHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hash = FileHash::of(b"hello world");
        assert_eq!(
            hash.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<FileHash>().is_err());
        assert!(
            "g94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
                .parse::<FileHash>()
                .is_err()
        );
    }

    #[test]
    fn test_parse_normalizes_case() {
        let upper = "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9";
        let hash: FileHash = upper.parse().unwrap();
        assert_eq!(hash, FileHash::of(b"hello world"));
    }

    #[test]
    fn test_serde_validates() {
        let json = serde_json::to_string(&FileHash::of(b"x")).unwrap();
        let back: FileHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FileHash::of(b"x"));
        assert!(serde_json::from_str::<FileHash>("\"nope\"").is_err());
    }
}
