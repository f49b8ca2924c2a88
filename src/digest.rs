//! SHA-256 verification of downloaded payloads.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::platform::Platform;

/// Checks `data` against the digest registered for the host platform in the
/// entry's `shas` map. Stored values have the form `<algorithm>:<hex>`; the
/// algorithm label is descriptive only, the hex portion is always compared
/// against a SHA-256 digest.
pub fn verify(
    name: &str,
    data: &[u8],
    shas: &HashMap<String, String>,
    platform: &Platform,
) -> Result<()> {
    let key = platform.key();
    let value = shas
        .get(&key)
        .ok_or_else(|| Error::EntryInvalid(format!("{name}: no checksum for {key}")))?;

    let (_, expected) = value
        .split_once(':')
        .ok_or_else(|| Error::EntryInvalid(format!("{name}: malformed checksum {value}")))?;

    let computed = sha256_hex(data);
    if computed != expected {
        return Err(Error::ChecksumMismatch {
            name: name.to_string(),
            computed,
            expected: expected.to_string(),
        });
    }
    Ok(())
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn linux_amd64() -> Platform {
        Platform {
            os: "linux".to_string(),
            arch: "amd64".to_string(),
        }
    }

    fn shas(value: &str) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("linux-amd64".to_string(), value.to_string());
        map
    }

    #[test]
    fn accepts_matching_digest() {
        let shas = shas(&format!("sha256:{HELLO_SHA}"));
        verify("tool", b"hello", &shas, &linux_amd64()).unwrap();
    }

    #[test]
    fn rejects_mismatch_with_both_digests() {
        let shas = shas(&format!("sha256:{}", "0".repeat(64)));
        let err = verify("tool", b"hello", &shas, &linux_amd64()).unwrap_err();
        match err {
            Error::ChecksumMismatch {
                name,
                computed,
                expected,
            } => {
                assert_eq!(name, "tool");
                assert_eq!(computed, HELLO_SHA);
                assert_eq!(expected, "0".repeat(64));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_platform_key_is_invalid() {
        let mut shas = HashMap::new();
        shas.insert(
            "darwin-arm64".to_string(),
            format!("sha256:{HELLO_SHA}"),
        );
        let err = verify("tool", b"hello", &shas, &linux_amd64()).unwrap_err();
        assert!(matches!(err, Error::EntryInvalid(_)));
    }

    #[test]
    fn value_without_algorithm_prefix_is_invalid() {
        let shas = shas(HELLO_SHA);
        let err = verify("tool", b"hello", &shas, &linux_amd64()).unwrap_err();
        assert!(matches!(err, Error::EntryInvalid(_)));
    }
}
