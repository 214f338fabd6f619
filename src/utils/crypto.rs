// src/utils/crypto.rs
//! Hashing utilities for credential commitments.
//!
//! Uses SHA-256 (via `ring`) for all operations; digests are rendered as
//! lowercase hex because that is how target hashes are embedded in issued
//! credentials.

use ring::digest::{digest, SHA256};

/// Computes a SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest(&SHA256, data).as_ref());
    out
}

/// Computes a SHA-256 hash and returns it as a 64-character lowercase hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(hash_data(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vectors() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hex_is_lowercase() {
        let hex = sha256_hex(b"hello world");
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, hex.to_lowercase());
    }
}
