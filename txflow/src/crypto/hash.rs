//! # Hashing Utilities
//!
//! The ledger identifies transactions, groups and logic-signature programs
//! by SHA-512/256 digests with a short ASCII domain prefix mixed in first.
//! The prefix keeps a transaction id from ever colliding with a group id or
//! a program address built from the same bytes.

use sha2::{Digest, Sha512_256};

/// Length in bytes of every digest produced here.
pub const DIGEST_LENGTH: usize = 32;

/// SHA-512/256 of the input.
///
/// # Example
///
/// ```
/// use txflow::crypto::hash::sha512_256;
///
/// let digest = sha512_256(b"txflow");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha512_256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    sha512_256_multi(&[data])
}

/// SHA-512/256 over several slices fed in order, without concatenating them
/// into a temporary buffer first.
pub fn sha512_256_multi(parts: &[&[u8]]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha512_256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; DIGEST_LENGTH];
    output.copy_from_slice(&result);
    output
}

/// Domain-separated digest: `SHA-512/256(domain || data)`.
///
/// Every protocol-visible hash in the crate goes through here with one of
/// the prefixes from [`crate::config`].
pub fn domain_hash(domain: &[u8], data: &[u8]) -> [u8; DIGEST_LENGTH] {
    sha512_256_multi(&[domain, data])
}

/// Prefixes `data` with `domain` into a fresh buffer. This is the message a
/// signature covers.
pub fn domain_message(domain: &[u8], data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(domain.len() + data.len());
    buf.extend_from_slice(domain);
    buf.extend_from_slice(data);
    buf
}
