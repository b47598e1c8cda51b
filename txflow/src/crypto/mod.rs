//! # Cryptographic Primitives
//!
//! Thin wrappers over audited implementations: Ed25519 (`ed25519-dalek`) for
//! account signatures and SHA-512/256 (`sha2`) for every protocol digest.
//! Nothing here is hand-rolled.

pub mod hash;
pub mod keys;

pub use hash::{domain_hash, sha512_256};
pub use keys::{Account, Address, KeyError, Signature};
