//! Canonical binary encoding.
//!
//! bincode over serde-derived structs: fields are written in declaration
//! order with fixed-width integers, so the same value always produces the
//! same bytes. JSON is for humans and logs; bincode is what gets hashed,
//! signed and submitted.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, TxFlowError};

/// Encodes `value` to its canonical bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| TxFlowError::Encoding(e.to_string()))
}

/// Decodes canonical bytes back into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| TxFlowError::Encoding(e.to_string()))
}
