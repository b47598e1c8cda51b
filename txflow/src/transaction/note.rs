//! Note-field precedence.
//!
//! A transaction can receive its note from four places: a raw or base64
//! note on the [`ExecParams`](super::exec::ExecParams), and a raw or base64
//! note on an asset definition. Exactly one source wins; notes are never
//! merged.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::MAX_NOTE_BYTES;
use crate::error::{Result, TxFlowError};

/// Encodes one note source pair. The base64 form is checked first.
///
/// Returns `Ok(None)` when neither field is present. A present-but-empty
/// note encodes to `Some(vec![])`.
pub fn encode_note(note: Option<&[u8]>, note_b64: Option<&str>) -> Result<Option<Vec<u8>>> {
    if let Some(b64) = note_b64 {
        let bytes = STANDARD
            .decode(b64)
            .map_err(|e| TxFlowError::InvalidTransaction(format!("note is not valid base64: {}", e)))?;
        return Ok(Some(bytes));
    }
    Ok(note.map(<[u8]>::to_vec))
}

/// Picks the note for a transaction: the transaction-level pair if either
/// field is present, otherwise the asset-definition pair.
///
/// The winning note is checked against [`MAX_NOTE_BYTES`]; an empty note is
/// dropped so the field is omitted from the transaction entirely.
pub fn resolve_note(
    tx_note: Option<&[u8]>,
    tx_note_b64: Option<&str>,
    asset_note: Option<&[u8]>,
    asset_note_b64: Option<&str>,
) -> Result<Option<Vec<u8>>> {
    let chosen = match encode_note(tx_note, tx_note_b64)? {
        Some(bytes) => Some(bytes),
        None => encode_note(asset_note, asset_note_b64)?,
    };

    match chosen {
        Some(bytes) if bytes.len() > MAX_NOTE_BYTES => Err(TxFlowError::InvalidTransaction(
            format!("note is {} bytes, maximum is {}", bytes.len(), MAX_NOTE_BYTES),
        )),
        Some(bytes) if bytes.is_empty() => Ok(None),
        other => Ok(other),
    }
}
