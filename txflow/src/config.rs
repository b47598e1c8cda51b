//! # Protocol Constants & Executor Configuration
//!
//! Every protocol limit the builder and executor enforce lives here. The
//! network rejects transactions that break these limits, usually without a
//! useful error message, so we check them locally before anything leaves
//! the process.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// Minimum fee any transaction must pay, in micro-units of the native token.
/// Flat fees below this are clamped up; per-byte fees that compute to less
/// than this are raised to it.
pub const MIN_TX_FEE: u64 = 1_000;

/// Bytes added to the unsigned encoding when estimating the size of the
/// signed transaction for per-byte fees: a 64-byte signature plus the
/// envelope framing.
pub const SIGNATURE_SIZE_OVERHEAD: u64 = 75;

// ---------------------------------------------------------------------------
// Atomic Groups
// ---------------------------------------------------------------------------

/// Largest number of transactions the network accepts in one atomic group.
pub const MAX_GROUP_SIZE: usize = 16;

// ---------------------------------------------------------------------------
// Transaction Fields
// ---------------------------------------------------------------------------

/// Maximum note length in bytes.
pub const MAX_NOTE_BYTES: usize = 1024;

/// A lease, when present, is exactly this many bytes.
pub const LEASE_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Asset Parameters
// ---------------------------------------------------------------------------

/// Maximum asset unit name length (e.g. `"USDC"`).
pub const MAX_UNIT_NAME_BYTES: usize = 8;

/// Maximum asset name length.
pub const MAX_ASSET_NAME_BYTES: usize = 32;

/// Maximum asset URL length.
pub const MAX_ASSET_URL_BYTES: usize = 96;

/// Asset metadata hashes are exactly 32 bytes.
pub const ASSET_METADATA_HASH_LENGTH: usize = 32;

/// Maximum number of decimal places an asset can declare.
pub const MAX_ASSET_DECIMALS: u32 = 19;

// ---------------------------------------------------------------------------
// Application Calls
// ---------------------------------------------------------------------------

/// Maximum number of application call arguments.
pub const MAX_APP_ARGS: usize = 16;

/// Maximum combined size of all application call arguments.
pub const MAX_APP_TOTAL_ARG_BYTES: usize = 2048;

/// Maximum number of extra accounts an application call may reference.
pub const MAX_APP_ACCOUNTS: usize = 4;

/// Maximum number of foreign apps plus foreign assets plus accounts.
pub const MAX_APP_TOTAL_REFERENCES: usize = 8;

/// Maximum size of an approval or clear-state program.
pub const MAX_APP_PROGRAM_BYTES: usize = 2048;

// ---------------------------------------------------------------------------
// Hash Domain Prefixes
// ---------------------------------------------------------------------------

/// Domain prefix for transaction ids and secret-key signatures.
pub const TX_DOMAIN: &[u8] = b"TX";

/// Domain prefix for atomic group ids.
pub const TX_GROUP_DOMAIN: &[u8] = b"TG";

/// Domain prefix for logic-signature program hashes and delegations.
pub const PROGRAM_DOMAIN: &[u8] = b"Program";

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Rounds to wait for confirmation before giving up.
pub const DEFAULT_WAIT_ROUNDS: u64 = 10;

/// Wall-clock ceiling on a single confirmation wait.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// ExecutorConfig
// ---------------------------------------------------------------------------

/// Tunables for [`crate::executor::SubmissionExecutor`] and
/// [`crate::replay::SignedBlobReplayer`].
///
/// Deserializable so hosts can embed it in their own config files; missing
/// fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Rounds to poll for confirmation after submission.
    pub wait_rounds: u64,

    /// Wall-clock limit on the confirmation wait. Serialized as
    /// `{ "secs": u64, "nanos": u32 }`.
    pub confirmation_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            wait_rounds: DEFAULT_WAIT_ROUNDS,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }
}

impl ExecutorConfig {
    /// Parses a JSON config fragment, e.g. `{"wait_rounds": 4}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Overrides the number of rounds to wait for confirmation.
    pub fn with_wait_rounds(mut self, rounds: u64) -> Self {
        self.wait_rounds = rounds;
        self
    }

    /// Overrides the wall-clock confirmation timeout.
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}
