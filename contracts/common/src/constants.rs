//! Protocol Constants
//!
//! The only compiled-in configuration. Label prefixes are universal token
//! standards; every other parameter (validator hashes, fee recipients,
//! rates) is stored in records and read at validation time, so no contract
//! ever carries another contract's identity as a literal.

/// Position identity token label prefixes.
///
/// A position is a matched pair of tokens under one policy: the reference
/// token carries the position record at the staking validator, the user
/// token is the bare ownership claim held in the staker's wallet.
pub mod labels {
    /// Reference token prefix (label 100).
    pub const REFERENCE: [u8; 4] = [0x00, 0x06, 0x43, 0xb0];
    /// User token prefix (label 222).
    pub const USER: [u8; 4] = [0x00, 0x0d, 0xe1, 0x40];
}

/// Byte lengths of ledger identifiers.
pub mod shape {
    /// Payment key hashes, script hashes, and policy ids are 28-byte digests.
    pub const HASH_LEN: usize = 28;
    /// One-shot token names are 32-byte SHA-256 digests.
    pub const ONE_SHOT_NAME_LEN: usize = 32;
}

/// Fee and rate configuration (basis points, 100 = 1%).
pub mod fees {
    /// Basis points denominator.
    pub const BPS_DENOMINATOR: u64 = 10_000;
    /// Highest accepted annual yield rate (100%).
    pub const MAX_YIELD_RATE_BPS: u64 = 10_000;
}

/// Time configuration (POSIX milliseconds).
pub mod time {
    /// Milliseconds per day.
    pub const MS_PER_DAY: u64 = 86_400_000;
    /// Days per year used by reward accrual.
    pub const DAYS_PER_YEAR: u64 = 365;
    /// Maximum width of a transaction validity window (10 minutes).
    ///
    /// A wider window would let a submitter place the lower bound far in
    /// the past and inflate elapsed-time reward calculations.
    pub const MAX_VALIDITY_WINDOW_MS: u64 = 600_000;
}
