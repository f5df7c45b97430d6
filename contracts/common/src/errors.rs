//! Error Types for the Tidepool Protocol
//!
//! Every failure is a fail-fast rejection of the whole proposed transaction.
//! The variants are grouped by the protocol's error taxonomy — shape,
//! authorization, invariant, economic, and temporal — and each one names the
//! check that failed, so audits and tests can pin rejections to a cause even
//! though the ledger boundary only observes accept/reject.

use crate::Vec;

/// Result type alias for Tidepool validations
pub type StakeResult<T> = Result<T, StakeError>;

/// Main error enum for all Tidepool contract errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakeError {
    // ============ Shape Errors ============
    /// Spent or targeted output carries no inline record
    MissingDatum,

    /// Inline record bytes did not decode to the expected record type
    MalformedDatum,

    /// Record could not be encoded to datum bytes
    DatumEncoding,

    /// Hash or key field has the wrong byte length (expected 28)
    InvalidHashLength { field: &'static str, actual: usize },

    /// Token name field has the wrong byte length (expected 32)
    InvalidTokenNameLength { field: &'static str, actual: usize },

    /// Record field violates a creation-shape constraint
    InvalidRecord {
        field: &'static str,
        reason: &'static str,
    },

    // ============ Authorization Errors ============
    /// Required signature is absent from the transaction
    MissingSignature { key: Vec<u8> },

    /// Neither authorizing validator appears among spent-input addresses
    AuthorizingScriptNotSpent,

    /// No input or reference input carries the requested identity token
    /// together with a well-formed record
    CapabilityNotFound,

    /// Script was invoked for the wrong purpose (mint vs. spend)
    WrongScriptPurpose,

    // ============ Invariant Errors ============
    /// Transaction has no consumed inputs
    NoInputs,

    /// The input being validated is missing from the transaction
    OwnInputNotFound,

    /// Spent output does not carry its self-referenced identity token
    IdentityTokenMissing,

    /// Identity token was not burned in a transaction that requires it
    IdentityNotBurned,

    /// No output at the same address still carries the identity token
    ContinuingOutputNotFound,

    /// Redeemer-declared output index is past the end of the outputs
    OutputIndexOutOfRange { index: u64, outputs: usize },

    /// Mint map has no entry for the validating policy
    NoMintForPolicy,

    /// Mint map has the wrong number of entries under the policy
    WrongMintEntryCount { expected: usize, actual: usize },

    /// Expected token name is absent from the mint map
    MintedNameNotFound { token: &'static str },

    /// Token is minted or burned with the wrong quantity
    WrongMintQuantity {
        token: &'static str,
        expected: i64,
        actual: i64,
    },

    /// Burn operation found a non-negative minted quantity
    MustBurn { quantity: i64 },

    /// Output sits at the wrong kind of address or wrong script
    WrongDestination { expected: &'static str },

    /// Continuing record differs from the single permitted mutation
    DatumMismatch,

    /// No output places the reference token at the staking validator
    ReferenceOutputMissing,

    /// More than one output carries the freshly minted reference token
    ReferenceOutputDuplicated,

    // ============ Economic Errors ============
    /// Zero amount where a positive amount is required
    ZeroAmount,

    /// Stake amount below the pool minimum
    BelowMinimumStake { amount: u64, minimum: u64 },

    /// Unstake amount exceeds the pool's recorded total
    ExceedsTotalStaked { amount: u64, total_staked: u64 },

    /// Withdrawal amount exceeds the position's stake
    ExceedsStake { amount: u64, stake: u64 },

    /// Platform fee output is missing or too small
    FeeNotPaid { required: u64 },

    /// Continuing output did not release the required tokens
    TokensNotRemoved { required: u64 },

    /// Continuing output did not receive the required tokens
    TokensNotAdded { required: u64 },

    /// Claim left the treasury's reward balance unchanged or higher
    NoRewardOutflow,

    /// No rewards have accrued since the last claim
    NoRewardsAccrued,

    /// Refunded stake was not returned to the position owner
    RefundNotPaid { required: u64 },

    /// Yield rate outside (0, 10000]
    YieldRateOutOfRange { rate: u64 },

    /// Arithmetic overflow
    Overflow,

    /// Arithmetic underflow
    Underflow,

    // ============ State Errors ============
    /// Operation is blocked while the pool is paused
    PoolPaused,

    /// Operation requires the pool to be paused first
    PoolNotPaused,

    /// Pause flag outside {0, 1}
    InvalidPauseFlag { value: u64 },

    // ============ Temporal Errors ============
    /// Validity interval has no finite lower bound
    NoLowerTimeBound,

    /// Validity interval has no finite upper bound
    NoUpperTimeBound,

    /// Validity interval's upper bound precedes its lower bound
    InvalidValidityRange,

    /// Validity interval wider than the protocol maximum
    ValidityWindowTooWide { window_ms: u64, max_ms: u64 },
}

impl StakeError {
    /// Returns a stable error code for logging and audit trails
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingDatum => "E001_MISSING_DATUM",
            Self::MalformedDatum => "E002_MALFORMED_DATUM",
            Self::DatumEncoding => "E003_DATUM_ENCODING",
            Self::InvalidHashLength { .. } => "E004_HASH_LENGTH",
            Self::InvalidTokenNameLength { .. } => "E005_TOKEN_NAME_LENGTH",
            Self::InvalidRecord { .. } => "E006_INVALID_RECORD",
            Self::MissingSignature { .. } => "E010_MISSING_SIGNATURE",
            Self::AuthorizingScriptNotSpent => "E011_AUTHORIZER_NOT_SPENT",
            Self::CapabilityNotFound => "E012_CAPABILITY_NOT_FOUND",
            Self::WrongScriptPurpose => "E013_WRONG_PURPOSE",
            Self::NoInputs => "E020_NO_INPUTS",
            Self::OwnInputNotFound => "E021_OWN_INPUT_NOT_FOUND",
            Self::IdentityTokenMissing => "E022_IDENTITY_MISSING",
            Self::IdentityNotBurned => "E023_IDENTITY_NOT_BURNED",
            Self::ContinuingOutputNotFound => "E024_NO_CONTINUING_OUTPUT",
            Self::OutputIndexOutOfRange { .. } => "E025_OUTPUT_INDEX",
            Self::NoMintForPolicy => "E026_NO_MINT_FOR_POLICY",
            Self::WrongMintEntryCount { .. } => "E027_MINT_ENTRY_COUNT",
            Self::MintedNameNotFound { .. } => "E028_MINTED_NAME_NOT_FOUND",
            Self::WrongMintQuantity { .. } => "E029_MINT_QUANTITY",
            Self::MustBurn { .. } => "E030_MUST_BURN",
            Self::WrongDestination { .. } => "E031_WRONG_DESTINATION",
            Self::DatumMismatch => "E032_DATUM_MISMATCH",
            Self::ReferenceOutputMissing => "E033_REF_OUTPUT_MISSING",
            Self::ReferenceOutputDuplicated => "E034_REF_OUTPUT_DUPLICATED",
            Self::ZeroAmount => "E040_ZERO_AMOUNT",
            Self::BelowMinimumStake { .. } => "E041_BELOW_MINIMUM",
            Self::ExceedsTotalStaked { .. } => "E042_EXCEEDS_TOTAL_STAKED",
            Self::ExceedsStake { .. } => "E043_EXCEEDS_STAKE",
            Self::FeeNotPaid { .. } => "E044_FEE_NOT_PAID",
            Self::TokensNotRemoved { .. } => "E045_TOKENS_NOT_REMOVED",
            Self::TokensNotAdded { .. } => "E046_TOKENS_NOT_ADDED",
            Self::NoRewardOutflow => "E047_NO_REWARD_OUTFLOW",
            Self::NoRewardsAccrued => "E048_NO_REWARDS_ACCRUED",
            Self::RefundNotPaid { .. } => "E049_REFUND_NOT_PAID",
            Self::YieldRateOutOfRange { .. } => "E050_YIELD_RATE",
            Self::Overflow => "E051_OVERFLOW",
            Self::Underflow => "E052_UNDERFLOW",
            Self::PoolPaused => "E060_POOL_PAUSED",
            Self::PoolNotPaused => "E061_POOL_NOT_PAUSED",
            Self::InvalidPauseFlag { .. } => "E062_PAUSE_FLAG",
            Self::NoLowerTimeBound => "E070_NO_LOWER_BOUND",
            Self::NoUpperTimeBound => "E071_NO_UPPER_BOUND",
            Self::InvalidValidityRange => "E072_INVALID_RANGE",
            Self::ValidityWindowTooWide { .. } => "E073_WINDOW_TOO_WIDE",
        }
    }
}
