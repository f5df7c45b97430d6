//! Ledger Boundary Types
//!
//! The transaction view a script evaluates over: consumed inputs, reference
//! inputs (consulted, not consumed), proposed outputs, the mint map, signer
//! key hashes, and the validity interval. The ledger runtime is assumed
//! correct; everything here is plain data plus lookups over it.

use crate::constants::time::MAX_VALIDITY_WINDOW_MS;
use crate::datum;
use crate::errors::{StakeError, StakeResult};
use crate::{BTreeMap, Vec};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 28-byte minting policy hash
pub type PolicyId = Vec<u8>;
/// Token name: a 32-byte one-shot digest, or a 4-byte label plus identifier
pub type TokenName = Vec<u8>;
/// 28-byte payment key hash
pub type KeyHash = Vec<u8>;
/// 28-byte validator script hash
pub type ScriptHash = Vec<u8>;
/// 32-byte transaction identifier
pub type TxId = [u8; 32];

// ============ Addresses ============

/// Payment credential of an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Controlled by a signing key
    Key(KeyHash),
    /// Controlled by a validator script
    Script(ScriptHash),
}

/// Ledger address (payment part only; staking parts play no role here)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub payment: Credential,
}

impl Address {
    /// Address controlled by a signing key
    pub fn key(hash: &[u8]) -> Self {
        Self { payment: Credential::Key(hash.to_vec()) }
    }

    /// Address controlled by a validator script
    pub fn script(hash: &[u8]) -> Self {
        Self { payment: Credential::Script(hash.to_vec()) }
    }

    /// Key hash if this is a key address
    pub fn key_hash(&self) -> Option<&[u8]> {
        match &self.payment {
            Credential::Key(hash) => Some(hash),
            Credential::Script(_) => None,
        }
    }

    /// Script hash if this is a script address
    pub fn script_hash(&self) -> Option<&[u8]> {
        match &self.payment {
            Credential::Key(_) => None,
            Credential::Script(hash) => Some(hash),
        }
    }
}

// ============ Values ============

/// Multi-asset value map: policy -> token name -> quantity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value(pub BTreeMap<PolicyId, BTreeMap<TokenName, u64>>);

impl Value {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add an asset quantity
    pub fn with_asset(mut self, policy: &[u8], name: &[u8], quantity: u64) -> Self {
        self.0
            .entry(policy.to_vec())
            .or_default()
            .insert(name.to_vec(), quantity);
        self
    }

    /// Quantity of an asset, zero when absent
    pub fn quantity_of(&self, policy: &[u8], name: &[u8]) -> u64 {
        self.0
            .get(policy)
            .and_then(|tokens| tokens.get(name))
            .copied()
            .unwrap_or(0)
    }

    /// True when the value holds at least one unit of the asset
    pub fn holds(&self, policy: &[u8], name: &[u8]) -> bool {
        self.quantity_of(policy, name) >= 1
    }

    /// True when the value holds exactly `quantity` units of the asset
    pub fn holds_exactly(&self, policy: &[u8], name: &[u8], quantity: u64) -> bool {
        self.quantity_of(policy, name) == quantity
    }
}

/// Mint map: policy -> token name -> signed quantity (negative = burn)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintValue(pub BTreeMap<PolicyId, BTreeMap<TokenName, i64>>);

impl MintValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a mint or burn entry
    pub fn with_entry(mut self, policy: &[u8], name: &[u8], quantity: i64) -> Self {
        self.0
            .entry(policy.to_vec())
            .or_default()
            .insert(name.to_vec(), quantity);
        self
    }

    /// All entries under one policy
    pub fn under_policy(&self, policy: &[u8]) -> StakeResult<&BTreeMap<TokenName, i64>> {
        self.0.get(policy).ok_or(StakeError::NoMintForPolicy)
    }

    /// Signed quantity for an asset, zero when absent
    pub fn quantity_of(&self, policy: &[u8], name: &[u8]) -> i64 {
        self.0
            .get(policy)
            .and_then(|tokens| tokens.get(name))
            .copied()
            .unwrap_or(0)
    }
}

// ============ Outputs and Inputs ============

/// Record attachment discriminant on an output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputDatum {
    #[default]
    None,
    Inline(Vec<u8>),
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub address: Address,
    pub value: Value,
    pub datum: OutputDatum,
}

impl TxOut {
    pub fn new(address: Address, value: Value) -> Self {
        Self { address, value, datum: OutputDatum::None }
    }

    /// Builder: attach an inline record
    pub fn with_record<T: Serialize>(mut self, record: &T) -> StakeResult<Self> {
        self.datum = OutputDatum::Inline(datum::encode(record)?);
        Ok(self)
    }

    /// Decode this output's inline record
    pub fn inline_record<T: DeserializeOwned>(&self) -> StakeResult<T> {
        match &self.datum {
            OutputDatum::Inline(bytes) => datum::decode(bytes),
            OutputDatum::None => Err(StakeError::MissingDatum),
        }
    }
}

/// Reference to an output of a prior transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRef {
    pub tx_id: TxId,
    pub index: u64,
}

impl OutputRef {
    pub fn new(tx_id: TxId, index: u64) -> Self {
        Self { tx_id, index }
    }
}

/// A consumed or referenced input: out-ref plus the resolved output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub out_ref: OutputRef,
    pub resolved: TxOut,
}

// ============ Validity Interval ============

/// Transaction validity interval in POSIX milliseconds; `None` = unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityRange {
    pub lower_ms: Option<u64>,
    pub upper_ms: Option<u64>,
}

impl ValidityRange {
    pub fn between(lower_ms: u64, upper_ms: u64) -> Self {
        Self { lower_ms: Some(lower_ms), upper_ms: Some(upper_ms) }
    }

    /// "Now" for reward accrual: the interval's upper bound.
    ///
    /// Both bounds must be finite and the window at most ten minutes wide.
    /// The upper bound is the latest instant the transaction can be valid,
    /// which is the most conservative choice for the paying side.
    pub fn current_time(&self) -> StakeResult<u64> {
        let lower = self.lower_ms.ok_or(StakeError::NoLowerTimeBound)?;
        let upper = self.upper_ms.ok_or(StakeError::NoUpperTimeBound)?;
        let window = upper.checked_sub(lower).ok_or(StakeError::InvalidValidityRange)?;
        if window > MAX_VALIDITY_WINDOW_MS {
            return Err(StakeError::ValidityWindowTooWide {
                window_ms: window,
                max_ms: MAX_VALIDITY_WINDOW_MS,
            });
        }
        Ok(upper)
    }
}

// ============ Transaction ============

/// The transaction object a script validates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub reference_inputs: Vec<TxInput>,
    pub outputs: Vec<TxOut>,
    pub mint: MintValue,
    pub signatories: Vec<KeyHash>,
    pub validity_range: ValidityRange,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the key hash is among the transaction's signers
    pub fn signed_by(&self, key: &[u8]) -> bool {
        self.signatories.iter().any(|s| s.as_slice() == key)
    }

    /// Require a signature, naming the missing key on failure
    pub fn require_signature(&self, key: &[u8]) -> StakeResult<()> {
        if self.signed_by(key) {
            Ok(())
        } else {
            Err(StakeError::MissingSignature { key: key.to_vec() })
        }
    }

    /// The first consumed input (one-shot name derivation source)
    pub fn first_input(&self) -> StakeResult<&TxInput> {
        self.inputs.first().ok_or(StakeError::NoInputs)
    }

    /// Resolve the output being spent by a given out-ref
    pub fn find_input(&self, out_ref: &OutputRef) -> StakeResult<&TxOut> {
        self.inputs
            .iter()
            .find(|i| &i.out_ref == out_ref)
            .map(|i| &i.resolved)
            .ok_or(StakeError::OwnInputNotFound)
    }

    /// True when some consumed input sits at the given script address.
    ///
    /// This is the cross-validator authorization primitive: "action X is
    /// legitimate iff script S is also being spent in this transaction".
    pub fn spends_script(&self, script_hash: &[u8]) -> bool {
        self.inputs
            .iter()
            .any(|i| i.resolved.address.script_hash() == Some(script_hash))
    }

    /// Require a co-spent authorizing script
    pub fn require_cospend(&self, script_hash: &[u8]) -> StakeResult<()> {
        if self.spends_script(script_hash) {
            Ok(())
        } else {
            Err(StakeError::AuthorizingScriptNotSpent)
        }
    }

    /// Output at a redeemer-declared index
    pub fn output_at(&self, index: u64) -> StakeResult<&TxOut> {
        self.outputs
            .get(index as usize)
            .ok_or(StakeError::OutputIndexOutOfRange { index, outputs: self.outputs.len() })
    }

    /// Output at the same address still carrying the identity token.
    ///
    /// Matches both policy and name so a look-alike token under another
    /// policy cannot stand in for the identity.
    pub fn find_continuing_output(
        &self,
        address: &Address,
        policy: &[u8],
        name: &[u8],
    ) -> StakeResult<&TxOut> {
        self.outputs
            .iter()
            .find(|o| &o.address == address && o.value.holds(policy, name))
            .ok_or(StakeError::ContinuingOutputNotFound)
    }

    /// True when some output pays at least `amount` of the asset to the key
    pub fn pays_to_key(&self, key: &[u8], policy: &[u8], name: &[u8], amount: u64) -> bool {
        self.outputs.iter().any(|o| {
            o.address.key_hash() == Some(key) && o.value.quantity_of(policy, name) >= amount
        })
    }

    /// True when some output at the given script address carries the token
    pub fn pays_token_to_script(&self, script_hash: &[u8], policy: &[u8], name: &[u8]) -> bool {
        self.outputs.iter().any(|o| {
            o.address.script_hash() == Some(script_hash) && o.value.holds(policy, name)
        })
    }
}

// ============ Script Context ============

/// Why the script is being run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptPurpose {
    /// Validating mints/burns under a policy
    Minting { policy_id: PolicyId },
    /// Validating the spend of an output locked by the script
    Spending { out_ref: OutputRef },
}

/// Everything a script sees: the transaction and its own purpose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptContext {
    pub tx: Transaction,
    pub purpose: ScriptPurpose,
}

impl ScriptContext {
    pub fn minting(tx: Transaction, policy_id: &[u8]) -> Self {
        Self { tx, purpose: ScriptPurpose::Minting { policy_id: policy_id.to_vec() } }
    }

    pub fn spending(tx: Transaction, out_ref: OutputRef) -> Self {
        Self { tx, purpose: ScriptPurpose::Spending { out_ref } }
    }

    /// The policy id under validation, for minting scripts
    pub fn minting_policy(&self) -> StakeResult<&[u8]> {
        match &self.purpose {
            ScriptPurpose::Minting { policy_id } => Ok(policy_id),
            ScriptPurpose::Spending { .. } => Err(StakeError::WrongScriptPurpose),
        }
    }

    /// The output being spent, for spending scripts
    pub fn spent_output(&self) -> StakeResult<&TxOut> {
        match &self.purpose {
            ScriptPurpose::Spending { out_ref } => self.tx.find_input(out_ref),
            ScriptPurpose::Minting { .. } => Err(StakeError::WrongScriptPurpose),
        }
    }
}
