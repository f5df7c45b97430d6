//! Capability Resolution
//!
//! Token possession is the protocol's sole authentication mechanism. A
//! record attached to an output is trusted only when the same output carries
//! the identity token minted for it, so a `Capability<T>` can only be
//! constructed by locating such an output among the transaction's inputs —
//! never from a bare record, and never by address.

use crate::errors::{StakeError, StakeResult};
use crate::tx::{Address, Transaction, TxInput};
use crate::types::{PlatformAuthorityDatum, PoolDatum};
use serde::de::DeserializeOwned;

/// A record type that can authenticate itself against the identity token it
/// travels with.
pub trait CapabilityRecord: DeserializeOwned {
    fn verify_against(&self, policy: &[u8], name: &[u8]) -> StakeResult<()>;
}

impl CapabilityRecord for PlatformAuthorityDatum {
    fn verify_against(&self, policy: &[u8], name: &[u8]) -> StakeResult<()> {
        self.verify(policy, name)
    }
}

impl CapabilityRecord for PoolDatum {
    fn verify_against(&self, policy: &[u8], name: &[u8]) -> StakeResult<()> {
        self.verify_identity(policy, name)
    }
}

/// Where the capability's output was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The output is being consumed in this transaction
    SpentInput,
    /// The output is consulted read-only
    ReferenceInput,
}

/// A record proven authentic by co-location with its identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability<T> {
    pub record: T,
    /// Address of the output that held token and record — for a pool
    /// capability this is the pool validator's own address, which is how
    /// peers learn it without compiling it in.
    pub address: Address,
    pub provenance: Provenance,
}

impl<T> Capability<T> {
    /// Script hash of the holding output's address.
    pub fn script_hash(&self) -> StakeResult<&[u8]> {
        self.address
            .script_hash()
            .ok_or(StakeError::WrongDestination { expected: "script address" })
    }
}

fn locate<'a>(inputs: &'a [TxInput], policy: &[u8], name: &[u8]) -> Option<&'a TxInput> {
    inputs.iter().find(|i| i.resolved.value.holds(policy, name))
}

fn build<T: CapabilityRecord>(
    input: &TxInput,
    policy: &[u8],
    name: &[u8],
    provenance: Provenance,
) -> StakeResult<Capability<T>> {
    let record: T = input.resolved.inline_record()?;
    record.verify_against(policy, name)?;
    Ok(Capability { record, address: input.resolved.address.clone(), provenance })
}

/// Resolve a capability by token search: spent inputs first (the holder is
/// being transitioned in this transaction), then reference inputs (the
/// holder is merely consulted).
pub fn resolve<T: CapabilityRecord>(
    tx: &Transaction,
    policy: &[u8],
    name: &[u8],
) -> StakeResult<Capability<T>> {
    if let Some(input) = locate(&tx.inputs, policy, name) {
        return build(input, policy, name, Provenance::SpentInput);
    }
    if let Some(input) = locate(&tx.reference_inputs, policy, name) {
        return build(input, policy, name, Provenance::ReferenceInput);
    }
    Err(StakeError::CapabilityNotFound)
}

/// Resolve from reference inputs only. Authority proofs are presented this
/// way: the authority UTxO is read, never consumed.
pub fn resolve_reference<T: CapabilityRecord>(
    tx: &Transaction,
    policy: &[u8],
    name: &[u8],
) -> StakeResult<Capability<T>> {
    match locate(&tx.reference_inputs, policy, name) {
        Some(input) => build(input, policy, name, Provenance::ReferenceInput),
        None => Err(StakeError::CapabilityNotFound),
    }
}
