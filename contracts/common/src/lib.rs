//! Tidepool Common Library
//!
//! Shared foundation for all Tidepool staking contracts.
//!
//! ## UTXO model
//!
//! Every contract in this workspace is a pure validator over a single
//! proposed transaction: it either accepts or rejects the whole transaction,
//! with no partial application and no retry. Persistent state is a record
//! (datum) attached to an unspent output, and a record is trusted only when
//! the output carrying it also carries the identity token whose minting
//! policy guarantees scarcity. The ledger's one-consumer-per-UTxO rule is
//! the only concurrency primitive the contracts rely on.
//!
//! ## What lives here
//!
//! - `tx` — the transaction view the ledger runtime hands to a script
//! - `types` — the three persistent records and their shape checks
//! - `capability` — token-possession authentication (`Capability<T>`)
//! - `token_ops` — one-shot and labelled token-name derivation, mint checks
//! - `math` — checked arithmetic, fee and yield accrual formulas
//! - `datum` — CBOR codec for inline records
//! - `events` — typed events returned by accepted transitions
//! - `errors` — the protocol error taxonomy
//!
//! This crate is `no_std` compatible when built without the default `std`
//! feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export alloc types for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
pub use std::{collections::BTreeMap, vec::Vec};

pub mod capability;
pub mod constants;
pub mod datum;
pub mod errors;
pub mod events;
pub mod math;
pub mod token_ops;
pub mod tx;
pub mod types;

// Re-exports for convenience
pub use capability::*;
pub use constants::*;
pub use datum::*;
pub use errors::*;
pub use events::*;
pub use math::*;
pub use token_ops::*;
pub use tx::*;
pub use types::*;
