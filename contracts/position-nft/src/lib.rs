//! Position Identity Policy
//!
//! Mints the paired identity tokens of a staking position: a *reference*
//! token that carries the position record at the staking validator, and a
//! *user* token held in the staker's wallet as the bare ownership claim.
//! Names are the label prefixes plus a caller-chosen position id; pair
//! uniqueness is enforced per mint, and collision avoidance for ids is the
//! caller's concern (ids are conventionally derived from a first-spent
//! input, which cannot be replayed).
//!
//! ## Authorization
//!
//! Every operation resolves the governing pool record by searching spent
//! inputs, then reference inputs, for the pool identity token — supporting
//! both "the pool is being transitioned" and "the pool is merely consulted"
//! call sites. The operation is authorized only when the pool's own
//! validator or its declared staking validator appears among the spent
//! inputs: without that gate anyone could mint or burn positions at will.
//! Both hashes are learned at runtime — the pool validator's from the
//! address of the UTxO holding the pool token, the staking validator's from
//! the pool record.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tidepool_common::{
    capability::{resolve, Capability},
    errors::{StakeError, StakeResult},
    events::ProtocolEvent,
    token_ops::{expect_minted, reference_token_name, user_token_name},
    tx::{PolicyId, ScriptContext, TokenName, Transaction},
    types::{PoolDatum, UserPositionDatum},
};

// ============ Redeemer ============

/// Operations of the position identity policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PositionRedeemer {
    /// Mint a fresh reference/user pair for a new position
    Mint {
        position_id: TokenName,
        /// Pool identity token, used to find the pool record at runtime
        pool_nft_policy: PolicyId,
        pool_nft_name: TokenName,
    },
    /// Burn a position's reference/user pair
    Burn {
        position_id: TokenName,
        pool_nft_policy: PolicyId,
        pool_nft_name: TokenName,
    },
    /// Replace a position in one step: burn the old user token, mint a
    /// fresh pair (partial-withdrawal replacement; the old reference token
    /// is routed to the burn address by the staking validator)
    Remint {
        old_position_id: TokenName,
        new_position_id: TokenName,
        pool_nft_policy: PolicyId,
        pool_nft_name: TokenName,
    },
}

// ============ Validation ============

/// Main validation entry point
pub fn validate(ctx: &ScriptContext, redeemer: &PositionRedeemer) -> StakeResult<ProtocolEvent> {
    let policy_id = ctx.minting_policy()?;
    let tx = &ctx.tx;

    match redeemer {
        PositionRedeemer::Mint { position_id, pool_nft_policy, pool_nft_name } => {
            let pool = authorized_pool(tx, pool_nft_policy, pool_nft_name)?;

            let ref_name = reference_token_name(position_id);
            let user_name = user_token_name(position_id);

            // Exactly the pair, one unit each
            let minted = tx.mint.under_policy(policy_id)?;
            if minted.len() != 2 {
                return Err(StakeError::WrongMintEntryCount { expected: 2, actual: minted.len() });
            }
            expect_minted(minted, &ref_name, 1, "reference")?;
            expect_minted(minted, &user_name, 1, "user")?;

            // The reference token lands at the staking validator with a
            // well-formed position record
            checked_reference_output(tx, policy_id, &ref_name, &pool.record.staking_validator_hash)?;

            Ok(ProtocolEvent::PositionMinted { position_id: position_id.clone() })
        }

        PositionRedeemer::Burn { position_id, pool_nft_policy, pool_nft_name } => {
            authorized_pool(tx, pool_nft_policy, pool_nft_name)?;

            let ref_name = reference_token_name(position_id);
            let user_name = user_token_name(position_id);

            // Exactly the pair, both burned
            let minted = tx.mint.under_policy(policy_id)?;
            if minted.len() != 2 {
                return Err(StakeError::WrongMintEntryCount { expected: 2, actual: minted.len() });
            }
            expect_minted(minted, &ref_name, -1, "reference")?;
            expect_minted(minted, &user_name, -1, "user")?;

            Ok(ProtocolEvent::PositionBurned { position_id: position_id.clone() })
        }

        PositionRedeemer::Remint {
            old_position_id,
            new_position_id,
            pool_nft_policy,
            pool_nft_name,
        } => {
            let pool = authorized_pool(tx, pool_nft_policy, pool_nft_name)?;

            let old_user_name = user_token_name(old_position_id);
            let new_ref_name = reference_token_name(new_position_id);
            let new_user_name = user_token_name(new_position_id);

            // Exactly three quantity entries: old user out, new pair in
            let minted = tx.mint.under_policy(policy_id)?;
            if minted.len() != 3 {
                return Err(StakeError::WrongMintEntryCount { expected: 3, actual: minted.len() });
            }
            expect_minted(minted, &old_user_name, -1, "old user")?;
            expect_minted(minted, &new_ref_name, 1, "reference")?;
            expect_minted(minted, &new_user_name, 1, "user")?;

            // The new reference token is placed like a fresh mint
            checked_reference_output(tx, policy_id, &new_ref_name, &pool.record.staking_validator_hash)?;

            Ok(ProtocolEvent::PositionReminted {
                old_position_id: old_position_id.clone(),
                new_position_id: new_position_id.clone(),
            })
        }
    }
}

/// Resolve the governing pool record and check the authorization gate: the
/// pool's own validator or its staking validator must be spent in this
/// transaction.
fn authorized_pool(
    tx: &Transaction,
    pool_nft_policy: &[u8],
    pool_nft_name: &[u8],
) -> StakeResult<Capability<PoolDatum>> {
    let pool = resolve::<PoolDatum>(tx, pool_nft_policy, pool_nft_name)?;
    // The pool validator's hash is wherever the pool token lives
    let pool_validator = pool.script_hash()?;
    if tx.spends_script(pool_validator) || tx.spends_script(&pool.record.staking_validator_hash) {
        Ok(pool)
    } else {
        Err(StakeError::AuthorizingScriptNotSpent)
    }
}

/// Exactly one output carries exactly one unit of the reference token; it
/// must sit at the staking validator and hold a well-formed position record.
fn checked_reference_output(
    tx: &Transaction,
    policy_id: &[u8],
    ref_name: &[u8],
    staking_validator_hash: &[u8],
) -> StakeResult<()> {
    let mut found = 0usize;
    for output in &tx.outputs {
        if !output.value.holds_exactly(policy_id, ref_name, 1) {
            continue;
        }
        if output.address.script_hash() != Some(staking_validator_hash) {
            return Err(StakeError::WrongDestination { expected: "staking validator address" });
        }
        let record: UserPositionDatum = output.inline_record()?;
        record.verify()?;
        found += 1;
    }
    match found {
        0 => Err(StakeError::ReferenceOutputMissing),
        1 => Ok(()),
        _ => Err(StakeError::ReferenceOutputDuplicated),
    }
}

// ============ Tests ============
