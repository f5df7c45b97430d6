//! Pool Identity Policy
//!
//! Mints the identity token that makes a pool configuration record
//! trustworthy. Only outputs carrying a token of this policy are accepted
//! by the pool validator, so this policy is where pool creation is gated.
//!
//! ## Authorization
//!
//! The redeemer names the platform authority token; the policy resolves the
//! authority's record among the transaction's *reference inputs* by token
//! presence — never by address — re-checks its self-reference, and requires
//! the designated pool-creator key's signature. That signature is the sole
//! authorization gate for pool creation; there is no fallback path.
//!
//! ## No baked-in peers
//!
//! The pool validator's hash arrives in the redeemer and the rest of the
//! pool's wiring (staking validator, position policy, fee recipient, burn
//! address) arrives in the proposed record. The policy checks their shape
//! and placement; it compiles in nothing.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tidepool_common::{
    capability::resolve_reference,
    constants::shape,
    errors::{StakeError, StakeResult},
    events::ProtocolEvent,
    token_ops::{expect_all_burns, expect_sole_mint, one_shot_token_name},
    tx::{PolicyId, ScriptContext, ScriptHash, TokenName},
    types::{PlatformAuthorityDatum, PoolDatum},
};

// ============ Redeemer ============

/// Operations of the pool identity policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolNftRedeemer {
    /// Mint a new pool identity token
    Mint {
        /// Index of the output that receives token and record
        output_index: u64,
        /// Declared hash of the pool validator the output must sit at
        pool_validator_hash: ScriptHash,
        /// Platform authority token to resolve among reference inputs
        authority_policy: PolicyId,
        authority_name: TokenName,
    },
    /// Burn a pool identity token (pool closure; safety is enforced by the
    /// pool validator, not here)
    Burn,
}

// ============ Validation ============

/// Main validation entry point
pub fn validate(ctx: &ScriptContext, redeemer: &PoolNftRedeemer) -> StakeResult<ProtocolEvent> {
    let policy_id = ctx.minting_policy()?;
    let tx = &ctx.tx;

    match redeemer {
        PoolNftRedeemer::Mint {
            output_index,
            pool_validator_hash,
            authority_policy,
            authority_name,
        } => {
            // 1. Redeemer-supplied identifiers must have ledger shape
            if pool_validator_hash.len() != shape::HASH_LEN {
                return Err(StakeError::InvalidHashLength {
                    field: "pool_validator_hash",
                    actual: pool_validator_hash.len(),
                });
            }
            if authority_policy.len() != shape::HASH_LEN {
                return Err(StakeError::InvalidHashLength {
                    field: "authority_policy",
                    actual: authority_policy.len(),
                });
            }
            if authority_name.len() != shape::ONE_SHOT_NAME_LEN {
                return Err(StakeError::InvalidTokenNameLength {
                    field: "authority_name",
                    actual: authority_name.len(),
                });
            }

            // 2. Resolve the platform authority among reference inputs by
            //    token presence; its record re-verifies itself against the
            //    token it travels with
            let authority =
                resolve_reference::<PlatformAuthorityDatum>(tx, authority_policy, authority_name)?;

            // 3. The designated pool-creator key must sign — the sole gate
            tx.require_signature(&authority.record.pool_creator)?;

            // 4. One-shot name from the first consumed input; exactly one
            //    unit of exactly that name under this policy
            let name = one_shot_token_name(tx)?;
            let minted = tx.mint.under_policy(policy_id)?;
            expect_sole_mint(minted, &name)?;

            // 5. The designated output must sit at the declared validator
            let target = tx.output_at(*output_index)?;
            if target.address.script_hash() != Some(pool_validator_hash.as_slice()) {
                return Err(StakeError::WrongDestination { expected: "pool validator address" });
            }

            // 6. ... hold exactly one unit of the new token
            if !target.value.holds_exactly(policy_id, &name, 1) {
                return Err(StakeError::IdentityTokenMissing);
            }

            // 7. ... and carry a pool record that self-references the token
            //    and passes every creation-shape check
            let pool: PoolDatum = target.inline_record()?;
            pool.verify_creation(policy_id, &name)?;

            Ok(ProtocolEvent::PoolCreated {
                pool_nft_name: name,
                owner: pool.owner.clone(),
                yield_rate_bps: pool.yield_rate_bps,
                min_stake: pool.min_stake,
            })
        }

        PoolNftRedeemer::Burn => {
            let minted = tx.mint.under_policy(policy_id)?;
            expect_all_burns(minted)?;

            Ok(ProtocolEvent::PoolIdentityBurned)
        }
    }
}

// ============ Tests ============
