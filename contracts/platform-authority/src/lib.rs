//! Platform Authority Policy
//!
//! One-shot minting policy for the platform authority token. The token's
//! output carries the [`PlatformAuthorityDatum`] that answers the root
//! question of the whole protocol: which key may create pools, and which
//! key administers the platform.
//!
//! ## One-shot minting
//!
//! The token name is the SHA-256 digest of the first consumed input's
//! transaction id. Consuming that input is the proof of uniqueness: the
//! ledger guarantees it can never be consumed again, so no second
//! transaction can ever mint a token of the same name under this policy.
//!
//! ## Operations
//!
//! - **Mint**: exactly one unit of the derived name, placed in the
//!   redeemer-designated output together with a self-referential authority
//!   record.
//! - **Burn**: every quantity under the policy negative; nothing else
//!   checked. Burning is the platform migration path.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tidepool_common::{
    errors::{StakeError, StakeResult},
    events::ProtocolEvent,
    token_ops::{expect_all_burns, expect_sole_mint, one_shot_token_name},
    tx::ScriptContext,
    types::PlatformAuthorityDatum,
};

// ============ Redeemer ============

/// Operations of the platform authority policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum AuthorityRedeemer {
    /// Mint the authority token (once, at deployment)
    Mint {
        /// Index of the output that receives token and record
        output_index: u64,
    },
    /// Burn the authority token (platform migration/shutdown)
    Burn,
}

// ============ Validation ============

/// Main validation entry point
pub fn validate(ctx: &ScriptContext, redeemer: &AuthorityRedeemer) -> StakeResult<ProtocolEvent> {
    let policy_id = ctx.minting_policy()?;
    let tx = &ctx.tx;

    match redeemer {
        AuthorityRedeemer::Mint { output_index } => {
            // 1. Derive the one-shot name from the first consumed input
            let name = one_shot_token_name(tx)?;

            // 2. Exactly one unit of exactly that name under this policy
            let minted = tx.mint.under_policy(policy_id)?;
            expect_sole_mint(minted, &name)?;

            // 3. The designated output must hold exactly one unit
            let target = tx.output_at(*output_index)?;
            if !target.value.holds_exactly(policy_id, &name, 1) {
                return Err(StakeError::IdentityTokenMissing);
            }

            // 4. ... and a self-referential, well-shaped authority record
            let record: PlatformAuthorityDatum = target.inline_record()?;
            record.verify(policy_id, &name)?;

            Ok(ProtocolEvent::AuthorityMinted { name })
        }

        AuthorityRedeemer::Burn => {
            // Burning is unrestricted once initiated: every quantity under
            // this policy must be negative, nothing else is checked.
            let minted = tx.mint.under_policy(policy_id)?;
            expect_all_burns(minted)?;

            Ok(ProtocolEvent::AuthorityBurned)
        }
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_common::tx::{
        Address, MintValue, OutputRef, Transaction, TxInput, TxOut, Value,
    };

    const SEED_TX: [u8; 32] = [42u8; 32];

    fn derived_name() -> Vec<u8> {
        let mut tx = Transaction::new();
        tx.inputs.push(seed_input());
        one_shot_token_name(&tx).unwrap()
    }

    fn seed_input() -> TxInput {
        TxInput {
            out_ref: OutputRef::new(SEED_TX, 0),
            resolved: TxOut::new(Address::key(&[1u8; 28]), Value::new()),
        }
    }

    fn authority_record(policy: &[u8], name: &[u8]) -> PlatformAuthorityDatum {
        PlatformAuthorityDatum {
            pool_creator: vec![10u8; 28],
            platform_admin: vec![11u8; 28],
            authority_policy: policy.to_vec(),
            authority_name: name.to_vec(),
        }
    }

    fn mint_context(policy: [u8; 28]) -> ScriptContext {
        let name = derived_name();
        let record = authority_record(&policy, &name);

        let mut tx = Transaction::new();
        tx.inputs.push(seed_input());
        tx.mint = MintValue::new().with_entry(&policy, &name, 1);
        tx.outputs.push(
            TxOut::new(
                Address::key(&[1u8; 28]),
                Value::new().with_asset(&policy, &name, 1),
            )
            .with_record(&record)
            .unwrap(),
        );
        ScriptContext::minting(tx, &policy)
    }

    #[test]
    fn mint_succeeds_with_well_formed_output() {
        let ctx = mint_context([5u8; 28]);
        let event = validate(&ctx, &AuthorityRedeemer::Mint { output_index: 0 }).unwrap();
        assert_eq!(event, ProtocolEvent::AuthorityMinted { name: derived_name() });
    }

    #[test]
    fn mint_rejects_wrong_token_name() {
        let policy = [5u8; 28];
        let mut ctx = mint_context(policy);
        ctx.tx.mint = MintValue::new().with_entry(&policy, &[0u8; 32], 1);
        assert!(matches!(
            validate(&ctx, &AuthorityRedeemer::Mint { output_index: 0 }),
            Err(StakeError::MintedNameNotFound { .. })
        ));
    }

    #[test]
    fn mint_rejects_quantity_above_one() {
        let policy = [5u8; 28];
        let mut ctx = mint_context(policy);
        ctx.tx.mint = MintValue::new().with_entry(&policy, &derived_name(), 2);
        assert!(matches!(
            validate(&ctx, &AuthorityRedeemer::Mint { output_index: 0 }),
            Err(StakeError::WrongMintQuantity { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn mint_rejects_extra_minted_assets() {
        let policy = [5u8; 28];
        let mut ctx = mint_context(policy);
        ctx.tx.mint = MintValue::new()
            .with_entry(&policy, &derived_name(), 1)
            .with_entry(&policy, b"stowaway", 1);
        assert!(matches!(
            validate(&ctx, &AuthorityRedeemer::Mint { output_index: 0 }),
            Err(StakeError::WrongMintEntryCount { .. })
        ));
    }

    #[test]
    fn mint_rejects_out_of_range_output_index() {
        let ctx = mint_context([5u8; 28]);
        assert!(matches!(
            validate(&ctx, &AuthorityRedeemer::Mint { output_index: 9 }),
            Err(StakeError::OutputIndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn mint_rejects_output_without_the_token() {
        let mut ctx = mint_context([5u8; 28]);
        ctx.tx.outputs[0].value = Value::new();
        assert_eq!(
            validate(&ctx, &AuthorityRedeemer::Mint { output_index: 0 }),
            Err(StakeError::IdentityTokenMissing)
        );
    }

    #[test]
    fn mint_rejects_missing_record() {
        let policy = [5u8; 28];
        let mut ctx = mint_context(policy);
        ctx.tx.outputs[0].datum = tidepool_common::tx::OutputDatum::None;
        assert_eq!(
            validate(&ctx, &AuthorityRedeemer::Mint { output_index: 0 }),
            Err(StakeError::MissingDatum)
        );
    }

    #[test]
    fn mint_rejects_self_reference_mismatch() {
        let policy = [5u8; 28];
        let mut ctx = mint_context(policy);
        let mut record = authority_record(&policy, &derived_name());
        record.authority_name = vec![0u8; 32];
        ctx.tx.outputs[0] = ctx.tx.outputs[0].clone().with_record(&record).unwrap();
        assert!(matches!(
            validate(&ctx, &AuthorityRedeemer::Mint { output_index: 0 }),
            Err(StakeError::InvalidRecord { field: "authority_name", .. })
        ));
    }

    #[test]
    fn mint_rejects_short_creator_key() {
        let policy = [5u8; 28];
        let mut ctx = mint_context(policy);
        let mut record = authority_record(&policy, &derived_name());
        record.pool_creator = vec![10u8; 27];
        ctx.tx.outputs[0] = ctx.tx.outputs[0].clone().with_record(&record).unwrap();
        assert_eq!(
            validate(&ctx, &AuthorityRedeemer::Mint { output_index: 0 }),
            Err(StakeError::InvalidHashLength { field: "pool_creator", actual: 27 })
        );
    }

    #[test]
    fn burn_accepts_all_negative_quantities() {
        let policy = [5u8; 28];
        let mut tx = Transaction::new();
        tx.inputs.push(seed_input());
        tx.mint = MintValue::new().with_entry(&policy, &derived_name(), -1);
        let ctx = ScriptContext::minting(tx, &policy);
        assert_eq!(
            validate(&ctx, &AuthorityRedeemer::Burn),
            Ok(ProtocolEvent::AuthorityBurned)
        );
    }

    #[test]
    fn burn_rejects_any_positive_quantity() {
        let policy = [5u8; 28];
        let mut tx = Transaction::new();
        tx.inputs.push(seed_input());
        tx.mint = MintValue::new()
            .with_entry(&policy, &derived_name(), -1)
            .with_entry(&policy, b"sneaky", 1);
        let ctx = ScriptContext::minting(tx, &policy);
        assert_eq!(
            validate(&ctx, &AuthorityRedeemer::Burn),
            Err(StakeError::MustBurn { quantity: 1 })
        );
    }
}
