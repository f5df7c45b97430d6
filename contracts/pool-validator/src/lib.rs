//! Pool State Machine
//!
//! One shared spending validator governs every pool's configuration and
//! treasury UTxO. A pool's identity is its identity token, re-verified on
//! every entry: a record without the token is a forgery and never reaches
//! the transition logic.
//!
//! ## Transitions
//!
//! - **Stake** — grow `total_staked`, platform fee on the amount
//! - **Unstake** — shrink `total_staked`, stake tokens actually leave
//! - **Claim** — reward tokens leave the treasury, record frozen
//! - **UpdatePool** — owner changes the yield rate
//! - **ClosePool** — owner destroys a paused pool, identity burned
//! - **FundTreasury** — owner adds reward tokens, fee like Stake
//! - **WithdrawTreasury** — owner removes reward tokens, no fee
//! - **PausePool** — owner flips the pause flag
//!
//! ## Cross-validator authorization
//!
//! Unstake and Claim release pool funds, yet check no user signature. The
//! pool trusts exactly one thing: that the staking validator — whose hash it
//! reads from its own record, never from a compiled-in constant — is also
//! being spent in the same transaction. The staking validator enforces the
//! per-position accounting; the pool only verifies that it participated.
//! Every other continuing-output check is a field-by-field datum equality:
//! all fields equal except the one the transition authorizes.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tidepool_common::{
    constants::fees,
    errors::{StakeError, StakeResult},
    events::ProtocolEvent,
    math::{platform_fee, safe_add, safe_sub},
    tx::{ScriptContext, Transaction, TxOut},
    types::PoolDatum,
};

// ============ Redeemer ============

/// Transitions of the pool state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolRedeemer {
    /// Add stake tokens to the pool
    Stake { amount: u64 },
    /// Remove stake tokens (authorized by the staking validator)
    Unstake { amount: u64 },
    /// Release reward tokens (authorized by the staking validator)
    Claim,
    /// Change the yield rate (owner only)
    UpdatePool { new_yield_rate: u64 },
    /// Destroy a paused pool and burn its identity (owner only)
    ClosePool,
    /// Add reward tokens to the treasury (owner only)
    FundTreasury { amount: u64 },
    /// Remove reward tokens from the treasury (owner only)
    WithdrawTreasury { amount: u64 },
    /// Pause or unpause the pool (owner only)
    PausePool { pause: u64 },
}

// ============ Validation ============

/// Main validation entry point
pub fn validate(ctx: &ScriptContext, redeemer: &PoolRedeemer) -> StakeResult<ProtocolEvent> {
    let tx = &ctx.tx;
    let own = ctx.spent_output()?;
    let pool: PoolDatum = own.inline_record()?;

    // The identity token in the spent input is what makes the record
    // trustworthy; without it this is a forged record at our address.
    if !own.value.holds(&pool.pool_nft_policy, &pool.pool_nft_name) {
        return Err(StakeError::IdentityTokenMissing);
    }

    match redeemer {
        PoolRedeemer::Stake { amount } => validate_stake(tx, own, &pool, *amount),
        PoolRedeemer::Unstake { amount } => validate_unstake(tx, own, &pool, *amount),
        PoolRedeemer::Claim => validate_claim(tx, own, &pool),
        PoolRedeemer::UpdatePool { new_yield_rate } => {
            validate_update_pool(tx, own, &pool, *new_yield_rate)
        }
        PoolRedeemer::ClosePool => validate_close_pool(tx, &pool),
        PoolRedeemer::FundTreasury { amount } => validate_fund_treasury(tx, own, &pool, *amount),
        PoolRedeemer::WithdrawTreasury { amount } => {
            validate_withdraw_treasury(tx, own, &pool, *amount)
        }
        PoolRedeemer::PausePool { pause } => validate_pause_pool(tx, own, &pool, *pause),
    }
}

/// Continuing output at the pool's own address, still carrying the pool
/// identity token, with its proposed record decoded.
fn continuing_record<'a>(
    tx: &'a Transaction,
    own: &TxOut,
    pool: &PoolDatum,
) -> StakeResult<(&'a TxOut, PoolDatum)> {
    let cont = tx.find_continuing_output(&own.address, &pool.pool_nft_policy, &pool.pool_nft_name)?;
    let record: PoolDatum = cont.inline_record()?;
    Ok((cont, record))
}

fn require_fee_paid(
    tx: &Transaction,
    pool: &PoolDatum,
    fee: u64,
    token_policy: &[u8],
    token_name: &[u8],
) -> StakeResult<()> {
    if fee == 0 {
        return Ok(());
    }
    if tx.pays_to_key(&pool.platform_fee_key, token_policy, token_name, fee) {
        Ok(())
    } else {
        Err(StakeError::FeeNotPaid { required: fee })
    }
}

fn validate_stake(
    tx: &Transaction,
    own: &TxOut,
    pool: &PoolDatum,
    amount: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. Paused pools accept no new stakes
    if pool.is_paused() {
        return Err(StakeError::PoolPaused);
    }

    // 2. Minimum stake
    if amount < pool.min_stake {
        return Err(StakeError::BelowMinimumStake { amount, minimum: pool.min_stake });
    }

    // 3. Only total_staked may change, and only by the staked amount
    let (_, new_record) = continuing_record(tx, own, pool)?;
    let new_total = safe_add(pool.total_staked, amount)?;
    if new_record != pool.with_total_staked(new_total) {
        return Err(StakeError::DatumMismatch);
    }

    // 4. Platform fee on the deposit, in stake-token units
    let fee = platform_fee(amount, pool.deposit_fee_bps)?;
    require_fee_paid(tx, pool, fee, &pool.stake_token_policy, &pool.stake_token_name)?;

    Ok(ProtocolEvent::Staked {
        pool_nft_name: pool.pool_nft_name.clone(),
        amount,
        fee,
        new_total_staked: new_total,
    })
}

fn validate_unstake(
    tx: &Transaction,
    own: &TxOut,
    pool: &PoolDatum,
    amount: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. Fund release requires the staking validator in the same
    //    transaction — a bare signature is never enough
    tx.require_cospend(&pool.staking_validator_hash)?;

    // 2. Amount within the recorded total
    if amount == 0 {
        return Err(StakeError::ZeroAmount);
    }
    if amount > pool.total_staked {
        return Err(StakeError::ExceedsTotalStaked { amount, total_staked: pool.total_staked });
    }

    // 3. Stake tokens must actually leave the pool output
    let (cont, new_record) = continuing_record(tx, own, pool)?;
    let held = own.value.quantity_of(&pool.stake_token_policy, &pool.stake_token_name);
    let remaining = cont.value.quantity_of(&pool.stake_token_policy, &pool.stake_token_name);
    if held < safe_add(remaining, amount)? {
        return Err(StakeError::TokensNotRemoved { required: amount });
    }

    // 4. Only total_staked may change
    let new_total = safe_sub(pool.total_staked, amount)?;
    if new_record != pool.with_total_staked(new_total) {
        return Err(StakeError::DatumMismatch);
    }

    // Withdrawals are free - no platform fee
    Ok(ProtocolEvent::Unstaked {
        pool_nft_name: pool.pool_nft_name.clone(),
        amount,
        new_total_staked: new_total,
    })
}

fn validate_claim(tx: &Transaction, own: &TxOut, pool: &PoolDatum) -> StakeResult<ProtocolEvent> {
    // 1. Reward release requires the staking validator in the same tx
    tx.require_cospend(&pool.staking_validator_hash)?;

    // 2. Reward tokens must strictly leave the treasury
    let (cont, new_record) = continuing_record(tx, own, pool)?;
    let held = own.value.quantity_of(&pool.reward_token_policy, &pool.reward_token_name);
    let remaining = cont.value.quantity_of(&pool.reward_token_policy, &pool.reward_token_name);
    if remaining >= held {
        return Err(StakeError::NoRewardOutflow);
    }

    // 3. Record frozen
    if new_record != *pool {
        return Err(StakeError::DatumMismatch);
    }

    // Claims are free - no platform fee
    Ok(ProtocolEvent::RewardsReleased {
        pool_nft_name: pool.pool_nft_name.clone(),
        amount: held - remaining,
    })
}

fn validate_update_pool(
    tx: &Transaction,
    own: &TxOut,
    pool: &PoolDatum,
    new_yield_rate: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. Owner must sign
    tx.require_signature(&pool.owner)?;

    // 2. New rate within (0, 10000]
    if new_yield_rate == 0 || new_yield_rate > fees::MAX_YIELD_RATE_BPS {
        return Err(StakeError::YieldRateOutOfRange { rate: new_yield_rate });
    }

    // 3. Only yield_rate_bps may change
    let (_, new_record) = continuing_record(tx, own, pool)?;
    if new_record != pool.with_yield_rate(new_yield_rate) {
        return Err(StakeError::DatumMismatch);
    }

    Ok(ProtocolEvent::PoolUpdated {
        pool_nft_name: pool.pool_nft_name.clone(),
        new_yield_rate_bps: new_yield_rate,
    })
}

fn validate_close_pool(tx: &Transaction, pool: &PoolDatum) -> StakeResult<ProtocolEvent> {
    // 1. Owner must sign
    tx.require_signature(&pool.owner)?;

    // 2. Pause first, then close - gives stakers a window to exit
    if !pool.is_paused() {
        return Err(StakeError::PoolNotPaused);
    }

    // 3. The identity token must be burned, which is what makes the pool
    //    permanently unusable. total_staked is deliberately not consulted:
    //    the staking validator tracks positions independently and the
    //    counter may be stale.
    if tx.mint.quantity_of(&pool.pool_nft_policy, &pool.pool_nft_name) != -1 {
        return Err(StakeError::IdentityNotBurned);
    }

    // No continuing output required - the pool is gone
    Ok(ProtocolEvent::PoolClosed { pool_nft_name: pool.pool_nft_name.clone() })
}

fn validate_fund_treasury(
    tx: &Transaction,
    own: &TxOut,
    pool: &PoolDatum,
    amount: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. Owner must sign
    tx.require_signature(&pool.owner)?;

    // 2. Amount must be positive
    if amount == 0 {
        return Err(StakeError::ZeroAmount);
    }

    // 3. Reward tokens must arrive in the treasury
    let (cont, new_record) = continuing_record(tx, own, pool)?;
    let held = own.value.quantity_of(&pool.reward_token_policy, &pool.reward_token_name);
    let now_held = cont.value.quantity_of(&pool.reward_token_policy, &pool.reward_token_name);
    if now_held < safe_add(held, amount)? {
        return Err(StakeError::TokensNotAdded { required: amount });
    }

    // 4. Record frozen
    if new_record != *pool {
        return Err(StakeError::DatumMismatch);
    }

    // 5. Platform fee on the funded amount, in reward-token units
    let fee = platform_fee(amount, pool.deposit_fee_bps)?;
    require_fee_paid(tx, pool, fee, &pool.reward_token_policy, &pool.reward_token_name)?;

    Ok(ProtocolEvent::TreasuryFunded {
        pool_nft_name: pool.pool_nft_name.clone(),
        amount,
        fee,
    })
}

fn validate_withdraw_treasury(
    tx: &Transaction,
    own: &TxOut,
    pool: &PoolDatum,
    amount: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. Owner must sign
    tx.require_signature(&pool.owner)?;

    // 2. Amount must be positive
    if amount == 0 {
        return Err(StakeError::ZeroAmount);
    }

    // 3. Reward tokens must leave the treasury
    let (cont, new_record) = continuing_record(tx, own, pool)?;
    let held = own.value.quantity_of(&pool.reward_token_policy, &pool.reward_token_name);
    let remaining = cont.value.quantity_of(&pool.reward_token_policy, &pool.reward_token_name);
    if held < safe_add(remaining, amount)? {
        return Err(StakeError::TokensNotRemoved { required: amount });
    }

    // 4. Record frozen
    if new_record != *pool {
        return Err(StakeError::DatumMismatch);
    }

    // Treasury withdrawals are free - no platform fee
    Ok(ProtocolEvent::TreasuryWithdrawn {
        pool_nft_name: pool.pool_nft_name.clone(),
        amount,
    })
}

fn validate_pause_pool(
    tx: &Transaction,
    own: &TxOut,
    pool: &PoolDatum,
    pause: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. Owner must sign
    tx.require_signature(&pool.owner)?;

    // 2. Flag must be 0 or 1
    if pause > 1 {
        return Err(StakeError::InvalidPauseFlag { value: pause });
    }

    // 3. Only paused may change
    let (_, new_record) = continuing_record(tx, own, pool)?;
    if new_record != pool.with_paused(pause) {
        return Err(StakeError::DatumMismatch);
    }

    Ok(ProtocolEvent::PoolPauseSet {
        pool_nft_name: pool.pool_nft_name.clone(),
        paused: pause,
    })
}

// ============ Tests ============
