//! User Position State Machine
//!
//! Spending validator for per-position UTxOs. Each position is one output
//! at this validator holding the position's reference token, its staked
//! tokens, and the [`UserPositionDatum`]. All pool configuration — yield
//! rate, fee rate, fee recipient, burn address, token pairings — is resolved
//! from the pool record at validation time by searching for the pool
//! identity token, never by address and never from compiled-in constants.
//!
//! ## Time
//!
//! "Now" is derived exclusively from the transaction's validity interval:
//! both bounds must be finite and the window at most ten minutes wide, and
//! the *upper* bound is used. A submitter can therefore understate elapsed
//! time (costing themselves reward) but never inflate it.
//!
//! ## Rewards
//!
//! `reward = floor(stake * rate_bps * days / (365 * 10000))` with
//! `days = floor((now - last_claim) / 86_400_000)`.
//!
//! ## Fees
//!
//! Register pays the fee on top of the full deposit (the whole deposit is
//! credited as stake); Deposit credits the amount net of fee. The asymmetry
//! is inherited from the deployed protocol and preserved for compatibility.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tidepool_common::{
    capability::resolve,
    errors::{StakeError, StakeResult},
    events::ProtocolEvent,
    math::{accrued_reward, platform_fee, safe_sub},
    tx::{ScriptContext, Transaction, TxOut},
    types::{PoolDatum, UserPositionDatum},
};

// ============ Redeemer ============

/// Transitions of the user position state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum StakingRedeemer {
    /// Open a new position
    Register { initial_deposit: u64 },
    /// Add tokens to an existing position
    Deposit { amount: u64 },
    /// Remove tokens; 0 means full withdrawal. Always retires the identity
    Withdraw { amount: u64 },
    /// Claim accrued rewards
    Claim,
    /// Fold accrued rewards back into the stake
    Compound,
    /// Owner-initiated refund during pool wind-down (pool must be paused)
    ForceRefund,
}

// ============ Validation ============

/// Main validation entry point
pub fn validate(ctx: &ScriptContext, redeemer: &StakingRedeemer) -> StakeResult<ProtocolEvent> {
    let tx = &ctx.tx;
    let own = ctx.spent_output()?;
    let position: UserPositionDatum = own.inline_record()?;

    // Resolve the governing pool by its identity token: spent inputs first
    // (Register/Deposit/Claim touch the pool), then reference inputs
    // (Withdraw only consults it).
    let pool = resolve::<PoolDatum>(tx, &position.pool_nft_policy, &position.pool_nft_name)?;
    let pool = &pool.record;

    match redeemer {
        // ForceRefund is dispatched first: it is the only transition that
        // does not carry the position owner's signature.
        StakingRedeemer::ForceRefund => validate_force_refund(tx, &position, pool),
        StakingRedeemer::Register { initial_deposit } => {
            validate_register(tx, &position, pool, *initial_deposit)
        }
        StakingRedeemer::Deposit { amount } => {
            validate_deposit(tx, own, &position, pool, *amount)
        }
        StakingRedeemer::Withdraw { amount } => {
            validate_withdraw(tx, &position, pool, *amount)
        }
        StakingRedeemer::Claim => validate_claim(tx, own, &position, pool),
        StakingRedeemer::Compound => validate_compound(tx, own, &position, pool),
    }
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

/// Continuing output: same address, still carrying this position's
/// reference token under the pool's declared position policy.
fn continuing_record(
    tx: &Transaction,
    own: &TxOut,
    position: &UserPositionDatum,
    pool: &PoolDatum,
) -> StakeResult<UserPositionDatum> {
    let cont = tx.find_continuing_output(
        &own.address,
        &pool.position_policy_hash,
        &position.position_name,
    )?;
    cont.inline_record()
}

/// The position's reference token must be routed to the pool's burn
/// address. Position destruction always retires the identity.
fn require_identity_retired(
    tx: &Transaction,
    position: &UserPositionDatum,
    pool: &PoolDatum,
) -> StakeResult<()> {
    if tx.pays_token_to_script(
        &pool.burn_address_hash,
        &pool.position_policy_hash,
        &position.position_name,
    ) {
        Ok(())
    } else {
        Err(StakeError::IdentityNotBurned)
    }
}

fn validate_register(
    tx: &Transaction,
    position: &UserPositionDatum,
    pool: &PoolDatum,
    initial_deposit: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. The position owner must sign
    tx.require_signature(&position.user_key)?;

    // 2. Paused pools accept no new positions
    if pool.is_paused() {
        return Err(StakeError::PoolPaused);
    }

    // 3. Minimum stake
    if initial_deposit < pool.min_stake {
        return Err(StakeError::BelowMinimumStake {
            amount: initial_deposit,
            minimum: pool.min_stake,
        });
    }

    // 4. The fresh record must credit exactly the full deposit
    if position.stake_amount != initial_deposit {
        return Err(StakeError::InvalidRecord {
            field: "stake_amount",
            reason: "must equal the initial deposit",
        });
    }

    // 5. Timestamps: opened now (or earlier), claim clock starts at open,
    //    lifetime counter starts at zero
    let now = tx.validity_range.current_time()?;
    if position.staked_at > now {
        return Err(StakeError::InvalidRecord {
            field: "staked_at",
            reason: "must not be in the future",
        });
    }
    if position.last_claim != position.staked_at {
        return Err(StakeError::InvalidRecord {
            field: "last_claim",
            reason: "must equal staked_at",
        });
    }
    if position.total_claimed != 0 {
        return Err(StakeError::InvalidRecord {
            field: "total_claimed",
            reason: "must start at zero",
        });
    }

    // 6. Fee on the deposit, paid on top — the full deposit was credited in
    //    step 4 (Deposit below is net-of-fee; asymmetry preserved)
    let fee = platform_fee(initial_deposit, pool.deposit_fee_bps)?;
    require_fee_paid(tx, pool, fee, &pool.stake_token_policy, &pool.stake_token_name)?;

    Ok(ProtocolEvent::PositionRegistered {
        position_name: position.position_name.clone(),
        user: position.user_key.clone(),
        deposit: initial_deposit,
        fee,
    })
}

fn validate_deposit(
    tx: &Transaction,
    own: &TxOut,
    position: &UserPositionDatum,
    pool: &PoolDatum,
    amount: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. The position owner must sign
    tx.require_signature(&position.user_key)?;

    // 2. Amount must be positive
    if amount == 0 {
        return Err(StakeError::ZeroAmount);
    }

    // 3. Paused pools accept no deposits
    if pool.is_paused() {
        return Err(StakeError::PoolPaused);
    }

    // 4. Net amount after fee is what the stake grows by
    let fee = platform_fee(amount, pool.deposit_fee_bps)?;
    let net = safe_sub(amount, fee)?;

    // 5. Only stake_amount may change, and only by the net amount
    let new_record = continuing_record(tx, own, position, pool)?;
    let expected = position.after_deposit(net)?;
    if new_record != expected {
        return Err(StakeError::DatumMismatch);
    }

    // 6. Fee output
    require_fee_paid(tx, pool, fee, &pool.stake_token_policy, &pool.stake_token_name)?;

    Ok(ProtocolEvent::PositionDeposited {
        position_name: position.position_name.clone(),
        amount,
        fee,
        new_stake: expected.stake_amount,
    })
}

fn validate_withdraw(
    tx: &Transaction,
    position: &UserPositionDatum,
    pool: &PoolDatum,
    amount: u64,
) -> StakeResult<ProtocolEvent> {
    // 1. The position owner must sign
    tx.require_signature(&position.user_key)?;

    // 2. Zero means full withdrawal
    let withdraw_amount = if amount == 0 { position.stake_amount } else { amount };
    if withdraw_amount == 0 {
        return Err(StakeError::ZeroAmount);
    }
    if withdraw_amount > position.stake_amount {
        return Err(StakeError::ExceedsStake { amount: withdraw_amount, stake: position.stake_amount });
    }

    // 3. Any withdrawal destroys the position: the reference token goes to
    //    the burn address. Partial withdrawals continue as a freshly
    //    reminted position under the position policy's Remint operation.
    require_identity_retired(tx, position, pool)?;

    // Withdrawals are free - no platform fee
    Ok(ProtocolEvent::PositionWithdrawn {
        position_name: position.position_name.clone(),
        amount: withdraw_amount,
    })
}

fn validate_claim(
    tx: &Transaction,
    own: &TxOut,
    position: &UserPositionDatum,
    pool: &PoolDatum,
) -> StakeResult<ProtocolEvent> {
    // 1. The position owner must sign
    tx.require_signature(&position.user_key)?;

    // 2. Rewards accrued since the last claim, at the pool's current rate
    let now = tx.validity_range.current_time()?;
    let reward = accrued_reward(position.stake_amount, pool.yield_rate_bps, position.last_claim, now)?;
    if reward == 0 {
        return Err(StakeError::NoRewardsAccrued);
    }

    // 3. The claim clock advances and the lifetime counter grows; stake and
    //    every identity-linking field stay frozen
    let new_record = continuing_record(tx, own, position, pool)?;
    if new_record != position.after_claim(now, reward)? {
        return Err(StakeError::DatumMismatch);
    }

    // Claims are free - no platform fee
    Ok(ProtocolEvent::PositionClaimed {
        position_name: position.position_name.clone(),
        reward,
    })
}

fn validate_compound(
    tx: &Transaction,
    own: &TxOut,
    position: &UserPositionDatum,
    pool: &PoolDatum,
) -> StakeResult<ProtocolEvent> {
    // 1. The position owner must sign
    tx.require_signature(&position.user_key)?;

    // 2. Rewards accrued since the last claim
    let now = tx.validity_range.current_time()?;
    let reward = accrued_reward(position.stake_amount, pool.yield_rate_bps, position.last_claim, now)?;
    if reward == 0 {
        return Err(StakeError::NoRewardsAccrued);
    }

    // 3. Fee on the compounded reward; the net is folded into the stake
    let fee = platform_fee(reward, pool.deposit_fee_bps)?;
    let expected = position.after_compound(now, reward, fee)?;
    let new_record = continuing_record(tx, own, position, pool)?;
    if new_record != expected {
        return Err(StakeError::DatumMismatch);
    }

    // 4. Compounding is a deposit of rewards, so the fee is paid in
    //    reward-token units
    require_fee_paid(tx, pool, fee, &pool.reward_token_policy, &pool.reward_token_name)?;

    Ok(ProtocolEvent::PositionCompounded {
        position_name: position.position_name.clone(),
        reward,
        fee,
        new_stake: expected.stake_amount,
    })
}

fn validate_force_refund(
    tx: &Transaction,
    position: &UserPositionDatum,
    pool: &PoolDatum,
) -> StakeResult<ProtocolEvent> {
    // 1. Only wound-down pools: the pool must be paused
    if !pool.is_paused() {
        return Err(StakeError::PoolNotPaused);
    }

    // 2. The pool owner signs — not the user; this is the owner sweeping
    //    remaining positions during closure
    tx.require_signature(&pool.owner)?;

    // 3. The position identity is retired like any other destruction
    require_identity_retired(tx, position, pool)?;

    // 4. The full recorded stake must return to the position owner. Any
    //    unclaimed reward is forfeited: stakers claim before the pause, and
    //    the owner can refund but never redirect the stake.
    if !tx.pays_to_key(
        &position.user_key,
        &pool.stake_token_policy,
        &pool.stake_token_name,
        position.stake_amount,
    ) {
        return Err(StakeError::RefundNotPaid { required: position.stake_amount });
    }

    Ok(ProtocolEvent::PositionForceRefunded {
        position_name: position.position_name.clone(),
        user: position.user_key.clone(),
        refunded: position.stake_amount,
    })
}

// ============ Tests ============
