//! Protocol Records
//!
//! The three persistent records of the protocol, as attached to outputs:
//! the platform authority record, the pool configuration record, and the
//! per-position record. All hash fields are byte strings validated to 28
//! bytes at the contract boundary — nothing is fixed at the type level,
//! because any transaction author can propose an output with any bytes in
//! it and the validators must treat length as a runtime shape check.

use crate::constants::{fees, shape};
use crate::errors::{StakeError, StakeResult};
use crate::math::{safe_add, safe_sub};
use crate::tx::{KeyHash, PolicyId, ScriptHash, TokenName};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

fn require_hash(field: &'static str, bytes: &[u8]) -> StakeResult<()> {
    if bytes.len() != shape::HASH_LEN {
        return Err(StakeError::InvalidHashLength { field, actual: bytes.len() });
    }
    Ok(())
}

fn require_one_shot_name(field: &'static str, bytes: &[u8]) -> StakeResult<()> {
    if bytes.len() != shape::ONE_SHOT_NAME_LEN {
        return Err(StakeError::InvalidTokenNameLength { field, actual: bytes.len() });
    }
    Ok(())
}

// ============ Platform Authority Record ============

/// Root platform configuration, carried by the one-shot authority token.
///
/// Created once at deployment and referenced (never spent) by every pool
/// creation afterwards. The self-reference fields let any contract that
/// finds this record re-check it against the token it travels with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PlatformAuthorityDatum {
    /// Key authorized to create pools
    pub pool_creator: KeyHash,
    /// Key that administers the platform
    pub platform_admin: KeyHash,
    /// This record's own minting policy (self-reference)
    pub authority_policy: PolicyId,
    /// This record's own token name (self-reference)
    pub authority_name: TokenName,
}

impl PlatformAuthorityDatum {
    /// Self-reference integrity plus key shape checks.
    pub fn verify(&self, policy: &[u8], name: &[u8]) -> StakeResult<()> {
        if self.authority_policy.as_slice() != policy {
            return Err(StakeError::InvalidRecord {
                field: "authority_policy",
                reason: "does not match the token's minting policy",
            });
        }
        if self.authority_name.as_slice() != name {
            return Err(StakeError::InvalidRecord {
                field: "authority_name",
                reason: "does not match the token's name",
            });
        }
        require_hash("pool_creator", &self.pool_creator)?;
        require_hash("platform_admin", &self.platform_admin)?;
        Ok(())
    }
}

// ============ Pool Configuration Record ============

/// Per-pool configuration and treasury state, carried by the pool identity
/// token at the pool validator address.
///
/// Every field is either frozen for the pool's life or mutated by exactly
/// one authorized transition: `total_staked` by Stake/Unstake, `yield_rate_bps`
/// by UpdatePool, `paused` by PausePool. The validator hashes stored here are
/// how the other contracts find each other — no contract compiles in a peer's
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolDatum {
    /// Pool identity token policy (self-reference)
    pub pool_nft_policy: PolicyId,
    /// Pool identity token name (self-reference)
    pub pool_nft_name: TokenName,
    /// Token users stake
    pub stake_token_policy: PolicyId,
    pub stake_token_name: TokenName,
    /// Token the treasury pays rewards in
    pub reward_token_policy: PolicyId,
    pub reward_token_name: TokenName,
    /// Annual yield in basis points (500 = 5%)
    pub yield_rate_bps: u64,
    /// Minimum initial stake
    pub min_stake: u64,
    /// Pool owner's key
    pub owner: KeyHash,
    /// Running total of staked tokens
    pub total_staked: u64,
    /// Where user positions live
    pub staking_validator_hash: ScriptHash,
    /// Policy that mints position identity pairs
    pub position_policy_hash: PolicyId,
    /// Platform fee recipient
    pub platform_fee_key: KeyHash,
    /// Deposit fee in basis points (100 = 1%)
    pub deposit_fee_bps: u64,
    /// Script address that position tokens are retired to
    pub burn_address_hash: ScriptHash,
    /// 0 = active, 1 = paused (no new stakes)
    pub paused: u64,
}

impl PoolDatum {
    pub fn is_paused(&self) -> bool {
        self.paused == 1
    }

    /// Self-reference integrity: the record must name the token it travels
    /// with. Re-checked every time the record is resolved.
    pub fn verify_identity(&self, policy: &[u8], name: &[u8]) -> StakeResult<()> {
        if self.pool_nft_policy.as_slice() != policy {
            return Err(StakeError::InvalidRecord {
                field: "pool_nft_policy",
                reason: "does not match the token's minting policy",
            });
        }
        if self.pool_nft_name.as_slice() != name {
            return Err(StakeError::InvalidRecord {
                field: "pool_nft_name",
                reason: "does not match the token's name",
            });
        }
        Ok(())
    }

    /// Full creation-shape check, enforced once when the pool identity is
    /// minted. Afterwards the fields are protected by the pool validator's
    /// transition rules instead.
    pub fn verify_creation(&self, policy: &[u8], name: &[u8]) -> StakeResult<()> {
        self.verify_identity(policy, name)?;
        if self.yield_rate_bps == 0 || self.yield_rate_bps > fees::MAX_YIELD_RATE_BPS {
            return Err(StakeError::YieldRateOutOfRange { rate: self.yield_rate_bps });
        }
        if self.min_stake == 0 {
            return Err(StakeError::InvalidRecord {
                field: "min_stake",
                reason: "must be positive",
            });
        }
        if self.total_staked != 0 {
            return Err(StakeError::InvalidRecord {
                field: "total_staked",
                reason: "must start at zero",
            });
        }
        require_hash("owner", &self.owner)?;
        require_hash("staking_validator_hash", &self.staking_validator_hash)?;
        require_hash("position_policy_hash", &self.position_policy_hash)?;
        require_hash("platform_fee_key", &self.platform_fee_key)?;
        require_hash("burn_address_hash", &self.burn_address_hash)?;
        if self.paused > 1 {
            return Err(StakeError::InvalidPauseFlag { value: self.paused });
        }
        Ok(())
    }

    /// Expected continuing record after Stake/Unstake
    pub fn with_total_staked(&self, total_staked: u64) -> Self {
        Self { total_staked, ..self.clone() }
    }

    /// Expected continuing record after UpdatePool
    pub fn with_yield_rate(&self, yield_rate_bps: u64) -> Self {
        Self { yield_rate_bps, ..self.clone() }
    }

    /// Expected continuing record after PausePool
    pub fn with_paused(&self, paused: u64) -> Self {
        Self { paused, ..self.clone() }
    }
}

// ============ User Position Record ============

/// One staking position, carried by its reference token at the staking
/// validator. Linked to its pool by identity-token equality, never by
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct UserPositionDatum {
    /// Pool this position belongs to
    pub pool_nft_policy: PolicyId,
    pub pool_nft_name: TokenName,
    /// Position owner's key
    pub user_key: KeyHash,
    /// Full name of this position's reference token
    pub position_name: TokenName,
    /// Currently staked tokens
    pub stake_amount: u64,
    /// When the position was opened (POSIX ms)
    pub staked_at: u64,
    /// Last reward claim (POSIX ms)
    pub last_claim: u64,
    /// Lifetime rewards claimed
    pub total_claimed: u64,
}

impl UserPositionDatum {
    /// Shape check applied when the position pair is minted.
    pub fn verify(&self) -> StakeResult<()> {
        require_hash("pool_nft_policy", &self.pool_nft_policy)?;
        require_one_shot_name("pool_nft_name", &self.pool_nft_name)?;
        require_hash("user_key", &self.user_key)?;
        if self.stake_amount == 0 {
            return Err(StakeError::InvalidRecord {
                field: "stake_amount",
                reason: "must be positive",
            });
        }
        if self.staked_at == 0 {
            return Err(StakeError::InvalidRecord {
                field: "staked_at",
                reason: "must be a positive timestamp",
            });
        }
        Ok(())
    }

    /// Expected continuing record after Deposit: stake grows by the net
    /// amount, everything else frozen.
    pub fn after_deposit(&self, net_amount: u64) -> StakeResult<Self> {
        Ok(Self { stake_amount: safe_add(self.stake_amount, net_amount)?, ..self.clone() })
    }

    /// Expected continuing record after Claim: the claim clock advances and
    /// the lifetime counter grows, everything else frozen.
    pub fn after_claim(&self, now_ms: u64, reward: u64) -> StakeResult<Self> {
        Ok(Self {
            last_claim: now_ms,
            total_claimed: safe_add(self.total_claimed, reward)?,
            ..self.clone()
        })
    }

    /// Expected continuing record after Compound: the net reward is folded
    /// into the stake, the claim clock advances, and the lifetime counter
    /// grows by the gross reward.
    pub fn after_compound(&self, now_ms: u64, reward: u64, fee: u64) -> StakeResult<Self> {
        let net = safe_sub(reward, fee)?;
        Ok(Self {
            stake_amount: safe_add(self.stake_amount, net)?,
            last_claim: now_ms,
            total_claimed: safe_add(self.total_claimed, reward)?,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> PlatformAuthorityDatum {
        PlatformAuthorityDatum {
            pool_creator: vec![1u8; 28],
            platform_admin: vec![2u8; 28],
            authority_policy: vec![3u8; 28],
            authority_name: vec![4u8; 32],
        }
    }

    fn pool() -> PoolDatum {
        PoolDatum {
            pool_nft_policy: vec![5u8; 28],
            pool_nft_name: vec![6u8; 32],
            stake_token_policy: vec![7u8; 28],
            stake_token_name: b"STAKE".to_vec(),
            reward_token_policy: vec![8u8; 28],
            reward_token_name: b"REWARD".to_vec(),
            yield_rate_bps: 500,
            min_stake: 100,
            owner: vec![9u8; 28],
            total_staked: 0,
            staking_validator_hash: vec![10u8; 28],
            position_policy_hash: vec![11u8; 28],
            platform_fee_key: vec![12u8; 28],
            deposit_fee_bps: 100,
            burn_address_hash: vec![13u8; 28],
            paused: 0,
        }
    }

    #[test]
    fn authority_self_reference_is_enforced() {
        let record = authority();
        assert!(record.verify(&[3u8; 28], &[4u8; 32]).is_ok());
        assert!(matches!(
            record.verify(&[99u8; 28], &[4u8; 32]),
            Err(StakeError::InvalidRecord { field: "authority_policy", .. })
        ));
    }

    #[test]
    fn authority_key_lengths_are_enforced() {
        let mut record = authority();
        record.pool_creator = vec![1u8; 27];
        assert_eq!(
            record.verify(&[3u8; 28], &[4u8; 32]),
            Err(StakeError::InvalidHashLength { field: "pool_creator", actual: 27 })
        );
    }

    #[test]
    fn pool_creation_shape() {
        let record = pool();
        assert!(record.verify_creation(&[5u8; 28], &[6u8; 32]).is_ok());

        let mut bad_rate = pool();
        bad_rate.yield_rate_bps = 10_001;
        assert_eq!(
            bad_rate.verify_creation(&[5u8; 28], &[6u8; 32]),
            Err(StakeError::YieldRateOutOfRange { rate: 10_001 })
        );

        let mut pre_staked = pool();
        pre_staked.total_staked = 7;
        assert!(matches!(
            pre_staked.verify_creation(&[5u8; 28], &[6u8; 32]),
            Err(StakeError::InvalidRecord { field: "total_staked", .. })
        ));

        let mut short_owner = pool();
        short_owner.owner = vec![9u8; 20];
        assert!(matches!(
            short_owner.verify_creation(&[5u8; 28], &[6u8; 32]),
            Err(StakeError::InvalidHashLength { field: "owner", .. })
        ));
    }

    #[test]
    fn position_transitions_preserve_frozen_fields() {
        let position = UserPositionDatum {
            pool_nft_policy: vec![5u8; 28],
            pool_nft_name: vec![6u8; 32],
            user_key: vec![14u8; 28],
            position_name: vec![15u8; 36],
            stake_amount: 1_000,
            staked_at: 1_000_000,
            last_claim: 1_000_000,
            total_claimed: 0,
        };

        let after = position.after_compound(2_000_000, 100, 1).unwrap();
        assert_eq!(after.stake_amount, 1_099);
        assert_eq!(after.last_claim, 2_000_000);
        assert_eq!(after.total_claimed, 100);
        assert_eq!(after.staked_at, position.staked_at);
        assert_eq!(after.user_key, position.user_key);
    }
}
