//! Protocol Events
//!
//! Each accepted transition returns the event describing what the
//! transaction did. Rejections never produce events; the ledger boundary
//! observes accept/reject only, so these exist for audit trails, testing,
//! and off-chain consumers replaying validations.

use crate::tx::{KeyHash, TokenName};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Event emitted by an accepted transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum ProtocolEvent {
    // ============ Platform Authority ============
    AuthorityMinted { name: TokenName },
    AuthorityBurned,

    // ============ Pool Identity ============
    PoolCreated {
        pool_nft_name: TokenName,
        owner: KeyHash,
        yield_rate_bps: u64,
        min_stake: u64,
    },
    PoolIdentityBurned,

    // ============ Pool State Machine ============
    Staked {
        pool_nft_name: TokenName,
        amount: u64,
        fee: u64,
        new_total_staked: u64,
    },
    Unstaked {
        pool_nft_name: TokenName,
        amount: u64,
        new_total_staked: u64,
    },
    RewardsReleased {
        pool_nft_name: TokenName,
        amount: u64,
    },
    PoolUpdated {
        pool_nft_name: TokenName,
        new_yield_rate_bps: u64,
    },
    PoolClosed {
        pool_nft_name: TokenName,
    },
    TreasuryFunded {
        pool_nft_name: TokenName,
        amount: u64,
        fee: u64,
    },
    TreasuryWithdrawn {
        pool_nft_name: TokenName,
        amount: u64,
    },
    PoolPauseSet {
        pool_nft_name: TokenName,
        paused: u64,
    },

    // ============ Position Identity ============
    PositionMinted {
        position_id: TokenName,
    },
    PositionBurned {
        position_id: TokenName,
    },
    PositionReminted {
        old_position_id: TokenName,
        new_position_id: TokenName,
    },

    // ============ User Position State Machine ============
    PositionRegistered {
        position_name: TokenName,
        user: KeyHash,
        deposit: u64,
        fee: u64,
    },
    PositionDeposited {
        position_name: TokenName,
        amount: u64,
        fee: u64,
        new_stake: u64,
    },
    PositionWithdrawn {
        position_name: TokenName,
        amount: u64,
    },
    PositionClaimed {
        position_name: TokenName,
        reward: u64,
    },
    PositionCompounded {
        position_name: TokenName,
        reward: u64,
        fee: u64,
        new_stake: u64,
    },
    PositionForceRefunded {
        position_name: TokenName,
        user: KeyHash,
        refunded: u64,
    },
}
