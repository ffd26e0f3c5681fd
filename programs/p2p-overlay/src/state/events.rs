use anchor_lang::prelude::*;
use borsh::{BorshDeserialize, BorshSerialize};

use crate::state::position::PositionSide;

#[event]
pub struct MarketCreatedRecord {
    pub market_index: u16,
    pub underlying: Pubkey,
    pub reserve_factor: u16,
    pub p2p_index_cursor: u16,
    pub pool_supply_index: u128,
    pub pool_borrow_index: u128,
}

#[event]
pub struct P2PIndexesRecord {
    pub market_index: u16,
    pub pool_supply_index: u128,
    pub pool_borrow_index: u128,
    pub p2p_supply_index: u128,
    pub p2p_borrow_index: u128,
}

#[event]
pub struct DeltaRecord {
    pub market_index: u16,
    pub p2p_supply_delta: u128,
    pub p2p_borrow_delta: u128,
    pub p2p_supply_amount: u128,
    pub p2p_borrow_amount: u128,
}

#[event]
pub struct PositionRecord {
    pub market_index: u16,
    pub account: Pubkey,
    pub side: PositionSide,
    pub action: PositionAction,
    /// underlying moved by the caller
    pub amount: u128,
    pub on_pool: u128,
    pub in_p2p: u128,
}

#[derive(Clone, Copy, BorshSerialize, BorshDeserialize, PartialEq, Eq, Debug, Default)]
pub enum PositionAction {
    #[default]
    Supply,
    Borrow,
    Withdraw,
    Repay,
    /// Position moved between pool and p2p by another account's operation
    Rematch,
}

#[event]
pub struct TreasuryClaimRecord {
    pub market_index: u16,
    pub amount: u128,
    pub treasury_balance_after: u128,
}
