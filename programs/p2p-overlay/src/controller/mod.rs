use anchor_lang::prelude::*;

use crate::controller::transaction::PoolTransfers;
use crate::state::events::DeltaRecord;
use crate::state::market::{Market, MarketIndexes};
use crate::state::position::Balance;

pub mod admin;
pub mod entry;
pub mod exit;
pub mod interest;
pub mod matching;
pub mod transaction;

/// Outcome of a supply, borrow, withdraw or repay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionUpdate {
    /// underlying moved by the caller
    pub amount: u128,
    pub balance: Balance,
    pub indexes: MarketIndexes,
    pub transfers: PoolTransfers,
}

pub(crate) fn emit_delta_record(market: &Market) {
    emit!(DeltaRecord {
        market_index: market.market_index,
        p2p_supply_delta: market.delta.p2p_supply_delta,
        p2p_borrow_delta: market.delta.p2p_borrow_delta,
        p2p_supply_amount: market.delta.p2p_supply_amount,
        p2p_borrow_amount: market.delta.p2p_borrow_amount,
    });
}
