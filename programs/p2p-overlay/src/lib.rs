#![allow(clippy::too_many_arguments)]
#![allow(clippy::comparison_chain)]

//! Peer-to-peer matching overlay for a pooled lending market.
//!
//! Suppliers and borrowers of a market are matched directly against each
//! other at a rate between the pool's supply and borrow rates. Anything that
//! cannot be matched sits in the pool, and matched credit that lost its
//! counterparty is tracked as delta until new activity absorbs it.

use anchor_lang::prelude::*;

use instructions::*;

use crate::error::OverlayResult;
use crate::math::p2p_index::P2PIndexes;
use crate::state::market::{Delta, Market};
use crate::state::market_map::MarketMap;
use crate::state::pool::LendingPool;
use crate::state::position::{ExitAmount, Placement, PositionSide, PositionSummary};
use crate::state::state::{MatchingBudget, State};

pub mod controller;
pub mod error;
pub mod instructions;
pub mod macros;
pub mod math;
pub mod state;
#[cfg(test)]
mod test_utils;


/// Every market of the overlay and its global configuration.
///
/// Each state changing call runs to completion with exclusive access. The pool
/// is passed in per call and is never able to call back into the overlay.
#[derive(Default)]
pub struct P2POverlay {
    pub state: State,
    pub market_map: MarketMap,
}

impl P2POverlay {
    pub fn new(state: State) -> Self {
        P2POverlay {
            state,
            market_map: MarketMap::default(),
        }
    }

    pub fn initialize_market(
        &mut self,
        pool: &dyn LendingPool,
        underlying: Pubkey,
        reserve_factor: u16,
        p2p_index_cursor: u16,
    ) -> OverlayResult<u16> {
        handle_initialize_market(
            &mut self.state,
            &mut self.market_map,
            pool,
            underlying,
            reserve_factor,
            p2p_index_cursor,
        )
    }

    pub fn refresh_indexes(
        &mut self,
        pool: &dyn LendingPool,
        market_index: u16,
    ) -> OverlayResult<P2PIndexes> {
        handle_refresh_indexes(&mut self.market_map, pool, market_index)
    }

    pub fn supply(
        &mut self,
        pool: &mut dyn LendingPool,
        market_index: u16,
        account: &Pubkey,
        amount: u128,
    ) -> OverlayResult<PositionSummary> {
        handle_supply(
            &self.state,
            &mut self.market_map,
            pool,
            market_index,
            account,
            amount,
        )
    }

    pub fn borrow(
        &mut self,
        pool: &mut dyn LendingPool,
        market_index: u16,
        account: &Pubkey,
        amount: u128,
    ) -> OverlayResult<PositionSummary> {
        handle_borrow(
            &self.state,
            &mut self.market_map,
            pool,
            market_index,
            account,
            amount,
        )
    }

    pub fn withdraw(
        &mut self,
        pool: &mut dyn LendingPool,
        market_index: u16,
        account: &Pubkey,
        amount: ExitAmount,
    ) -> OverlayResult<PositionSummary> {
        handle_withdraw(
            &self.state,
            &mut self.market_map,
            pool,
            market_index,
            account,
            amount,
        )
    }

    pub fn repay(
        &mut self,
        pool: &mut dyn LendingPool,
        market_index: u16,
        account: &Pubkey,
        amount: ExitAmount,
    ) -> OverlayResult<PositionSummary> {
        handle_repay(
            &self.state,
            &mut self.market_map,
            pool,
            market_index,
            account,
            amount,
        )
    }

    pub fn market(&self, market_index: u16) -> OverlayResult<&Market> {
        Ok(&self.market_map.get_ref(&market_index)?.market)
    }

    pub fn virtual_p2p_indexes(
        &self,
        pool: &dyn LendingPool,
        market_index: u16,
    ) -> OverlayResult<P2PIndexes> {
        get_virtual_p2p_indexes_for_market(&self.market_map, pool, market_index)
    }

    pub fn current_supply_balance(
        &self,
        pool: &dyn LendingPool,
        market_index: u16,
        account: &Pubkey,
    ) -> OverlayResult<PositionSummary> {
        get_current_balance(
            &self.market_map,
            pool,
            market_index,
            PositionSide::Supply,
            account,
        )
    }

    pub fn current_borrow_balance(
        &self,
        pool: &dyn LendingPool,
        market_index: u16,
        account: &Pubkey,
    ) -> OverlayResult<PositionSummary> {
        get_current_balance(
            &self.market_map,
            pool,
            market_index,
            PositionSide::Borrow,
            account,
        )
    }

    pub fn market_delta(&self, market_index: u16) -> OverlayResult<Delta> {
        get_market_delta(&self.market_map, market_index)
    }

    pub fn p2p_supply_amount_in_underlying(
        &self,
        pool: &dyn LendingPool,
        market_index: u16,
    ) -> OverlayResult<u128> {
        get_p2p_amount_in_underlying(&self.market_map, pool, market_index, PositionSide::Supply)
    }

    pub fn p2p_borrow_amount_in_underlying(
        &self,
        pool: &dyn LendingPool,
        market_index: u16,
    ) -> OverlayResult<u128> {
        get_p2p_amount_in_underlying(&self.market_map, pool, market_index, PositionSide::Borrow)
    }

    pub fn registry_head(
        &self,
        market_index: u16,
        side: PositionSide,
        placement: Placement,
    ) -> OverlayResult<Option<Pubkey>> {
        get_registry_head(&self.market_map, market_index, side, placement)
    }

    pub fn registry_next(
        &self,
        market_index: u16,
        side: PositionSide,
        placement: Placement,
        account: &Pubkey,
    ) -> OverlayResult<Option<Pubkey>> {
        get_registry_next(&self.market_map, market_index, side, placement, account)
    }

    pub fn update_reserve_factor(
        &mut self,
        pool: &dyn LendingPool,
        market_index: u16,
        reserve_factor: u16,
    ) -> OverlayResult {
        handle_update_reserve_factor(&mut self.market_map, pool, market_index, reserve_factor)
    }

    pub fn update_p2p_index_cursor(
        &mut self,
        pool: &dyn LendingPool,
        market_index: u16,
        p2p_index_cursor: u16,
    ) -> OverlayResult {
        handle_update_p2p_index_cursor(&mut self.market_map, pool, market_index, p2p_index_cursor)
    }

    pub fn update_max_ranked_size(
        &mut self,
        market_index: Option<u16>,
        max_ranked_size: u32,
    ) -> OverlayResult {
        handle_update_max_ranked_size(
            &mut self.state,
            &mut self.market_map,
            market_index,
            max_ranked_size,
        )
    }

    pub fn update_matching_budget(
        &mut self,
        market_index: Option<u16>,
        matching_budget: MatchingBudget,
    ) -> OverlayResult {
        handle_update_matching_budget(
            &mut self.state,
            &mut self.market_map,
            market_index,
            matching_budget,
        )
    }

    pub fn update_paused_operations(
        &mut self,
        market_index: u16,
        paused_operations: u8,
    ) -> OverlayResult {
        handle_update_paused_operations(&mut self.market_map, market_index, paused_operations)
    }

    pub fn update_exchange_status(&mut self, exchange_status: u8) -> OverlayResult {
        handle_update_exchange_status(&mut self.state, exchange_status)
    }

    pub fn update_p2p_disabled(
        &mut self,
        market_index: u16,
        is_p2p_disabled: bool,
    ) -> OverlayResult {
        handle_update_p2p_disabled(&mut self.market_map, market_index, is_p2p_disabled)
    }

    pub fn increase_p2p_deltas(
        &mut self,
        pool: &mut dyn LendingPool,
        market_index: u16,
        amount: u128,
    ) -> OverlayResult<u128> {
        handle_increase_p2p_deltas(&mut self.market_map, pool, market_index, amount)
    }

    pub fn claim_to_treasury(&mut self, market_index: u16, amount: u128) -> OverlayResult<u128> {
        handle_claim_to_treasury(&mut self.market_map, market_index, amount)
    }
}
