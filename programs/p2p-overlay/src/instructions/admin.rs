use anchor_lang::prelude::*;

use crate::controller;
use crate::controller::transaction::with_rollback;
use crate::error::OverlayResult;
use crate::math::p2p_index::P2PIndexes;
use crate::state::market_map::MarketMap;
use crate::state::pool::{LendingPool, PoolIndexes};
use crate::state::state::{MatchingBudget, State};

pub fn handle_initialize_market(
    state: &mut State,
    market_map: &mut MarketMap,
    pool: &dyn LendingPool,
    underlying: Pubkey,
    reserve_factor: u16,
    p2p_index_cursor: u16,
) -> OverlayResult<u16> {
    let pool_indexes = PoolIndexes::fetch(pool, &underlying)?;

    controller::admin::initialize_market(
        state,
        market_map,
        &pool_indexes,
        underlying,
        reserve_factor,
        p2p_index_cursor,
    )
}

pub fn handle_refresh_indexes(
    market_map: &mut MarketMap,
    pool: &dyn LendingPool,
    market_index: u16,
) -> OverlayResult<P2PIndexes> {
    let market = &mut market_map.get_ref_mut(&market_index)?.market;
    let pool_indexes = PoolIndexes::fetch(pool, &market.underlying)?;

    controller::interest::update_p2p_indexes(market, &pool_indexes)
}

pub fn handle_update_reserve_factor(
    market_map: &mut MarketMap,
    pool: &dyn LendingPool,
    market_index: u16,
    reserve_factor: u16,
) -> OverlayResult {
    let market = &mut market_map.get_ref_mut(&market_index)?.market;
    let pool_indexes = PoolIndexes::fetch(pool, &market.underlying)?;

    controller::admin::update_reserve_factor(market, &pool_indexes, reserve_factor)
}

pub fn handle_update_p2p_index_cursor(
    market_map: &mut MarketMap,
    pool: &dyn LendingPool,
    market_index: u16,
    p2p_index_cursor: u16,
) -> OverlayResult {
    let market = &mut market_map.get_ref_mut(&market_index)?.market;
    let pool_indexes = PoolIndexes::fetch(pool, &market.underlying)?;

    controller::admin::update_p2p_index_cursor(market, &pool_indexes, p2p_index_cursor)
}

pub fn handle_update_max_ranked_size(
    state: &mut State,
    market_map: &mut MarketMap,
    market_index: Option<u16>,
    max_ranked_size: u32,
) -> OverlayResult {
    controller::admin::update_max_ranked_size(state, market_map, market_index, max_ranked_size)
}

pub fn handle_update_matching_budget(
    state: &mut State,
    market_map: &mut MarketMap,
    market_index: Option<u16>,
    matching_budget: MatchingBudget,
) -> OverlayResult {
    controller::admin::update_matching_budget(state, market_map, market_index, matching_budget)
}

pub fn handle_update_paused_operations(
    market_map: &mut MarketMap,
    market_index: u16,
    paused_operations: u8,
) -> OverlayResult {
    let market = &mut market_map.get_ref_mut(&market_index)?.market;
    controller::admin::update_paused_operations(market, paused_operations)
}

pub fn handle_update_exchange_status(state: &mut State, exchange_status: u8) -> OverlayResult {
    controller::admin::update_exchange_status(state, exchange_status)
}

pub fn handle_update_p2p_disabled(
    market_map: &mut MarketMap,
    market_index: u16,
    is_p2p_disabled: bool,
) -> OverlayResult {
    let market = &mut market_map.get_ref_mut(&market_index)?.market;
    controller::admin::update_p2p_disabled(market, is_p2p_disabled)
}

pub fn handle_increase_p2p_deltas(
    market_map: &mut MarketMap,
    pool: &mut dyn LendingPool,
    market_index: u16,
    amount: u128,
) -> OverlayResult<u128> {
    let book = market_map.get_ref_mut(&market_index)?;
    let underlying = book.market.underlying;
    let pool_indexes = PoolIndexes::fetch(pool, &underlying)?;

    with_rollback(book, |book| {
        let (amount, transfers) =
            controller::admin::increase_p2p_deltas(&mut book.market, &pool_indexes, amount)?;
        transfers.execute(pool, &underlying)?;
        Ok(amount)
    })
}

pub fn handle_claim_to_treasury(
    market_map: &mut MarketMap,
    market_index: u16,
    amount: u128,
) -> OverlayResult<u128> {
    let market = &mut market_map.get_ref_mut(&market_index)?.market;
    controller::admin::claim_to_treasury(market, amount)
}
