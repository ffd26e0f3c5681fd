use anchor_lang::prelude::*;

use crate::controller::interest::get_virtual_p2p_indexes;
use crate::error::OverlayResult;
use crate::math::fixed_point::ray_mul;
use crate::math::p2p_index::P2PIndexes;
use crate::state::market::{Delta, MarketIndexes};
use crate::state::market_map::MarketMap;
use crate::state::pool::{LendingPool, PoolIndexes};
use crate::state::position::{Placement, PositionSide, PositionSummary};

pub fn get_virtual_market_indexes(
    market_map: &MarketMap,
    pool: &dyn LendingPool,
    market_index: u16,
) -> OverlayResult<MarketIndexes> {
    let market = &market_map.get_ref(&market_index)?.market;
    let pool_indexes = PoolIndexes::fetch(pool, &market.underlying)?;
    let p2p_indexes = get_virtual_p2p_indexes(market, &pool_indexes)?;

    Ok(MarketIndexes::new(&pool_indexes, &p2p_indexes))
}

pub fn get_virtual_p2p_indexes_for_market(
    market_map: &MarketMap,
    pool: &dyn LendingPool,
    market_index: u16,
) -> OverlayResult<P2PIndexes> {
    let indexes = get_virtual_market_indexes(market_map, pool, market_index)?;

    Ok(P2PIndexes {
        p2p_supply_index: indexes.p2p_supply_index,
        p2p_borrow_index: indexes.p2p_borrow_index,
    })
}

pub fn get_current_balance(
    market_map: &MarketMap,
    pool: &dyn LendingPool,
    market_index: u16,
    side: PositionSide,
    account: &Pubkey,
) -> OverlayResult<PositionSummary> {
    let indexes = get_virtual_market_indexes(market_map, pool, market_index)?;
    let balance = market_map
        .get_ref(&market_index)?
        .get_balance(side, account);

    PositionSummary::new(
        &balance,
        indexes.pool_index(side),
        indexes.p2p_index(side),
    )
}

pub fn get_market_delta(market_map: &MarketMap, market_index: u16) -> OverlayResult<Delta> {
    Ok(market_map.get_ref(&market_index)?.market.delta)
}

/// Total p2p credit (or debt) of a side in underlying, delta included.
pub fn get_p2p_amount_in_underlying(
    market_map: &MarketMap,
    pool: &dyn LendingPool,
    market_index: u16,
    side: PositionSide,
) -> OverlayResult<u128> {
    let indexes = get_virtual_market_indexes(market_map, pool, market_index)?;
    let delta = market_map.get_ref(&market_index)?.market.delta;

    ray_mul(delta.p2p_amount(side), indexes.p2p_index(side))
}

pub fn get_registry_head(
    market_map: &MarketMap,
    market_index: u16,
    side: PositionSide,
    placement: Placement,
) -> OverlayResult<Option<Pubkey>> {
    let book = market_map.get_ref(&market_index)?;

    Ok(match placement {
        Placement::OnPool => book.on_pool_registry(side).head(),
        Placement::InP2P => book.in_p2p_registry(side).head(),
    })
}

pub fn get_registry_next(
    market_map: &MarketMap,
    market_index: u16,
    side: PositionSide,
    placement: Placement,
    account: &Pubkey,
) -> OverlayResult<Option<Pubkey>> {
    let book = market_map.get_ref(&market_index)?;

    match placement {
        Placement::OnPool => book.on_pool_registry(side).next(account),
        Placement::InP2P => book.in_p2p_registry(side).next(account),
    }
}
