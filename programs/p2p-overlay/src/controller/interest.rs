use anchor_lang::prelude::*;

use crate::error::OverlayResult;
use crate::math::p2p_index::P2PIndexes;
use crate::state::events::P2PIndexesRecord;
use crate::state::market::{Market, MarketIndexes};
use crate::state::pool::PoolIndexes;


/// Brings the market's p2p indexes up to the pool's current indexes.
pub fn update_p2p_indexes(
    market: &mut Market,
    pool_indexes: &PoolIndexes,
) -> OverlayResult<P2PIndexes> {
    let p2p_indexes = get_virtual_p2p_indexes(market, pool_indexes)?;

    if pool_indexes.supply == market.last_pool_supply_index
        && pool_indexes.borrow == market.last_pool_borrow_index
    {
        return Ok(p2p_indexes);
    }

    market.p2p_supply_index = p2p_indexes.p2p_supply_index;
    market.p2p_borrow_index = p2p_indexes.p2p_borrow_index;
    market.last_pool_supply_index = pool_indexes.supply;
    market.last_pool_borrow_index = pool_indexes.borrow;

    emit!(P2PIndexesRecord {
        market_index: market.market_index,
        pool_supply_index: pool_indexes.supply,
        pool_borrow_index: pool_indexes.borrow,
        p2p_supply_index: market.p2p_supply_index,
        p2p_borrow_index: market.p2p_borrow_index,
    });

    Ok(p2p_indexes)
}

pub fn update_market_indexes(
    market: &mut Market,
    pool_indexes: &PoolIndexes,
) -> OverlayResult<MarketIndexes> {
    let p2p_indexes = update_p2p_indexes(market, pool_indexes)?;
    Ok(MarketIndexes::new(pool_indexes, &p2p_indexes))
}

/// Indexes the market would have after a refresh, without touching it.
pub fn get_virtual_p2p_indexes(
    market: &Market,
    pool_indexes: &PoolIndexes,
) -> OverlayResult<P2PIndexes> {
    if pool_indexes.supply == market.last_pool_supply_index
        && pool_indexes.borrow == market.last_pool_borrow_index
    {
        return Ok(P2PIndexes {
            p2p_supply_index: market.p2p_supply_index,
            p2p_borrow_index: market.p2p_borrow_index,
        });
    }

    market.get_p2p_indexes(pool_indexes.supply, pool_indexes.borrow)
}
