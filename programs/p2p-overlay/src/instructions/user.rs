use anchor_lang::prelude::*;

use crate::controller;
use crate::controller::transaction::with_rollback;
use crate::controller::PositionUpdate;
use crate::error::OverlayResult;
use crate::state::market_map::MarketMap;
use crate::state::pool::{LendingPool, PoolIndexes};
use crate::state::position::{ExitAmount, PositionSide, PositionSummary};
use crate::state::state::State;

pub fn handle_supply(
    state: &State,
    market_map: &mut MarketMap,
    pool: &mut dyn LendingPool,
    market_index: u16,
    account: &Pubkey,
    amount: u128,
) -> OverlayResult<PositionSummary> {
    let book = market_map.get_ref_mut(&market_index)?;
    let underlying = book.market.underlying;
    let pool_indexes = PoolIndexes::fetch(pool, &underlying)?;

    let update = with_rollback(book, |book| {
        let update = controller::entry::supply(state, book, &pool_indexes, account, amount)?;
        update.transfers.execute(pool, &underlying)?;
        Ok(update)
    })?;

    summarize(&update, PositionSide::Supply)
}

pub fn handle_borrow(
    state: &State,
    market_map: &mut MarketMap,
    pool: &mut dyn LendingPool,
    market_index: u16,
    account: &Pubkey,
    amount: u128,
) -> OverlayResult<PositionSummary> {
    let book = market_map.get_ref_mut(&market_index)?;
    let underlying = book.market.underlying;
    let pool_indexes = PoolIndexes::fetch(pool, &underlying)?;

    let update = with_rollback(book, |book| {
        let update = controller::entry::borrow(state, book, &pool_indexes, account, amount)?;
        update.transfers.execute(pool, &underlying)?;
        Ok(update)
    })?;

    summarize(&update, PositionSide::Borrow)
}

pub fn handle_withdraw(
    state: &State,
    market_map: &mut MarketMap,
    pool: &mut dyn LendingPool,
    market_index: u16,
    account: &Pubkey,
    amount: ExitAmount,
) -> OverlayResult<PositionSummary> {
    let book = market_map.get_ref_mut(&market_index)?;
    let underlying = book.market.underlying;
    let pool_indexes = PoolIndexes::fetch(pool, &underlying)?;

    let update = with_rollback(book, |book| {
        let update = controller::exit::withdraw(state, book, &pool_indexes, account, amount)?;
        update.transfers.execute(pool, &underlying)?;
        Ok(update)
    })?;

    summarize(&update, PositionSide::Supply)
}

pub fn handle_repay(
    state: &State,
    market_map: &mut MarketMap,
    pool: &mut dyn LendingPool,
    market_index: u16,
    account: &Pubkey,
    amount: ExitAmount,
) -> OverlayResult<PositionSummary> {
    let book = market_map.get_ref_mut(&market_index)?;
    let underlying = book.market.underlying;
    let pool_indexes = PoolIndexes::fetch(pool, &underlying)?;

    let update = with_rollback(book, |book| {
        let update = controller::exit::repay(state, book, &pool_indexes, account, amount)?;
        update.transfers.execute(pool, &underlying)?;
        Ok(update)
    })?;

    summarize(&update, PositionSide::Borrow)
}

fn summarize(update: &PositionUpdate, side: PositionSide) -> OverlayResult<PositionSummary> {
    PositionSummary::new(
        &update.balance,
        update.indexes.pool_index(side),
        update.indexes.p2p_index(side),
    )
}
