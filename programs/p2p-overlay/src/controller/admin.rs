use anchor_lang::prelude::*;
use enumflags2::BitFlags;

use crate::controller::emit_delta_record;
use crate::controller::interest::update_market_indexes;
use crate::controller::transaction::PoolTransfers;
use crate::error::{ErrorCode, OverlayResult};
use crate::math::constants::RAY;
use crate::math::fixed_point::ray_div;
use crate::math::safe_math::SafeMath;
use crate::state::events::{MarketCreatedRecord, TreasuryClaimRecord};
use crate::state::market::Market;
use crate::state::market_map::{MarketBook, MarketMap};
use crate::state::paused_operations::MarketOperation;
use crate::state::pool::PoolIndexes;
use crate::state::state::{validate_max_ranked_size, ExchangeStatus, MatchingBudget, State};
use crate::{math_error, safe_increment, validate};


pub fn initialize_market(
    state: &mut State,
    market_map: &mut MarketMap,
    pool_indexes: &PoolIndexes,
    underlying: Pubkey,
    reserve_factor: u16,
    p2p_index_cursor: u16,
) -> OverlayResult<u16> {
    if let Some(market_index) = market_map.find_by_underlying(&underlying) {
        msg!("{} already listed as market {}", underlying, market_index);
        return Err(ErrorCode::MarketAlreadyCreated);
    }

    validate!(
        pool_indexes.supply != 0 && pool_indexes.borrow != 0,
        ErrorCode::InvalidPoolIndex,
        "pool indexes for {} must be non zero",
        underlying
    )?;

    let market_index = state.number_of_markets;
    let market = Market {
        market_index,
        underlying,
        p2p_supply_index: RAY,
        p2p_borrow_index: RAY,
        last_pool_supply_index: pool_indexes.supply,
        last_pool_borrow_index: pool_indexes.borrow,
        reserve_factor,
        p2p_index_cursor,
        ..Market::default()
    };
    market.validate_config()?;

    market_map.insert(MarketBook::new(market, state.default_max_ranked_size))?;
    safe_increment!(state.number_of_markets, 1);

    emit!(MarketCreatedRecord {
        market_index,
        underlying,
        reserve_factor,
        p2p_index_cursor,
        pool_supply_index: pool_indexes.supply,
        pool_borrow_index: pool_indexes.borrow,
    });

    Ok(market_index)
}

pub fn update_reserve_factor(
    market: &mut Market,
    pool_indexes: &PoolIndexes,
    reserve_factor: u16,
) -> OverlayResult {
    let mut updated = *market;
    updated.reserve_factor = reserve_factor;
    updated.validate_config()?;

    // accrue under the old parameters
    update_market_indexes(market, pool_indexes)?;

    msg!(
        "market {} reserve_factor: {} -> {}",
        market.market_index,
        market.reserve_factor,
        reserve_factor
    );
    market.reserve_factor = reserve_factor;

    Ok(())
}

pub fn update_p2p_index_cursor(
    market: &mut Market,
    pool_indexes: &PoolIndexes,
    p2p_index_cursor: u16,
) -> OverlayResult {
    let mut updated = *market;
    updated.p2p_index_cursor = p2p_index_cursor;
    updated.validate_config()?;

    update_market_indexes(market, pool_indexes)?;

    msg!(
        "market {} p2p_index_cursor: {} -> {}",
        market.market_index,
        market.p2p_index_cursor,
        p2p_index_cursor
    );
    market.p2p_index_cursor = p2p_index_cursor;

    Ok(())
}

/// Sets the market's ranked size, or the default of every market without an
/// override when `market_index` is `None`.
pub fn update_max_ranked_size(
    state: &mut State,
    market_map: &mut MarketMap,
    market_index: Option<u16>,
    max_ranked_size: u32,
) -> OverlayResult {
    validate_max_ranked_size(max_ranked_size)?;

    match market_index {
        Some(market_index) => {
            let book = market_map.get_ref_mut(&market_index)?;
            msg!(
                "market {} max_ranked_size: {} -> {}",
                market_index,
                book.market.get_max_ranked_size(state),
                max_ranked_size
            );
            book.market.max_ranked_size = Some(max_ranked_size);
            book.set_max_ranked_size(max_ranked_size)?;
        }
        None => {
            msg!(
                "default_max_ranked_size: {} -> {}",
                state.default_max_ranked_size,
                max_ranked_size
            );
            state.default_max_ranked_size = max_ranked_size;

            for book in market_map.0.values_mut() {
                if book.market.max_ranked_size.is_none() {
                    book.set_max_ranked_size(max_ranked_size)?;
                }
            }
        }
    }

    Ok(())
}

pub fn update_matching_budget(
    state: &mut State,
    market_map: &mut MarketMap,
    market_index: Option<u16>,
    matching_budget: MatchingBudget,
) -> OverlayResult {
    match market_index {
        Some(market_index) => {
            let market = &mut market_map.get_ref_mut(&market_index)?.market;
            msg!(
                "market {} matching_budget: {:?} -> {:?}",
                market_index,
                market.matching_budget.unwrap_or(state.default_matching_budget),
                matching_budget
            );
            market.matching_budget = Some(matching_budget);
        }
        None => {
            msg!(
                "default_matching_budget: {:?} -> {:?}",
                state.default_matching_budget,
                matching_budget
            );
            state.default_matching_budget = matching_budget;
        }
    }

    Ok(())
}

pub fn update_paused_operations(market: &mut Market, paused_operations: u8) -> OverlayResult {
    validate!(
        paused_operations & !MarketOperation::all() == 0,
        ErrorCode::InvalidPausedOperations,
        "unknown paused operations {:#010b}",
        paused_operations
    )?;

    market.paused_operations = paused_operations;
    MarketOperation::log_all_operations_paused(market.paused_operations);

    Ok(())
}

pub fn update_exchange_status(state: &mut State, exchange_status: u8) -> OverlayResult {
    validate!(
        BitFlags::<ExchangeStatus>::from_bits(usize::from(exchange_status)).is_ok(),
        ErrorCode::InvalidExchangeStatus,
        "unknown exchange status {:#010b}",
        exchange_status
    )?;

    msg!(
        "exchange_status: {:#010b} -> {:#010b}",
        state.exchange_status,
        exchange_status
    );
    state.exchange_status = exchange_status;

    Ok(())
}

pub fn update_p2p_disabled(market: &mut Market, is_p2p_disabled: bool) -> OverlayResult {
    msg!(
        "market {} is_p2p_disabled: {} -> {}",
        market.market_index,
        market.is_p2p_disabled,
        is_p2p_disabled
    );
    market.is_p2p_disabled = is_p2p_disabled;

    Ok(())
}

/// Moves up to `amount` of matched liquidity back onto the pool on both sides.
/// Returns the pool transfers to execute and the amount actually moved.
pub fn increase_p2p_deltas(
    market: &mut Market,
    pool_indexes: &PoolIndexes,
    amount: u128,
) -> OverlayResult<(u128, PoolTransfers)> {
    validate!(amount > 0, ErrorCode::AmountIsZero, "delta increase of zero")?;

    let indexes = update_market_indexes(market, pool_indexes)?;
    let delta = market.delta;

    let matched_supply = market.get_matched_supply(indexes.pool_supply_index)?;
    let matched_borrow = market.get_matched_borrow(indexes.pool_borrow_index)?;

    let amount = amount.min(matched_supply).min(matched_borrow);
    validate!(
        amount > 0,
        ErrorCode::AmountIsZero,
        "market {} has no matched liquidity",
        market.market_index
    )?;

    market.delta.p2p_supply_delta = delta
        .p2p_supply_delta
        .safe_add(ray_div(amount, indexes.pool_supply_index)?)?;
    market.delta.p2p_borrow_delta = delta
        .p2p_borrow_delta
        .safe_add(ray_div(amount, indexes.pool_borrow_index)?)?;

    let mut transfers = PoolTransfers::default();
    transfers.borrow(amount)?;
    transfers.deposit(amount)?;

    emit_delta_record(market);

    Ok((amount, transfers))
}

/// Takes up to `amount` of the accrued reserve fee out of the market.
pub fn claim_to_treasury(market: &mut Market, amount: u128) -> OverlayResult<u128> {
    validate!(amount > 0, ErrorCode::AmountIsZero, "claim of zero")?;
    validate!(
        market.treasury_balance > 0,
        ErrorCode::NothingToClaim,
        "market {} treasury balance is empty",
        market.market_index
    )?;

    let claimed = amount.min(market.treasury_balance);
    market.treasury_balance = market.treasury_balance.safe_sub(claimed)?;

    emit!(TreasuryClaimRecord {
        market_index: market.market_index,
        amount: claimed,
        treasury_balance_after: market.treasury_balance,
    });

    Ok(claimed)
}
