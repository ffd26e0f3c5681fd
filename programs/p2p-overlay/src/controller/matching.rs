use anchor_lang::prelude::*;

use crate::error::{ErrorCode, OverlayResult};
use crate::math::fixed_point::{ray_div, ray_mul};
use crate::math::safe_math::{SafeMath, ZeroFloorSub};
use crate::state::events::{PositionAction, PositionRecord};
use crate::state::market::MarketIndexes;
use crate::state::market_map::MarketBook;
use crate::state::position::{Balance, PositionSide};
use crate::validate;

#[cfg(test)]
mod tests;

/// Moves up to `amount` of underlying from the pool balances of `side` into p2p,
/// largest pool positions first. Every visited entry costs one unit of `budget`.
///
/// Returns the amount matched, in underlying.
pub fn promote_positions(
    book: &mut MarketBook,
    side: PositionSide,
    indexes: &MarketIndexes,
    amount: u128,
    budget: &mut u32,
) -> OverlayResult<u128> {
    let pool_index = indexes.pool_index(side);
    let p2p_index = indexes.p2p_index(side);

    let mut remaining = amount;
    let mut matched = 0_u128;

    while remaining > 0 {
        let account = match book.on_pool_registry(side).head() {
            Some(account) => account,
            None => break,
        };

        if *budget == 0 {
            log_budget_exhausted(book, side, remaining);
            break;
        }
        *budget = budget.safe_sub(1)?;

        let mut balance = book.get_balance(side, &account);
        let on_pool_in_underlying = ray_mul(balance.on_pool, pool_index)?;

        let to_match = if on_pool_in_underlying > remaining {
            balance.on_pool = balance
                .on_pool
                .zero_floor_sub(ray_div(remaining, pool_index)?);
            remaining
        } else {
            balance.on_pool = 0;
            on_pool_in_underlying
        };

        let p2p_units = ray_div(to_match, p2p_index)?;
        balance.in_p2p = balance.in_p2p.safe_add(p2p_units)?;

        let p2p_amount = book.market.delta.p2p_amount_mut(side);
        *p2p_amount = p2p_amount.safe_add(p2p_units)?;

        book.set_balance(side, &account, balance)?;
        emit_rematch(book, side, &account, to_match, &balance);

        matched = matched.safe_add(to_match)?;
        remaining = remaining.safe_sub(to_match)?;
    }

    Ok(matched)
}

/// Moves up to `amount` of underlying from the p2p balances of `side` back to the
/// pool, largest p2p positions first. Every visited entry costs one unit of `budget`.
///
/// Returns the amount unmatched, in underlying.
pub fn demote_positions(
    book: &mut MarketBook,
    side: PositionSide,
    indexes: &MarketIndexes,
    amount: u128,
    budget: &mut u32,
) -> OverlayResult<u128> {
    let pool_index = indexes.pool_index(side);
    let p2p_index = indexes.p2p_index(side);

    let mut remaining = amount;
    let mut unmatched = 0_u128;

    while remaining > 0 {
        let account = match book.in_p2p_registry(side).head() {
            Some(account) => account,
            None => break,
        };

        if *budget == 0 {
            log_budget_exhausted(book, side, remaining);
            break;
        }
        *budget = budget.safe_sub(1)?;

        let mut balance = book.get_balance(side, &account);
        let in_p2p_in_underlying = ray_mul(balance.in_p2p, p2p_index)?;

        let (to_unmatch, p2p_units) = if in_p2p_in_underlying > remaining {
            (
                remaining,
                ray_div(remaining, p2p_index)?.min(balance.in_p2p),
            )
        } else {
            (in_p2p_in_underlying, balance.in_p2p)
        };

        balance.in_p2p = balance.in_p2p.safe_sub(p2p_units)?;
        balance.on_pool = balance
            .on_pool
            .safe_add(ray_div(to_unmatch, pool_index)?)?;

        decrease_p2p_amount(book, side, p2p_units)?;

        book.set_balance(side, &account, balance)?;
        emit_rematch(book, side, &account, to_unmatch, &balance);

        unmatched = unmatched.safe_add(to_unmatch)?;
        remaining = remaining.safe_sub(to_unmatch)?;
    }

    Ok(unmatched)
}

/// Consumes up to `amount` of underlying from the delta of `side`.
/// Costs no budget. Returns the amount taken, in underlying.
pub fn reduce_delta(
    book: &mut MarketBook,
    side: PositionSide,
    indexes: &MarketIndexes,
    amount: u128,
) -> OverlayResult<u128> {
    let delta = book.market.delta.p2p_delta(side);
    if delta == 0 || amount == 0 {
        return Ok(0);
    }

    let pool_index = indexes.pool_index(side);
    let delta_in_underlying = ray_mul(delta, pool_index)?;

    let (matched_delta, new_delta) = if delta_in_underlying <= amount {
        (delta_in_underlying, 0)
    } else {
        (amount, delta.zero_floor_sub(ray_div(amount, pool_index)?))
    };

    *book.market.delta.p2p_delta_mut(side) = new_delta;

    Ok(matched_delta)
}

pub fn decrease_p2p_amount(
    book: &mut MarketBook,
    side: PositionSide,
    p2p_units: u128,
) -> OverlayResult {
    let market_index = book.market.market_index;
    let p2p_amount = book.market.delta.p2p_amount_mut(side);

    validate!(
        *p2p_amount >= p2p_units,
        ErrorCode::AccountingInvariantBroken,
        "market {} {:?} p2p amount {} below position {}",
        market_index,
        side,
        *p2p_amount,
        p2p_units
    )?;

    *p2p_amount = p2p_amount.safe_sub(p2p_units)?;

    Ok(())
}

fn log_budget_exhausted(book: &MarketBook, side: PositionSide, remaining: u128) {
    msg!(
        "matching budget exhausted on market {} ({:?}), {} left unmatched",
        book.market.market_index,
        side,
        remaining
    );
}

fn emit_rematch(
    book: &MarketBook,
    side: PositionSide,
    account: &Pubkey,
    amount: u128,
    balance: &Balance,
) {
    emit!(PositionRecord {
        market_index: book.market.market_index,
        account: *account,
        side,
        action: PositionAction::Rematch,
        amount,
        on_pool: balance.on_pool,
        in_p2p: balance.in_p2p,
    });
}
