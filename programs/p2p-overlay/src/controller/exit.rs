use anchor_lang::prelude::*;

use crate::controller::interest::{get_virtual_p2p_indexes, update_market_indexes};
use crate::controller::matching::{
    decrease_p2p_amount, demote_positions, promote_positions, reduce_delta,
};
use crate::controller::transaction::PoolTransfers;
use crate::controller::{emit_delta_record, PositionUpdate};
use crate::error::{ErrorCode, OverlayResult};
use crate::math::fixed_point::{ray_div, ray_mul};
use crate::math::safe_math::{SafeMath, ZeroFloorSub};
use crate::state::events::{PositionAction, PositionRecord};
use crate::state::market::MarketIndexes;
use crate::state::market_map::MarketBook;
use crate::state::paused_operations::MarketOperation;
use crate::state::pool::PoolIndexes;
use crate::state::position::{ExitAmount, PositionSide};
use crate::state::state::State;
use crate::validate;

#[cfg(test)]
mod tests;

pub fn withdraw(
    state: &State,
    book: &mut MarketBook,
    pool_indexes: &PoolIndexes,
    account: &Pubkey,
    amount: ExitAmount,
) -> OverlayResult<PositionUpdate> {
    exit_position(state, book, PositionSide::Supply, pool_indexes, account, amount)
}

pub fn repay(
    state: &State,
    book: &mut MarketBook,
    pool_indexes: &PoolIndexes,
    account: &Pubkey,
    amount: ExitAmount,
) -> OverlayResult<PositionUpdate> {
    exit_position(state, book, PositionSide::Borrow, pool_indexes, account, amount)
}

/// Resolves the underlying amount an exit removes, against virtually refreshed indexes.
pub fn calculate_exit_amount(
    book: &MarketBook,
    side: PositionSide,
    pool_indexes: &PoolIndexes,
    account: &Pubkey,
    amount: ExitAmount,
) -> OverlayResult<u128> {
    let p2p_indexes = get_virtual_p2p_indexes(&book.market, pool_indexes)?;
    let indexes = MarketIndexes::new(pool_indexes, &p2p_indexes);

    let total = book
        .get_balance(side, account)
        .total_in_underlying(indexes.pool_index(side), indexes.p2p_index(side))?;

    match amount {
        ExitAmount::Exact(amount) => {
            validate!(amount > 0, ErrorCode::AmountIsZero, "exit of zero")?;
            validate!(
                amount <= total,
                ErrorCode::InsufficientBalance,
                "{:?} exit of {} exceeds position {}",
                side,
                amount,
                total
            )?;
            Ok(amount)
        }
        ExitAmount::All => {
            validate!(
                total > 0,
                ErrorCode::AmountIsZero,
                "{:?} position of {} is empty",
                side,
                account
            )?;
            Ok(total)
        }
    }
}

/// Removes underlying from the `side` position of `account`.
///
/// The caller's pool balance goes first. Removing p2p balance then consumes the
/// caller's side delta, promotes same side pool positions as replacements and
/// finally demotes p2p counterparties to the pool. Whatever cannot be demoted
/// within budget stays matched and becomes counterparty delta.
fn exit_position(
    state: &State,
    book: &mut MarketBook,
    side: PositionSide,
    pool_indexes: &PoolIndexes,
    account: &Pubkey,
    amount: ExitAmount,
) -> OverlayResult<PositionUpdate> {
    let operation = match side {
        PositionSide::Supply => MarketOperation::Withdraw,
        PositionSide::Borrow => MarketOperation::Repay,
    };

    book.market.validate_operation(state, operation)?;
    let amount = calculate_exit_amount(book, side, pool_indexes, account, amount)?;

    let indexes = update_market_indexes(&mut book.market, pool_indexes)?;
    let counterparty = side.opposite();
    let pool_index = indexes.pool_index(side);
    let p2p_index = indexes.p2p_index(side);

    let mut transfers = PoolTransfers::default();
    let mut balance = book.get_balance(side, account);
    let mut remaining = amount;

    if balance.on_pool > 0 {
        let on_pool_in_underlying = ray_mul(balance.on_pool, pool_index)?;

        let from_pool = if on_pool_in_underlying <= remaining {
            balance.on_pool = 0;
            on_pool_in_underlying
        } else {
            balance.on_pool = balance
                .on_pool
                .zero_floor_sub(ray_div(remaining, pool_index)?);
            remaining
        };

        exit_pool(&mut transfers, side, from_pool)?;
        remaining = remaining.safe_sub(from_pool)?;
    }

    if remaining > 0 {
        let in_p2p_in_underlying = ray_mul(balance.in_p2p, p2p_index)?;
        let p2p_units = if remaining >= in_p2p_in_underlying {
            balance.in_p2p
        } else {
            ray_div(remaining, p2p_index)?.min(balance.in_p2p)
        };

        balance.in_p2p = balance.in_p2p.safe_sub(p2p_units)?;
        decrease_p2p_amount(book, side, p2p_units)?;
    }

    book.set_balance(side, account, balance)?;

    if remaining > 0 {
        let matched_delta = reduce_delta(book, side, &indexes, remaining)?;
        exit_pool(&mut transfers, side, matched_delta)?;
        remaining = remaining.safe_sub(matched_delta)?;
    }

    if remaining > 0 && side == PositionSide::Borrow {
        let fee_repaid = repay_fee(book, &indexes, remaining)?;
        remaining = remaining.safe_sub(fee_repaid)?;
    }

    let mut budget = book.market.get_matching_budget(state, operation);

    if remaining > 0 && !book.market.is_p2p_disabled {
        let promoted = promote_positions(book, side, &indexes, remaining, &mut budget)?;
        exit_pool(&mut transfers, side, promoted)?;
        remaining = remaining.safe_sub(promoted)?;
    }

    if remaining > 0 {
        let demoted = demote_positions(book, counterparty, &indexes, remaining, &mut budget)?;

        let undemoted = remaining.safe_sub(demoted)?;
        if undemoted > 0 {
            let delta = book.market.delta.p2p_delta_mut(counterparty);
            *delta = delta.safe_add(ray_div(undemoted, indexes.pool_index(counterparty))?)?;
        }

        // demoted and undemoted counterparties alike are now backed by the pool
        match counterparty {
            PositionSide::Borrow => transfers.borrow(remaining)?,
            PositionSide::Supply => transfers.deposit(remaining)?,
        }
    }

    emit!(PositionRecord {
        market_index: book.market.market_index,
        account: *account,
        side,
        action: match side {
            PositionSide::Supply => PositionAction::Withdraw,
            PositionSide::Borrow => PositionAction::Repay,
        },
        amount,
        on_pool: balance.on_pool,
        in_p2p: balance.in_p2p,
    });
    emit_delta_record(&book.market);

    Ok(PositionUpdate {
        amount,
        balance,
        indexes,
        transfers,
    })
}

fn exit_pool(transfers: &mut PoolTransfers, side: PositionSide, amount: u128) -> OverlayResult {
    if amount == 0 {
        return Ok(());
    }

    match side {
        PositionSide::Supply => transfers.withdraw(amount),
        PositionSide::Borrow => transfers.repay(amount),
    }
}

/// Part of the p2p borrow mass not owed to p2p suppliers is the reserve's cut of
/// the spread. A repaying p2p borrower settles it first and it accrues to the treasury.
fn repay_fee(
    book: &mut MarketBook,
    indexes: &MarketIndexes,
    remaining: u128,
) -> OverlayResult<u128> {
    let delta = book.market.delta;

    let p2p_borrow_in_underlying = ray_mul(delta.p2p_borrow_amount, indexes.p2p_borrow_index)?
        .safe_add(remaining)?;
    let matched_supply = ray_mul(delta.p2p_supply_amount, indexes.p2p_supply_index)?
        .zero_floor_sub(ray_mul(delta.p2p_supply_delta, indexes.pool_supply_index)?);

    let fee_repaid = p2p_borrow_in_underlying
        .zero_floor_sub(matched_supply)
        .min(remaining);

    if fee_repaid > 0 {
        book.market.treasury_balance = book.market.treasury_balance.safe_add(fee_repaid)?;
        msg!(
            "market {} repaid fee {}, treasury balance {}",
            book.market.market_index,
            fee_repaid,
            book.market.treasury_balance
        );
    }

    Ok(fee_repaid)
}
