use anchor_lang::prelude::*;

use crate::controller::interest::update_market_indexes;
use crate::controller::matching::{promote_positions, reduce_delta};
use crate::controller::transaction::PoolTransfers;
use crate::controller::{emit_delta_record, PositionUpdate};
use crate::error::{ErrorCode, OverlayResult};
use crate::math::fixed_point::ray_div;
use crate::math::safe_math::SafeMath;
use crate::state::events::{PositionAction, PositionRecord};
use crate::state::market_map::MarketBook;
use crate::state::paused_operations::MarketOperation;
use crate::state::pool::PoolIndexes;
use crate::state::position::PositionSide;
use crate::state::state::State;
use crate::validate;


pub fn supply(
    state: &State,
    book: &mut MarketBook,
    pool_indexes: &PoolIndexes,
    account: &Pubkey,
    amount: u128,
) -> OverlayResult<PositionUpdate> {
    enter_position(state, book, PositionSide::Supply, pool_indexes, account, amount)
}

pub fn borrow(
    state: &State,
    book: &mut MarketBook,
    pool_indexes: &PoolIndexes,
    account: &Pubkey,
    amount: u128,
) -> OverlayResult<PositionUpdate> {
    enter_position(state, book, PositionSide::Borrow, pool_indexes, account, amount)
}

/// Adds `amount` of underlying to the `side` position of `account`.
///
/// The opposite side's delta is filled first, then the largest opposite pool
/// positions are promoted to p2p, and whatever is left goes to the pool.
fn enter_position(
    state: &State,
    book: &mut MarketBook,
    side: PositionSide,
    pool_indexes: &PoolIndexes,
    account: &Pubkey,
    amount: u128,
) -> OverlayResult<PositionUpdate> {
    let operation = match side {
        PositionSide::Supply => MarketOperation::Supply,
        PositionSide::Borrow => MarketOperation::Borrow,
    };

    book.market.validate_operation(state, operation)?;
    validate!(amount > 0, ErrorCode::AmountIsZero, "{:?} of zero", operation)?;

    let indexes = update_market_indexes(&mut book.market, pool_indexes)?;
    let counterparty = side.opposite();

    let mut transfers = PoolTransfers::default();
    let mut remaining = amount;
    let mut matched = 0_u128;

    if !book.market.is_p2p_disabled {
        let matched_delta = reduce_delta(book, counterparty, &indexes, remaining)?;
        matched = matched.safe_add(matched_delta)?;
        remaining = remaining.safe_sub(matched_delta)?;

        if remaining > 0 {
            let mut budget = book.market.get_matching_budget(state, operation);
            let promoted =
                promote_positions(book, counterparty, &indexes, remaining, &mut budget)?;
            matched = matched.safe_add(promoted)?;
            remaining = remaining.safe_sub(promoted)?;
        }
    }

    let mut balance = book.get_balance(side, account);

    if matched > 0 {
        let p2p_units = ray_div(matched, indexes.p2p_index(side))?;
        balance.in_p2p = balance.in_p2p.safe_add(p2p_units)?;

        let p2p_amount = book.market.delta.p2p_amount_mut(side);
        *p2p_amount = p2p_amount.safe_add(p2p_units)?;

        // the counterparty's pool position is closed with the caller's funds
        match counterparty {
            PositionSide::Borrow => transfers.repay(matched)?,
            PositionSide::Supply => transfers.withdraw(matched)?,
        }
    }

    if remaining > 0 {
        balance.on_pool = balance
            .on_pool
            .safe_add(ray_div(remaining, indexes.pool_index(side))?)?;

        match side {
            PositionSide::Supply => transfers.deposit(remaining)?,
            PositionSide::Borrow => transfers.borrow(remaining)?,
        }
    }

    book.set_balance(side, account, balance)?;

    emit!(PositionRecord {
        market_index: book.market.market_index,
        account: *account,
        side,
        action: match side {
            PositionSide::Supply => PositionAction::Supply,
            PositionSide::Borrow => PositionAction::Borrow,
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
