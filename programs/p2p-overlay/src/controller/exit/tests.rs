use anchor_lang::prelude::Pubkey;

use crate::controller::entry::{borrow, supply};
use crate::controller::exit::{repay, withdraw};
use crate::error::ErrorCode;
use crate::math::constants::RAY;
use crate::state::market_map::MarketBook;
use crate::state::pool::PoolIndexes;
use crate::state::position::{Balance, ExitAmount, PositionSide};
use crate::state::state::{MatchingBudget, State};
use crate::test_utils::{create_market_book, sum_in_p2p};

const POOL_SUPPLY_INDEX: u128 = 2 * RAY;
const POOL_BORROW_INDEX: u128 = 4 * RAY;
const AMOUNT: u128 = 10_000_000_000;

fn pool_indexes() -> PoolIndexes {
    PoolIndexes {
        supply: POOL_SUPPLY_INDEX,
        borrow: POOL_BORROW_INDEX,
    }
}

fn zero_exit_budget() -> State {
    State {
        default_matching_budget: MatchingBudget {
            withdraw: 0,
            repay: 0,
            ..MatchingBudget::default()
        },
        ..State::default()
    }
}

/// A supplier and a borrower matched for `AMOUNT`.
fn matched_pair(state: &State) -> (MarketBook, Pubkey, Pubkey) {
    let mut book = create_market_book(POOL_SUPPLY_INDEX, POOL_BORROW_INDEX);
    let supplier = Pubkey::new_unique();
    let borrower = Pubkey::new_unique();

    supply(state, &mut book, &pool_indexes(), &supplier, AMOUNT).unwrap();
    borrow(state, &mut book, &pool_indexes(), &borrower, AMOUNT).unwrap();

    assert_eq!(book.get_balance(PositionSide::Supply, &supplier).in_p2p, AMOUNT);
    assert_eq!(book.get_balance(PositionSide::Borrow, &borrower).in_p2p, AMOUNT);

    (book, supplier, borrower)
}

#[test]
fn withdraw_from_pool_only() {
    let state = State::default();
    let mut book = create_market_book(POOL_SUPPLY_INDEX, POOL_BORROW_INDEX);
    let supplier = Pubkey::new_unique();
    supply(&state, &mut book, &pool_indexes(), &supplier, AMOUNT).unwrap();

    let update = withdraw(
        &state,
        &mut book,
        &pool_indexes(),
        &supplier,
        ExitAmount::Exact(AMOUNT / 2),
    )
    .unwrap();

    assert_eq!(
        update.balance,
        Balance {
            on_pool: AMOUNT / 4,
            in_p2p: 0
        }
    );
    assert_eq!(update.transfers.to_withdraw, AMOUNT / 2);

    let update = withdraw(&state, &mut book, &pool_indexes(), &supplier, ExitAmount::All).unwrap();
    assert_eq!(update.amount, AMOUNT / 2);
    assert!(update.balance.is_empty());
    assert!(book.on_pool_registry(PositionSide::Supply).is_empty());
    // zeroed, not deleted
    assert!(book.balances(PositionSide::Supply).contains_key(&supplier));
}

#[test]
fn exit_preconditions() {
    let state = State::default();
    let mut book = create_market_book(POOL_SUPPLY_INDEX, POOL_BORROW_INDEX);
    let supplier = Pubkey::new_unique();
    supply(&state, &mut book, &pool_indexes(), &supplier, 1_000).unwrap();

    assert_eq!(
        withdraw(
            &state,
            &mut book,
            &pool_indexes(),
            &supplier,
            ExitAmount::Exact(1_001)
        ),
        Err(ErrorCode::InsufficientBalance)
    );
    assert_eq!(
        withdraw(
            &state,
            &mut book,
            &pool_indexes(),
            &supplier,
            ExitAmount::Exact(0)
        ),
        Err(ErrorCode::AmountIsZero)
    );
    assert_eq!(
        repay(
            &state,
            &mut book,
            &pool_indexes(),
            &supplier,
            ExitAmount::All
        ),
        Err(ErrorCode::AmountIsZero)
    );
    assert_eq!(
        book.get_balance(PositionSide::Supply, &supplier).on_pool,
        500
    );
}

#[test]
fn withdraw_promotes_replacement_supplier() {
    let state = State::default();
    let (mut book, supplier, borrower) = matched_pair(&state);
    let replacement = Pubkey::new_unique();
    supply(&state, &mut book, &pool_indexes(), &replacement, AMOUNT).unwrap();
    assert_eq!(
        book.get_balance(PositionSide::Supply, &replacement).on_pool,
        AMOUNT / 2
    );

    let update = withdraw(&state, &mut book, &pool_indexes(), &supplier, ExitAmount::All).unwrap();

    assert!(update.balance.is_empty());
    assert_eq!(update.transfers.to_withdraw, AMOUNT);
    assert_eq!(update.transfers.to_borrow, 0);
    assert_eq!(
        book.get_balance(PositionSide::Supply, &replacement),
        Balance {
            on_pool: 0,
            in_p2p: AMOUNT
        }
    );
    // the borrower never notices
    assert_eq!(
        book.get_balance(PositionSide::Borrow, &borrower),
        Balance {
            on_pool: 0,
            in_p2p: AMOUNT
        }
    );
    assert_eq!(book.market.delta.p2p_supply_amount, AMOUNT);
    assert_eq!(book.market.delta.p2p_borrow_delta, 0);
}

#[test]
fn withdraw_demotes_borrower() {
    let state = State::default();
    let (mut book, supplier, borrower) = matched_pair(&state);

    let update = withdraw(&state, &mut book, &pool_indexes(), &supplier, ExitAmount::All).unwrap();

    assert!(update.balance.is_empty());
    assert_eq!(update.transfers.to_borrow, AMOUNT);
    assert_eq!(
        book.get_balance(PositionSide::Borrow, &borrower),
        Balance {
            on_pool: AMOUNT / 4,
            in_p2p: 0
        }
    );
    assert_eq!(book.market.delta.p2p_supply_amount, 0);
    assert_eq!(book.market.delta.p2p_borrow_amount, 0);
    assert_eq!(book.market.delta.p2p_borrow_delta, 0);
    assert!(book.in_p2p_registry(PositionSide::Borrow).is_empty());
    assert_eq!(
        book.on_pool_registry(PositionSide::Borrow).head(),
        Some(borrower)
    );
}

#[test]
fn withdraw_without_budget_creates_borrow_delta() {
    let state = zero_exit_budget();
    let (mut book, supplier, borrower) = matched_pair(&state);

    let update = withdraw(
        &state,
        &mut book,
        &pool_indexes(),
        &supplier,
        ExitAmount::Exact(AMOUNT / 2),
    )
    .unwrap();

    assert_eq!(update.balance.in_p2p, AMOUNT / 2);
    assert_eq!(update.transfers.to_borrow, AMOUNT / 2);
    assert_eq!(book.market.delta.p2p_borrow_delta, AMOUNT / 8);
    assert_eq!(book.market.delta.p2p_supply_amount, AMOUNT / 2);
    assert_eq!(book.market.delta.p2p_borrow_amount, AMOUNT);
    assert_eq!(book.get_balance(PositionSide::Borrow, &borrower).in_p2p, AMOUNT);

    // a new supplier absorbs the delta before anything else
    let supplier_2 = Pubkey::new_unique();
    let update = supply(&state, &mut book, &pool_indexes(), &supplier_2, AMOUNT).unwrap();
    assert_eq!(book.market.delta.p2p_borrow_delta, 0);
    assert_eq!(
        update.balance,
        Balance {
            on_pool: AMOUNT / 4,
            in_p2p: AMOUNT / 2
        }
    );
    assert_eq!(update.transfers.to_repay, AMOUNT / 2);
}

#[test]
fn withdraw_consumes_own_supply_delta() {
    let state = State::default();
    let (mut book, supplier, _) = matched_pair(&state);
    book.market.delta.p2p_supply_delta = AMOUNT / 4;

    let update = withdraw(
        &state,
        &mut book,
        &pool_indexes(),
        &supplier,
        ExitAmount::Exact(AMOUNT / 4),
    )
    .unwrap();

    assert_eq!(book.market.delta.p2p_supply_delta, AMOUNT / 8);
    assert_eq!(update.transfers.to_withdraw, AMOUNT / 4);
    assert_eq!(update.transfers.to_borrow, 0);
    assert_eq!(book.market.delta.p2p_supply_amount, AMOUNT - AMOUNT / 4);
    assert_eq!(book.market.delta.p2p_borrow_amount, AMOUNT);
}

#[test]
fn repay_without_counterparty_creates_supply_delta() {
    let state = zero_exit_budget();
    let (mut book, supplier, borrower) = matched_pair(&state);

    let update = repay(&state, &mut book, &pool_indexes(), &borrower, ExitAmount::All).unwrap();

    assert!(update.balance.is_empty());
    assert_eq!(update.amount, AMOUNT);
    assert_eq!(update.transfers.to_deposit, AMOUNT);
    // the repaid p2p notional in pool units
    assert_eq!(book.market.delta.p2p_supply_delta, AMOUNT / 2);
    assert_eq!(book.market.delta.p2p_borrow_amount, 0);
    assert_eq!(book.market.delta.p2p_supply_amount, AMOUNT);
    assert_eq!(book.get_balance(PositionSide::Supply, &supplier).in_p2p, AMOUNT);
    assert_eq!(book.market.treasury_balance, 0);
}

#[test]
fn repay_demotes_supplier() {
    let state = State::default();
    let (mut book, supplier, borrower) = matched_pair(&state);

    let update = repay(&state, &mut book, &pool_indexes(), &borrower, ExitAmount::All).unwrap();

    assert_eq!(update.transfers.to_deposit, AMOUNT);
    assert_eq!(book.market.delta.p2p_supply_delta, 0);
    assert_eq!(
        book.get_balance(PositionSide::Supply, &supplier),
        Balance {
            on_pool: AMOUNT / 2,
            in_p2p: 0
        }
    );
}

#[test]
fn repay_pool_debt_first() {
    let state = State::default();
    let (mut book, _, borrower) = matched_pair(&state);
    borrow(&state, &mut book, &pool_indexes(), &borrower, 4_000).unwrap();
    assert_eq!(book.get_balance(PositionSide::Borrow, &borrower).on_pool, 1_000);

    let update = repay(
        &state,
        &mut book,
        &pool_indexes(),
        &borrower,
        ExitAmount::Exact(6_000),
    )
    .unwrap();

    assert_eq!(
        update.balance,
        Balance {
            on_pool: 0,
            in_p2p: AMOUNT - 2_000
        }
    );
    assert_eq!(update.transfers.to_repay, 4_000);
    assert_eq!(update.transfers.to_deposit, 2_000);
}

#[test]
fn repay_settles_reserve_fee() {
    let state = State::default();
    let (mut book, supplier, borrower) = matched_pair(&state);
    book.market.reserve_factor = 10_000;
    book.market.p2p_index_cursor = 5_000;

    // supply +1%, borrow +3%
    let moved = PoolIndexes {
        supply: POOL_SUPPLY_INDEX + POOL_SUPPLY_INDEX / 100,
        borrow: POOL_BORROW_INDEX + 3 * POOL_BORROW_INDEX / 100,
    };

    let update = repay(&state, &mut book, &moved, &borrower, ExitAmount::All).unwrap();

    assert_eq!(book.market.p2p_supply_index, RAY + RAY / 100);
    assert_eq!(book.market.p2p_borrow_index, RAY + 3 * RAY / 100);
    assert_eq!(update.amount, 10_300_000_000);
    assert_eq!(book.market.treasury_balance, 200_000_000);
    assert_eq!(update.transfers.to_deposit, 10_100_000_000);
    assert_eq!(
        book.get_balance(PositionSide::Supply, &supplier),
        Balance {
            on_pool: AMOUNT / 2,
            in_p2p: 0
        }
    );
    assert_eq!(book.market.delta.p2p_supply_amount, 0);
    assert_eq!(book.market.delta.p2p_supply_delta, 0);
}

#[test]
fn p2p_disabled_still_unwinds() {
    let state = State::default();
    let (mut book, supplier, borrower) = matched_pair(&state);
    let replacement = Pubkey::new_unique();
    supply(&state, &mut book, &pool_indexes(), &replacement, AMOUNT).unwrap();
    book.market.is_p2p_disabled = true;

    withdraw(&state, &mut book, &pool_indexes(), &supplier, ExitAmount::All).unwrap();

    // no promotion, the borrower is demoted instead
    assert_eq!(
        book.get_balance(PositionSide::Supply, &replacement).in_p2p,
        0
    );
    assert_eq!(
        book.get_balance(PositionSide::Borrow, &borrower),
        Balance {
            on_pool: AMOUNT / 4,
            in_p2p: 0
        }
    );
}

#[test]
fn promotion_and_demotion_share_budget() {
    let state = State {
        default_matching_budget: MatchingBudget {
            withdraw: 2,
            ..MatchingBudget::default()
        },
        ..State::default()
    };
    let mut book = create_market_book(POOL_SUPPLY_INDEX, POOL_BORROW_INDEX);

    let borrowers: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
    for borrower in borrowers.iter() {
        borrow(&state, &mut book, &pool_indexes(), borrower, 4_000).unwrap();
    }
    let supplier = Pubkey::new_unique();
    supply(&state, &mut book, &pool_indexes(), &supplier, 12_000).unwrap();

    let replacement = Pubkey::new_unique();
    supply(&state, &mut book, &pool_indexes(), &replacement, 4_000).unwrap();

    let update = withdraw(&state, &mut book, &pool_indexes(), &supplier, ExitAmount::All).unwrap();
    assert_eq!(update.amount, 12_000);

    // one unit for the replacement, one for a single demotion
    assert_eq!(
        book.get_balance(PositionSide::Supply, &replacement).in_p2p,
        4_000
    );
    let demoted = borrowers
        .iter()
        .filter(|borrower| book.get_balance(PositionSide::Borrow, borrower).in_p2p == 0)
        .count();
    assert_eq!(demoted, 1);
    assert_eq!(book.market.delta.p2p_borrow_delta, 1_000);
    assert_eq!(update.transfers.to_withdraw, 4_000);
    assert_eq!(update.transfers.to_borrow, 8_000);

    assert_eq!(sum_in_p2p(&book, PositionSide::Supply), book.market.delta.p2p_supply_amount);
    assert_eq!(sum_in_p2p(&book, PositionSide::Borrow), book.market.delta.p2p_borrow_amount);
}
