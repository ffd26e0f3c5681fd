use anchor_lang::prelude::Pubkey;

use crate::controller::matching::{
    decrease_p2p_amount, demote_positions, promote_positions, reduce_delta,
};
use crate::error::ErrorCode;
use crate::math::constants::RAY;
use crate::state::market::MarketIndexes;
use crate::state::market_map::MarketBook;
use crate::state::position::{Balance, PositionSide};
use crate::test_utils::{create_market_book, sum_in_p2p};

fn indexes() -> MarketIndexes {
    MarketIndexes {
        pool_supply_index: 2 * RAY,
        pool_borrow_index: 4 * RAY,
        p2p_supply_index: RAY,
        p2p_borrow_index: RAY,
    }
}

fn book_with_pool_suppliers(on_pool: &[u128]) -> (MarketBook, Vec<Pubkey>) {
    let mut book = create_market_book(2 * RAY, 4 * RAY);
    let accounts: Vec<Pubkey> = on_pool.iter().map(|_| Pubkey::new_unique()).collect();
    for (account, on_pool) in accounts.iter().zip(on_pool) {
        book.set_balance(
            PositionSide::Supply,
            account,
            Balance {
                on_pool: *on_pool,
                in_p2p: 0,
            },
        )
        .unwrap();
    }
    (book, accounts)
}

fn book_with_p2p_suppliers(in_p2p: &[u128]) -> (MarketBook, Vec<Pubkey>) {
    let mut book = create_market_book(2 * RAY, 4 * RAY);
    let accounts: Vec<Pubkey> = in_p2p.iter().map(|_| Pubkey::new_unique()).collect();
    for (account, in_p2p) in accounts.iter().zip(in_p2p) {
        book.set_balance(
            PositionSide::Supply,
            account,
            Balance {
                on_pool: 0,
                in_p2p: *in_p2p,
            },
        )
        .unwrap();
    }
    book.market.delta.p2p_supply_amount = in_p2p.iter().sum();
    (book, accounts)
}

#[test]
fn promote_largest_first() {
    let (mut book, accounts) = book_with_pool_suppliers(&[100, 10, 50]);
    let mut budget = 10;

    let matched =
        promote_positions(&mut book, PositionSide::Supply, &indexes(), 250, &mut budget).unwrap();

    assert_eq!(matched, 250);
    assert_eq!(budget, 8);
    assert_eq!(
        book.get_balance(PositionSide::Supply, &accounts[0]),
        Balance {
            on_pool: 0,
            in_p2p: 200
        }
    );
    assert_eq!(
        book.get_balance(PositionSide::Supply, &accounts[2]),
        Balance {
            on_pool: 25,
            in_p2p: 50
        }
    );
    assert_eq!(
        book.get_balance(PositionSide::Supply, &accounts[1]),
        Balance {
            on_pool: 10,
            in_p2p: 0
        }
    );

    assert_eq!(book.market.delta.p2p_supply_amount, 250);
    assert_eq!(sum_in_p2p(&book, PositionSide::Supply), 250);

    let on_pool = book.on_pool_registry(PositionSide::Supply);
    assert_eq!(on_pool.head(), Some(accounts[2]));
    assert!(!on_pool.contains(&accounts[0]));
    assert_eq!(
        book.in_p2p_registry(PositionSide::Supply).head(),
        Some(accounts[0])
    );
}

#[test]
fn promote_stops_when_budget_runs_out() {
    let (mut book, accounts) = book_with_pool_suppliers(&[100, 10, 50]);
    let mut budget = 1;

    let matched =
        promote_positions(&mut book, PositionSide::Supply, &indexes(), 250, &mut budget).unwrap();

    assert_eq!(matched, 200);
    assert_eq!(budget, 0);
    assert_eq!(book.get_balance(PositionSide::Supply, &accounts[2]).on_pool, 50);
}

#[test]
fn promote_with_empty_registry_keeps_budget() {
    let mut book = create_market_book(2 * RAY, 4 * RAY);
    let mut budget = 3;

    let matched =
        promote_positions(&mut book, PositionSide::Borrow, &indexes(), 1_000, &mut budget)
            .unwrap();

    assert_eq!(matched, 0);
    assert_eq!(budget, 3);
}

#[test]
fn demote_largest_first() {
    let (mut book, accounts) = book_with_p2p_suppliers(&[100, 300]);
    let mut budget = 5;

    let unmatched =
        demote_positions(&mut book, PositionSide::Supply, &indexes(), 350, &mut budget).unwrap();

    assert_eq!(unmatched, 350);
    assert_eq!(budget, 3);
    assert_eq!(
        book.get_balance(PositionSide::Supply, &accounts[1]),
        Balance {
            on_pool: 150,
            in_p2p: 0
        }
    );
    assert_eq!(
        book.get_balance(PositionSide::Supply, &accounts[0]),
        Balance {
            on_pool: 25,
            in_p2p: 50
        }
    );
    assert_eq!(book.market.delta.p2p_supply_amount, 50);
    assert_eq!(sum_in_p2p(&book, PositionSide::Supply), 50);
}

#[test]
fn demote_stops_when_everyone_is_on_pool() {
    let (mut book, _) = book_with_p2p_suppliers(&[100]);
    let mut budget = 5;

    let unmatched =
        demote_positions(&mut book, PositionSide::Supply, &indexes(), 1_000, &mut budget)
            .unwrap();

    assert_eq!(unmatched, 100);
    assert_eq!(budget, 4);
    assert_eq!(book.market.delta.p2p_supply_amount, 0);
    assert!(book.in_p2p_registry(PositionSide::Supply).is_empty());
}

#[test]
fn demote_detects_p2p_amount_drift() {
    let (mut book, _) = book_with_p2p_suppliers(&[100]);
    book.market.delta.p2p_supply_amount = 40;
    let mut budget = 5;

    let result = demote_positions(&mut book, PositionSide::Supply, &indexes(), 100, &mut budget);

    assert_eq!(result, Err(ErrorCode::AccountingInvariantBroken));
}

#[test]
fn reduce_delta_partially_and_fully() {
    let mut book = create_market_book(2 * RAY, 4 * RAY);
    book.market.delta.p2p_supply_delta = 100;

    let matched = reduce_delta(&mut book, PositionSide::Supply, &indexes(), 50).unwrap();
    assert_eq!(matched, 50);
    assert_eq!(book.market.delta.p2p_supply_delta, 75);

    let matched = reduce_delta(&mut book, PositionSide::Supply, &indexes(), 500).unwrap();
    assert_eq!(matched, 150);
    assert_eq!(book.market.delta.p2p_supply_delta, 0);

    let matched = reduce_delta(&mut book, PositionSide::Supply, &indexes(), 500).unwrap();
    assert_eq!(matched, 0);
}

#[test]
fn reduce_delta_leaves_other_side_alone() {
    let mut book = create_market_book(2 * RAY, 4 * RAY);
    book.market.delta.p2p_supply_delta = 100;
    book.market.delta.p2p_borrow_delta = 10;

    let matched = reduce_delta(&mut book, PositionSide::Borrow, &indexes(), 1_000).unwrap();

    assert_eq!(matched, 40);
    assert_eq!(book.market.delta.p2p_borrow_delta, 0);
    assert_eq!(book.market.delta.p2p_supply_delta, 100);
}

#[test]
fn decrease_p2p_amount_underflow() {
    let mut book = create_market_book(2 * RAY, 4 * RAY);
    book.market.delta.p2p_borrow_amount = 10;

    decrease_p2p_amount(&mut book, PositionSide::Borrow, 4).unwrap();
    assert_eq!(book.market.delta.p2p_borrow_amount, 6);

    let result = decrease_p2p_amount(&mut book, PositionSide::Borrow, 7);
    assert_eq!(result, Err(ErrorCode::AccountingInvariantBroken));
    assert_eq!(book.market.delta.p2p_borrow_amount, 6);
}
