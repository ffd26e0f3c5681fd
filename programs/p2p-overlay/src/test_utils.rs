use std::collections::BTreeMap;

use anchor_lang::prelude::Pubkey;

use crate::error::{ErrorCode, OverlayResult};
use crate::math::constants::{DEFAULT_MAX_RANKED_SIZE, RAY};
use crate::math::fixed_point::percent_mul;
use crate::math::safe_math::SafeMath;
use crate::state::market::Market;
use crate::state::market_map::MarketBook;
use crate::state::pool::LendingPool;
use crate::state::position::PositionSide;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolCall {
    Deposit(u128),
    Withdraw(u128),
    Borrow(u128),
    Repay(u128),
}

#[derive(Clone, Debug, Default)]
pub struct TestReserve {
    pub supply_index: u128,
    pub borrow_index: u128,
    /// cash available to withdraw or borrow
    pub liquidity: u128,
    pub calls: Vec<PoolCall>,
}

/// In-memory lending pool. Indexes only move when a test moves them.
#[derive(Clone, Debug, Default)]
pub struct TestPool {
    pub reserves: BTreeMap<Pubkey, TestReserve>,
    pub fail_transfers: bool,
}

impl TestPool {
    pub fn new(underlying: Pubkey, supply_index: u128, borrow_index: u128) -> Self {
        let mut pool = TestPool::default();
        pool.add_reserve(underlying, supply_index, borrow_index);
        pool
    }

    pub fn add_reserve(&mut self, underlying: Pubkey, supply_index: u128, borrow_index: u128) {
        self.reserves.insert(
            underlying,
            TestReserve {
                supply_index,
                borrow_index,
                liquidity: 1_000_000_000 * RAY,
                calls: vec![],
            },
        );
    }

    pub fn reserve(&self, underlying: &Pubkey) -> &TestReserve {
        self.reserves.get(underlying).unwrap()
    }

    pub fn reserve_mut(&mut self, underlying: &Pubkey) -> &mut TestReserve {
        self.reserves.get_mut(underlying).unwrap()
    }

    pub fn set_indexes(&mut self, underlying: &Pubkey, supply_index: u128, borrow_index: u128) {
        let reserve = self.reserve_mut(underlying);
        reserve.supply_index = supply_index;
        reserve.borrow_index = borrow_index;
    }

    /// Grows both indexes by the given basis points.
    pub fn accrue(&mut self, underlying: &Pubkey, supply_bps: u16, borrow_bps: u16) {
        let reserve = self.reserve_mut(underlying);
        reserve.supply_index += percent_mul(reserve.supply_index, supply_bps).unwrap();
        reserve.borrow_index += percent_mul(reserve.borrow_index, borrow_bps).unwrap();
    }

    pub fn calls(&self, underlying: &Pubkey) -> Vec<PoolCall> {
        self.reserve(underlying).calls.clone()
    }

    pub fn clear_calls(&mut self, underlying: &Pubkey) {
        self.reserve_mut(underlying).calls.clear();
    }

    fn get(&self, underlying: &Pubkey) -> OverlayResult<&TestReserve> {
        self.reserves.get(underlying).ok_or(ErrorCode::MarketNotFound)
    }

    fn transfer(&mut self, underlying: &Pubkey, call: PoolCall) -> OverlayResult {
        if self.fail_transfers {
            return Err(ErrorCode::InsufficientBalance);
        }

        let reserve = self
            .reserves
            .get_mut(underlying)
            .ok_or(ErrorCode::MarketNotFound)?;

        reserve.liquidity = match call {
            PoolCall::Deposit(amount) | PoolCall::Repay(amount) => {
                reserve.liquidity.safe_add(amount)?
            }
            PoolCall::Withdraw(amount) | PoolCall::Borrow(amount) => {
                if amount > reserve.liquidity {
                    return Err(ErrorCode::InsufficientBalance);
                }
                reserve.liquidity - amount
            }
        };
        reserve.calls.push(call);

        Ok(())
    }
}

impl LendingPool for TestPool {
    fn get_supply_growth_index(&self, underlying: &Pubkey) -> OverlayResult<u128> {
        Ok(self.get(underlying)?.supply_index)
    }

    fn get_borrow_growth_index(&self, underlying: &Pubkey) -> OverlayResult<u128> {
        Ok(self.get(underlying)?.borrow_index)
    }

    fn deposit(&mut self, underlying: &Pubkey, amount: u128) -> OverlayResult {
        self.transfer(underlying, PoolCall::Deposit(amount))
    }

    fn withdraw(&mut self, underlying: &Pubkey, amount: u128) -> OverlayResult {
        self.transfer(underlying, PoolCall::Withdraw(amount))
    }

    fn borrow(&mut self, underlying: &Pubkey, amount: u128) -> OverlayResult {
        self.transfer(underlying, PoolCall::Borrow(amount))
    }

    fn repay(&mut self, underlying: &Pubkey, amount: u128) -> OverlayResult {
        self.transfer(underlying, PoolCall::Repay(amount))
    }
}

pub fn create_market_book(pool_supply_index: u128, pool_borrow_index: u128) -> MarketBook {
    MarketBook::new(
        Market {
            market_index: 0,
            underlying: Pubkey::default(),
            last_pool_supply_index: pool_supply_index,
            last_pool_borrow_index: pool_borrow_index,
            ..Market::default()
        },
        DEFAULT_MAX_RANKED_SIZE,
    )
}

/// Sum of the `in_p2p` balances of a side, which must equal the market's p2p amount.
pub fn sum_in_p2p(book: &MarketBook, side: PositionSide) -> u128 {
    book.balances(side)
        .values()
        .map(|balance| balance.in_p2p)
        .sum()
}
