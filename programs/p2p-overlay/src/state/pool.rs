use anchor_lang::prelude::Pubkey;

use crate::error::OverlayResult;

/// The lending pool the overlay sits on top of.
///
/// Indexes are RAY scaled and non-decreasing. Every transfer is for the
/// overlay's own aggregate position in the pool; a failed transfer fails the
/// whole overlay operation.
pub trait LendingPool {
    fn get_supply_growth_index(&self, underlying: &Pubkey) -> OverlayResult<u128>;

    fn get_borrow_growth_index(&self, underlying: &Pubkey) -> OverlayResult<u128>;

    fn deposit(&mut self, underlying: &Pubkey, amount: u128) -> OverlayResult;

    fn withdraw(&mut self, underlying: &Pubkey, amount: u128) -> OverlayResult;

    fn borrow(&mut self, underlying: &Pubkey, amount: u128) -> OverlayResult;

    fn repay(&mut self, underlying: &Pubkey, amount: u128) -> OverlayResult;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolIndexes {
    pub supply: u128,
    pub borrow: u128,
}

impl PoolIndexes {
    pub fn fetch(pool: &dyn LendingPool, underlying: &Pubkey) -> OverlayResult<PoolIndexes> {
        Ok(PoolIndexes {
            supply: pool.get_supply_growth_index(underlying)?,
            borrow: pool.get_borrow_growth_index(underlying)?,
        })
    }
}
