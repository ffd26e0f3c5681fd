use anchor_lang::prelude::Pubkey;
use solana_program::msg;

use crate::error::{ErrorCode, OverlayResult};
use crate::math::safe_math::SafeMath;
use crate::state::market_map::MarketBook;
use crate::state::pool::LendingPool;


/// Transfers with the pool accumulated by a call, executed once its accounting is done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolTransfers {
    pub to_withdraw: u128,
    pub to_borrow: u128,
    pub to_repay: u128,
    pub to_deposit: u128,
}

impl PoolTransfers {
    pub fn withdraw(&mut self, amount: u128) -> OverlayResult {
        self.to_withdraw = self.to_withdraw.safe_add(amount)?;
        Ok(())
    }

    pub fn borrow(&mut self, amount: u128) -> OverlayResult {
        self.to_borrow = self.to_borrow.safe_add(amount)?;
        Ok(())
    }

    pub fn repay(&mut self, amount: u128) -> OverlayResult {
        self.to_repay = self.to_repay.safe_add(amount)?;
        Ok(())
    }

    pub fn deposit(&mut self, amount: u128) -> OverlayResult {
        self.to_deposit = self.to_deposit.safe_add(amount)?;
        Ok(())
    }

    /// Funds leaving the pool move first.
    pub fn execute(&self, pool: &mut dyn LendingPool, underlying: &Pubkey) -> OverlayResult {
        if self.to_withdraw > 0 {
            pool.withdraw(underlying, self.to_withdraw)
                .map_err(|e| pool_error("withdraw", self.to_withdraw, e))?;
        }

        if self.to_borrow > 0 {
            pool.borrow(underlying, self.to_borrow)
                .map_err(|e| pool_error("borrow", self.to_borrow, e))?;
        }

        if self.to_repay > 0 {
            pool.repay(underlying, self.to_repay)
                .map_err(|e| pool_error("repay", self.to_repay, e))?;
        }

        if self.to_deposit > 0 {
            pool.deposit(underlying, self.to_deposit)
                .map_err(|e| pool_error("deposit", self.to_deposit, e))?;
        }

        Ok(())
    }
}

fn pool_error(action: &str, amount: u128, error: ErrorCode) -> ErrorCode {
    msg!("pool {} of {} failed: {}", action, amount, error);
    ErrorCode::PoolOperationFailed
}

/// Runs `f` against the book and restores the book if it fails.
pub fn with_rollback<T, F>(book: &mut MarketBook, f: F) -> OverlayResult<T>
where
    F: FnOnce(&mut MarketBook) -> OverlayResult<T>,
{
    book.begin_journal();

    match f(book) {
        Ok(value) => {
            book.commit_journal();
            Ok(value)
        }
        Err(error) => {
            book.rollback_journal()?;
            Err(error)
        }
    }
}
