use anchor_lang::prelude::*;
use enumflags2::BitFlags;

use crate::error::{ErrorCode, OverlayResult};
use crate::math::constants::{DEFAULT_MATCHING_BUDGET, DEFAULT_MAX_RANKED_SIZE, MAX_MAX_RANKED_SIZE};
use crate::math::safe_unwrap::SafeUnwrap;
use crate::state::paused_operations::MarketOperation;
use crate::validate;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct State {
    pub default_max_ranked_size: u32,
    pub default_matching_budget: MatchingBudget,
    pub number_of_markets: u16,
    pub exchange_status: u8,
}

impl Default for State {
    fn default() -> Self {
        State {
            default_max_ranked_size: DEFAULT_MAX_RANKED_SIZE,
            default_matching_budget: MatchingBudget::default(),
            number_of_markets: 0,
            exchange_status: ExchangeStatus::active(),
        }
    }
}

#[derive(BitFlags, Clone, Copy, PartialEq, Debug, Eq)]
pub enum ExchangeStatus {
    // Active = 0b00000000
    SupplyPaused = 0b00000001,
    BorrowPaused = 0b00000010,
    WithdrawPaused = 0b00000100,
    RepayPaused = 0b00001000,
    // Paused = 0b00001111
}

impl ExchangeStatus {
    pub fn active() -> u8 {
        BitFlags::<ExchangeStatus>::empty().bits() as u8
    }

    pub fn paused() -> u8 {
        BitFlags::<ExchangeStatus>::all().bits() as u8
    }
}

impl State {
    pub fn get_exchange_status(&self) -> OverlayResult<BitFlags<ExchangeStatus>> {
        BitFlags::<ExchangeStatus>::from_bits(usize::from(self.exchange_status)).safe_unwrap()
    }

    pub fn is_operation_paused(&self, operation: MarketOperation) -> OverlayResult<bool> {
        let status = self.get_exchange_status()?;

        Ok(match operation {
            MarketOperation::Supply => status.contains(ExchangeStatus::SupplyPaused),
            MarketOperation::Borrow => status.contains(ExchangeStatus::BorrowPaused),
            MarketOperation::Withdraw => status.contains(ExchangeStatus::WithdrawPaused),
            MarketOperation::Repay => status.contains(ExchangeStatus::RepayPaused),
        })
    }
}

/// Maximum number of registry entries a single operation may visit while
/// matching or unmatching. Zero disables the walk for that operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct MatchingBudget {
    pub supply: u32,
    pub borrow: u32,
    /// Shared by the promotion and demotion walks of a withdraw
    pub withdraw: u32,
    /// Shared by the promotion and demotion walks of a repay
    pub repay: u32,
}

impl Default for MatchingBudget {
    fn default() -> Self {
        MatchingBudget {
            supply: DEFAULT_MATCHING_BUDGET,
            borrow: DEFAULT_MATCHING_BUDGET,
            withdraw: DEFAULT_MATCHING_BUDGET,
            repay: DEFAULT_MATCHING_BUDGET,
        }
    }
}

impl MatchingBudget {
    pub fn get(&self, operation: MarketOperation) -> u32 {
        match operation {
            MarketOperation::Supply => self.supply,
            MarketOperation::Borrow => self.borrow,
            MarketOperation::Withdraw => self.withdraw,
            MarketOperation::Repay => self.repay,
        }
    }
}

pub fn validate_max_ranked_size(max_ranked_size: u32) -> OverlayResult {
    validate!(
        max_ranked_size > 0 && max_ranked_size <= MAX_MAX_RANKED_SIZE,
        ErrorCode::InvalidMaxRankedSize,
        "max_ranked_size={} must be in [1, {}]",
        max_ranked_size,
        MAX_MAX_RANKED_SIZE
    )
}
