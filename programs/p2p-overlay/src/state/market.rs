use anchor_lang::prelude::*;

use crate::error::{ErrorCode, OverlayResult};
use crate::math::constants::{MAX_BASIS_POINTS, RAY};
use crate::math::fixed_point::ray_mul;
use crate::math::p2p_index::{calculate_p2p_indexes, P2PIndexParams, P2PIndexes};
use crate::math::safe_math::ZeroFloorSub;
use crate::state::paused_operations::MarketOperation;
use crate::state::pool::PoolIndexes;
use crate::state::position::PositionSide;
use crate::state::state::{MatchingBudget, State};
use crate::validate;


/// Peer-to-peer bookkeeping of a market.
///
/// `p2p_supply_delta` and `p2p_borrow_delta` are in pool units and track P2P
/// credit that is actually backed by a pool position. `p2p_supply_amount` and
/// `p2p_borrow_amount` are in p2p units and sum the `in_p2p` balances of each
/// side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct Delta {
    pub p2p_supply_delta: u128,
    pub p2p_borrow_delta: u128,
    pub p2p_supply_amount: u128,
    pub p2p_borrow_amount: u128,
}

impl Delta {
    pub fn p2p_delta(&self, side: PositionSide) -> u128 {
        match side {
            PositionSide::Supply => self.p2p_supply_delta,
            PositionSide::Borrow => self.p2p_borrow_delta,
        }
    }

    pub fn p2p_delta_mut(&mut self, side: PositionSide) -> &mut u128 {
        match side {
            PositionSide::Supply => &mut self.p2p_supply_delta,
            PositionSide::Borrow => &mut self.p2p_borrow_delta,
        }
    }

    pub fn p2p_amount(&self, side: PositionSide) -> u128 {
        match side {
            PositionSide::Supply => self.p2p_supply_amount,
            PositionSide::Borrow => self.p2p_borrow_amount,
        }
    }

    pub fn p2p_amount_mut(&mut self, side: PositionSide) -> &mut u128 {
        match side {
            PositionSide::Supply => &mut self.p2p_supply_amount,
            PositionSide::Borrow => &mut self.p2p_borrow_amount,
        }
    }
}

/// Pool and p2p indexes of a market as of the current call.
/// precision: RAY
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarketIndexes {
    pub pool_supply_index: u128,
    pub pool_borrow_index: u128,
    pub p2p_supply_index: u128,
    pub p2p_borrow_index: u128,
}

impl MarketIndexes {
    pub fn new(pool_indexes: &PoolIndexes, p2p_indexes: &P2PIndexes) -> Self {
        MarketIndexes {
            pool_supply_index: pool_indexes.supply,
            pool_borrow_index: pool_indexes.borrow,
            p2p_supply_index: p2p_indexes.p2p_supply_index,
            p2p_borrow_index: p2p_indexes.p2p_borrow_index,
        }
    }

    pub fn pool_index(&self, side: PositionSide) -> u128 {
        match side {
            PositionSide::Supply => self.pool_supply_index,
            PositionSide::Borrow => self.pool_borrow_index,
        }
    }

    pub fn p2p_index(&self, side: PositionSide) -> u128 {
        match side {
            PositionSide::Supply => self.p2p_supply_index,
            PositionSide::Borrow => self.p2p_borrow_index,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Market {
    /// The index of the market. Markets are keyed by it in the market map
    pub market_index: u16,
    /// The underlying asset lent and borrowed through the pool
    pub underlying: Pubkey,
    /// Value of one p2p supply unit in underlying
    /// precision: RAY
    pub p2p_supply_index: u128,
    /// Value of one p2p borrow unit in underlying
    /// precision: RAY
    pub p2p_borrow_index: u128,
    /// Pool supply index observed at the last refresh
    /// precision: RAY
    pub last_pool_supply_index: u128,
    /// Pool borrow index observed at the last refresh
    /// precision: RAY
    pub last_pool_borrow_index: u128,
    pub delta: Delta,
    /// Underlying repaid by P2P borrowers in excess of what P2P suppliers are owed
    pub treasury_balance: u128,
    /// Share of the pool spread kept by the treasury
    /// precision: basis points
    pub reserve_factor: u16,
    /// Where the p2p rate sits between the pool supply (0) and borrow (10_000) rate
    /// precision: basis points
    pub p2p_index_cursor: u16,
    /// Bitflags of [`MarketOperation`]
    pub paused_operations: u8,
    /// When set, new matching is skipped. Existing P2P positions are unmatched normally
    pub is_p2p_disabled: bool,
    pub max_ranked_size: Option<u32>,
    pub matching_budget: Option<MatchingBudget>,
}

impl Default for Market {
    fn default() -> Self {
        Market {
            market_index: 0,
            underlying: Pubkey::default(),
            p2p_supply_index: RAY,
            p2p_borrow_index: RAY,
            last_pool_supply_index: RAY,
            last_pool_borrow_index: RAY,
            delta: Delta::default(),
            treasury_balance: 0,
            reserve_factor: 0,
            p2p_index_cursor: 0,
            paused_operations: 0,
            is_p2p_disabled: false,
            max_ranked_size: None,
            matching_budget: None,
        }
    }
}

impl Market {
    pub fn is_operation_paused(&self, operation: MarketOperation) -> bool {
        MarketOperation::is_operation_paused(self.paused_operations, operation)
    }

    pub fn validate_operation(&self, state: &State, operation: MarketOperation) -> OverlayResult {
        validate!(
            !state.is_operation_paused(operation)? && !self.is_operation_paused(operation),
            ErrorCode::OperationPaused,
            "market {} operation {:?} is paused",
            self.market_index,
            operation
        )
    }

    pub fn get_matching_budget(&self, state: &State, operation: MarketOperation) -> u32 {
        self.matching_budget
            .unwrap_or(state.default_matching_budget)
            .get(operation)
    }

    pub fn get_max_ranked_size(&self, state: &State) -> u32 {
        self.max_ranked_size.unwrap_or(state.default_max_ranked_size)
    }

    pub fn get_p2p_indexes(
        &self,
        pool_supply_index: u128,
        pool_borrow_index: u128,
    ) -> OverlayResult<P2PIndexes> {
        calculate_p2p_indexes(&P2PIndexParams {
            p2p_supply_index: self.p2p_supply_index,
            p2p_borrow_index: self.p2p_borrow_index,
            pool_supply_index,
            pool_borrow_index,
            last_pool_supply_index: self.last_pool_supply_index,
            last_pool_borrow_index: self.last_pool_borrow_index,
            reserve_factor: self.reserve_factor,
            p2p_index_cursor: self.p2p_index_cursor,
            delta: self.delta,
        })
    }

    /// P2P supply credit not backed by the supply delta, in underlying.
    pub fn get_matched_supply(&self, pool_supply_index: u128) -> OverlayResult<u128> {
        Ok(
            ray_mul(self.delta.p2p_supply_amount, self.p2p_supply_index)?
                .zero_floor_sub(ray_mul(self.delta.p2p_supply_delta, pool_supply_index)?),
        )
    }

    /// P2P borrow debt not backed by the borrow delta, in underlying.
    pub fn get_matched_borrow(&self, pool_borrow_index: u128) -> OverlayResult<u128> {
        Ok(
            ray_mul(self.delta.p2p_borrow_amount, self.p2p_borrow_index)?
                .zero_floor_sub(ray_mul(self.delta.p2p_borrow_delta, pool_borrow_index)?),
        )
    }

    pub fn validate_config(&self) -> OverlayResult {
        validate!(
            self.reserve_factor <= MAX_BASIS_POINTS,
            ErrorCode::InvalidReserveFactor,
            "reserve_factor={} > {}",
            self.reserve_factor,
            MAX_BASIS_POINTS
        )?;

        validate!(
            self.p2p_index_cursor <= MAX_BASIS_POINTS,
            ErrorCode::InvalidP2PIndexCursor,
            "p2p_index_cursor={} > {}",
            self.p2p_index_cursor,
            MAX_BASIS_POINTS
        )?;

        Ok(())
    }
}
