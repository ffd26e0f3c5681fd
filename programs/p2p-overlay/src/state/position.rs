use anchor_lang::prelude::*;

use crate::error::OverlayResult;
use crate::math::fixed_point::ray_mul;
use crate::math::safe_math::SafeMath;

#[derive(
    Clone, Copy, PartialEq, Debug, Eq, PartialOrd, Ord, AnchorSerialize, AnchorDeserialize, Default,
)]
pub enum PositionSide {
    #[default]
    Supply,
    Borrow,
}

impl PositionSide {
    pub fn opposite(&self) -> Self {
        match self {
            PositionSide::Supply => PositionSide::Borrow,
            PositionSide::Borrow => PositionSide::Supply,
        }
    }
}

/// Where a balance component sits.
#[derive(Clone, Copy, PartialEq, Debug, Eq)]
pub enum Placement {
    OnPool,
    InP2P,
}

/// One side of an account's position in a market.
///
/// `on_pool` is denominated in pool units (underlying / pool index) and
/// `in_p2p` in p2p units (underlying / p2p index).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct Balance {
    pub on_pool: u128,
    pub in_p2p: u128,
}

impl Balance {
    pub fn is_empty(&self) -> bool {
        self.on_pool == 0 && self.in_p2p == 0
    }

    pub fn on_pool_in_underlying(&self, pool_index: u128) -> OverlayResult<u128> {
        ray_mul(self.on_pool, pool_index)
    }

    pub fn in_p2p_in_underlying(&self, p2p_index: u128) -> OverlayResult<u128> {
        ray_mul(self.in_p2p, p2p_index)
    }

    pub fn total_in_underlying(&self, pool_index: u128, p2p_index: u128) -> OverlayResult<u128> {
        self.on_pool_in_underlying(pool_index)?
            .safe_add(self.in_p2p_in_underlying(p2p_index)?)
    }
}

/// How much of a position a withdraw or repay removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitAmount {
    /// Underlying amount
    Exact(u128),
    /// The whole position, pool and p2p
    All,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionSummary {
    pub on_pool: u128,
    pub in_p2p: u128,
    pub total: u128,
}

impl PositionSummary {
    pub fn new(balance: &Balance, pool_index: u128, p2p_index: u128) -> OverlayResult<Self> {
        let on_pool = balance.on_pool_in_underlying(pool_index)?;
        let in_p2p = balance.in_p2p_in_underlying(p2p_index)?;

        Ok(PositionSummary {
            on_pool,
            in_p2p,
            total: on_pool.safe_add(in_p2p)?,
        })
    }
}
