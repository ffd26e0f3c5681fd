//! Peer-to-peer index model.
//!
//! The P2P indexes are derived from the pool's own growth over the refresh
//! interval. Pool growth factors are blended by the index cursor, the reserve
//! factor skims the spread on both sides, and the slice of each side's P2P
//! mass that actually sits on the pool (the delta) grows at the pool rate.

use crate::error::{ErrorCode, OverlayResult};
use crate::math::constants::{MAX_BASIS_POINTS, RAY};
use crate::math::fixed_point::{percent_mul, ray_div, ray_mul, weighted_average};
use crate::math::safe_math::SafeMath;
use crate::state::market::Delta;
use crate::validate;
use solana_program::msg;


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowthFactors {
    pub pool_supply_growth_factor: u128,
    pub pool_borrow_growth_factor: u128,
    pub p2p_growth_factor: u128,
    pub p2p_supply_growth_factor: u128,
    pub p2p_borrow_growth_factor: u128,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct P2PIndexParams {
    pub p2p_supply_index: u128,
    pub p2p_borrow_index: u128,
    pub pool_supply_index: u128,
    pub pool_borrow_index: u128,
    pub last_pool_supply_index: u128,
    pub last_pool_borrow_index: u128,
    pub reserve_factor: u16,
    pub p2p_index_cursor: u16,
    pub delta: Delta,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct P2PIndexes {
    pub p2p_supply_index: u128,
    pub p2p_borrow_index: u128,
}

pub fn calculate_growth_factors(
    pool_supply_index: u128,
    pool_borrow_index: u128,
    last_pool_supply_index: u128,
    last_pool_borrow_index: u128,
    p2p_index_cursor: u16,
    reserve_factor: u16,
) -> OverlayResult<GrowthFactors> {
    validate!(
        last_pool_supply_index != 0 && last_pool_borrow_index != 0,
        ErrorCode::InvalidPoolIndex,
        "last pool indexes must be non zero: supply={} borrow={}",
        last_pool_supply_index,
        last_pool_borrow_index
    )?;

    validate!(
        reserve_factor <= MAX_BASIS_POINTS && p2p_index_cursor <= MAX_BASIS_POINTS,
        ErrorCode::MathError,
        "reserve_factor={} p2p_index_cursor={} out of range",
        reserve_factor,
        p2p_index_cursor
    )?;

    let pool_supply_growth_factor = ray_div(pool_supply_index, last_pool_supply_index)?;
    let pool_borrow_growth_factor = ray_div(pool_borrow_index, last_pool_borrow_index)?;

    if pool_supply_growth_factor <= pool_borrow_growth_factor {
        let p2p_growth_factor = weighted_average(
            pool_supply_growth_factor,
            pool_borrow_growth_factor,
            p2p_index_cursor,
        )?;

        let p2p_supply_growth_factor = p2p_growth_factor.safe_sub(percent_mul(
            p2p_growth_factor.safe_sub(pool_supply_growth_factor)?,
            reserve_factor,
        )?)?;

        let p2p_borrow_growth_factor = p2p_growth_factor.safe_add(percent_mul(
            pool_borrow_growth_factor.safe_sub(p2p_growth_factor)?,
            reserve_factor,
        )?)?;

        Ok(GrowthFactors {
            pool_supply_growth_factor,
            pool_borrow_growth_factor,
            p2p_growth_factor,
            p2p_supply_growth_factor,
            p2p_borrow_growth_factor,
        })
    } else {
        // inverted spread: clamp both p2p growth factors to the pool borrow growth
        msg!(
            "inverted pool spread: supply growth {} > borrow growth {}",
            pool_supply_growth_factor,
            pool_borrow_growth_factor
        );

        Ok(GrowthFactors {
            pool_supply_growth_factor,
            pool_borrow_growth_factor,
            p2p_growth_factor: pool_borrow_growth_factor,
            p2p_supply_growth_factor: pool_borrow_growth_factor,
            p2p_borrow_growth_factor: pool_borrow_growth_factor,
        })
    }
}

/// Fraction (ray) of a side's P2P mass that sits on the pool as delta.
pub fn calculate_delta_share(
    p2p_delta: u128,
    p2p_amount: u128,
    last_pool_index: u128,
    last_p2p_index: u128,
) -> OverlayResult<u128> {
    if p2p_delta == 0 || p2p_amount == 0 {
        return Ok(0);
    }

    let p2p_amount_in_underlying = ray_mul(p2p_amount, last_p2p_index)?;
    if p2p_amount_in_underlying == 0 {
        return Ok(0);
    }

    let delta_in_underlying = ray_mul(p2p_delta, last_pool_index)?;

    Ok(ray_div(delta_in_underlying, p2p_amount_in_underlying)?.min(RAY))
}

pub fn calculate_p2p_index(
    last_p2p_index: u128,
    p2p_growth_factor: u128,
    pool_growth_factor: u128,
    delta_share: u128,
) -> OverlayResult<u128> {
    if delta_share == 0 {
        return ray_mul(last_p2p_index, p2p_growth_factor);
    }

    let blended_growth_factor = ray_mul(RAY.safe_sub(delta_share)?, p2p_growth_factor)?
        .safe_add(ray_mul(delta_share, pool_growth_factor)?)?;

    ray_mul(last_p2p_index, blended_growth_factor)
}

pub fn calculate_p2p_indexes(params: &P2PIndexParams) -> OverlayResult<P2PIndexes> {
    let growth_factors = calculate_growth_factors(
        params.pool_supply_index,
        params.pool_borrow_index,
        params.last_pool_supply_index,
        params.last_pool_borrow_index,
        params.p2p_index_cursor,
        params.reserve_factor,
    )?;

    let supply_delta_share = calculate_delta_share(
        params.delta.p2p_supply_delta,
        params.delta.p2p_supply_amount,
        params.last_pool_supply_index,
        params.p2p_supply_index,
    )?;

    let borrow_delta_share = calculate_delta_share(
        params.delta.p2p_borrow_delta,
        params.delta.p2p_borrow_amount,
        params.last_pool_borrow_index,
        params.p2p_borrow_index,
    )?;

    let p2p_supply_index = calculate_p2p_index(
        params.p2p_supply_index,
        growth_factors.p2p_supply_growth_factor,
        growth_factors.pool_supply_growth_factor,
        supply_delta_share,
    )?;

    let p2p_borrow_index = calculate_p2p_index(
        params.p2p_borrow_index,
        growth_factors.p2p_borrow_growth_factor,
        growth_factors.pool_borrow_growth_factor,
        borrow_delta_share,
    )?;

    Ok(P2PIndexes {
        p2p_supply_index,
        p2p_borrow_index,
    })
}
