use crate::error::OverlayResult;
use crate::math::bn::U256;
use crate::math::constants::{MAX_BASIS_POINTS_U128, RAY};
use crate::math::safe_math::SafeMath;


/// `a * b / RAY`, rounded toward zero. Intermediate product is 256 bit.
pub fn ray_mul(a: u128, b: u128) -> OverlayResult<u128> {
    if a == 0 || b == 0 {
        return Ok(0);
    }

    U256::from(a)
        .safe_mul(U256::from(b))?
        .safe_div(U256::from(RAY))?
        .try_to_u128()
}

/// `a * RAY / b`, rounded toward zero. Fails on a zero denominator.
pub fn ray_div(a: u128, b: u128) -> OverlayResult<u128> {
    U256::from(a)
        .safe_mul(U256::from(RAY))?
        .safe_div(U256::from(b))?
        .try_to_u128()
}

/// `value * basis_points / 10_000`, rounded toward zero.
pub fn percent_mul(value: u128, basis_points: u16) -> OverlayResult<u128> {
    if value == 0 || basis_points == 0 {
        return Ok(0);
    }

    U256::from(value)
        .safe_mul(U256::from(basis_points))?
        .safe_div(U256::from(MAX_BASIS_POINTS_U128))?
        .try_to_u128()
}

/// Linear interpolation between `x` (weight 0) and `y` (weight 10_000).
pub fn weighted_average(x: u128, y: u128, weight: u16) -> OverlayResult<u128> {
    let weight = u128::from(weight);

    U256::from(x)
        .safe_mul(U256::from(MAX_BASIS_POINTS_U128.safe_sub(weight)?))?
        .safe_add(U256::from(y).safe_mul(U256::from(weight))?)?
        .safe_div(U256::from(MAX_BASIS_POINTS_U128))?
        .try_to_u128()
}
