use crate::error::{ErrorCode, OverlayResult};
use crate::math::bn::U256;
use solana_program::msg;
use std::panic::Location;

pub trait SafeMath: Sized {
    fn safe_add(self, rhs: Self) -> OverlayResult<Self>;
    fn safe_sub(self, rhs: Self) -> OverlayResult<Self>;
    fn safe_mul(self, rhs: Self) -> OverlayResult<Self>;
    fn safe_div(self, rhs: Self) -> OverlayResult<Self>;
}

macro_rules! checked_impl {
    ($t:ty) => {
        impl SafeMath for $t {
            #[track_caller]
            #[inline(always)]
            fn safe_add(self, v: $t) -> OverlayResult<$t> {
                match self.checked_add(v) {
                    Some(result) => Ok(result),
                    None => {
                        let caller = Location::caller();
                        msg!("Math error thrown at {}:{}", caller.file(), caller.line());
                        Err(ErrorCode::MathError)
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_sub(self, v: $t) -> OverlayResult<$t> {
                match self.checked_sub(v) {
                    Some(result) => Ok(result),
                    None => {
                        let caller = Location::caller();
                        msg!("Math error thrown at {}:{}", caller.file(), caller.line());
                        Err(ErrorCode::MathError)
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_mul(self, v: $t) -> OverlayResult<$t> {
                match self.checked_mul(v) {
                    Some(result) => Ok(result),
                    None => {
                        let caller = Location::caller();
                        msg!("Math error thrown at {}:{}", caller.file(), caller.line());
                        Err(ErrorCode::MathError)
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_div(self, v: $t) -> OverlayResult<$t> {
                match self.checked_div(v) {
                    Some(result) => Ok(result),
                    None => {
                        let caller = Location::caller();
                        msg!("Math error thrown at {}:{}", caller.file(), caller.line());
                        Err(ErrorCode::MathError)
                    }
                }
            }
        }
    };
}

checked_impl!(U256);
checked_impl!(u128);
checked_impl!(u64);
checked_impl!(u32);
checked_impl!(u16);

/// Subtraction that floors at zero instead of failing.
pub trait ZeroFloorSub: Sized {
    fn zero_floor_sub(self, rhs: Self) -> Self;
}

impl ZeroFloorSub for u128 {
    #[inline(always)]
    fn zero_floor_sub(self, rhs: u128) -> u128 {
        self.saturating_sub(rhs)
    }
}
