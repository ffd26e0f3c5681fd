use crate::error::{ErrorCode, OverlayResult};
use solana_program::msg;
use std::panic::Location;

pub trait SafeUnwrap {
    type Item;

    fn safe_unwrap(self) -> OverlayResult<Self::Item>;
}

impl<T, U> SafeUnwrap for Result<T, U> {
    type Item = T;

    #[track_caller]
    #[inline(always)]
    fn safe_unwrap(self) -> OverlayResult<T> {
        match self {
            Ok(v) => Ok(v),
            Err(_) => {
                let caller = Location::caller();
                msg!("Unwrap error thrown at {}:{}", caller.file(), caller.line());
                Err(ErrorCode::FailedUnwrap)
            }
        }
    }
}
