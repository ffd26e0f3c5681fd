//! Big number types

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use crate::error::ErrorCode::BnConversionError;
use std::convert::TryInto;
use uint::construct_uint;

use crate::error::OverlayResult;

construct_uint! {
    /// 256-bit unsigned integer.
    pub struct U256(4);
}

impl U256 {
    /// Convert u256 to u128
    pub fn try_to_u128(self) -> OverlayResult<u128> {
        self.try_into().map_err(|_| BnConversionError)
    }
}
