use crate::error::{ErrorCode, OverlayResult};
use std::convert::TryInto;

pub trait Cast: Sized {
    fn cast<T: std::convert::TryFrom<Self>>(self) -> OverlayResult<T> {
        self.try_into().map_err(|_| ErrorCode::CastingFailure)
    }
}

impl Cast for usize {}
