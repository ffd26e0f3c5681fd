use anchor_lang::prelude::*;

pub type OverlayResult<T = ()> = std::result::Result<T, ErrorCode>;

#[error_code]
#[derive(PartialEq, Eq)]
pub enum ErrorCode {
    #[msg("Math Error")]
    MathError,
    #[msg("Conversion to u128/u64 failed with an overflow or underflow")]
    BnConversionError,
    #[msg("Casting Failure")]
    CastingFailure,
    #[msg("Failed Unwrap")]
    FailedUnwrap,
    #[msg("Market Not Found")]
    MarketNotFound,
    #[msg("Market Already Created")]
    MarketAlreadyCreated,
    #[msg("Market Index Already Initialized")]
    MarketIndexAlreadyInitialized,
    #[msg("Amount Is Zero")]
    AmountIsZero,
    #[msg("Insufficient Balance")]
    InsufficientBalance,
    #[msg("Operation Paused")]
    OperationPaused,
    #[msg("Invalid Reserve Factor")]
    InvalidReserveFactor,
    #[msg("Invalid P2P Index Cursor")]
    InvalidP2PIndexCursor,
    #[msg("Invalid Max Ranked Size")]
    InvalidMaxRankedSize,
    #[msg("Invalid Pool Index")]
    InvalidPoolIndex,
    #[msg("Invalid Exchange Status")]
    InvalidExchangeStatus,
    #[msg("Invalid Paused Operations")]
    InvalidPausedOperations,
    #[msg("Nothing To Claim")]
    NothingToClaim,
    #[msg("Registry Entry Not Found")]
    RegistryEntryNotFound,
    #[msg("Registry Corrupted")]
    RegistryCorrupted,
    #[msg("Pool Operation Failed")]
    PoolOperationFailed,
    #[msg("Accounting Invariant Broken")]
    AccountingInvariantBroken,
}

impl ErrorCode {
    /// Invariant violations that signal a defect rather than a rejected request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorCode::MathError
                | ErrorCode::BnConversionError
                | ErrorCode::CastingFailure
                | ErrorCode::FailedUnwrap
                | ErrorCode::InvalidPoolIndex
                | ErrorCode::RegistryEntryNotFound
                | ErrorCode::RegistryCorrupted
                | ErrorCode::AccountingInvariantBroken
        )
    }
}

#[macro_export]
macro_rules! math_error {
    () => {{
        || {
            let error_code = $crate::error::ErrorCode::MathError;
            msg!("Error {} thrown at {}:{}", error_code, file!(), line!());
            error_code
        }
    }};
}
