use solana_program::msg;


const ALL_MARKET_OPERATIONS: [MarketOperation; 4] = [
    MarketOperation::Supply,
    MarketOperation::Borrow,
    MarketOperation::Withdraw,
    MarketOperation::Repay,
];

#[derive(Clone, Copy, PartialEq, Debug, Eq)]
pub enum MarketOperation {
    Supply = 0b00000001,
    Borrow = 0b00000010,
    Withdraw = 0b00000100,
    Repay = 0b00001000,
}

impl MarketOperation {
    pub fn is_operation_paused(current: u8, operation: MarketOperation) -> bool {
        current & operation as u8 != 0
    }

    pub fn all() -> u8 {
        ALL_MARKET_OPERATIONS
            .iter()
            .fold(0, |paused, operation| paused | *operation as u8)
    }

    pub fn log_all_operations_paused(current: u8) {
        for operation in ALL_MARKET_OPERATIONS.iter() {
            if Self::is_operation_paused(current, *operation) {
                msg!("{:?} is paused", operation);
            }
        }
    }
}
