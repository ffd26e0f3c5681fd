// PRECISIONS
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000; // 1e27

pub const MAX_BASIS_POINTS: u16 = 10_000; // 100%
pub const MAX_BASIS_POINTS_U128: u128 = MAX_BASIS_POINTS as u128;

// DEFAULT CONFIG
pub const DEFAULT_MAX_RANKED_SIZE: u32 = 128;
pub const DEFAULT_MATCHING_BUDGET: u32 = 64;
pub const MAX_MAX_RANKED_SIZE: u32 = 10_000;
