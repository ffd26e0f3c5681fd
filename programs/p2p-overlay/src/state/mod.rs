pub mod events;
pub mod market;
pub mod market_map;
pub mod paused_operations;
pub mod pool;
pub mod position;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod state;
