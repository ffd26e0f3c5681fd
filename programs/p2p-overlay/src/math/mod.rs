pub mod bn;
pub mod casting;
pub mod constants;
pub mod fixed_point;
pub mod p2p_index;
pub mod safe_math;
pub mod safe_unwrap;
