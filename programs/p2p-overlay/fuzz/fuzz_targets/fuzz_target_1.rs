#![no_main]

use crate::arbitrary::Arbitrary;
use libfuzzer_sys::arbitrary;
use libfuzzer_sys::fuzz_target;
use p2p_overlay::math::constants::{MAX_BASIS_POINTS, RAY};
use p2p_overlay::math::fixed_point::{ray_div, ray_mul};
use p2p_overlay::math::p2p_index::{calculate_p2p_indexes, P2PIndexParams};
use p2p_overlay::state::market::Delta;

#[derive(Debug, Clone, Copy)]
struct Data {
    pub params: P2PIndexParams,
}

impl<'a> Arbitrary<'a> for Data {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let last_pool_supply_index = arbitrary_index(u)?;
        let last_pool_borrow_index = arbitrary_index(u)?;
        let p2p_supply_index = arbitrary_index(u)?;

        let params = P2PIndexParams {
            p2p_supply_index,
            // suppliers never earn more than borrowers pay
            p2p_borrow_index: p2p_supply_index.saturating_add(arbitrary_growth(u)?),
            pool_supply_index: last_pool_supply_index.saturating_add(arbitrary_growth(u)?),
            pool_borrow_index: last_pool_borrow_index.saturating_add(arbitrary_growth(u)?),
            last_pool_supply_index,
            last_pool_borrow_index,
            reserve_factor: u16::arbitrary(u)? % (MAX_BASIS_POINTS + 1),
            p2p_index_cursor: u16::arbitrary(u)? % (MAX_BASIS_POINTS + 1),
            delta: Delta {
                p2p_supply_delta: arbitrary_amount(u)?,
                p2p_borrow_delta: arbitrary_amount(u)?,
                p2p_supply_amount: arbitrary_amount(u)?,
                p2p_borrow_amount: arbitrary_amount(u)?,
            },
        };

        Ok(Self { params })
    }
}

fn arbitrary_index(u: &mut arbitrary::Unstructured) -> arbitrary::Result<u128> {
    let v = u128::arbitrary(u)?;
    Ok(v.clamp(RAY / 1_000, 1_000 * RAY))
}

fn arbitrary_growth(u: &mut arbitrary::Unstructured) -> arbitrary::Result<u128> {
    Ok(u128::arbitrary(u)? % RAY)
}

fn arbitrary_amount(u: &mut arbitrary::Unstructured) -> arbitrary::Result<u128> {
    Ok(u128::from(u64::arbitrary(u)?))
}

fuzz_target!(|data: Data| {
    fuzz(data);
});

fn fuzz(data: Data) {
    let params = data.params;
    let indexes = calculate_p2p_indexes(&params).unwrap();

    // pool indexes only grow, so p2p indexes never shrink
    assert!(indexes.p2p_supply_index >= params.p2p_supply_index);
    assert!(indexes.p2p_borrow_index >= params.p2p_borrow_index);

    if params.delta.p2p_supply_delta == 0 {
        assert!(indexes.p2p_supply_index <= indexes.p2p_borrow_index);
    }

    if params.delta.p2p_borrow_delta == 0 {
        let pool_borrow_growth_factor =
            ray_div(params.pool_borrow_index, params.last_pool_borrow_index).unwrap();

        // p2p borrowers never pay more than the pool would charge
        assert!(
            indexes.p2p_borrow_index
                <= ray_mul(params.p2p_borrow_index, pool_borrow_growth_factor).unwrap()
        );
    }
}
