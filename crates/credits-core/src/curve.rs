//! `price(s) = BASE + A*s^2 + B*s`, closed-form trade cost via the
//! `S2(n) = n(n+1)(2n+1)/6`, `S1(n) = n(n+1)/2` sum identities. All
//! arithmetic happens in 256-bit unsigned integers: at the supply cap
//! (`2^64 - 1`), `A * sumSquares` alone overflows 128 bits by a wide margin.

use bnum::BUint;

/// 256-bit unsigned integer wide enough for `trade_cost`, `sumSquares` and
/// `sumFirstN` at any supply up to [`MAX_TOTAL_SUPPLY`].
pub type U256 = BUint<4>;

pub const BASE: u128 = 100_000_000_000_000; // 10^14
pub const A: u128 = 15_000_000_000; // 1.5 * 10^10
pub const B: u128 = 25_000_000_000_000; // 2.5 * 10^13

/// Hard cap on `total_supply`: `2^64 - 1`.
pub const MAX_TOTAL_SUPPLY: u64 = u64::MAX;

fn sum_first_n(n: u64) -> U256 {
    let n = U256::from(n);
    let np1 = n + U256::ONE;
    (n * np1) / U256::from(2u64)
}

fn sum_squares(n: u64) -> U256 {
    let n = U256::from(n);
    let np1 = n + U256::ONE;
    let two_np1 = n + np1;
    (n * np1 * two_np1) / U256::from(6u64)
}

/// Per-unit instantaneous price at supply `s`: `BASE + A*s^2 + B*s`.
pub fn spot_price(supply: u64) -> U256 {
    let s = U256::from(supply);
    U256::from(BASE) + U256::from(A) * s * s + U256::from(B) * s
}

/// Cost of trading the inclusive unit range `[from_supply, to_supply]`.
/// For a buy, `from_supply = total_supply` and `to_supply = total_supply +
/// amount - 1`; for a sell, `from_supply = total_supply - amount` and
/// `to_supply = total_supply - 1`. Callers are responsible for validating
/// `from_supply <= to_supply` and the supply cap before calling.
pub fn trade_cost(from_supply: u64, to_supply: u64) -> U256 {
    debug_assert!(from_supply <= to_supply);

    let amount = U256::from(to_supply) - U256::from(from_supply) + U256::ONE;

    let (sum_sq, sum_n) = if from_supply == 0 {
        (sum_squares(to_supply), sum_first_n(to_supply))
    } else {
        (
            sum_squares(to_supply) - sum_squares(from_supply - 1),
            sum_first_n(to_supply) - sum_first_n(from_supply - 1),
        )
    };

    U256::from(BASE) * amount + U256::from(A) * sum_sq + U256::from(B) * sum_n
}
