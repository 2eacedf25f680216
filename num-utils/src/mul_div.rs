
use core::ops::Mul;

use bnum::{BInt, BUint, cast::As};

pub trait CheckedMulDiv<RHS = Self>: Sized {
    fn checked_mul_div(self, mul: RHS, div: RHS) -> Option<Self>;
    fn checked_mul_div_ceil(self, mul: RHS, div: RHS) -> Option<Self>;
    fn checked_mul_div_euclid(self, mul: RHS, div: RHS) -> Option<Self>;
}

macro_rules! impl_checked_mul_div {
    ($t:ty as $h:ty) => {
        impl CheckedMulDiv for $t {
            #[inline]
            fn checked_mul_div(self, mul: Self, div: Self) -> Option<Self> {
                self.as_::<$h>()
                    .mul(mul.as_::<$h>())
                    .checked_div(div.as_::<$h>())?
                    .try_into()
                    .ok()
            }

            #[inline]
            fn checked_mul_div_ceil(self, mul: Self, div: Self) -> Option<Self> {
                if div == 0 {
                    return None;
                }
                self.as_::<$h>()
                    .mul(mul.as_::<$h>())
                    .div_ceil(div.as_::<$h>())
                    .try_into()
                    .ok()
            }

            #[inline]
            fn checked_mul_div_euclid(self, mul: Self, div: Self) -> Option<Self> {
                if div == 0 {
                    return None;
                }
                self.as_::<$h>()
                    .mul(mul.as_::<$h>())
                    .div_euclid(div.as_::<$h>())
                    .try_into()
                    .ok()
            }
        }
    };
}
impl_checked_mul_div!(u8 as u16);
impl_checked_mul_div!(u16 as u32);
impl_checked_mul_div!(u32 as u64);
impl_checked_mul_div!(u64 as u128);
impl_checked_mul_div!(u128 as BUint<4>);

// #![feature(int_roundings)]
// const _: () = {
//     impl_checked_mul_div!(i8 as i16);
//     impl_checked_mul_div!(i16 as i32);
//     impl_checked_mul_div!(i32 as i64);
//     impl_checked_mul_div!(i64 as i128);
// };
impl_checked_mul_div!(i128 as BInt<4>);
impl_checked_mul_div!(BUint<4> as BUint<8>);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn mul_div_floors() {
        assert_eq!(7u128.checked_mul_div(3, 2), Some(10));
    }

    #[rstest]
    fn mul_div_ceil_rounds_up() {
        assert_eq!(7u128.checked_mul_div_ceil(3, 2), Some(11));
    }

    #[rstest]
    fn mul_div_rejects_zero_divisor() {
        assert_eq!(7u128.checked_mul_div(3, 0), None);
        assert_eq!(7u128.checked_mul_div_ceil(3, 0), None);
        assert_eq!(7u128.checked_mul_div_euclid(3, 0), None);
    }

    #[rstest]
    fn mul_div_widens_past_native_overflow() {
        // u128::MAX * 2 overflows u128 outright; the BUint<4> widening keeps
        // the intermediate product exact.
        let huge = BUint::<4>::from(u128::MAX);
        assert_eq!(huge.checked_mul_div(BUint::from(2u64), BUint::from(2u64)), Some(huge));
    }
}
