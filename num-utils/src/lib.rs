#![cfg_attr(not(test), no_std)]

mod mul_div;

pub use self::mul_div::*;
