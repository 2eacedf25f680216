use vcred_num_utils::CheckedMulDiv;

use crate::{
    curve::U256,
    error::{Error, Result},
};

pub const FEE_DEN: u32 = 1_000_000;
pub const CREATOR_FEE_PPM: u32 = 20_000; // 2.0%
pub const PROTOCOL_FEE_PPM: u32 = 20_000; // 2.0%
pub const REFERRER_FEE_PPM: u32 = 10_000; // 1.0%

/// `creator_fee`, `protocol_fee`, `referrer_fee` split of a trade's cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub creator_fee: U256,
    pub protocol_fee: U256,
    pub referrer_fee: U256,
}

/// Enforced once, at construction time: `PROTOCOL_FEE_PPM > REFERRER_FEE_PPM`.
pub fn validate_fee_params() -> Result<()> {
    if PROTOCOL_FEE_PPM <= REFERRER_FEE_PPM {
        return Err(Error::InvalidFeeParams);
    }
    Ok(())
}

fn ppm_of(amount: U256, ppm: u32) -> U256 {
    amount
        .checked_mul_div(U256::from(ppm), U256::from(FEE_DEN))
        .unwrap_or_else(|| unreachable!("ppm is bounded by FEE_DEN, division cannot overflow"))
}

/// Splits `trade_cost` into creator/protocol/referrer shares. When a
/// referrer is present, the protocol's share is reduced by the referrer's
/// (see spec's open question on `PROTOCOL_FEE_PPM - REFERRER_FEE_PPM`: with
/// the normative constants this never underflows, but it is still checked
/// rather than assumed so a future constant change fails loudly).
pub fn split(trade_cost: U256, has_referrer: bool) -> Result<FeeSplit> {
    let creator_fee = ppm_of(trade_cost, CREATOR_FEE_PPM);

    let (protocol_fee, referrer_fee) = if has_referrer {
        let protocol_ppm = PROTOCOL_FEE_PPM
            .checked_sub(REFERRER_FEE_PPM)
            .ok_or(Error::InvalidFeeParams)?;
        (ppm_of(trade_cost, protocol_ppm), ppm_of(trade_cost, REFERRER_FEE_PPM))
    } else {
        (ppm_of(trade_cost, PROTOCOL_FEE_PPM), U256::ZERO)
    };

    Ok(FeeSplit {
        creator_fee,
        protocol_fee,
        referrer_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn first_unit_fee_split() {
        // trade_cost = BASE = 10^14
        let cost = U256::from(100_000_000_000_000u128);
        let split = split(cost, false).unwrap();
        assert_eq!(split.creator_fee, U256::from(2_000_000_000_000u128));
        assert_eq!(split.protocol_fee, U256::from(2_000_000_000_000u128));
        assert_eq!(split.referrer_fee, U256::ZERO);
    }

    #[rstest]
    fn referrer_reduces_protocol_share() {
        let cost = U256::from(100_000_000_000_000u128);
        let split = split(cost, true).unwrap();
        assert_eq!(split.creator_fee, U256::from(2_000_000_000_000u128));
        assert_eq!(split.referrer_fee, U256::from(1_000_000_000_000u128));
        assert_eq!(split.protocol_fee, U256::from(1_000_000_000_000u128));
        assert_eq!(
            split.protocol_fee + split.referrer_fee,
            U256::from(2_000_000_000_000u128)
        );
    }

    #[rstest]
    fn fee_split_is_exact() {
        let cost = U256::from(7_000_000_000_000_000u128);
        let no_ref = split(cost, false).unwrap();
        let with_ref = split(cost, true).unwrap();
        let expected = ppm_of(cost, CREATOR_FEE_PPM + PROTOCOL_FEE_PPM);
        assert_eq!(no_ref.creator_fee + no_ref.protocol_fee, expected);
        assert_eq!(
            with_ref.creator_fee + with_ref.protocol_fee + with_ref.referrer_fee,
            expected
        );
    }
}
