use std::str::FromStr;
use bitcoin::Amount;

use crate::error::AppError;

/// 1000バイトあたりのリレー手数料 (sats)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FeeRate(u64);

impl FeeRate {
    pub const ZERO: FeeRate = FeeRate(0);

    pub const fn from_sat_per_kvb(sat_per_kvb: u64) -> Self {
        FeeRate(sat_per_kvb)
    }

    pub const fn to_sat_per_kvb(self) -> u64 {
        self.0
    }

    /// シリアライズサイズに対する手数料。端数は切り上げ、MAX_MONEY で頭打ち。
    pub fn fee(&self, serialize_size: usize) -> Amount {
        let fee = (u128::from(self.0) * serialize_size as u128).div_ceil(1000);
        u64::try_from(fee)
            .ok()
            .map(Amount::from_sat)
            .filter(|fee| *fee <= Amount::MAX_MONEY)
            .unwrap_or(Amount::MAX_MONEY)
    }
}

impl FromStr for FeeRate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(FeeRate)
            .map_err(|e| AppError::InputValidation(format!("無効な手数料率 ({}): {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("1000".parse::<FeeRate>().unwrap(), FeeRate::from_sat_per_kvb(1000));
        assert_eq!(" 0 ".parse::<FeeRate>().unwrap(), FeeRate::ZERO);
        assert!("-4".parse::<FeeRate>().is_err());
        assert!("1.5".parse::<FeeRate>().is_err());
        assert!("".parse::<FeeRate>().is_err());
    }

    #[test]
    fn fee() {
        let rate = FeeRate::from_sat_per_kvb(1000);
        assert_eq!(rate.fee(228), Amount::from_sat(228));
        assert_eq!(FeeRate::from_sat_per_kvb(10_000).fee(250), Amount::from_sat(2500));
        assert_eq!(FeeRate::ZERO.fee(1_000_000), Amount::ZERO);
    }

    #[test]
    fn fee_rounds_up() {
        assert_eq!(FeeRate::from_sat_per_kvb(1).fee(1), Amount::from_sat(1));
        assert_eq!(FeeRate::from_sat_per_kvb(1500).fee(3), Amount::from_sat(5));
        assert_eq!(FeeRate::from_sat_per_kvb(1000).fee(0), Amount::ZERO);
    }

    #[test]
    fn fee_saturates_at_max_money() {
        assert_eq!(FeeRate::from_sat_per_kvb(u64::MAX).fee(usize::MAX), Amount::MAX_MONEY);
        assert_eq!(
            FeeRate::from_sat_per_kvb(Amount::MAX_MONEY.to_sat()).fee(2000),
            Amount::MAX_MONEY
        );
    }

    #[test]
    fn fee_is_monotonic_in_size() {
        let rate = FeeRate::from_sat_per_kvb(1234);
        let mut last = Amount::ZERO;
        for size in 0..5000 {
            let fee = rate.fee(size);
            assert!(fee >= last);
            last = fee;
        }
    }
}
