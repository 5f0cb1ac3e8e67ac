use bigdecimal::BigDecimal;
use common_money::{normalize_scale, Money};
use proptest::prelude::*;
use std::str::FromStr;

proptest! {
    // Summing amounts must agree with summing their cent values.
    #[test]
    fn sum_matches_integer_cents(cents in proptest::collection::vec(0i64..1_000_000, 0..20)) {
        let expected: i64 = cents.iter().sum();
        let total: Money = cents.iter().copied().map(Money::from_cents).sum();
        prop_assert_eq!(total.to_cents(), expected);
    }

    // Normalization never increases a positive amount and keeps it within one cent.
    #[test]
    fn normalize_truncates_positive(units in 0i64..100_000, thousandths in 0u32..1000) {
        let raw = BigDecimal::from_str(&format!("{units}.{thousandths:03}")).unwrap();
        let norm = normalize_scale(&raw);
        prop_assert!(norm <= raw);
        prop_assert!(&raw - &norm < BigDecimal::from_str("0.01").unwrap());
    }
}
