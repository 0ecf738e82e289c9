//! Final amount selection: manual override, automatic rounding, or the exact grand total.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::{
    money::{round_money, serialize_bigdecimal},
    profile::CalculationProfile,
};

/// How the invoice total is arrived at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalCalculation {
    #[default]
    Auto,
    /// The user may type the final amount
    Manual,
}

/// Where the final amount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalAmountSource {
    Manual,
    Rounded,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundOff {
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub final_amount: BigDecimal,
    /// `final_amount - grand_total`
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub round_off_amount: BigDecimal,
    pub final_amount_source: FinalAmountSource,
}

impl RoundOff {
    /// Decide the final amount for `grand_total`.
    ///
    /// A manual total only takes effect in manual mode; otherwise rounding to the nearest whole
    /// unit (halves away from zero) applies when enabled.
    pub fn apply(
        grand_total: &BigDecimal,
        profile: &CalculationProfile,
        manual_total: Option<&BigDecimal>,
    ) -> Self {
        let manual = match profile.total_calculation() {
            TotalCalculation::Manual => manual_total,
            TotalCalculation::Auto => None,
        };
        let (final_amount, final_amount_source) = match (manual, profile.enable_rounding()) {
            (Some(value), _) => (value.clone(), FinalAmountSource::Manual),
            (None, true) => (round_money(grand_total, 0), FinalAmountSource::Rounded),
            (None, false) => (grand_total.clone(), FinalAmountSource::Exact),
        };
        let round_off_amount = match final_amount_source {
            FinalAmountSource::Exact => BigDecimal::zero(),
            FinalAmountSource::Manual | FinalAmountSource::Rounded => &final_amount - grand_total,
        };
        Self {
            final_amount,
            round_off_amount,
            final_amount_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::profile::CalculationProfileBuilder;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn profile(enable_rounding: bool, total_calculation: TotalCalculation) -> CalculationProfile {
        CalculationProfileBuilder::default()
            .enable_rounding(enable_rounding)
            .total_calculation(total_calculation)
            .build()
            .unwrap()
    }

    #[test]
    fn manual_total_overrides_grand_total() {
        let manual = dec("250.00");
        let r = RoundOff::apply(
            &dec("236.00"),
            &profile(true, TotalCalculation::Manual),
            Some(&manual),
        );
        assert_eq!(r.final_amount, dec("250"));
        assert_eq!(r.round_off_amount, dec("14.00"));
        assert_eq!(r.final_amount_source, FinalAmountSource::Manual);
    }

    #[test]
    fn manual_mode_without_value_falls_back_to_rounding() {
        let r = RoundOff::apply(&dec("235.41"), &profile(true, TotalCalculation::Manual), None);
        assert_eq!(r.final_amount, dec("235"));
        assert_eq!(r.round_off_amount, dec("-0.41"));
        assert_eq!(r.final_amount_source, FinalAmountSource::Rounded);
    }

    #[test]
    fn manual_value_is_ignored_in_auto_mode() {
        let manual = dec("999");
        let r = RoundOff::apply(
            &dec("212.50"),
            &profile(true, TotalCalculation::Auto),
            Some(&manual),
        );
        assert_eq!(r.final_amount, dec("213"));
        assert_eq!(r.round_off_amount, dec("0.5"));
    }

    #[test]
    fn nothing_active_keeps_grand_total_exactly() {
        let r = RoundOff::apply(&dec("212.40"), &profile(false, TotalCalculation::Auto), None);
        assert_eq!(r.final_amount, dec("212.40"));
        assert!(r.round_off_amount.is_zero());
        assert_eq!(r.final_amount_source, FinalAmountSource::Exact);
    }

    #[test]
    fn manual_delta_may_be_negative() {
        let manual = dec("200");
        let r = RoundOff::apply(
            &dec("236"),
            &profile(false, TotalCalculation::Manual),
            Some(&manual),
        );
        assert_eq!(r.round_off_amount, dec("-36"));
    }
}
