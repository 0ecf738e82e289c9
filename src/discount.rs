//! Per-line discount specifications.
//!
//! A discount is entered as free text: `"10%"` is a percentage of the line's gross value and
//! `"25"` is a flat amount. [`DiscountSpec`] keeps the text exactly as entered (it is printed
//! back on the invoice) and [`Discount`] is its parsed form.

use std::fmt::Display;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::money::{parse_amount, percent_of};

/// Parsed discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discount {
    /// Percentage of the gross value
    Percent(BigDecimal),
    /// Flat monetary amount
    Flat(BigDecimal),
}

impl Discount {
    /// Monetary discount against `gross`. No upper bound is applied, so the result may exceed
    /// the gross value.
    pub fn amount(&self, gross: &BigDecimal) -> BigDecimal {
        match self {
            Discount::Percent(pct) => percent_of(gross, pct),
            Discount::Flat(amount) => amount.clone(),
        }
    }
}

/// Discount exactly as entered on a line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiscountSpec(String);

impl DiscountSpec {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse the entered text. Unparsable numbers become a zero discount of the same kind.
    pub fn parse(&self) -> Discount {
        let raw = self.0.trim();
        match raw.strip_suffix('%') {
            Some(pct) => Discount::Percent(parse_amount(pct)),
            None => Discount::Flat(parse_amount(raw)),
        }
    }

    /// Monetary discount for a line with the given gross value.
    pub fn resolve(&self, gross: &BigDecimal) -> BigDecimal {
        self.parse().amount(gross)
    }
}

impl Display for DiscountSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DiscountSpec {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DiscountSpec {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Drafts coming from forms carry either text or a bare number here.
impl<'de> Deserialize<'de> for DiscountSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Self(s),
            Value::Number(n) => Self(n.to_string()),
            _ => Self::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::Zero;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn percent_discount_is_a_share_of_gross() {
        let spec = DiscountSpec::from("10%");
        assert_eq!(spec.parse(), Discount::Percent(dec("10")));
        assert_eq!(spec.resolve(&dec("200")), dec("20"));
    }

    #[test]
    fn flat_discount_ignores_gross() {
        let spec = DiscountSpec::from("25.5");
        assert_eq!(spec.resolve(&dec("200")), dec("25.5"));
        assert_eq!(spec.resolve(&dec("10")), dec("25.5"));
    }

    #[test]
    fn unparsable_discounts_are_zero() {
        assert_eq!(DiscountSpec::from("abc%").resolve(&dec("100")), BigDecimal::zero());
        assert_eq!(DiscountSpec::from("abc").resolve(&dec("100")), BigDecimal::zero());
        assert_eq!(DiscountSpec::from("%").resolve(&dec("100")), BigDecimal::zero());
        assert_eq!(DiscountSpec::default().resolve(&dec("100")), BigDecimal::zero());
    }

    #[test]
    fn discount_may_exceed_gross() {
        assert_eq!(DiscountSpec::from("150%").resolve(&dec("100")), dec("150"));
    }

    #[test]
    fn raw_text_round_trips_through_json() {
        let spec: DiscountSpec = serde_json::from_value(serde_json::json!("7.5%")).unwrap();
        assert_eq!(spec.to_string(), "7.5%");
        assert_eq!(serde_json::to_value(&spec).unwrap(), serde_json::json!("7.5%"));

        let spec: DiscountSpec = serde_json::from_value(serde_json::json!(12)).unwrap();
        assert_eq!(spec.parse(), Discount::Flat(dec("12")));

        let spec: DiscountSpec = serde_json::from_value(serde_json::json!(null)).unwrap();
        assert_eq!(spec, DiscountSpec::default());
    }
}
