//! Decimal money helpers shared by every calculation stage.
//!
//! All amounts are [`BigDecimal`]. They are written to JSON as strings so no precision is lost
//! on the way to storage or print, and read back leniently: a JSON number, a numeric string, or
//! anything unparsable (which becomes zero) are all accepted, so a half-edited draft still
//! produces a result.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Parse a monetary or rate value, falling back to zero when the text is not a number.
pub fn parse_amount(raw: &str) -> BigDecimal {
    BigDecimal::from_str(raw.trim()).unwrap_or_else(|_| BigDecimal::zero())
}

/// `base * rate / 100`
pub fn percent_of(base: &BigDecimal, rate: &BigDecimal) -> BigDecimal {
    base * rate / BigDecimal::from(100)
}

/// Round to `places` decimal places, halves away from zero.
pub fn round_money(value: &BigDecimal, places: i64) -> BigDecimal {
    value.with_scale_round(places, RoundingMode::HalfUp)
}

/// Drop trailing fractional zeros, keeping whole numbers at scale zero (`5.000` becomes `5`,
/// `10` stays `10`).
pub fn trim_zeros(value: &BigDecimal) -> BigDecimal {
    let trimmed = value.normalized();
    if trimmed.as_bigint_and_exponent().1 < 0 {
        trimmed.with_scale(0)
    } else {
        trimmed
    }
}

fn amount_from_value(value: Value) -> Option<BigDecimal> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(parse_amount(&s)),
        Value::Number(n) => Some(parse_amount(&n.to_string())),
        _ => Some(BigDecimal::zero()),
    }
}

pub(crate) fn serialize_bigdecimal<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub(crate) fn serialize_optional_bigdecimal<S>(
    value: &Option<BigDecimal>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serializer.serialize_str(&v.to_string()),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn deserialize_bigdecimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(value).unwrap_or_else(BigDecimal::zero))
}

pub(crate) fn deserialize_optional_bigdecimal<'de, D>(
    deserializer: D,
) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(value))
}
