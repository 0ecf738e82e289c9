//! Netting payments, credit notes and expense adjustments against the final amount.

use bigdecimal::{BigDecimal, Zero};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::money::{deserialize_bigdecimal, serialize_bigdecimal};

/// Amounts already settled against an invoice. Each defaults to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(default, setter(into), pattern = "owned")]
pub struct Payments {
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    amount_paid: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    credits_applied: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    expenses_adjusted: BigDecimal,
}

impl Payments {
    pub fn amount_paid(&self) -> &BigDecimal {
        &self.amount_paid
    }

    pub fn credits_applied(&self) -> &BigDecimal {
        &self.credits_applied
    }

    pub fn expenses_adjusted(&self) -> &BigDecimal {
        &self.expenses_adjusted
    }

    pub fn total_settled(&self) -> BigDecimal {
        &self.amount_paid + &self.credits_applied + &self.expenses_adjusted
    }
}

/// Sign of the balance due. An overpayment is a valid state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Due,
    Settled,
    Overpaid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub total_settled: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub balance_due: BigDecimal,
    #[serde(rename = "settlement_status")]
    pub status: SettlementStatus,
}

impl Settlement {
    /// `balance_due = final_amount - total_settled`, unclamped.
    pub fn net(final_amount: &BigDecimal, payments: &Payments) -> Self {
        let total_settled = payments.total_settled();
        let balance_due = final_amount - &total_settled;
        let status = if balance_due.is_zero() {
            SettlementStatus::Settled
        } else if balance_due > BigDecimal::zero() {
            SettlementStatus::Due
        } else {
            SettlementStatus::Overpaid
        };
        Self {
            total_settled,
            balance_due,
            status,
        }
    }
}
