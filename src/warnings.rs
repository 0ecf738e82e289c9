//! Business warnings about a draft.
//!
//! These never block a calculation; callers check them before or after [`crate::compute`] and
//! decide what to show the user.

use std::fmt::Display;

use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

use crate::{
    invoice::InvoiceDraft,
    line::ItemKind,
    money::serialize_bigdecimal,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum Warning {
    /// A goods line sells more units than are on hand
    InsufficientStock {
        line_index: usize,
        name: String,
        #[serde(serialize_with = "serialize_bigdecimal")]
        requested: BigDecimal,
        #[serde(serialize_with = "serialize_bigdecimal")]
        available: BigDecimal,
    },
    /// A draft should carry exactly one document-level discount charge
    MandatoryChargeCount { found: usize },
    /// A charge with a value has nowhere to be posted
    ChargeWithoutLedger { charge_index: usize, label: String },
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::InsufficientStock {
                line_index,
                name,
                requested,
                available,
            } => write!(
                f,
                "line {} '{name}' requests {requested} units but only {available} are in stock",
                line_index + 1
            ),
            Warning::MandatoryChargeCount { found } => write!(
                f,
                "expected exactly one document discount charge, found {found}"
            ),
            Warning::ChargeWithoutLedger {
                charge_index,
                label,
            } => write!(
                f,
                "charge {} '{label}' has no ledger account",
                charge_index + 1
            ),
        }
    }
}

/// Collect every warning for `draft`, in line then charge order.
pub fn check(draft: &InvoiceDraft) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for (line_index, line) in draft.line_items().iter().enumerate() {
        if line.kind() == ItemKind::Service {
            continue;
        }
        if let Some(available) = line.stock() {
            if line.quantity() > available {
                warnings.push(Warning::InsufficientStock {
                    line_index,
                    name: line.name().to_string(),
                    requested: line.quantity().clone(),
                    available: available.clone(),
                });
            }
        }
    }

    let mandatory = draft
        .additional_charges()
        .iter()
        .filter(|c| c.is_mandatory())
        .count();
    if mandatory != 1 {
        warnings.push(Warning::MandatoryChargeCount { found: mandatory });
    }

    for (charge_index, charge) in draft.additional_charges().iter().enumerate() {
        if charge.ledger_id().is_none() && !charge.value().is_zero() {
            warnings.push(Warning::ChargeWithoutLedger {
                charge_index,
                label: charge.label().to_string(),
            });
        }
    }

    warnings
}
