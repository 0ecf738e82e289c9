//! Document-level additional charges and their proportional tax allocation.
//!
//! A charge such as freight or insurance, or the document-level discount, is not taxed at a
//! single rate of its own. It is split across the invoice lines in proportion to each line's
//! share of the total item taxable value, and every portion is taxed with that line's own rates
//! and route. A charge spread over a 28% line and a 0% line therefore carries tax only on the
//! part that falls on the 28% line, never an averaged rate.
//!
//! Allocation is always measured against the item taxable total before any charge, so the
//! order of charges does not matter.

use bigdecimal::{BigDecimal, Zero};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    line::CalculatedLineItem,
    money::{deserialize_bigdecimal, percent_of, round_money, serialize_bigdecimal, trim_zeros},
    tax::{TaxBreakdown, TaxDisplay},
};

/// How a charge's value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    /// Percentage of the total item taxable value
    Percentage,
    /// Fixed monetary amount
    #[default]
    Fixed,
}

/// Direction in which a charge moves the invoice total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeSign {
    Add,
    Deduct,
}

impl ChargeSign {
    pub fn apply(self, value: &BigDecimal) -> BigDecimal {
        match self {
            ChargeSign::Add => value.clone(),
            ChargeSign::Deduct => -value.clone(),
        }
    }

    pub fn apply_tax(self, tax: &TaxBreakdown) -> TaxBreakdown {
        match self {
            ChargeSign::Add => tax.clone(),
            ChargeSign::Deduct => -tax.clone(),
        }
    }
}

fn default_visible() -> bool {
    true
}

/// An additional charge line below the items.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned")]
pub struct AdditionalCharge {
    #[serde(default)]
    label: String,
    #[builder(default)]
    #[serde(default)]
    kind: ChargeKind,
    #[builder(default)]
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    value: BigDecimal,
    #[builder(default)]
    #[serde(default)]
    ledger_id: Option<String>,
    /// Set only on the document-level discount, which is deducted rather than added
    #[builder(default)]
    #[serde(default)]
    mandatory: bool,
    #[builder(default = true)]
    #[serde(default = "default_visible")]
    visible: bool,
}

impl AdditionalCharge {
    /// The mandatory document-level discount charge.
    pub fn document_discount(kind: ChargeKind, value: impl Into<BigDecimal>) -> Self {
        Self {
            label: String::from("Discount"),
            kind,
            value: value.into(),
            ledger_id: None,
            mandatory: true,
            visible: true,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> ChargeKind {
        self.kind
    }

    pub fn value(&self) -> &BigDecimal {
        &self.value
    }

    pub fn ledger_id(&self) -> Option<&str> {
        self.ledger_id.as_deref()
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Visibility only affects presentation; hidden charges are still calculated.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn sign(&self) -> ChargeSign {
        if self.mandatory {
            ChargeSign::Deduct
        } else {
            ChargeSign::Add
        }
    }

    /// Unsigned amount of the charge against the total item taxable value.
    pub fn amount(&self, total_items_taxable: &BigDecimal) -> BigDecimal {
        match self.kind {
            ChargeKind::Percentage => percent_of(total_items_taxable, &self.value),
            ChargeKind::Fixed => self.value.clone(),
        }
    }
}

/// The part of a charge that falls on one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeAllocation {
    pub line_index: usize,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub proportion: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub portion: BigDecimal,
    pub tax: TaxBreakdown,
}

/// A charge with its amount, allocated tax and signed contribution to the invoice.
///
/// `amount`, `tax` and `allocations` are unsigned; `signed_amount`, `signed_tax` and `total`
/// have the charge's sign applied and are what enter the invoice totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedCharge {
    pub charge: AdditionalCharge,
    pub sign: ChargeSign,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub amount: BigDecimal,
    pub tax: TaxBreakdown,
    pub allocations: Vec<ChargeAllocation>,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub signed_amount: BigDecimal,
    pub signed_tax: TaxBreakdown,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub total: BigDecimal,
}

/// Decimal places kept on allocated shares and portions.
pub const ALLOCATION_SCALE: i64 = 10;

/// Split a charge's amount over `lines` by taxable share and tax each portion at the line's
/// own rates.
///
/// Shares and portions are rounded to [`ALLOCATION_SCALE`] places. The last line with a
/// non-zero taxable value takes whatever is left, so shares always sum to exactly one and
/// portions to exactly `amount`. Nothing is allocated when the total item taxable value is not
/// positive.
pub fn allocate(
    amount: &BigDecimal,
    lines: &[CalculatedLineItem],
    total_items_taxable: &BigDecimal,
) -> Vec<ChargeAllocation> {
    if total_items_taxable <= &BigDecimal::zero() {
        return Vec::new();
    }
    let Some(last) = lines.iter().rposition(|l| !l.taxable_value.is_zero()) else {
        return Vec::new();
    };

    let mut shared = BigDecimal::zero();
    let mut allocated = BigDecimal::zero();
    let mut allocations = Vec::with_capacity(lines.len());
    for (line_index, line) in lines.iter().enumerate() {
        let (proportion, portion) = if line_index == last {
            (BigDecimal::from(1) - &shared, amount - &allocated)
        } else {
            let proportion = round_money(
                &(&line.taxable_value / total_items_taxable),
                ALLOCATION_SCALE,
            );
            let portion = round_money(
                &(amount * &line.taxable_value / total_items_taxable),
                ALLOCATION_SCALE,
            );
            (proportion, portion)
        };
        shared += &proportion;
        allocated += &portion;

        let proportion = trim_zeros(&proportion);
        let portion = trim_zeros(&portion);
        let tax = TaxBreakdown::assess(line.route, line.line.rates(), &portion);
        allocations.push(ChargeAllocation {
            line_index,
            proportion,
            portion,
            tax,
        });
    }
    allocations
}

/// Compute one additional charge against the already calculated lines. With taxes hidden the
/// charge carries no tax.
pub fn calculate_charge(
    charge: &AdditionalCharge,
    lines: &[CalculatedLineItem],
    total_items_taxable: &BigDecimal,
    display: TaxDisplay,
) -> CalculatedCharge {
    let amount = charge.amount(total_items_taxable);
    let allocations = match display {
        TaxDisplay::NoTax => Vec::new(),
        TaxDisplay::Breakdown => allocate(&amount, lines, total_items_taxable),
    };
    let tax: TaxBreakdown = allocations.iter().map(|a| &a.tax).sum();
    let sign = charge.sign();
    let signed_amount = sign.apply(&amount);
    let signed_tax = sign.apply_tax(&tax);
    let total = signed_tax.total() + &signed_amount;
    CalculatedCharge {
        charge: charge.clone(),
        sign,
        amount,
        tax,
        allocations,
        signed_amount,
        signed_tax,
        total,
    }
}
