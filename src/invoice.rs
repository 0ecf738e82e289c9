//! Invoice drafts and the calculation that resolves them.
//!
//! An [`InvoiceDraft`] is the caller's current snapshot of an invoice being edited. Calling
//! [`compute`] (or [`InvoiceDraft::compute`]) derives a [`CalculatedInvoice`] from it. The
//! calculation keeps no state between calls: the same draft always yields the same result, so
//! it can be rerun after every edit.

use bigdecimal::BigDecimal;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    charge::{AdditionalCharge, CalculatedCharge, calculate_charge},
    error::AddContext,
    line::{CalculatedLineItem, LineItem, calculate_line},
    money::{deserialize_optional_bigdecimal, serialize_optional_bigdecimal},
    profile::CalculationProfile,
    rounding::RoundOff,
    settlement::{Payments, Settlement},
    tax::{TaxRoute, TaxTable},
    totals::InvoiceTotals,
};

/// Invoice input as edited by the user.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned")]
pub struct InvoiceDraft {
    id: String,
    #[builder(default)]
    #[serde(default)]
    supplier_location: String,
    #[builder(default)]
    #[serde(default)]
    customer_location: Option<String>,
    #[builder(default)]
    #[serde(default)]
    profile: CalculationProfile,
    #[builder(default)]
    #[serde(
        serialize_with = "serialize_optional_bigdecimal",
        deserialize_with = "deserialize_optional_bigdecimal",
        default
    )]
    manual_total: Option<BigDecimal>,
    #[builder(default)]
    #[serde(default)]
    payments: Payments,
    #[builder(default = Vec::new())]
    #[serde(default)]
    line_items: Vec<LineItem>,
    #[builder(default = Vec::new())]
    #[serde(default)]
    additional_charges: Vec<AdditionalCharge>,
}

/// A fully resolved invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedInvoice {
    pub id: String,
    pub profile: String,
    pub line_items: Vec<CalculatedLineItem>,
    pub additional_charges: Vec<CalculatedCharge>,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
    #[serde(flatten)]
    pub round_off: RoundOff,
    #[serde(flatten)]
    pub settlement: Settlement,
}

impl CalculatedInvoice {
    pub fn grand_total(&self) -> &BigDecimal {
        &self.totals.grand_total
    }

    pub fn final_amount(&self) -> &BigDecimal {
        &self.round_off.final_amount
    }

    pub fn balance_due(&self) -> &BigDecimal {
        &self.settlement.balance_due
    }
}

/// Resolve every figure of `draft`.
///
/// Lines are calculated first. Charges are then measured against the summed item taxable
/// value, totals are aggregated, the final amount is chosen and payments are netted off.
///
/// Lines are taxed with the rates they carry. Use [`compute_with`] to resolve tax references
/// through a [`TaxTable`] first.
pub fn compute(draft: &InvoiceDraft) -> CalculatedInvoice {
    let display = draft.profile.tax_display();

    let line_items: Vec<CalculatedLineItem> = draft
        .line_items
        .iter()
        .map(|line| {
            let route =
                TaxRoute::between(&draft.supplier_location, draft.customer_location.as_deref());
            calculate_line(line, route, display)
        })
        .collect();
    let total_items_taxable: BigDecimal = line_items.iter().map(|l| &l.taxable_value).sum();
    let additional_charges: Vec<CalculatedCharge> = draft
        .additional_charges
        .iter()
        .map(|charge| calculate_charge(charge, &line_items, &total_items_taxable, display))
        .collect();

    let totals = InvoiceTotals::aggregate(&line_items, &additional_charges);
    let round_off = RoundOff::apply(
        &totals.grand_total,
        &draft.profile,
        draft.manual_total.as_ref(),
    );
    let settlement = Settlement::net(&round_off.final_amount, &draft.payments);

    debug!(
        invoice = %draft.id,
        profile = draft.profile.name(),
        lines = line_items.len(),
        charges = additional_charges.len(),
        grand_total = %totals.grand_total,
        final_amount = %round_off.final_amount,
        balance_due = %settlement.balance_due,
        "computed invoice"
    );

    CalculatedInvoice {
        id: draft.id.clone(),
        profile: draft.profile.name().to_string(),
        line_items,
        additional_charges,
        totals,
        round_off,
        settlement,
    }
}

/// Resolve every line's tax reference through `table`, then [`compute`].
///
/// Lines with a reference the table does not know are taxed at zero rates, whatever rates they
/// carried inline. Lines without a reference keep their own rates.
pub fn compute_with(draft: &InvoiceDraft, table: &TaxTable) -> CalculatedInvoice {
    let mut resolved = draft.clone();
    resolved.apply_tax_table(table);
    compute(&resolved)
}

impl InvoiceDraft {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn supplier_location(&self) -> &str {
        &self.supplier_location
    }

    pub fn customer_location(&self) -> Option<&str> {
        self.customer_location.as_deref()
    }

    pub fn profile(&self) -> &CalculationProfile {
        &self.profile
    }

    pub fn manual_total(&self) -> Option<&BigDecimal> {
        self.manual_total.as_ref()
    }

    pub fn payments(&self) -> &Payments {
        &self.payments
    }

    /// Return a reference to the draft's line items.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn line_items_mut(&mut self) -> &mut [LineItem] {
        &mut self.line_items
    }

    pub fn additional_charges(&self) -> &[AdditionalCharge] {
        &self.additional_charges
    }

    /// Calculate this draft. See [`compute`].
    pub fn compute(&self) -> CalculatedInvoice {
        compute(self)
    }

    /// Calculate this draft with rates from `table`. See [`compute_with`].
    pub fn compute_with(&self, table: &TaxTable) -> CalculatedInvoice {
        compute_with(self, table)
    }

    /// Replace the rates of every line that carries a tax reference with the table's rates.
    pub fn apply_tax_table(&mut self, table: &TaxTable) {
        table.apply(&mut self.line_items);
    }

    pub fn add_line(&mut self, line: LineItem) {
        self.line_items.push(line);
    }

    /// Remove the line at `index`, returning it. Removing the only line leaves a blank line in
    /// its place so the draft always has a line to edit.
    pub fn remove_line(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.line_items.len() {
            return None;
        }
        if self.line_items.len() == 1 {
            return Some(std::mem::replace(&mut self.line_items[0], LineItem::blank()));
        }
        Some(self.line_items.remove(index))
    }

    pub fn add_charge(&mut self, charge: AdditionalCharge) {
        self.additional_charges.push(charge);
    }

    /// The mandatory document-level discount charge, if the draft has one.
    pub fn document_discount(&self) -> Option<&AdditionalCharge> {
        self.additional_charges.iter().find(|c| c.is_mandatory())
    }

    pub fn set_manual_total(&mut self, manual_total: Option<BigDecimal>) {
        self.manual_total = manual_total;
    }

    pub fn set_customer_location(&mut self, customer_location: Option<String>) {
        self.customer_location = customer_location;
    }

    pub fn set_payments(&mut self, payments: Payments) {
        self.payments = payments;
    }

    /// Install a different calculation profile. Any manual total is cleared since it was
    /// entered against the old profile's rules.
    pub fn switch_profile(&mut self, profile: CalculationProfile) {
        if self.manual_total.is_some() {
            debug!(
                invoice = %self.id,
                profile = profile.name(),
                "clearing manual total on profile switch"
            );
        }
        self.profile = profile;
        self.manual_total = None;
    }

    /// Parse a JSON array of drafts.
    pub fn list_from_json(raw: &str) -> Result<Vec<InvoiceDraft>, crate::Error> {
        serde_json::from_str(raw)
            .map_err(crate::Error::from)
            .add_context("parsing invoice draft JSON")
    }
}

impl InvoiceDraftBuilder {
    /// Add a [`LineItem`] to the builder's internal list.
    ///
    /// # Arguments
    /// * `line` - The [`LineItem`] to append.
    ///
    /// # Returns
    /// The updated [`InvoiceDraftBuilder`].
    pub fn add_line(self, line: LineItem) -> Self {
        match self.line_items {
            Some(mut l) => {
                l.push(line);
                Self {
                    line_items: Some(l),
                    ..self
                }
            }
            None => Self {
                line_items: Some(vec![line]),
                ..self
            },
        }
    }

    /// Add an [`AdditionalCharge`] to the builder's internal list.
    pub fn add_charge(self, charge: AdditionalCharge) -> Self {
        match self.additional_charges {
            Some(mut c) => {
                c.push(charge);
                Self {
                    additional_charges: Some(c),
                    ..self
                }
            }
            None => Self {
                additional_charges: Some(vec![charge]),
                ..self
            },
        }
    }
}
