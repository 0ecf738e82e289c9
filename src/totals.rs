//! Invoice-level sums. Nothing here is calculated independently; every figure is a sum of line
//! or charge figures.

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::{
    charge::CalculatedCharge,
    line::CalculatedLineItem,
    money::serialize_bigdecimal,
    tax::TaxBreakdown,
};

/// Sums over the item lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemAggregates {
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub gross: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub discount: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub taxable_value: BigDecimal,
    pub tax: TaxBreakdown,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub total: BigDecimal,
}

impl ItemAggregates {
    pub fn sum(lines: &[CalculatedLineItem]) -> Self {
        lines.iter().fold(Self::default(), |mut acc, line| {
            acc.gross += &line.gross;
            acc.discount += &line.discount;
            acc.taxable_value += &line.taxable_value;
            acc.tax += &line.tax;
            acc.total += &line.total;
            acc
        })
    }
}

/// Signed sums over the additional charges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChargeAggregates {
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub amount: BigDecimal,
    pub tax: TaxBreakdown,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub total: BigDecimal,
}

impl ChargeAggregates {
    pub fn sum(charges: &[CalculatedCharge]) -> Self {
        charges.iter().fold(Self::default(), |mut acc, charge| {
            acc.amount += &charge.signed_amount;
            acc.tax += &charge.signed_tax;
            acc.total += &charge.total;
            acc
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub items: ItemAggregates,
    pub charges: ChargeAggregates,
    /// Items and charges together, per component
    pub tax: TaxBreakdown,
    /// Sum of line totals
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub sub_total_a: BigDecimal,
    /// Sum of signed charge totals
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub sub_total_b: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub grand_total: BigDecimal,
}

impl InvoiceTotals {
    pub fn aggregate(lines: &[CalculatedLineItem], charges: &[CalculatedCharge]) -> Self {
        let items = ItemAggregates::sum(lines);
        let charges = ChargeAggregates::sum(charges);
        let mut tax = items.tax.clone();
        tax += &charges.tax;
        let sub_total_a = items.total.clone();
        let sub_total_b = charges.total.clone();
        let grand_total = &sub_total_a + &sub_total_b;
        Self {
            items,
            charges,
            tax,
            sub_total_a,
            sub_total_b,
            grand_total,
        }
    }

    /// Total tax across items and charges.
    pub fn total_tax(&self) -> BigDecimal {
        self.tax.total()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{
        charge::{AdditionalCharge, AdditionalChargeBuilder, ChargeKind, calculate_charge},
        line::{LineItemBuilder, calculate_line},
        tax::{TaxDisplay, TaxRates, TaxRoute},
    };

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn empty_invoice_totals_are_zero() {
        assert_eq!(InvoiceTotals::aggregate(&[], &[]), InvoiceTotals::default());
    }

    #[test]
    fn grand_total_is_sum_of_subtotals() {
        let lines: Vec<_> = [("10%", 18), ("0", 5)]
            .iter()
            .map(|(discount, gst)| {
                let item = LineItemBuilder::default()
                    .quantity(2)
                    .rate(100)
                    .discount(*discount)
                    .rates(TaxRates::gst(*gst))
                    .build()
                    .unwrap();
                calculate_line(&item, TaxRoute::Intrastate, TaxDisplay::Breakdown)
            })
            .collect();
        let taxable = &lines[0].taxable_value + &lines[1].taxable_value;
        let freight = AdditionalChargeBuilder::default()
            .label("Freight")
            .value(38)
            .build()
            .unwrap();
        let discount = AdditionalCharge::document_discount(ChargeKind::Fixed, 19);
        let charges: Vec<_> = [freight, discount]
            .iter()
            .map(|c| calculate_charge(c, &lines, &taxable, TaxDisplay::Breakdown))
            .collect();

        let totals = InvoiceTotals::aggregate(&lines, &charges);
        assert_eq!(totals.items.gross, dec("400"));
        assert_eq!(totals.items.discount, dec("20"));
        assert_eq!(totals.items.taxable_value, dec("380"));
        assert_eq!(totals.sub_total_a, &lines[0].total + &lines[1].total);
        assert_eq!(totals.sub_total_b, &charges[0].total + &charges[1].total);
        assert_eq!(totals.grand_total, &totals.sub_total_a + &totals.sub_total_b);
        assert_eq!(totals.charges.amount, dec("19"));
        assert_eq!(
            totals.total_tax(),
            totals.items.tax.total() + totals.charges.tax.total()
        );
    }
}
