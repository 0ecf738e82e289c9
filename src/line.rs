//! Invoice line items and their per-line calculation.

use bigdecimal::BigDecimal;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    discount::DiscountSpec,
    money::{
        deserialize_bigdecimal, deserialize_optional_bigdecimal, serialize_bigdecimal,
        serialize_optional_bigdecimal,
    },
    tax::{TaxBreakdown, TaxDisplay, TaxRates, TaxRoute},
};

/// Whether a line sells stocked goods or a service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Goods,
    Service,
}

/// A single invoice line as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned")]
pub struct LineItem {
    #[builder(default)]
    #[serde(default)]
    name: String,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    quantity: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    rate: BigDecimal,
    #[builder(default)]
    #[serde(default)]
    discount: DiscountSpec,
    #[builder(default)]
    #[serde(default)]
    tax_rate_id: Option<String>,
    #[builder(default)]
    #[serde(default)]
    rates: TaxRates,
    #[builder(default)]
    #[serde(default)]
    hsn_code: Option<String>,
    #[builder(default)]
    #[serde(
        serialize_with = "serialize_optional_bigdecimal",
        deserialize_with = "deserialize_optional_bigdecimal",
        default
    )]
    stock: Option<BigDecimal>,
    #[builder(default)]
    #[serde(default)]
    kind: ItemKind,
}

impl LineItem {
    /// An empty line, used when the last line of a draft is removed.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> &BigDecimal {
        &self.quantity
    }

    /// Return the unit rate for this line item.
    pub fn rate(&self) -> &BigDecimal {
        &self.rate
    }

    pub fn discount(&self) -> &DiscountSpec {
        &self.discount
    }

    pub fn tax_rate_id(&self) -> Option<&str> {
        self.tax_rate_id.as_deref()
    }

    pub fn rates(&self) -> &TaxRates {
        &self.rates
    }

    pub fn set_rates(&mut self, rates: TaxRates) {
        self.rates = rates;
    }

    /// Item classification code (HSN for goods, SAC for services).
    pub fn hsn_code(&self) -> Option<&str> {
        self.hsn_code.as_deref()
    }

    /// Units on hand, when the catalog tracks them.
    pub fn stock(&self) -> Option<&BigDecimal> {
        self.stock.as_ref()
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Return the gross value for this line item equal to `quantity * rate`
    pub fn gross(&self) -> BigDecimal {
        &self.quantity * &self.rate
    }
}

/// A line item with every figure derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedLineItem {
    pub line: LineItem,
    pub route: TaxRoute,
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

/// Compute the taxable value, taxes and total of one line.
///
/// A discount larger than the gross value leaves a negative taxable value and negative taxes;
/// nothing is clamped.
pub fn calculate_line(line: &LineItem, route: TaxRoute, display: TaxDisplay) -> CalculatedLineItem {
    let gross = line.gross();
    let discount = line.discount.resolve(&gross);
    let taxable_value = &gross - &discount;
    let tax = match display {
        TaxDisplay::NoTax => TaxBreakdown::default(),
        TaxDisplay::Breakdown => {
            let mut tax = TaxBreakdown::assess(route, &line.rates, &taxable_value);
            tax.cess += &line.rates.cess_per_unit * &line.quantity;
            tax
        }
    };
    let total = tax.total() + &taxable_value;
    trace!(line = %line.name, ?route, %taxable_value, %total, "calculated line");
    CalculatedLineItem {
        line: line.clone(),
        route,
        gross,
        discount,
        taxable_value,
        tax,
        total,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::Zero;

    use super::*;
    use crate::tax::TaxRatesBuilder;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn gst_line(discount: &str) -> LineItem {
        LineItemBuilder::default()
            .name("Widget")
            .quantity(2)
            .rate(100)
            .discount(discount)
            .rates(TaxRates::gst(18))
            .build()
            .unwrap()
    }

    #[test]
    fn line_item_builder_success_and_accessors() {
        let item = LineItemBuilder::default()
            .name("Gadget")
            .quantity(3)
            .rate(dec("2.50"))
            .hsn_code("8471")
            .stock(10)
            .kind(ItemKind::Goods)
            .build()
            .unwrap();

        assert_eq!(item.name(), "Gadget");
        assert_eq!(item.quantity(), &dec("3"));
        assert_eq!(item.rate(), &dec("2.5"));
        assert_eq!(item.hsn_code(), Some("8471"));
        assert_eq!(item.stock(), Some(&dec("10")));
        assert_eq!(item.kind(), ItemKind::Goods);
        assert_eq!(item.discount(), &DiscountSpec::default());
        assert_eq!(item.gross(), dec("7.5"));
    }

    #[test]
    fn line_item_builder_missing_required_fields_fails() {
        // Missing rate
        let _ = LineItemBuilder::default().quantity(1).build().unwrap_err();

        // Missing quantity
        let _ = LineItemBuilder::default().rate(1).build().unwrap_err();
    }

    #[test]
    fn percent_discount_intrastate_line() {
        let calc = calculate_line(&gst_line("10%"), TaxRoute::Intrastate, TaxDisplay::Breakdown);
        assert_eq!(calc.gross, dec("200"));
        assert_eq!(calc.discount, dec("20"));
        assert_eq!(calc.taxable_value, dec("180.00"));
        assert_eq!(calc.tax.cgst, dec("16.20"));
        assert_eq!(calc.tax.sgst, dec("16.20"));
        assert!(calc.tax.igst.is_zero());
        assert_eq!(calc.total, dec("212.40"));
    }

    #[test]
    fn interstate_line_uses_igst() {
        let calc = calculate_line(&gst_line("20"), TaxRoute::Interstate, TaxDisplay::Breakdown);
        assert_eq!(calc.taxable_value, dec("180"));
        assert!(calc.tax.cgst.is_zero());
        assert!(calc.tax.sgst.is_zero());
        assert_eq!(calc.tax.igst, dec("32.4"));
        assert_eq!(calc.total, dec("212.4"));
    }

    #[test]
    fn no_tax_zeroes_every_component() {
        let line = LineItemBuilder::default()
            .quantity(2)
            .rate(100)
            .rates(
                TaxRatesBuilder::default()
                    .cgst(9)
                    .sgst(9)
                    .vat(5)
                    .cess(1)
                    .cess_per_unit(3)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let calc = calculate_line(&line, TaxRoute::Intrastate, TaxDisplay::NoTax);
        assert!(calc.tax.is_zero());
        assert_eq!(calc.total, calc.taxable_value);
    }

    #[test]
    fn cess_has_ad_valorem_and_per_unit_parts() {
        let line = LineItemBuilder::default()
            .quantity(10)
            .rate(10)
            .rates(
                TaxRatesBuilder::default()
                    .cess(1)
                    .cess_per_unit(dec("0.5"))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let calc = calculate_line(&line, TaxRoute::Interstate, TaxDisplay::Breakdown);
        assert_eq!(calc.tax.cess, dec("6"));
        assert_eq!(calc.total, dec("106"));
    }

    #[test]
    fn negative_taxable_value_is_preserved_not_clamped() {
        let line = LineItemBuilder::default()
            .quantity(1)
            .rate(100)
            .discount("150")
            .rates(TaxRates::gst(18))
            .build()
            .unwrap();
        let calc = calculate_line(&line, TaxRoute::Intrastate, TaxDisplay::Breakdown);
        assert_eq!(calc.taxable_value, dec("-50"));
        assert_eq!(calc.tax.cgst, dec("-4.5"));
        assert_eq!(calc.total, dec("-59"));
    }

    #[test]
    fn malformed_fields_deserialize_to_zero() {
        let line: LineItem = serde_json::from_value(serde_json::json!({
            "name": "Half typed",
            "quantity": "abc",
            "rate": 12.5,
            "discount": "5%",
            "rates": { "cgst": "6", "sgst": 6 }
        }))
        .unwrap();
        assert!(line.quantity().is_zero());
        assert_eq!(line.rate(), &dec("12.5"));
        assert_eq!(line.rates().cgst, dec("6"));
        assert!(line.stock().is_none());
        assert_eq!(line.kind(), ItemKind::Goods);

        let calc = calculate_line(&line, TaxRoute::Intrastate, TaxDisplay::Breakdown);
        assert!(calc.total.is_zero());
    }
}
