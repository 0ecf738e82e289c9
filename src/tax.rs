//! Tax rates, intrastate/interstate routing and tax component arithmetic.
//!
//! Goods and services tax is levied either as two co-equal components (CGST and SGST) when
//! supplier and customer are in the same state, or as a single IGST component when they are not.
//! VAT and cess are applied on top regardless of the route.

use std::{
    collections::HashMap,
    fs,
    iter::Sum,
    ops::{AddAssign, Neg},
    path::Path,
};

use bigdecimal::{BigDecimal, Zero};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    error::AddContext,
    line::LineItem,
    money::{deserialize_bigdecimal, percent_of, serialize_bigdecimal},
};

/// Whether taxes are computed and shown on the invoice at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxDisplay {
    /// Every tax and cess component is zero
    NoTax,
    /// Taxes are computed per component
    #[default]
    Breakdown,
}

/// Which GST components apply to a supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRoute {
    /// CGST + SGST
    Intrastate,
    /// IGST only
    Interstate,
}

fn normalize_location(location: &str) -> String {
    location.trim().to_lowercase()
}

impl TaxRoute {
    /// Classify a supply from the supplier's and customer's locations.
    ///
    /// Locations are compared trimmed and case-folded. A missing or blank customer location is
    /// treated as intrastate.
    pub fn between(supplier: &str, customer: Option<&str>) -> Self {
        let customer = customer.map(normalize_location).filter(|c| !c.is_empty());
        match customer {
            None => TaxRoute::Intrastate,
            Some(c) if c == normalize_location(supplier) => TaxRoute::Intrastate,
            Some(_) => TaxRoute::Interstate,
        }
    }
}

/// Percentage rates configured on an item. `cess_per_unit` is a fixed amount per unit sold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(default, setter(into), pattern = "owned")]
pub struct TaxRates {
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    pub cgst: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    pub sgst: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    pub igst: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    pub vat: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    pub cess: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default
    )]
    pub cess_per_unit: BigDecimal,
}

impl TaxRates {
    /// Rates for a GST slab: half of `total` each for CGST and SGST, all of it for IGST.
    pub fn gst(total: impl Into<BigDecimal>) -> Self {
        let total = total.into();
        let half = &total / &BigDecimal::from(2);
        Self {
            cgst: half.clone(),
            sgst: half,
            igst: total,
            ..Self::default()
        }
    }
}

/// Tax components charged on some taxable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxBreakdown {
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub cgst: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub sgst: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub igst: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub vat: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub cess: BigDecimal,
}

impl TaxBreakdown {
    /// Percentage-based taxes on `taxable` for the given route. The per-unit cess is not
    /// included since it depends on quantity rather than value.
    pub fn assess(route: TaxRoute, rates: &TaxRates, taxable: &BigDecimal) -> Self {
        let (cgst, sgst, igst) = match route {
            TaxRoute::Intrastate => (
                percent_of(taxable, &rates.cgst),
                percent_of(taxable, &rates.sgst),
                BigDecimal::zero(),
            ),
            TaxRoute::Interstate => (
                BigDecimal::zero(),
                BigDecimal::zero(),
                percent_of(taxable, &rates.igst),
            ),
        };
        Self {
            cgst,
            sgst,
            igst,
            vat: percent_of(taxable, &rates.vat),
            cess: percent_of(taxable, &rates.cess),
        }
    }

    /// Sum of every component.
    pub fn total(&self) -> BigDecimal {
        &self.cgst + &self.sgst + &self.igst + &self.vat + &self.cess
    }

    pub fn is_zero(&self) -> bool {
        self.cgst.is_zero()
            && self.sgst.is_zero()
            && self.igst.is_zero()
            && self.vat.is_zero()
            && self.cess.is_zero()
    }
}

impl AddAssign<&TaxBreakdown> for TaxBreakdown {
    fn add_assign(&mut self, rhs: &TaxBreakdown) {
        self.cgst += &rhs.cgst;
        self.sgst += &rhs.sgst;
        self.igst += &rhs.igst;
        self.vat += &rhs.vat;
        self.cess += &rhs.cess;
    }
}

impl Neg for TaxBreakdown {
    type Output = TaxBreakdown;

    fn neg(self) -> Self::Output {
        Self {
            cgst: -self.cgst,
            sgst: -self.sgst,
            igst: -self.igst,
            vat: -self.vat,
            cess: -self.cess,
        }
    }
}

impl<'a> Sum<&'a TaxBreakdown> for TaxBreakdown {
    fn sum<I: Iterator<Item = &'a TaxBreakdown>>(iter: I) -> Self {
        iter.fold(TaxBreakdown::default(), |mut acc, t| {
            acc += t;
            acc
        })
    }
}

/// Rates keyed by tax reference, supplied by the caller's settings.
///
/// References that are not in the table resolve to zero rates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxTable {
    rates: HashMap<String, TaxRates>,
}

impl TaxTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rates for a tax reference, replacing any earlier entry.
    pub fn insert(&mut self, id: impl Into<String>, rates: TaxRates) {
        self.rates.insert(id.into(), rates);
    }

    /// Rates for `id`, or zero rates when the reference is absent or unknown.
    pub fn resolve(&self, id: Option<&str>) -> TaxRates {
        id.and_then(|id| self.rates.get(id))
            .cloned()
            .unwrap_or_default()
    }

    /// Fill in rates for every line that carries a tax reference. Lines without one keep their
    /// own rates.
    pub fn apply(&self, lines: &mut [LineItem]) {
        for line in lines.iter_mut() {
            if let Some(id) = line.tax_rate_id().map(str::to_string) {
                line.set_rates(self.resolve(Some(&id)));
            }
        }
    }

    /// Parse a table from a JSON object of reference to rates.
    pub fn from_json(raw: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(raw)
            .map_err(crate::Error::from)
            .add_context("parsing tax table JSON")
    }

    /// Read a table from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, crate::Error> {
        let raw = fs::read_to_string(path)
            .map_err(crate::Error::from)
            .add_context(&format!(
                "reading tax table from file '{}'",
                path.to_string_lossy()
            ))?;
        Self::from_json(&raw)
    }
}
