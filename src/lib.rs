//! Financial calculation engine for invoices
//!
//! This crate derives a fully resolved invoice from a draft: per-line taxable values and GST
//! breakdowns, additional charges with proportionally allocated tax, subtotals, rounding or a
//! manual final amount, and the balance due after payments. All money is [`BigDecimal`] so the
//! figures are exact and can be persisted and printed as they are.
//!
//! The calculation is a pure function of the draft ([`compute`], or [`compute_with`] when line
//! tax references should be resolved through a [`TaxTable`]); it never fails, treating
//! malformed numbers as zero.
//!
//! # Example
//!
//! ```rust
//! use bigdecimal::BigDecimal;
//! use invoice_calc::{
//!     AdditionalChargeBuilder, InvoiceDraftBuilder, LineItemBuilder, TaxRates, compute,
//! };
//!
//! let draft = InvoiceDraftBuilder::default()
//!     .id("INV-1")
//!     .supplier_location("Karnataka")
//!     .customer_location("Karnataka")
//!     .add_line(
//!         LineItemBuilder::default()
//!             .name("Widget")
//!             .quantity(2)
//!             .rate(100)
//!             .discount("10%")
//!             .rates(TaxRates::gst(18))
//!             .build().unwrap()
//!     )
//!     .add_charge(
//!         AdditionalChargeBuilder::default()
//!             .label("Freight")
//!             .value(20)
//!             .build().unwrap()
//!     )
//!     .build().unwrap();
//! let invoice = compute(&draft);
//! assert_eq!(invoice.grand_total(), &BigDecimal::from(236));
//! ```
//!
//! [`BigDecimal`]: bigdecimal::BigDecimal

pub mod charge;
pub mod discount;
pub mod error;
pub mod invoice;
pub mod line;
pub mod money;
pub mod profile;
pub mod rounding;
pub mod settlement;
pub mod tax;
pub mod totals;
pub mod warnings;

pub use charge::{
    AdditionalCharge, AdditionalChargeBuilder, AdditionalChargeBuilderError, CalculatedCharge,
    ChargeAllocation, ChargeKind, ChargeSign,
};
pub use discount::{Discount, DiscountSpec};
pub use error::Error;
pub use invoice::{
    CalculatedInvoice, InvoiceDraft, InvoiceDraftBuilder, InvoiceDraftBuilderError, compute,
    compute_with,
};
pub use line::{CalculatedLineItem, ItemKind, LineItem, LineItemBuilder, LineItemBuilderError};
pub use profile::{CalculationProfile, CalculationProfileBuilder, CalculationProfileBuilderError};
pub use rounding::{FinalAmountSource, RoundOff, TotalCalculation};
pub use settlement::{Payments, PaymentsBuilder, Settlement, SettlementStatus};
pub use tax::{TaxBreakdown, TaxDisplay, TaxRates, TaxRatesBuilder, TaxRoute, TaxTable};
pub use totals::{ChargeAggregates, InvoiceTotals, ItemAggregates};
pub use warnings::Warning;
