//! Calculation profile: the settings that decide how an invoice is totalled.
//!
//! Profiles are passed to the engine explicitly with each draft, so different drafts can be
//! calculated under different profiles side by side.

use std::{fs, path::Path};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    error::AddContext,
    rounding::TotalCalculation,
    tax::TaxDisplay,
};

fn default_name() -> String {
    String::from("default")
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), pattern = "owned")]
pub struct CalculationProfile {
    #[builder(default = default_name())]
    #[serde(default = "default_name")]
    name: String,
    #[builder(default)]
    #[serde(default)]
    tax_display: TaxDisplay,
    #[builder(default)]
    #[serde(default)]
    enable_rounding: bool,
    #[builder(default)]
    #[serde(default)]
    total_calculation: TotalCalculation,
}

impl Default for CalculationProfile {
    fn default() -> Self {
        Self {
            name: default_name(),
            tax_display: TaxDisplay::default(),
            enable_rounding: false,
            total_calculation: TotalCalculation::default(),
        }
    }
}

impl CalculationProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tax_display(&self) -> TaxDisplay {
        self.tax_display
    }

    pub fn enable_rounding(&self) -> bool {
        self.enable_rounding
    }

    pub fn total_calculation(&self) -> TotalCalculation {
        self.total_calculation
    }

    /// Parse a profile from JSON. Missing settings take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(raw)
            .map_err(crate::Error::from)
            .add_context("parsing calculation profile JSON")
    }

    /// Read a profile from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, crate::Error> {
        let raw = fs::read_to_string(path)
            .map_err(crate::Error::from)
            .add_context(&format!(
                "reading calculation profile from file '{}'",
                path.to_string_lossy()
            ))?;
        Self::from_json(&raw)
    }
}
