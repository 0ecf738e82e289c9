use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use clap::Parser;
use invoice_calc::{CalculationProfile, InvoiceDraft, TaxTable, error::AddContext};

fn read_until_eof() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

/// Calculate invoice drafts and print the resolved invoices as JSON.
#[derive(Debug, Parser)]
#[command(name = "invoice-calc", version, about)]
pub struct Cli {
    /// Path to the JSON file with an array of invoice drafts. Reads stdin when omitted
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Path to a JSON calculation profile applied to every draft. Clears manual totals
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Path to a JSON tax table resolving each line's `tax_rate_id` to rates
    #[arg(short, long)]
    pub tax_table: Option<PathBuf>,

    /// Directory where one `<id>.json` per calculated invoice should be saved
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    pub fn get_drafts(&self) -> Result<Vec<InvoiceDraft>, invoice_calc::Error> {
        let raw = match &self.data {
            Some(path) => fs::read_to_string(path)
                .map_err(invoice_calc::Error::from)
                .add_context(&format!(
                    "reading invoice drafts from file '{}'",
                    path.to_str().unwrap_or("UNKNOWN")
                ))?,
            None => read_until_eof()
                .map_err(invoice_calc::Error::from)
                .add_context("reading invoice drafts from stdin")?,
        };

        InvoiceDraft::list_from_json(&raw)
    }

    pub fn get_profile(&self) -> Result<Option<CalculationProfile>, invoice_calc::Error> {
        match &self.profile {
            Some(path) => Ok(Some(CalculationProfile::from_path(path)?)),
            None => Ok(None),
        }
    }

    pub fn get_tax_table(&self) -> Result<Option<TaxTable>, invoice_calc::Error> {
        match &self.tax_table {
            Some(path) => Ok(Some(TaxTable::from_path(path)?)),
            None => Ok(None),
        }
    }
}

/// File inside `dir` for the invoice `id`. Ids that would name a path outside `dir` are
/// rejected.
pub fn output_path(dir: &Path, id: &str) -> Result<PathBuf, invoice_calc::Error> {
    let escapes = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if escapes {
        return Err(invoice_calc::Error::from(format!(
            "invoice id '{}' cannot be used as a file name",
            id.escape_debug()
        )));
    }
    Ok(dir.join(format!("{id}.json")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_options() {
        let cli = Cli::try_parse_from([
            "invoice-calc",
            "--data",
            "drafts.json",
            "-p",
            "retail.json",
            "-o",
            "out",
            "-t",
            "taxes.json",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(cli.tax_table, Some(PathBuf::from("taxes.json")));
        assert_eq!(cli.data, Some(PathBuf::from("drafts.json")));
        assert_eq!(cli.profile, Some(PathBuf::from("retail.json")));
        assert_eq!(cli.out, Some(PathBuf::from("out")));
        assert!(cli.pretty);
    }

    #[test]
    fn no_profile_means_drafts_keep_their_own() {
        let cli = Cli::try_parse_from(["invoice-calc"]).unwrap();
        assert!(cli.get_profile().unwrap().is_none());
        assert!(cli.get_tax_table().unwrap().is_none());
    }

    #[test]
    fn missing_tax_table_file_is_reported() {
        let cli = Cli::try_parse_from(["invoice-calc", "-t", "/nonexistent/taxes.json"]).unwrap();
        let err = cli.get_tax_table().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/taxes.json"));
    }

    #[test]
    fn output_path_stays_inside_out_dir() {
        let dir = Path::new("out");
        assert_eq!(
            output_path(dir, "INV-1").unwrap(),
            PathBuf::from("out/INV-1.json")
        );
        assert_eq!(
            output_path(dir, "2024.07").unwrap(),
            PathBuf::from("out/2024.07.json")
        );
        for id in ["../x", "a/b", "..\\x", "/etc/passwd", "..", ".", ""] {
            let err = output_path(dir, id).unwrap_err();
            assert!(err.to_string().contains("cannot be used as a file name"), "{id}");
        }
    }

    #[test]
    fn missing_data_file_is_reported() {
        let cli = Cli::try_parse_from(["invoice-calc", "-d", "/nonexistent/drafts.json"]).unwrap();
        let err = cli.get_drafts().unwrap_err();
        assert!(err.to_string().starts_with("reading invoice drafts from file"));
    }
}
