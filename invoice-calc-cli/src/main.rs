use std::{io::Write, path::Path};

use clap::Parser;
use invoice_calc::{CalculatedInvoice, error::AddContext, warnings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, output_path};

mod cli;

fn to_json<T: serde::Serialize + ?Sized>(
    value: &T,
    pretty: bool,
) -> Result<String, invoice_calc::Error> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(invoice_calc::Error::from)
}

fn write_invoice(
    dir: &Path,
    invoice: &CalculatedInvoice,
    pretty: bool,
) -> Result<(), invoice_calc::Error> {
    let path = output_path(dir, &invoice.id).add_context("choosing output file")?;
    let json = to_json(invoice, pretty).add_context("serializing calculated invoice")?;
    std::fs::write(&path, json)
        .map_err(invoice_calc::Error::from)
        .add_context(&format!("writing invoice to '{}'", path.to_string_lossy()))?;
    info!(invoice = %invoice.id, path = %path.to_string_lossy(), "wrote calculated invoice");
    Ok(())
}

fn write_to_stdout(
    invoices: &[CalculatedInvoice],
    pretty: bool,
) -> Result<(), invoice_calc::Error> {
    let json = to_json(invoices, pretty).add_context("serializing calculated invoices")?;
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{json}")
        .map_err(invoice_calc::Error::from)
        .add_context("writing invoices to stdout")?;
    stdout
        .flush()
        .map_err(invoice_calc::Error::from)
        .add_context("flushing stdout")?;
    Ok(())
}

fn main() -> Result<(), invoice_calc::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.get_profile().add_context("loading profile from cli")?;
    let tax_table = cli.get_tax_table().add_context("loading tax table from cli")?;
    let drafts = cli
        .get_drafts()
        .add_context("deserializing invoice drafts from cli")?;

    let mut calculated = Vec::with_capacity(drafts.len());
    for mut draft in drafts {
        if let Some(profile) = &profile {
            draft.switch_profile(profile.clone());
        }
        if let Some(table) = &tax_table {
            draft.apply_tax_table(table);
        }
        for warning in warnings::check(&draft) {
            warn!(invoice = draft.id(), %warning, "business warning");
        }
        calculated.push(draft.compute());
    }

    match &cli.out {
        Some(dir) => {
            for invoice in &calculated {
                output_path(dir, &invoice.id).add_context("checking invoice ids before writing")?;
            }
            for invoice in &calculated {
                write_invoice(dir, invoice, cli.pretty)?;
            }
            Ok(())
        }
        None => write_to_stdout(&calculated, cli.pretty),
    }
}
