//! Subcommand execution against an opened workspace.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use labledger_core::date::{format_ledger_date, parse_ledger_date};
use labledger_infra::{LabWorkspace, Receipt, Relation};

use crate::cli::{Command, RegisterCommand};
use crate::render;

/// Machine-readable form of a [`Receipt`].
#[derive(Debug, Serialize)]
struct ReceiptView<'a> {
    transaction: u64,
    event_type: &'a str,
    #[serde(rename = "Roll No")]
    roll: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Product")]
    product: &'a str,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Status")]
    status: String,
}

impl<'a> From<&'a Receipt> for ReceiptView<'a> {
    fn from(receipt: &'a Receipt) -> Self {
        Self {
            transaction: receipt.transaction.sequence_number(),
            event_type: receipt.transaction.event_type(),
            roll: receipt.entry.roll.as_str(),
            name: receipt.entry.student_name.as_str(),
            product: receipt.entry.product.as_str(),
            date: format_ledger_date(&receipt.entry.date),
            status: receipt.entry.status.to_string(),
        }
    }
}

fn date_or_now(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match raw {
        Some(raw) => Ok(parse_ledger_date(raw)?),
        None => Ok(Utc::now()),
    }
}

fn print_receipt<W: Write>(out: &mut W, receipt: &Receipt, verb: &str, json: bool) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, &ReceiptView::from(receipt))?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "{} {verb} {} ({}) on {} [transaction #{}]",
            receipt.entry.product,
            receipt.entry.student_name,
            receipt.entry.roll,
            format_ledger_date(&receipt.entry.date),
            receipt.transaction.sequence_number(),
        )?;
    }
    Ok(())
}

/// The product to return: the explicit one, or the student's single outstanding product.
fn resolve_return_product(
    workspace: &LabWorkspace,
    roll: &str,
    product: Option<&str>,
) -> anyhow::Result<String> {
    if let Some(product) = product {
        return Ok(product.to_string());
    }
    let open = workspace.lending().returnable_products(roll)?;
    match open.as_slice() {
        [] => bail!("{roll} has nothing outstanding"),
        [only] => Ok(only.to_string()),
        many => {
            let names: Vec<&str> = many.iter().map(|p| p.as_str()).collect();
            bail!("{roll} has several outstanding products ({}); pass --product", names.join(", "))
        }
    }
}

fn export<W: Write>(
    out: &mut W,
    workspace: &LabWorkspace,
    relation: Relation,
    target: Option<&Path>,
) -> anyhow::Result<()> {
    let text = workspace.export(relation)?;
    let Some(target) = target else {
        out.write_all(text.as_bytes())?;
        return Ok(());
    };

    let path = if target.is_dir() {
        target.join(relation.export_file_name())
    } else {
        target.to_path_buf()
    };
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    writeln!(out, "exported {relation} to {}", path.display())?;
    Ok(())
}

pub fn run<W: Write>(
    command: Command,
    workspace: &LabWorkspace,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    debug!(?command, "running command");

    // Any command works on a fresh data directory; `init` reports what it created.
    if !matches!(command, Command::Init { .. }) {
        workspace.lending().bootstrap()?;
    }

    match command {
        Command::Init { samples } => {
            let (lending, register) = workspace.bootstrap(samples)?;
            if lending.seeded_inventory {
                writeln!(out, "seeded default inventory")?;
            }
            if lending.created_ledger || lending.created_transactions {
                writeln!(out, "created empty outgoing and transactions logs")?;
            }
            if register {
                writeln!(out, "created register logs")?;
            }
            writeln!(out, "workspace ready")?;
        }
        Command::Issue {
            roll,
            name,
            product,
            date,
        } => {
            let date = date_or_now(date.as_deref())?;
            let receipt = workspace.lending().issue(&roll, &name, &product, date)?;
            print_receipt(out, &receipt, "issued to", json)?;
        }
        Command::Return {
            roll,
            product,
            date,
        } => {
            let date = date_or_now(date.as_deref())?;
            let product = resolve_return_product(workspace, &roll, product.as_deref())?;
            let receipt = workspace.lending().return_item(&roll, &product, date)?;
            print_receipt(out, &receipt, "returned by", json)?;
        }
        Command::Pending { roll } => {
            let pending = match roll {
                Some(roll) => workspace.lending().pending_for_student(&roll)?,
                None => workspace.lending().pending_all()?,
            };
            render::rows(out, "pending", &pending, json)?;
        }
        Command::History { roll } => {
            let history = workspace.lending().history_for_student(&roll)?;
            render::rows(out, "history", &history, json)?;
        }
        Command::Inventory => {
            render::rows(out, "inventory", &workspace.lending().inventory()?, json)?;
        }
        Command::Transactions => {
            render::rows(out, "transactions", &workspace.lending().transactions()?, json)?;
        }
        Command::Export { relation, out: target } => {
            export(out, workspace, relation, target.as_deref())?;
        }
        Command::Register { command } => run_register(command, workspace, json, out)?,
    }
    Ok(())
}

fn run_register<W: Write>(
    command: RegisterCommand,
    workspace: &LabWorkspace,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let register = workspace.register();
    match command {
        RegisterCommand::Issue {
            roll,
            name,
            product,
            quantity,
            date,
        } => {
            let date = date_or_now(date.as_deref())?;
            let record = register.record_outgoing(&roll, &name, &product, quantity, date)?;
            render::rows(out, "issued", &[record], json)?;
        }
        RegisterCommand::Return {
            roll,
            product,
            quantity,
            date,
        } => {
            let date = date_or_now(date.as_deref())?;
            let record = register.record_incoming(&roll, &product, quantity, date)?;
            render::rows(out, "returned", &[record], json)?;
        }
        RegisterCommand::Issued => render::rows(out, "issued", &register.issued()?, json)?,
        RegisterCommand::Returned => render::rows(out, "returned", &register.returned()?, json)?,
        RegisterCommand::Report => {
            render::rows(out, "not-yet-returned", &register.not_yet_returned()?, json)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;

    use labledger_core::DomainError;
    use labledger_infra::{LedgerConfig, ServiceError};

    use crate::cli::Cli;

    fn exec(workspace: &LabWorkspace, args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("labledger").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        run(cli.command, workspace, cli.json, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn ready() -> LabWorkspace {
        let workspace = LabWorkspace::in_memory();
        exec(&workspace, &["init"]).unwrap();
        workspace
    }

    #[test]
    fn issue_then_return_without_naming_the_product() {
        let workspace = ready();
        let issued = exec(
            &workspace,
            &[
                "issue", "--roll", "22BCS001", "--name", "Rahul", "--product", "Microscope",
                "--date", "2025-08-20 10:15",
            ],
        )
        .unwrap();
        assert_eq!(
            issued,
            "Microscope issued to Rahul (22BCS001) on 2025-08-20 10:15 [transaction #1]\n"
        );

        let returned = exec(&workspace, &["return", "--roll", "22BCS001", "--date", "2025-08-22"]).unwrap();
        assert_eq!(
            returned,
            "Microscope returned by Rahul (22BCS001) on 2025-08-22 00:00 [transaction #2]\n"
        );
        assert_eq!(exec(&workspace, &["pending"]).unwrap(), "(no pending rows)\n");
    }

    #[test]
    fn fresh_data_directory_is_seeded_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::default().with_data_dir(dir.path());
        let workspace = LabWorkspace::open(&config);

        let issued = exec(
            &workspace,
            &[
                "issue", "--roll", "22BCS001", "--name", "Rahul", "--product", "Microscope",
                "--date", "2025-08-20 10:15",
            ],
        )
        .unwrap();
        assert!(issued.starts_with("Microscope issued to Rahul"));

        let inventory = exec(&workspace, &["--json", "inventory"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&inventory).unwrap();
        assert_eq!(value[0]["Product"], "Microscope");
        assert_eq!(value[0]["Quantity"], 9);
        assert!(dir.path().join("inventory.csv").is_file());
        assert!(dir.path().join("transactions.csv").is_file());
    }

    #[test]
    fn ambiguous_return_asks_for_a_product() {
        let workspace = ready();
        for product in ["Beaker", "Slide"] {
            exec(
                &workspace,
                &["issue", "--roll", "22BCS004", "--name", "Nisha", "--product", product],
            )
            .unwrap();
        }
        let err = exec(&workspace, &["return", "--roll", "22BCS004"]).unwrap_err();
        assert!(err.to_string().contains("Beaker, Slide"));
    }

    #[test]
    fn domain_rejections_surface_as_service_errors() {
        let workspace = ready();
        let err = exec(
            &workspace,
            &["return", "--roll", "22BCS009", "--product", "Pipette"],
        )
        .unwrap_err();
        let domain = err
            .downcast_ref::<ServiceError>()
            .and_then(ServiceError::domain)
            .cloned();
        assert_eq!(domain, Some(DomainError::no_pending_entry("22BCS009", "Pipette")));
    }

    #[test]
    fn issue_json_reports_the_transaction_number() {
        let workspace = ready();
        let text = exec(
            &workspace,
            &[
                "--json", "issue", "--roll", "22BCS002", "--name", "Priya", "--product", "Beaker",
            ],
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["transaction"], 1);
        assert_eq!(value["event_type"], "lending.item.issued");
        assert_eq!(value["Status"], "Not Returned");
    }

    #[test]
    fn register_report_and_export_to_directory() {
        let workspace = LabWorkspace::in_memory();
        exec(&workspace, &["init", "--samples"]).unwrap();

        let report = exec(&workspace, &["register", "report"]).unwrap();
        assert!(report.contains("22BCS002"));
        assert!(!report.contains("22BCS001"));

        let dir = tempfile::tempdir().unwrap();
        let dir_arg = dir.path().to_str().unwrap();
        exec(&workspace, &["export", "not-yet-returned", "--out", dir_arg]).unwrap();
        let written = std::fs::read_to_string(dir.path().join("not_yet_returned.csv")).unwrap();
        assert!(written.starts_with("Roll No,Name,Product,Quantity_issued,Quantity_returned,Pending\n"));
    }

    #[test]
    fn invalid_date_is_rejected() {
        let workspace = ready();
        let err = exec(
            &workspace,
            &[
                "issue", "--roll", "22BCS001", "--name", "Rahul", "--product", "Slide", "--date",
                "yesterday",
            ],
        )
        .unwrap_err();
        assert!(err.downcast_ref::<DomainError>().is_some());
    }
}
