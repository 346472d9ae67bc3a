use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use labledger_infra::Relation;
use labledger_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "labledger")]
#[command(about = "Lab inventory lending ledger", version)]
#[command(
    after_help = "Environment:\n  LABLEDGER_DATA_DIR     Directory holding the CSV relations\n  LABLEDGER_LOG_FORMAT   pretty | json\n  RUST_LOG               Log filter override"
)]
pub struct Cli {
    /// Directory holding the CSV relations.
    #[arg(long, global = true, env = "LABLEDGER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
    #[arg(long, global = true, env = "LABLEDGER_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    /// Print reports as JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create missing relations and seed the default stock.
    Init {
        /// Fill fresh register logs with demo rows.
        #[arg(long, default_value_t = false)]
        samples: bool,
    },
    /// Lend one item to a student.
    Issue {
        #[arg(long)]
        roll: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        product: String,
        /// YYYY-MM-DD or YYYY-MM-DD HH:MM; defaults to now.
        #[arg(long)]
        date: Option<String>,
    },
    /// Take an item back from a student.
    Return {
        #[arg(long)]
        roll: String,
        /// Defaults to the student's only outstanding product.
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Outstanding items, for everyone or one student.
    Pending {
        #[arg(long)]
        roll: Option<String>,
    },
    /// Every entry for one student.
    History {
        #[arg(long)]
        roll: String,
    },
    /// Current stock.
    Inventory,
    /// Unified issue/return log.
    Transactions,
    /// Write a relation as CSV.
    Export {
        /// inventory, ledger, transactions, register-outgoing, register-returned, not-yet-returned
        relation: Relation,
        /// File or directory to write to; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Quantity-based register with separate issue and return logs.
    Register {
        #[command(subcommand)]
        command: RegisterCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum RegisterCommand {
    Issue {
        #[arg(long)]
        roll: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        product: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        date: Option<String>,
    },
    Return {
        #[arg(long)]
        roll: String,
        #[arg(long)]
        product: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        date: Option<String>,
    },
    /// All issued rows.
    Issued,
    /// All returned rows.
    Returned,
    /// Issued minus returned per student and product, open groups only.
    Report,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_issue_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "labledger",
            "issue",
            "--roll",
            "22BCS001",
            "--name",
            "Rahul",
            "--product",
            "Microscope",
            "--json",
            "--data-dir",
            "/tmp/lab",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/lab")));
        assert!(matches!(cli.command, Command::Issue { ref product, date: None, .. } if product == "Microscope"));
    }

    #[test]
    fn parses_export_relation_and_register_defaults() {
        let cli = Cli::try_parse_from(["labledger", "export", "not-yet-returned"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Export { relation: Relation::NotYetReturned, out: None }
        ));

        let cli = Cli::try_parse_from([
            "labledger", "register", "issue", "--roll", "R1", "--name", "N", "--product", "Beaker",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Register { command: RegisterCommand::Issue { quantity: 1, .. } }
        ));
    }

    #[test]
    fn rejects_unknown_relation_and_log_format() {
        assert!(Cli::try_parse_from(["labledger", "export", "students"]).is_err());
        assert!(Cli::try_parse_from(["labledger", "--log-format", "xml", "inventory"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
