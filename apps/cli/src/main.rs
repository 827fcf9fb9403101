//! BrokerDesk command-line client.
//!
//! Bulk-loads CSV files and lists records through the same optimistic data
//! layer the web client uses, against a running API (live or demo tree) or
//! an offline demo storage file.
//!
//! ```bash
//! # Import products into the live workspace
//! brokerdesk --email admin@correduria.es import products productos.csv
//!
//! # Check a file against the demo workspace without writing
//! brokerdesk --demo import delegations delegaciones.csv --dry-run
//!
//! # List companies stored in an offline demo file
//! brokerdesk --local demo.json list companies
//! ```

#![forbid(unsafe_code)]

use std::path::PathBuf;

use brokerdesk_core::AppError;
use brokerdesk_domain::ResourceKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod target;

use crate::target::{ConnectionArgs, Target};

#[derive(Debug, Parser)]
#[command(name = "brokerdesk")]
#[command(author, version, about = "BrokerDesk command-line client")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a CSV file and create its valid rows
    Import {
        /// Kind to import (products, companies, delegations, departments)
        kind: ResourceKind,

        /// CSV file with a header row
        file: PathBuf,

        /// Only report the preview, create nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print every record of a kind as JSON
    List {
        /// Kind to list (for example products or system-alerts)
        kind: ResourceKind,
    },
    /// Print the CSV header expected for a kind
    Template {
        /// Kind to describe
        kind: ResourceKind,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    run(cli).await.inspect_err(|error| {
        tracing::error!(%error, "command failed");
    })
}

async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Template { kind } => commands::import::template(kind),
        Commands::Import {
            kind,
            file,
            dry_run,
        } => {
            let target = Target::connect(&cli.connection).await?;
            commands::import::run(&target, kind, &file, dry_run).await
        }
        Commands::List { kind } => {
            let target = Target::connect(&cli.connection).await?;
            commands::list::run(&target, kind).await
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use brokerdesk_domain::ResourceKind;
    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn parses_import_with_hyphenated_kind() {
        let cli = Cli::try_parse_from([
            "brokerdesk",
            "--demo",
            "import",
            "product-categories",
            "categorias.csv",
            "--dry-run",
        ])
        .unwrap_or_else(|_| unreachable!());

        assert!(cli.connection.demo);
        assert!(matches!(
            cli.command,
            Commands::Import {
                kind: ResourceKind::ProductCategory,
                dry_run: true,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_kinds() {
        assert!(Cli::try_parse_from(["brokerdesk", "list", "policies"]).is_err());
    }

    #[test]
    fn local_and_demo_are_exclusive() {
        assert!(
            Cli::try_parse_from(["brokerdesk", "--local", "demo.json", "--demo", "list", "news"])
                .is_err()
        );
    }
}
