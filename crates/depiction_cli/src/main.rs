//! Command-line access to a depictions database.
//!
//! # Responsibility
//! - Wire config, store, router and provider the way a host process would.
//! - Expose list/get/add/rename/import for manual checks against a database file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use depiction_core::db::open_db;
use depiction_core::{
    core_version, default_log_level, init_logging, AddressRouter, ContentObserver, Depiction,
    DepictionDao, DepictionProvider, DepictionStore, ObserverRegistry, ProviderConfig,
    DEFAULT_AUTHORITY,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "depictions", about = "Inspect and edit a depictions database", version)]
struct CliArgs {
    #[arg(
        long,
        env = "DEPICTIONS_DB",
        value_name = "FILE",
        default_value = "depictions.sqlite3",
        help = "SQLite database file (created when missing)"
    )]
    db: PathBuf,

    #[arg(
        long,
        env = "DEPICTIONS_AUTHORITY",
        value_name = "AUTHORITY",
        default_value = DEFAULT_AUTHORITY,
        help = "Authority segment of depiction addresses"
    )]
    authority: String,

    #[arg(
        long,
        env = "DEPICTIONS_LOG_LEVEL",
        value_name = "LEVEL",
        help = "trace|debug|info|warn|error (defaults by build mode)"
    )]
    log_level: Option<String>,

    #[arg(
        long,
        env = "DEPICTIONS_LOG_DIR",
        value_name = "DIR",
        help = "Absolute directory for rolling log files; logging is off when unset"
    )]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List depictions, most recently used first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Print one depiction as JSON.
    Get { id: i64 },
    /// Insert one depiction.
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change the name of an existing depiction.
    Rename { id: i64, name: String },
    /// Insert several depictions in one transaction.
    Import {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Print the core version.
    Version,
}

/// Prints every change signal to stderr.
struct StderrObserver;

impl ContentObserver for StderrObserver {
    fn on_change(&self, address: &str) {
        eprintln!("changed {address}");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(level, log_dir)?;
    }

    if let Command::Version = cli.command {
        println!("depiction_core version={}", core_version());
        return Ok(());
    }

    let config = ProviderConfig::new(cli.authority.as_str())?;
    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let registry = Arc::new(ObserverRegistry::new());
    let router = AddressRouter::new(&config);
    registry.register(&router.collection_address(), true, Arc::new(StderrObserver));
    let provider = DepictionProvider::new(router, DepictionStore::new(conn), registry);
    info!(
        "event=cli_start module=cli status=ok authority={}",
        config.authority()
    );

    run(&provider, cli.command)
}

fn run(
    provider: &DepictionProvider<Arc<ObserverRegistry>>,
    command: Command,
) -> anyhow::Result<()> {
    let dao = DepictionDao::new(provider);
    match command {
        Command::List { limit } => {
            for depiction in dao.recent(limit)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    depiction.id.unwrap_or_default(),
                    depiction.name,
                    depiction.times_used,
                    depiction.description.unwrap_or_default()
                );
            }
        }
        Command::Get { id } => match dao.find(id)? {
            Some(depiction) => println!("{}", serde_json::to_string_pretty(&depiction)?),
            None => anyhow::bail!("depiction {id} not found"),
        },
        Command::Add { name, description } => {
            let mut depiction = Depiction::new(name);
            depiction.description = description;
            dao.save(&mut depiction)?;
            println!("{}", depiction.id.unwrap_or_default());
        }
        Command::Rename { id, name } => {
            let mut depiction = dao
                .find(id)?
                .with_context(|| format!("depiction {id} not found"))?;
            depiction.name = name;
            dao.save(&mut depiction)?;
        }
        Command::Import { names } => {
            let rows: Vec<_> = names
                .into_iter()
                .map(|name| Depiction::new(name).to_values())
                .collect();
            let inserted =
                provider.bulk_insert(&provider.router().collection_address(), &rows)?;
            println!("imported {inserted}");
        }
        Command::Version => println!("depiction_core version={}", core_version()),
    }
    Ok(())
}
