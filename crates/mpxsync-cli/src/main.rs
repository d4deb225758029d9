mod cycle;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mpxsync_gateway::MoneypexClient;
use tracing_subscriber::EnvFilter;

use crate::cycle::{CycleOptions, ExportScope};

#[derive(Debug, Parser)]
#[command(name = "mpxsync")]
#[command(about = "Moneypex POS inventory sync")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and parse the current Moneypex product export
    Pull {
        /// Print the parsed items as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run one sync cycle: fetch, reconcile, rebuild, upload
    Sync {
        /// JSON file with locally updated items and sales
        #[arg(long)]
        updates: Option<PathBuf>,
        /// Export only the locally updated items instead of the full catalog
        #[arg(long)]
        only_updated: bool,
        /// Write the workbook to this path instead of uploading it
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run sync cycles on the configured schedule until interrupted
    Watch {
        /// JSON file with locally updated items and sales, re-read every cycle
        #[arg(long)]
        updates: Option<PathBuf>,
        /// Export only the locally updated items instead of the full catalog
        #[arg(long)]
        only_updated: bool,
    },
}

fn export_scope(only_updated: bool) -> ExportScope {
    if only_updated {
        ExportScope::UpdatedOnly
    } else {
        ExportScope::Catalog
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("mpxsync: pass a subcommand (pull, sync, watch); see --help");
        return Ok(());
    };

    let config = mpxsync_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "loaded configuration");

    let client = MoneypexClient::from_app_config(&config)?;

    match command {
        Commands::Pull { json } => run_pull(&client, json).await?,
        Commands::Sync {
            updates,
            only_updated,
            out,
        } => {
            let updates_path = updates.or_else(|| config.updates_path.clone());
            let updates = cycle::load_updates(updates_path.as_deref())?;
            let options = CycleOptions {
                scope: export_scope(only_updated),
                output: out,
            };
            let report = cycle::run_cycle(&client, &updates, &options).await?;
            println!(
                "cycle {}: {} remote items, {} updated, {} sales, {} rows {}",
                report.cycle_id,
                report.remote_items,
                report.updated_items,
                report.sales_applied,
                report.rows_exported,
                if report.uploaded { "uploaded" } else { "written" },
            );
        }
        Commands::Watch {
            updates,
            only_updated,
        } => {
            let updates_path = updates.or_else(|| config.updates_path.clone());
            watch::run_watch(
                client,
                &config.poll_schedule,
                updates_path,
                export_scope(only_updated),
            )
            .await?;
        }
    }

    Ok(())
}

async fn run_pull(client: &MoneypexClient, json: bool) -> anyhow::Result<()> {
    let items = cycle::fetch_inventory(client).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        println!(
            "{:<16} {:<32} {:>8} {:>10} {:>10} {}",
            item.barcode().unwrap_or("-"),
            item.name,
            item.stock,
            item.sale_price,
            item.purchase_price,
            if item.is_active { "active" } else { "inactive" },
        );
    }
    println!("{} items", items.len());
    Ok(())
}
