//! One inventory sync cycle: fetch, parse, reconcile, rebuild, upload.
//!
//! Steps run strictly in order and the first error ends the cycle. Nothing
//! is uploaded unless every earlier step succeeded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use mpxsync_core::{InventoryItem, LocalUpdates};
use mpxsync_gateway::MoneypexClient;
use mpxsync_inventory::{
    apply_sales, build_workbook, decode, parse_inventory, reconcile, validate_items,
};
use tracing::Instrument;
use uuid::Uuid;

/// Which items the rebuilt workbook lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ExportScope {
    /// Every item of the fetched catalog.
    #[default]
    Catalog,
    /// Only the locally updated items.
    UpdatedOnly,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CycleOptions {
    pub scope: ExportScope,
    /// Write the workbook here instead of uploading it.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub(crate) struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub remote_items: usize,
    pub updated_items: usize,
    pub sales_applied: usize,
    pub rows_exported: usize,
    pub uploaded: bool,
}

/// Fetches and parses the remote catalog.
///
/// # Errors
///
/// Returns an error if the export cannot be fetched, is not a workbook, is
/// empty, or holds an invalid row.
pub(crate) async fn fetch_inventory(client: &MoneypexClient) -> anyhow::Result<Vec<InventoryItem>> {
    let bytes = client
        .fetch_export()
        .await
        .context("failed to fetch product export")?;
    let rows = decode(&bytes).context("failed to decode product export")?;
    let items = parse_inventory(&rows).context("failed to parse product export")?;
    Ok(items)
}

/// Runs one full sync cycle against the vendor.
///
/// # Errors
///
/// Returns the first error from any step. A failed fetch or parse means no
/// upload is attempted.
pub(crate) async fn run_cycle(
    client: &MoneypexClient,
    updates: &LocalUpdates,
    options: &CycleOptions,
) -> anyhow::Result<CycleReport> {
    let cycle_id = Uuid::new_v4();
    let span = tracing::info_span!("sync_cycle", %cycle_id);
    run_cycle_inner(client, updates, options, cycle_id)
        .instrument(span)
        .await
}

async fn run_cycle_inner(
    client: &MoneypexClient,
    updates: &LocalUpdates,
    options: &CycleOptions,
    cycle_id: Uuid,
) -> anyhow::Result<CycleReport> {
    let started_at = Utc::now();
    tracing::info!(
        updated_items = updates.items.len(),
        sales = updates.sales.len(),
        "starting sync cycle"
    );

    validate_items(&updates.items).context("invalid locally updated items")?;

    let remote = fetch_inventory(client).await?;
    tracing::info!(remote_items = remote.len(), "fetched remote inventory");

    let stock = reconcile(&remote, &updates.items);
    let stock = apply_sales(stock, &updates.sales).context("failed to apply local sales")?;

    let export_items = match options.scope {
        ExportScope::Catalog => {
            let dropped = missing_from_catalog(&remote, &updates.items);
            if dropped > 0 {
                tracing::warn!(
                    dropped,
                    "updated items not in the remote catalog are left out of the export"
                );
            }
            remote.as_slice()
        }
        ExportScope::UpdatedOnly => updates.items.as_slice(),
    };
    if export_items.is_empty() {
        anyhow::bail!("nothing to export: {:?} scope selected no items", options.scope);
    }

    let workbook = build_workbook(export_items, &stock).context("failed to build workbook")?;

    let uploaded = match &options.output {
        Some(path) => {
            write_workbook(path, &workbook)?;
            tracing::info!(path = %path.display(), "wrote workbook instead of uploading");
            false
        }
        None => {
            client
                .upload_workbook(workbook)
                .await
                .context("failed to upload product workbook")?;
            true
        }
    };

    let report = CycleReport {
        cycle_id,
        started_at,
        finished_at: Utc::now(),
        remote_items: remote.len(),
        updated_items: updates.items.len(),
        sales_applied: updates.sales.len(),
        rows_exported: export_items.len(),
        uploaded,
    };
    tracing::info!(
        rows = report.rows_exported,
        uploaded = report.uploaded,
        elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
        "sync cycle complete"
    );
    Ok(report)
}

/// Reads the local updates file, or returns empty updates when no path is set.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub(crate) fn load_updates(path: Option<&Path>) -> anyhow::Result<LocalUpdates> {
    let Some(path) = path else {
        return Ok(LocalUpdates::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read local updates from {}", path.display()))?;
    let updates: LocalUpdates = serde_json::from_str(&raw)
        .with_context(|| format!("invalid local updates in {}", path.display()))?;
    Ok(updates)
}

/// Counts distinct barcodes of `updated` that no remote item carries.
fn missing_from_catalog(remote: &[InventoryItem], updated: &[InventoryItem]) -> usize {
    let known: HashSet<&str> = remote.iter().filter_map(InventoryItem::barcode).collect();
    updated
        .iter()
        .filter_map(InventoryItem::barcode)
        .filter(|barcode| !known.contains(barcode))
        .collect::<HashSet<_>>()
        .len()
}

fn write_workbook(path: &Path, workbook: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, workbook)
        .with_context(|| format!("failed to write workbook to {}", path.display()))
}

#[cfg(test)]
#[path = "cycle_test.rs"]
mod tests;
