use std::path::Path;

use anyhow::anyhow;
use clap::Parser;
use console::style;
use serde_json::{Map, Value};

use crate::library::{
    api::ApiClient,
    config::Credentials,
    constant::{OUTPUT_CSV, OUTPUT_JSON, VERSION},
    export::{save_to_csv, save_to_json},
    progress::create_spinner,
    table::print_snapshot_table,
};

/// A CLI tool for exporting storage volume snapshots.
#[derive(Parser, Debug)]
#[command(name = "snapex")]
#[command(about = "Volume Snapshot Export Tool", long_about = None)]
#[command(version = VERSION.as_str())]
pub struct Cli {
    /// Hostname of the storage system to query.
    pub storage: String,

    /// Name of the SVM that owns the volume.
    pub svm: String,

    /// Name of the volume whose snapshots are exported.
    pub volume: String,
}

pub async fn run() -> anyhow::Result<()> {
    let args = Cli::parse();

    let credentials = Credentials::from_env()?;
    let client = ApiClient::new(&args.storage, &credentials)?;

    let volume_uuid = client
        .resolve_volume_uuid(&args.svm, &args.volume)
        .await?
        .ok_or_else(|| anyhow!("Volume {} does not exist in SVM {}.", args.volume, args.svm))?;

    let snapshot_uuids = client.list_snapshot_uuids(&volume_uuid, &args.svm).await?;

    if snapshot_uuids.is_empty() {
        println!("Volume {} has no snapshots.", args.volume);
    }

    let spinner = create_spinner(format!(
        "Fetching details for {} snapshots...",
        snapshot_uuids.len()
    ))?;

    let mut records: Vec<Map<String, Value>> = Vec::new();
    let mut fetch_error: Option<anyhow::Error> = None;

    // One failure stops the loop; everything gathered so far is still
    // exported before the error reaches the exit code.
    for snapshot_uuid in &snapshot_uuids {
        match client.fetch_snapshot(&volume_uuid, snapshot_uuid).await {
            Ok(record) => records.push(record),
            Err(error) => {
                fetch_error = Some(error);
                break;
            }
        }
    }

    spinner.finish_and_clear();

    save_to_json(&records, Path::new(OUTPUT_JSON))?;
    save_to_csv(&records, Path::new(OUTPUT_CSV))?;

    if !records.is_empty() {
        print_snapshot_table(&records);
    }

    println!(
        "Exported {} of {} snapshots to {} and {}.",
        style(records.len()).green().bold(),
        snapshot_uuids.len(),
        OUTPUT_JSON,
        OUTPUT_CSV
    );

    if let Some(error) = fetch_error {
        return Err(error);
    }

    Ok(())
}
