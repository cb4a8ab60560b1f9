//! Inspect command - show which datasets a downloaded pack contains.

use console::style;
use underfoot::store::StoreConfig;
use underfoot::MapMode;

use super::{format_size, open_store};
use crate::error::CliError;

/// Run the inspect command.
pub async fn run(config: StoreConfig, pack_id: &str) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let pack = store
        .get(pack_id)
        .await?
        .filter(|pack| pack.is_downloaded())
        .ok_or_else(|| CliError::Config(format!("pack not downloaded: {}", pack_id)))?;

    let data = pack.unzipped_data().await?;
    if data.is_empty() {
        println!(
            "{}",
            style("Archive could not be read; no datasets found.").yellow()
        );
        return Ok(());
    }

    println!("{} ({}, {})", pack.id, pack.name, pack.admin1);
    println!();

    let datasets = [
        ("ways.pmtiles", data.ways_pmtiles.as_ref().map(|d| d.len())),
        (
            "rocks.pmtiles",
            data.rocks_pmtiles.as_ref().map(|d| d.len()),
        ),
        (
            "rocks-rock_units_attrs.csv",
            data.rocks_units_csv.as_ref().map(|d| d.len()),
        ),
        (
            "rocks-citations.csv",
            data.rocks_citations_csv.as_ref().map(|d| d.len()),
        ),
        (
            "water.pmtiles",
            data.water_pmtiles.as_ref().map(|d| d.len()),
        ),
        (
            "water-citations.csv",
            data.water_citations_csv.as_ref().map(|d| d.len()),
        ),
        (
            "water-waterways-network.csv",
            data.water_waterways_network_csv.as_ref().map(|d| d.len()),
        ),
        (
            "contours.pmtiles",
            data.contours_pmtiles.as_ref().map(|d| d.len()),
        ),
        (
            "context.pmtiles",
            data.context_pmtiles.as_ref().map(|d| d.len()),
        ),
    ];
    for (name, size) in datasets {
        match size {
            Some(size) => println!(
                "  {:32} {}",
                name,
                style(format_size(size as u64)).green()
            ),
            None => println!("  {:32} {}", name, style("missing").dim()),
        }
    }

    println!();
    for mode in [MapMode::Rocks, MapMode::Water] {
        match data.mode_data(mode) {
            Ok(_) => println!("{} mode: {}", mode, style("renderable").green()),
            Err(e) => println!("{} mode: {}", mode, style(e.to_string()).yellow()),
        }
    }
    Ok(())
}
