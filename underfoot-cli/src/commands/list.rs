//! List command - show catalog and on-device packs.

use console::style;
use underfoot::store::StoreConfig;

use super::{format_size, open_store};
use crate::error::CliError;

/// Run the list command.
pub async fn run(config: StoreConfig) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let catalog = store.refresh().await;

    if catalog.is_degraded() {
        println!(
            "{}",
            style("Catalog unavailable; showing packs on this device.").yellow()
        );
        println!();
    }

    let current = store.current_pack_id().await?;
    let packs = store.list().await?;

    if packs.is_empty() {
        println!("No packs available.");
        return Ok(());
    }

    for pack in &packs {
        let marker = if current.as_deref() == Some(pack.id.as_str()) {
            "*"
        } else {
            " "
        };
        let status = match pack.zipped_data() {
            Some(data) => style(format!("downloaded ({})", format_size(data.len() as u64)))
                .green()
                .to_string(),
            None => style("available").dim().to_string(),
        };
        println!(
            "{} {:24} {:32} {}",
            marker,
            pack.id,
            format!("{}, {}", pack.name, pack.admin1),
            status
        );
    }
    println!();
    println!("{} pack(s). * marks the current pack.", packs.len());
    Ok(())
}
