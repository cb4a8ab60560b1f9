//! Remove command - delete a downloaded pack.

use console::style;
use underfoot::store::StoreConfig;

use super::open_store;
use crate::error::CliError;

/// Run the remove command.
pub async fn run(config: StoreConfig, pack_id: &str) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let was_current = store.current_pack_id().await?.as_deref() == Some(pack_id);

    store.remove(pack_id).await?;

    println!("{} {}", style("Removed").green(), pack_id);
    if was_current {
        println!("Current pack selection cleared.");
    }
    Ok(())
}
