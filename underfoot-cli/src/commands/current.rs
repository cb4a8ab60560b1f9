//! Current command - show or change the current pack selection.

use underfoot::store::StoreConfig;

use super::open_store;
use crate::error::CliError;

/// Run the current command.
///
/// With no argument, prints the current selection. With a pack id, makes
/// that pack current; only downloaded packs can be selected, since the
/// viewer renders from local data. `--clear` removes the selection.
pub async fn run(
    config: StoreConfig,
    pack_id: Option<String>,
    clear: bool,
) -> Result<(), CliError> {
    let store = open_store(config).await?;

    if clear {
        store.set_current(None).await?;
        println!("Current pack selection cleared.");
        return Ok(());
    }

    match pack_id {
        Some(id) => {
            let downloaded = store
                .get(&id)
                .await?
                .map(|pack| pack.is_downloaded())
                .unwrap_or(false);
            if !downloaded {
                return Err(CliError::Config(format!("pack not downloaded: {}", id)));
            }
            store.set_current(Some(id.as_str())).await?;
            println!("Current pack is now {}.", id);
        }
        None => match store.current_pack_id().await? {
            Some(id) => println!("{}", id),
            None => println!("No current pack."),
        },
    }
    Ok(())
}
