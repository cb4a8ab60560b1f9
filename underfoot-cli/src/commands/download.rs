//! Download command - fetch a pack archive with progress and Ctrl-C
//! cancellation.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use underfoot::store::{DownloadOptions, StoreConfig};

use super::open_store;
use crate::error::CliError;

/// Run the download command.
pub async fn run(config: StoreConfig, pack_id: &str) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let catalog = store.refresh().await;
    if catalog.is_degraded() {
        println!(
            "{}",
            style("Catalog unavailable; the pack must already be known locally.").yellow()
        );
    }

    // Ctrl-C cancels this download cooperatively instead of killing the
    // process mid-write.
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| CliError::Config(format!("failed to set signal handler: {}", e)))?;

    let bar = ProgressBar::new(0);
    let bar_style = ProgressStyle::with_template(
        "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )
    .map_err(|e| CliError::Config(format!("bad progress template: {}", e)))?;
    bar.set_style(bar_style);

    let progress_bar = bar.clone();
    let options = DownloadOptions::new()
        .with_progress(move |progress| {
            progress_bar.set_length(progress.total_bytes);
            progress_bar.set_position(progress.received_bytes);
        })
        .with_cancel(cancel);

    println!("Downloading {}...", pack_id);
    match store.download(pack_id, options).await {
        Ok(()) => {
            bar.finish_and_clear();
            println!("{} {}", style("Downloaded").green(), pack_id);
            if store.current_pack_id().await?.as_deref() == Some(pack_id) {
                println!("{} is now the current pack.", pack_id);
            }
            Ok(())
        }
        // A user cancel halts quietly; it is not a failure to report.
        Err(e) if e.is_aborted() => {
            bar.finish_and_clear();
            println!("Download cancelled.");
            Ok(())
        }
        Err(e) => {
            bar.abandon();
            Err(e.into())
        }
    }
}
