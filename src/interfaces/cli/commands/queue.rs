use std::sync::Arc;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::queue::QueueDriver;

pub async fn purge(driver: &Arc<QueueDriver>) -> Result<(), CliError> {
    let purged = driver.purge_queue().await?;
    println!("{} Removed {} queued jobs", "✓".bold().green(), purged);
    Ok(())
}
