//! Cron, fetch and count commands

use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;

use crate::counter::{CounterService, FetchOutcome, format_number};
use crate::interfaces::cli::CliError;
use crate::queue::QueueDriver;

pub async fn run_cron(driver: &Arc<QueueDriver>, force: bool) -> Result<(), CliError> {
    let report = driver.run_cron(Utc::now(), force).await?;

    if !report.ran {
        println!(
            "{} Cron interval has not elapsed yet, use {} to run anyway",
            "ℹ".bold().blue(),
            "--force".cyan()
        );
        return Ok(());
    }

    println!("{}", "Cron finished".bold().green());
    println!("  {}:   {}", "Fetch jobs".cyan(), report.fetch_jobs);
    println!("  {}:   {}", "Count jobs".cyan(), report.count_jobs);
    println!("  {}:    {}", "Processed".cyan(), report.processed);
    if report.failed > 0 {
        println!("  {}:       {}", "Failed".cyan(), report.failed.to_string().red());
    }
    Ok(())
}

pub async fn fetch(service: &Arc<CounterService>, index: u64) -> Result<(), CliError> {
    let outcome = service.fetch(index, Utc::now()).await?;
    let source = match &outcome {
        FetchOutcome::Cached(_) => "cache".yellow(),
        FetchOutcome::Fresh(_) => "analytics API".green(),
    };
    let page = outcome.page();

    println!(
        "{} Fetched {} paths at index {} from {}",
        "✓".bold().green(),
        page.rows.len(),
        index,
        source
    );
    println!(
        "  {}: {}",
        "Total pageviews".cyan(),
        format_number(page.total_pageviews)
    );
    println!("  {}:     {}", "Total paths".cyan(), page.total_results);
    Ok(())
}

pub async fn count(service: &Arc<CounterService>, nid: i64) -> Result<(), CliError> {
    let total = service.count(nid).await?;
    println!(
        "{} Item {} has {} pageviews",
        "✓".bold().green(),
        nid.to_string().cyan(),
        format_number(total).bold()
    );
    Ok(())
}
