//! Status command: prints the dashboard summary

use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;

use crate::counter::{CounterService, DashboardSummary};
use crate::interfaces::cli::CliError;

pub async fn show_status(service: &Arc<CounterService>, json: bool) -> Result<(), CliError> {
    let summary = service.dashboard(Utc::now()).await?;

    if json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::ParseError(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    print_summary(&summary);
    Ok(())
}

fn print_summary(s: &DashboardSummary) {
    println!("{}", "Counter Status".bold().green());
    println!(
        "  {}:     {}",
        "Authenticated".cyan(),
        if s.authenticated {
            "yes".green()
        } else {
            "no".red()
        }
    );
    println!("  {}:        {}", "Date range".cyan(), s.date_range);
    println!("  {}:   {}", "Total pageviews".cyan(), s.total_pageviews);
    println!("  {}:       {}", "Total paths".cyan(), s.total_paths);
    println!("  {}:    {}", "Last refreshed".cyan(), s.data_last_refreshed);
    println!("  {}:      {}", "Stored paths".cyan(), s.stored_paths);
    println!(
        "  {}:   {} published, {} stored, {} with pageviews",
        "Content items".cyan(),
        s.published_items,
        s.items_stored,
        s.items_with_pageviews
    );
    println!("  {}:       {}", "Queued jobs".cyan(), s.queued_jobs);

    let next = if s.cron.overdue && s.cron.next_execution > 0 {
        format!("{} (due)", s.cron.next_execution_display).yellow()
    } else {
        s.cron.next_execution_display.normal()
    };
    println!("  {}:          {}", "Next cron".cyan(), next);
    println!("  {}:      {}", "Last query".cyan(), s.most_recent_query.dimmed());
    if let Some(url) = &s.quota_url {
        println!("  {}:       {}", "Quota page".cyan(), url.blue());
    }

    if !s.top_paths.is_empty() {
        println!();
        println!("{}", "Top paths".bold());
        for row in &s.top_paths {
            println!("  {:>12}  {}", row.pageviews, row.path);
        }
    }
    if !s.top_items.is_empty() {
        println!();
        println!("{}", "Top items".bold());
        for row in &s.top_items {
            println!("  {:>12}  node/{}", row.pageviews, row.nid);
        }
    }
}
