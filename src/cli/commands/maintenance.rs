//! Scheduled jobs: cleanup, publishing, event intake

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::analytics::EventInput;
use crate::cli::{AppContext, CleanupTarget, CliError};

pub async fn run_cleanup(
    ctx: &AppContext,
    target: CleanupTarget,
    trash_days: u32,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    match target {
        CleanupTarget::All => {
            let report = ctx.cleanup.run_all(trash_days, now).await?;
            println!(
                "{} Removed {} events, purged {} trashed CTAs",
                "✓".bold().green(),
                report.events_deleted.to_string().cyan(),
                report.ctas_purged.to_string().cyan()
            );
            if report.grace_expired {
                println!("{} Retention grace period ended", "ℹ".bold().blue());
            }
        }
        CleanupTarget::Events => {
            let settings = ctx.retention.expire_grace(now).await?;
            let deleted = ctx.cleanup.run_event_cleanup(&settings, now).await?;
            println!(
                "{} Removed {} events",
                "✓".bold().green(),
                deleted.to_string().cyan()
            );
        }
        CleanupTarget::Trash => {
            let purged = ctx.cleanup.run_trash_cleanup(trash_days, now).await?;
            println!(
                "{} Purged {} trashed CTAs (older than {} days)",
                "✓".bold().green(),
                purged.to_string().cyan(),
                trash_days
            );
        }
    }
    Ok(())
}

pub async fn publish_due(ctx: &AppContext, now: DateTime<Utc>) -> Result<(), CliError> {
    let published = ctx.ctas.publish_due(now).await?;
    if published == 0 {
        println!("{} No scheduled CTAs are due", "ℹ".bold().blue());
    } else {
        println!(
            "{} Published {} scheduled CTAs",
            "✓".bold().green(),
            published.to_string().cyan()
        );
    }
    Ok(())
}

pub async fn record_event(
    ctx: &AppContext,
    payload: &str,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let input: EventInput = serde_json::from_str(payload)
        .map_err(|e| CliError::ParseError(format!("Invalid event JSON: {}", e)))?;
    if input.cta_id <= 0 {
        return Err(CliError::ParseError("cta_id must be positive".into()));
    }

    let id = ctx.analytics.record_input(input, now).await?;
    println!("{} Recorded event #{}", "✓".bold().green(), id);
    Ok(())
}
