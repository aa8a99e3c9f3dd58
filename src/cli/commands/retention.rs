//! Retention setting commands

use std::str::FromStr;

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::cli::{AppContext, CliError};
use crate::retention::{AnalyticsSettings, RetentionCategory};

pub async fn show_retention(
    ctx: &AppContext,
    json: bool,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let settings = ctx.retention.current().await?;
    let cleanup_days = ctx.retention.effective_cleanup_days(&settings);

    if json {
        let value = serde_json::json!({
            "tier": ctx.retention.tier(),
            "settings": settings,
            "effective_cleanup_days": cleanup_days,
            "in_grace": settings.is_mid_grace(now),
        });
        let out = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{} {}", "Tier:".bold(), ctx.retention.tier().to_string().cyan());
    println!(
        "{} {}",
        "Retention:".bold(),
        settings.retention.to_string().cyan()
    );
    if settings.retention == RetentionCategory::Custom {
        println!("  custom days: {}", settings.configured_days());
    }
    let effective = if cleanup_days == 0 {
        "unlimited".to_string()
    } else {
        format!("{} days", cleanup_days)
    };
    println!("{} {}", "Events kept:".bold(), effective.green());

    if let Some(grace) = settings.grace {
        let state = if grace.is_active(now) {
            "active".yellow()
        } else {
            "finished, cleared on next cleanup".dimmed()
        };
        println!(
            "{} previous {} days, changed {}, until {} ({})",
            "Grace:".bold(),
            grace.previous_days,
            grace.changed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            grace.grace_until.format("%Y-%m-%d %H:%M:%S UTC"),
            state
        );
    }
    Ok(())
}

pub async fn set_retention(
    ctx: &AppContext,
    category: &str,
    custom_days: Option<u32>,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let category = RetentionCategory::from_str(category.trim()).map_err(|_| {
        let allowed: Vec<String> = ctx
            .retention
            .tier()
            .allowed_categories()
            .iter()
            .map(|c| c.to_string())
            .collect();
        CliError::ParseError(format!(
            "Unknown retention '{}', expected one of: {}",
            category,
            allowed.join(", ")
        ))
    })?;

    let requested = match category {
        RetentionCategory::Custom => AnalyticsSettings::custom(custom_days.unwrap_or(0)),
        other => AnalyticsSettings::new(other),
    };

    let updated = ctx.retention.change_retention(requested, now).await?;
    println!(
        "{} Retention set to {}",
        "✓".bold().green(),
        updated.retention.to_string().cyan()
    );
    if let Some(grace) = updated.grace {
        println!(
            "{} Events from the last {} days stay available until {}",
            "ℹ".bold().blue(),
            grace.previous_days,
            grace.grace_until.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}
