//! Stats command

use chrono::{DateTime, Duration, NaiveDate, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::analytics::{DashboardStats, Snapshot};
use crate::cli::{AppContext, CliError};
use crate::utils::{parse_datetime_lenient, start_of_next_day};

fn parse_bound(label: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, CliError> {
    match raw {
        None => Ok(None),
        Some(value) => parse_datetime_lenient(value)
            .map(Some)
            .ok_or_else(|| CliError::ParseError(format!("Invalid {} date: {}", label, value))),
    }
}

/// 仅给日期的结束边界包含当天全部时间
fn parse_end_bound(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, CliError> {
    match raw.map(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")) {
        Some(Ok(date)) => Ok(Some(start_of_next_day(date) - Duration::nanoseconds(1))),
        _ => parse_bound("end", raw),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out =
        serde_json::to_string_pretty(value).map_err(|e| CliError::CommandError(e.to_string()))?;
    println!("{}", out);
    Ok(())
}

pub async fn show_stats(
    ctx: &AppContext,
    start: Option<&str>,
    end: Option<&str>,
    dashboard: bool,
    json: bool,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let settings = ctx.retention.current().await?;

    if dashboard {
        let stats = ctx.analytics.build_dashboard_stats(&settings, now).await?;
        return if json {
            print_json(&stats)
        } else {
            print_dashboard(&stats);
            Ok(())
        };
    }

    let start = parse_bound("start", start)?;
    let end = parse_end_bound(end)?;
    let window = ctx
        .retention
        .effective_reporting_range(&settings, start, end, now);
    let snapshot = ctx.analytics.build_snapshot(window).await?;

    if json {
        return print_json(&snapshot);
    }

    println!(
        "{} {} .. {}",
        "Range:".bold(),
        window.start.format("%Y-%m-%d %H:%M"),
        window.end.format("%Y-%m-%d %H:%M")
    );
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    println!(
        "{} {} clicks / {} impressions",
        "Total:".bold(),
        snapshot.total_clicks.to_string().cyan(),
        snapshot.total_impressions().to_string().cyan()
    );
    if let Some(last) = snapshot.last_click {
        println!(
            "{} {}",
            "Last click:".bold(),
            last.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    for (date, count) in &snapshot.clicks_by_date {
        println!("  {}  {}", date, count);
    }
    for (id, cta) in &snapshot.ctas {
        let title = if cta.title.is_empty() {
            "(deleted)".dimmed().to_string()
        } else {
            cta.title.clone()
        };
        println!(
            "#{} {}: {} clicks / {} impressions",
            id, title, cta.clicks, cta.impressions
        );
        for page in cta.pages.values() {
            println!(
                "    {} {} / {}",
                page.url.blue().underline(),
                page.clicks,
                page.impressions
            );
        }
    }
}

fn print_dashboard(stats: &DashboardStats) {
    println!(
        "{} {} clicks / {} impressions (CTR {:.2}%)",
        "7 days:".bold(),
        stats.clicks_7d,
        stats.impressions_7d,
        stats.click_through_rate_7d * 100.0
    );
    println!(
        "{} {} clicks / {} impressions",
        "14 days:".bold(),
        stats.clicks_14d,
        stats.impressions_14d
    );
    println!(
        "{} {} clicks / {} impressions",
        "30 days:".bold(),
        stats.clicks_30d,
        stats.impressions_30d
    );
    println!(
        "{} {} impression / {} click",
        "Unique visitors:".bold(),
        stats.unique_impression_visitors,
        stats.unique_click_visitors
    );
    if let Some(page) = &stats.top_page {
        println!(
            "{} {} ({} clicks)",
            "Top page:".bold(),
            page.url.blue().underline(),
            page.clicks
        );
    }
    if let Some(cta) = &stats.most_clicked {
        println!("{} #{} {} ({})", "Most clicked:".bold(), cta.cta_id, cta.title, cta.count);
    }
    if let Some(cta) = &stats.most_impressed {
        println!(
            "{} #{} {} ({})",
            "Most seen:".bold(),
            cta.cta_id,
            cta.title,
            cta.count
        );
    }
    if let Some(best) = &stats.best_ctr {
        println!(
            "{} #{} {} ({:.2}%)",
            "Best CTR:".bold(),
            best.cta_id,
            best.title,
            best.rate * 100.0
        );
    }
}
