//! CLI 解析与引擎装配测试

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use clap::Parser;

use ctapulse::cli::{AppContext, CleanupTarget, Cli, Commands, ConfigCommands};
use ctapulse::config::RetentionConfig;
use ctapulse::lifecycle::CtaInput;
use ctapulse::storage::MemoryStorage;
use ctapulse::storage::models::{EventType, NewEvent};

#[test]
fn test_parse_subcommands() {
    let cli = Cli::try_parse_from(["ctapulse", "cleanup", "trash", "--trash-days", "14"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Cleanup {
            target: CleanupTarget::Trash,
            trash_days: Some(14)
        }
    ));

    let cli = Cli::try_parse_from(["ctapulse", "stats", "--dashboard", "--json"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Stats {
            dashboard: true,
            json: true,
            ..
        }
    ));

    let cli = Cli::try_parse_from(["ctapulse", "config", "generate", "out.toml"]).unwrap();
    match cli.command {
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => {
            assert_eq!(output_path.as_deref(), Some("out.toml"));
            assert!(!force);
        }
        _ => panic!("expected config generate"),
    }

    assert!(Cli::try_parse_from(["ctapulse"]).is_err());
}

#[tokio::test]
async fn test_context_shares_one_storage() {
    let now = Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let ctx = AppContext::from_storage(storage.clone(), &RetentionConfig::default());

    let id = ctx.ctas.create(&CtaInput::titled("Wired"), now).await.unwrap();
    ctx.analytics
        .record(&NewEvent::new(id, EventType::Click, now - Duration::days(9)))
        .await
        .unwrap();
    ctx.analytics
        .record(&NewEvent::new(id, EventType::Click, now - Duration::hours(1)))
        .await
        .unwrap();
    ctx.ctas.trash(id, now - Duration::days(45)).await.unwrap();

    let report = ctx.cleanup.run_all(30, now).await.unwrap();
    assert_eq!(report.events_deleted, 1);
    assert_eq!(report.ctas_purged, 1);
    assert_eq!(storage.events().len(), 1);
    assert!(ctx.ctas.get(id).await.unwrap().is_none());
}
