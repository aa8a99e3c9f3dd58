//! SeaOrmStorage 集成测试（临时 SQLite 数据库）

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use ctapulse::config::DatabaseConfig;
use ctapulse::retention::{AnalyticsSettings, RetentionCategory, RetentionGrace};
use ctapulse::storage::models::{Cta, CtaStatus, EventType, NewEvent, TargetingMode};
use ctapulse::storage::{CtaStore, EventStore, SeaOrmStorage, SettingsStore};
use ctapulse::utils::TimeWindow;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

async fn create_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = SeaOrmStorage::new(&url, "sqlite", &DatabaseConfig::default())
        .await
        .unwrap()
        .with_cleanup_batch_size(2);
    (Arc::new(storage), dir)
}

fn cta(slug: &str) -> Cta {
    let mut cta = Cta::new_draft(t0());
    cta.title = slug.to_string();
    cta.slug = slug.to_string();
    cta
}

// =============================================================================
// CTA 表
// =============================================================================

mod cta_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_save_delete() {
        let (storage, _dir) = create_storage().await;

        let mut record = cta("hello");
        record.content.headline = "Hi there".into();
        let id = storage.insert_cta(&record).await.unwrap();
        assert!(id > 0);

        let mut loaded = storage.get_cta(id).await.unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.uuid, record.uuid);
        assert_eq!(loaded.content.headline, "Hi there");
        assert_eq!(loaded.created_at, t0());

        loaded.status = CtaStatus::Published;
        loaded.published_at = Some(t0());
        assert!(storage.save_cta(&loaded).await.unwrap());
        let reloaded = storage.get_cta(id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, CtaStatus::Published);
        assert_eq!(reloaded.published_at, Some(t0()));

        assert!(storage.delete_cta(id).await.unwrap());
        assert!(!storage.delete_cta(id).await.unwrap());
        assert!(storage.get_cta(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_missing_row_returns_false() {
        let (storage, _dir) = create_storage().await;
        let mut ghost = cta("ghost");
        ghost.id = 404;
        assert!(!storage.save_cta(&ghost).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let (storage, _dir) = create_storage().await;
        storage.insert_cta(&cta("same")).await.unwrap();
        assert!(storage.insert_cta(&cta("same")).await.is_err());
    }

    #[tokio::test]
    async fn test_slugs_with_base() {
        let (storage, _dir) = create_storage().await;
        let first = storage.insert_cta(&cta("promo")).await.unwrap();
        storage.insert_cta(&cta("promo-2")).await.unwrap();
        storage.insert_cta(&cta("other")).await.unwrap();

        let mut taken = storage.slugs_with_base("promo", None).await.unwrap();
        taken.sort();
        assert_eq!(taken, vec!["promo".to_string(), "promo-2".to_string()]);

        let excluding = storage.slugs_with_base("promo", Some(first)).await.unwrap();
        assert_eq!(excluding, vec!["promo-2".to_string()]);
    }

    #[tokio::test]
    async fn test_scheduled_due_and_countable() {
        let (storage, _dir) = create_storage().await;

        let mut due = cta("due");
        due.status = CtaStatus::Scheduled;
        due.targeting = TargetingMode::DateRange;
        due.schedule_start = NaiveDate::from_ymd_opt(2025, 3, 1);
        let due_id = storage.insert_cta(&due).await.unwrap();

        let mut later = cta("later");
        later.status = CtaStatus::Scheduled;
        later.targeting = TargetingMode::DateRange;
        later.schedule_start = NaiveDate::from_ymd_opt(2025, 3, 9);
        storage.insert_cta(&later).await.unwrap();

        let mut demo = cta("demo");
        demo.is_demo = true;
        storage.insert_cta(&demo).await.unwrap();

        let found = storage
            .scheduled_due(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due_id);

        assert_eq!(storage.count_countable().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_purge_trashed_before() {
        let (storage, _dir) = create_storage().await;

        let mut old = cta("old");
        old.status = CtaStatus::Trash;
        old.trashed_at = Some(t0() - Duration::days(40));
        let old_id = storage.insert_cta(&old).await.unwrap();

        let mut recent = cta("recent");
        recent.status = CtaStatus::Trash;
        recent.trashed_at = Some(t0() - Duration::days(2));
        let recent_id = storage.insert_cta(&recent).await.unwrap();

        let purged = storage
            .purge_trashed_before(t0() - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(purged, 1);
        assert!(storage.get_cta(old_id).await.unwrap().is_none());
        assert!(storage.get_cta(recent_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_titles() {
        let (storage, _dir) = create_storage().await;
        let a = storage.insert_cta(&cta("alpha")).await.unwrap();
        let titles = storage.titles(&[a, 999]).await.unwrap();
        assert_eq!(titles.get(&a).map(String::as_str), Some("alpha"));
        assert!(!titles.contains_key(&999));
        assert!(storage.titles(&[]).await.unwrap().is_empty());
    }
}

// =============================================================================
// 事件表
// =============================================================================

mod event_store_tests {
    use super::*;

    async fn seed(storage: &SeaOrmStorage) {
        let page = "https://example.com/pricing";
        let events = [
            NewEvent::new(1, EventType::Impression, t0() - Duration::days(1))
                .with_page(page, Some("Pricing"))
                .with_visitor(10),
            NewEvent::new(1, EventType::Impression, t0() - Duration::days(1))
                .with_page(page, None)
                .with_visitor(11),
            NewEvent::new(1, EventType::Click, t0() - Duration::days(1))
                .with_page(page, None)
                .with_visitor(10),
            NewEvent::new(2, EventType::Click, t0() - Duration::hours(2)),
            NewEvent::new(2, EventType::Close, t0() - Duration::hours(2)),
            NewEvent::new(2, EventType::Click, t0() - Duration::days(20)),
        ];
        for event in &events {
            storage.record_event(event).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_counts_and_last_event() {
        let (storage, _dir) = create_storage().await;
        seed(&storage).await;
        let week = TimeWindow::last_days(t0(), 7);

        assert_eq!(storage.count_events(EventType::Click, week).await.unwrap(), 2);
        assert_eq!(
            storage.count_events(EventType::Impression, week).await.unwrap(),
            2
        );
        assert_eq!(
            storage.last_event_at(EventType::Click, week).await.unwrap(),
            Some(t0() - Duration::hours(2))
        );
        assert_eq!(
            storage
                .distinct_visitors(EventType::Impression, week)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_daily_counts() {
        let (storage, _dir) = create_storage().await;
        seed(&storage).await;

        let days = storage
            .daily_counts(EventType::Click, TimeWindow::last_days(t0(), 7))
            .await
            .unwrap();
        let pairs: Vec<(NaiveDate, u64)> = days.iter().map(|d| (d.date, d.count)).collect();
        assert_eq!(
            pairs,
            vec![
                (NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_grouped_counts() {
        let (storage, _dir) = create_storage().await;
        seed(&storage).await;
        let week = TimeWindow::last_days(t0(), 7);

        let mut by_cta = storage.counts_by_cta(week).await.unwrap();
        by_cta.sort_by_key(|r| (r.cta_id, r.event_type));
        let flat: Vec<(i64, EventType, u64)> = by_cta
            .iter()
            .map(|r| (r.cta_id, r.event_type, r.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                (1, EventType::Impression, 2),
                (1, EventType::Click, 1),
                (2, EventType::Click, 1),
                (2, EventType::Close, 1),
            ]
        );

        let by_page = storage.counts_by_page(week).await.unwrap();
        assert_eq!(by_page.len(), 2);
        let impressions = by_page
            .iter()
            .find(|r| r.event_type == EventType::Impression)
            .unwrap();
        assert_eq!(impressions.count, 2);
        assert_eq!(impressions.page_url, "https://example.com/pricing");
        assert_eq!(impressions.page_title.as_deref(), Some("Pricing"));
    }

    #[tokio::test]
    async fn test_batched_deletes() {
        let (storage, _dir) = create_storage().await;
        seed(&storage).await;

        // 批大小为 2，需要多批才能删完
        let deleted = storage
            .delete_events_before(t0() - Duration::hours(12))
            .await
            .unwrap();
        assert_eq!(deleted, 4);

        let all = TimeWindow::new(t0() - Duration::days(365), t0());
        assert_eq!(storage.count_events(EventType::Click, all).await.unwrap(), 1);

        let between = storage
            .delete_events_between(t0() - Duration::hours(3), t0() - Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(between, 2);
        assert_eq!(
            storage
                .delete_events_between(t0(), t0() - Duration::days(1))
                .await
                .unwrap(),
            0
        );
    }
}

// =============================================================================
// 设置表
// =============================================================================

mod settings_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_settings_use_defaults() {
        let (storage, _dir) = create_storage().await;
        let settings = storage.load_analytics().await.unwrap();
        assert_eq!(settings, AnalyticsSettings::default());
    }

    #[tokio::test]
    async fn test_modify_round_trips_grace() {
        let (storage, _dir) = create_storage().await;
        let grace = RetentionGrace {
            previous_days: 30,
            changed_at: t0(),
            grace_until: t0() + Duration::days(30),
        };
        let next = AnalyticsSettings {
            grace: Some(grace),
            ..AnalyticsSettings::new(RetentionCategory::SevenDays)
        };

        storage
            .modify_analytics(&move |_: &AnalyticsSettings| next)
            .await
            .unwrap();
        let loaded = storage.load_analytics().await.unwrap();
        assert_eq!(loaded, next);

        // 第二次修改走更新分支
        let updated = storage
            .modify_analytics(&|current: &AnalyticsSettings| AnalyticsSettings {
                retention: RetentionCategory::FourteenDays,
                ..*current
            })
            .await
            .unwrap();
        assert_eq!(updated.retention, RetentionCategory::FourteenDays);
        assert_eq!(storage.load_analytics().await.unwrap(), updated);
    }
}
