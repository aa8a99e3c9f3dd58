//! RetentionPolicyManager 集成测试

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use ctapulse::retention::{
    AnalyticsSettings, RetentionCategory, RetentionPolicyManager, RetentionTier,
};
use ctapulse::storage::{MemoryStorage, SettingsStore};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn manager(tier: RetentionTier) -> (RetentionPolicyManager, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (RetentionPolicyManager::new(storage.clone(), tier), storage)
}

// =============================================================================
// 保留期变更与宽限期
// =============================================================================

mod change_tests {
    use super::*;

    #[tokio::test]
    async fn test_default_settings() {
        let (mgr, _) = manager(RetentionTier::Basic);
        let current = mgr.current().await.unwrap();
        assert_eq!(current.retention, RetentionCategory::SevenDays);
        assert!(current.grace.is_none());
        assert_eq!(mgr.effective_cleanup_days(&current), 7);
    }

    #[tokio::test]
    async fn test_narrowing_persists_grace() {
        let (mgr, storage) = manager(RetentionTier::Basic);
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::ThirtyDays), t0())
            .await
            .unwrap();
        let later = t0() + Duration::days(1);
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::SevenDays), later)
            .await
            .unwrap();

        let stored = storage.load_analytics().await.unwrap();
        let grace = stored.grace.unwrap();
        assert_eq!(grace.previous_days, 30);
        assert_eq!(grace.changed_at, later);
        assert_eq!(grace.grace_until, later + Duration::days(30));
    }

    #[tokio::test]
    async fn test_second_narrowing_keeps_baseline() {
        let (mgr, _) = manager(RetentionTier::Basic);
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::ThirtyDays), t0())
            .await
            .unwrap();
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::FourteenDays), t0())
            .await
            .unwrap();
        let third = t0() + Duration::days(3);
        let updated = mgr
            .change_retention(AnalyticsSettings::new(RetentionCategory::OneDay), third)
            .await
            .unwrap();

        let grace = updated.grace.unwrap();
        assert_eq!(grace.previous_days, 30);
        assert_eq!(grace.changed_at, t0());
    }

    #[tokio::test]
    async fn test_widening_clears_grace() {
        let (mgr, _) = manager(RetentionTier::Basic);
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::ThirtyDays), t0())
            .await
            .unwrap();
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::SevenDays), t0())
            .await
            .unwrap();
        let widened = mgr
            .change_retention(AnalyticsSettings::new(RetentionCategory::ThirtyDays), t0())
            .await
            .unwrap();
        assert!(widened.grace.is_none());
    }

    #[tokio::test]
    async fn test_resubmitting_same_choice_keeps_grace() {
        let (mgr, _) = manager(RetentionTier::Basic);
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::ThirtyDays), t0())
            .await
            .unwrap();
        let first = mgr
            .change_retention(AnalyticsSettings::new(RetentionCategory::SevenDays), t0())
            .await
            .unwrap();
        let again = mgr
            .change_retention(
                AnalyticsSettings::new(RetentionCategory::SevenDays),
                t0() + Duration::days(2),
            )
            .await
            .unwrap();
        assert_eq!(first.grace, again.grace);
    }

    #[tokio::test]
    async fn test_basic_tier_rejects_long_categories() {
        let (mgr, _) = manager(RetentionTier::Basic);
        assert!(
            mgr.change_retention(AnalyticsSettings::new(RetentionCategory::OneYear), t0())
                .await
                .is_err()
        );
        assert!(
            mgr.change_retention(AnalyticsSettings::new(RetentionCategory::Unlimited), t0())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_custom_requires_positive_days() {
        let (mgr, _) = manager(RetentionTier::Extended);
        assert!(
            mgr.change_retention(AnalyticsSettings::custom(0), t0())
                .await
                .is_err()
        );
        let updated = mgr
            .change_retention(AnalyticsSettings::custom(45), t0())
            .await
            .unwrap();
        assert_eq!(mgr.effective_cleanup_days(&updated), 45);
    }

    #[tokio::test]
    async fn test_unlimited_never_opens_grace() {
        let (mgr, _) = manager(RetentionTier::Extended);
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::Unlimited), t0())
            .await
            .unwrap();
        let narrowed = mgr
            .change_retention(AnalyticsSettings::new(RetentionCategory::NinetyDays), t0())
            .await
            .unwrap();
        assert!(narrowed.grace.is_none());
    }
}

// =============================================================================
// 宽限期到期与报表范围
// =============================================================================

mod expiry_tests {
    use super::*;

    #[tokio::test]
    async fn test_expire_grace_only_after_deadline() {
        let (mgr, _) = manager(RetentionTier::Basic);
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::ThirtyDays), t0())
            .await
            .unwrap();
        mgr.change_retention(AnalyticsSettings::new(RetentionCategory::SevenDays), t0())
            .await
            .unwrap();

        let mid = mgr.expire_grace(t0() + Duration::days(29)).await.unwrap();
        assert!(mid.grace.is_some());

        let after = mgr.expire_grace(t0() + Duration::days(30)).await.unwrap();
        assert!(after.grace.is_none());
        assert!(mgr.current().await.unwrap().grace.is_none());
    }

    #[tokio::test]
    async fn test_reporting_range_clamped_to_retention() {
        let (mgr, _) = manager(RetentionTier::Basic);
        let settings = AnalyticsSettings::new(RetentionCategory::SevenDays);
        let now = t0();

        let window = mgr.effective_reporting_range(
            &settings,
            Some(now - Duration::days(60)),
            None,
            now,
        );
        assert_eq!(window.start, now - Duration::days(7));
        assert_eq!(window.end, now);
    }

    #[tokio::test]
    async fn test_disallowed_stored_category_reports_fallback() {
        // 存储中的值可能来自更高版本
        let (mgr, storage) = manager(RetentionTier::Basic);
        storage
            .modify_analytics(&|_: &AnalyticsSettings| {
                AnalyticsSettings::new(RetentionCategory::Unlimited)
            })
            .await
            .unwrap();

        let settings = mgr.current().await.unwrap();
        assert_eq!(mgr.effective_cleanup_days(&settings), 7);
        let window = mgr.effective_reporting_range(&settings, None, None, t0());
        assert_eq!(window.start, t0() - Duration::days(7));
    }
}
