//! Pure retention rules
//!
//! Every function takes the settings snapshot and `now` as arguments; nothing
//! here reads ambient state.

use chrono::{DateTime, Duration, Utc};

use super::settings::{AnalyticsSettings, FALLBACK_RETENTION_DAYS, RetentionGrace, RetentionTier};
use crate::utils::{TimeWindow, clamp_window, days_ago};

/// 保留期不限时，未指定起点的报表默认回看天数
pub const DEFAULT_REPORTING_DAYS: u32 = 30;

/// Reconcile a requested retention change with the settings currently stored
///
/// Grace fields in `requested` are ignored; they are derived here:
/// - unchanged choice keeps the current grace state
/// - a narrowing opens (or extends) a grace period whose baseline is the
///   widest window seen since the sequence started
/// - widening, unlimited or equal windows clear the grace period
pub fn apply_retention_change(
    current: &AnalyticsSettings,
    requested: &AnalyticsSettings,
    now: DateTime<Utc>,
) -> AnalyticsSettings {
    let mut next = AnalyticsSettings {
        retention: requested.retention,
        retention_custom_days: requested.retention_custom_days,
        grace: None,
    };

    if current.same_choice(requested) {
        next.grace = current.grace;
        return next;
    }

    let prev_days = current.configured_days();
    let new_days = next.configured_days();

    // 宽限期内再次收窄时，基线不能缩小
    let running = current.grace.filter(|g| g.is_active(now));
    let baseline = running.map_or(prev_days, |g| g.previous_days.max(prev_days));

    if baseline > 0 && new_days > 0 && new_days < baseline {
        let changed_at = running.map_or(now, |g| g.changed_at);
        next.grace = Some(RetentionGrace {
            previous_days: baseline,
            changed_at,
            grace_until: changed_at + Duration::days(i64::from(baseline)),
        });
    }

    next
}

/// Clear the grace period once `grace_until` has passed
pub fn expire_grace(settings: &AnalyticsSettings, now: DateTime<Utc>) -> AnalyticsSettings {
    let mut next = *settings;
    if next.grace.is_some_and(|g| !g.is_active(now)) {
        next.grace = None;
    }
    next
}

/// Days of events to keep when physically deleting. 0 means never delete.
///
/// A category the tier does not allow falls back to
/// [`FALLBACK_RETENTION_DAYS`].
pub fn effective_cleanup_days(settings: &AnalyticsSettings, tier: RetentionTier) -> u32 {
    if !tier.allows(settings.retention) {
        return FALLBACK_RETENTION_DAYS;
    }
    settings.configured_days()
}

/// Oldest instant reports may show, or `None` when retention is unlimited
pub fn retention_floor(
    settings: &AnalyticsSettings,
    tier: RetentionTier,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match effective_cleanup_days(settings, tier) {
        0 => None,
        days => Some(days_ago(now, days)),
    }
}

/// Clamp a requested report window to what retention still guarantees
///
/// A missing start becomes the retention floor (or 30 days back when
/// retention is unlimited); a missing end becomes `now`.
pub fn effective_reporting_range(
    settings: &AnalyticsSettings,
    tier: RetentionTier,
    requested_start: Option<DateTime<Utc>>,
    requested_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> TimeWindow {
    let floor = retention_floor(settings, tier, now);
    let start = requested_start
        .or(floor)
        .unwrap_or_else(|| days_ago(now, DEFAULT_REPORTING_DAYS));
    let end = requested_end.unwrap_or(now);
    clamp_window(start, end, floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::RetentionCategory;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn settings(category: RetentionCategory) -> AnalyticsSettings {
        AnalyticsSettings::new(category)
    }

    #[test]
    fn test_narrowing_opens_grace() {
        let next = apply_retention_change(
            &settings(RetentionCategory::ThirtyDays),
            &settings(RetentionCategory::SevenDays),
            t0(),
        );
        let grace = next.grace.unwrap();
        assert_eq!(next.retention, RetentionCategory::SevenDays);
        assert_eq!(grace.previous_days, 30);
        assert_eq!(grace.changed_at, t0());
        assert_eq!(grace.grace_until, t0() + Duration::days(30));
    }

    #[test]
    fn test_second_narrowing_preserves_widest_baseline() {
        let first = apply_retention_change(
            &settings(RetentionCategory::ThirtyDays),
            &settings(RetentionCategory::SevenDays),
            t0(),
        );
        let later = t0() + Duration::days(3);
        let second = apply_retention_change(&first, &settings(RetentionCategory::OneDay), later);

        let grace = second.grace.unwrap();
        assert_eq!(second.retention, RetentionCategory::OneDay);
        assert_eq!(grace.previous_days, 30);
        assert_eq!(grace.changed_at, t0());
        assert_eq!(grace.grace_until, t0() + Duration::days(30));
    }

    #[test]
    fn test_narrowing_after_grace_elapsed_starts_new_sequence() {
        let first = apply_retention_change(
            &settings(RetentionCategory::ThirtyDays),
            &settings(RetentionCategory::FourteenDays),
            t0(),
        );
        let later = t0() + Duration::days(31);
        let second = apply_retention_change(&first, &settings(RetentionCategory::SevenDays), later);

        let grace = second.grace.unwrap();
        assert_eq!(grace.previous_days, 14);
        assert_eq!(grace.changed_at, later);
    }

    #[test]
    fn test_widening_clears_grace() {
        let narrowed = apply_retention_change(
            &settings(RetentionCategory::ThirtyDays),
            &settings(RetentionCategory::SevenDays),
            t0(),
        );
        let widened = apply_retention_change(
            &narrowed,
            &settings(RetentionCategory::ThirtyDays),
            t0() + Duration::days(1),
        );
        assert!(widened.grace.is_none());

        let widened = apply_retention_change(
            &settings(RetentionCategory::SevenDays),
            &settings(RetentionCategory::NinetyDays),
            t0(),
        );
        assert!(widened.grace.is_none());
    }

    #[test]
    fn test_unlimited_clears_grace() {
        let narrowed = apply_retention_change(
            &settings(RetentionCategory::ThirtyDays),
            &settings(RetentionCategory::SevenDays),
            t0(),
        );
        let unlimited = apply_retention_change(
            &narrowed,
            &settings(RetentionCategory::Unlimited),
            t0() + Duration::days(1),
        );
        assert!(unlimited.grace.is_none());
    }

    #[test]
    fn test_leaving_unlimited_is_not_a_narrowing() {
        let next = apply_retention_change(
            &settings(RetentionCategory::Unlimited),
            &settings(RetentionCategory::SevenDays),
            t0(),
        );
        assert!(next.grace.is_none());
    }

    #[test]
    fn test_unchanged_choice_keeps_grace_and_ignores_user_grace() {
        let narrowed = apply_retention_change(
            &settings(RetentionCategory::ThirtyDays),
            &settings(RetentionCategory::SevenDays),
            t0(),
        );

        let mut tampered = settings(RetentionCategory::SevenDays);
        tampered.grace = Some(RetentionGrace {
            previous_days: 365,
            changed_at: t0() - Duration::days(100),
            grace_until: t0() + Duration::days(265),
        });
        let next = apply_retention_change(&narrowed, &tampered, t0() + Duration::days(2));
        assert_eq!(next.grace, narrowed.grace);
    }

    #[test]
    fn test_custom_days_change_is_detected() {
        let next = apply_retention_change(
            &AnalyticsSettings::custom(45),
            &AnalyticsSettings::custom(10),
            t0(),
        );
        assert_eq!(next.grace.unwrap().previous_days, 45);

        let same = apply_retention_change(
            &AnalyticsSettings::custom(45),
            &AnalyticsSettings::custom(45),
            t0(),
        );
        assert!(same.grace.is_none());
    }

    #[test]
    fn test_expire_grace() {
        let narrowed = apply_retention_change(
            &settings(RetentionCategory::ThirtyDays),
            &settings(RetentionCategory::SevenDays),
            t0(),
        );
        assert!(expire_grace(&narrowed, t0() + Duration::days(29)).grace.is_some());
        assert!(expire_grace(&narrowed, t0() + Duration::days(30)).grace.is_none());
    }

    #[test]
    fn test_effective_cleanup_days() {
        let basic = RetentionTier::Basic;
        assert_eq!(
            effective_cleanup_days(&settings(RetentionCategory::ThirtyDays), basic),
            30
        );
        assert_eq!(
            effective_cleanup_days(&settings(RetentionCategory::Unlimited), basic),
            FALLBACK_RETENTION_DAYS
        );
        assert_eq!(
            effective_cleanup_days(&settings(RetentionCategory::Unlimited), RetentionTier::Extended),
            0
        );
        assert_eq!(
            effective_cleanup_days(&AnalyticsSettings::custom(45), RetentionTier::Extended),
            45
        );
    }

    #[test]
    fn test_reporting_range_clamps_to_floor() {
        let now = t0();
        let w = effective_reporting_range(
            &settings(RetentionCategory::SevenDays),
            RetentionTier::Basic,
            Some(now - Duration::days(30)),
            Some(now),
            now,
        );
        assert_eq!(w.start, now - Duration::days(7));
        assert_eq!(w.end, now);
    }

    #[test]
    fn test_reporting_range_defaults() {
        let now = t0();
        let w = effective_reporting_range(
            &settings(RetentionCategory::FourteenDays),
            RetentionTier::Basic,
            None,
            None,
            now,
        );
        assert_eq!(w.start, now - Duration::days(14));
        assert_eq!(w.end, now);

        let w = effective_reporting_range(
            &settings(RetentionCategory::Unlimited),
            RetentionTier::Extended,
            None,
            None,
            now,
        );
        assert_eq!(w.start, now - Duration::days(DEFAULT_REPORTING_DAYS as i64));
    }

    #[test]
    fn test_reporting_range_end_follows_clamped_start() {
        let now = t0();
        let w = effective_reporting_range(
            &settings(RetentionCategory::SevenDays),
            RetentionTier::Basic,
            Some(now - Duration::days(20)),
            Some(now - Duration::days(10)),
            now,
        );
        assert_eq!(w.start, now - Duration::days(7));
        assert_eq!(w.end, w.start);
    }

    #[test]
    fn test_reporting_range_unlimited_keeps_requested_start() {
        let now = t0();
        let start = now - Duration::days(400);
        let w = effective_reporting_range(
            &settings(RetentionCategory::Unlimited),
            RetentionTier::Extended,
            Some(start),
            None,
            now,
        );
        assert_eq!(w.start, start);
    }
}
