//! Status transitions
//!
//! Everything here mutates a `Cta` in memory; persisting the result is the
//! caller's job.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{CtaError, Result};
use crate::storage::models::{Cta, CtaStatus, TargetingMode};
use crate::utils::start_of_day;

/// Result of a lifecycle operation
///
/// `DemoProtected` is not an error: callers branch on it to offer a hard
/// delete instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied,
    NotFound,
    /// Demo CTAs cannot be trashed or archived
    DemoProtected,
    /// The CTA is not in a state the operation applies to
    NotApplicable,
}

impl TransitionOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

pub fn clear_schedule(cta: &mut Cta) {
    cta.schedule_start = None;
    cta.schedule_end = None;
}

/// Move to trash. Trashing twice keeps the original `trashed_at`.
pub fn trash(cta: &mut Cta, now: DateTime<Utc>) -> TransitionOutcome {
    if cta.is_demo {
        return TransitionOutcome::DemoProtected;
    }
    if cta.status != CtaStatus::Trash {
        cta.trashed_at = Some(now);
    }
    cta.status = CtaStatus::Trash;
    clear_schedule(cta);
    TransitionOutcome::Applied
}

pub fn archive(cta: &mut Cta) -> TransitionOutcome {
    if cta.is_demo {
        return TransitionOutcome::DemoProtected;
    }
    cta.status = CtaStatus::Archived;
    cta.trashed_at = None;
    clear_schedule(cta);
    TransitionOutcome::Applied
}

/// Take a CTA out of the trash into `target`
///
/// `target = Trash` is a caller error. A CTA that is not in the trash is
/// left alone and reported as `NotApplicable`.
pub fn restore(cta: &mut Cta, target: CtaStatus, now: DateTime<Utc>) -> Result<TransitionOutcome> {
    if target == CtaStatus::Trash {
        return Err(CtaError::validation("Cannot restore a CTA into the trash"));
    }
    if cta.status != CtaStatus::Trash {
        return Ok(TransitionOutcome::NotApplicable);
    }

    cta.status = target;
    cta.trashed_at = None;
    normalize_for_save(cta, now);
    Ok(TransitionOutcome::Applied)
}

/// Enforce the record invariants before a create or update is written
///
/// - schedule bounds only survive on date-range CTAs that are scheduled or
///   published
/// - `trashed_at` is set exactly while the status is `Trash`
/// - a live published CTA records `published_at` and `first_active_at` once
/// - a scheduled CTA records its start date's midnight as `first_active_at`
pub fn normalize_for_save(cta: &mut Cta, now: DateTime<Utc>) {
    if cta.targeting != TargetingMode::DateRange || cta.status.clears_schedule() {
        clear_schedule(cta);
    }

    if cta.status == CtaStatus::Trash {
        if cta.trashed_at.is_none() {
            cta.trashed_at = Some(now);
        }
    } else {
        cta.trashed_at = None;
    }

    match cta.status {
        CtaStatus::Published if cta.is_enabled => {
            if cta.first_active_at.is_none() {
                cta.first_active_at = Some(now);
            }
            if cta.published_at.is_none() {
                cta.published_at = Some(now);
            }
        }
        CtaStatus::Scheduled => {
            if let Some(start) = cta.schedule_start
                && cta.first_active_at.is_none()
            {
                cta.first_active_at = Some(start_of_day(start));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 20, 9, 30, 0).unwrap()
    }

    fn scheduled_cta() -> Cta {
        let mut cta = Cta::new_draft(now());
        cta.status = CtaStatus::Scheduled;
        cta.targeting = TargetingMode::DateRange;
        cta.schedule_start = NaiveDate::from_ymd_opt(2025, 3, 1);
        cta.schedule_end = NaiveDate::from_ymd_opt(2025, 3, 31);
        cta
    }

    fn assert_trash_invariant(cta: &Cta) {
        assert_eq!(cta.status == CtaStatus::Trash, cta.trashed_at.is_some());
    }

    #[test]
    fn test_trash_sets_timestamp_and_clears_schedule() {
        let mut cta = scheduled_cta();
        assert_eq!(trash(&mut cta, now()), TransitionOutcome::Applied);
        assert_eq!(cta.status, CtaStatus::Trash);
        assert_eq!(cta.trashed_at, Some(now()));
        assert!(cta.schedule_start.is_none() && cta.schedule_end.is_none());
        assert_trash_invariant(&cta);
    }

    #[test]
    fn test_trash_twice_keeps_original_timestamp() {
        let mut cta = scheduled_cta();
        trash(&mut cta, now());
        trash(&mut cta, now() + chrono::Duration::days(2));
        assert_eq!(cta.trashed_at, Some(now()));
    }

    #[test]
    fn test_demo_is_protected() {
        let mut cta = scheduled_cta();
        cta.is_demo = true;
        assert_eq!(trash(&mut cta, now()), TransitionOutcome::DemoProtected);
        assert_eq!(archive(&mut cta), TransitionOutcome::DemoProtected);
        assert_eq!(cta.status, CtaStatus::Scheduled);
        assert!(cta.schedule_start.is_some());
    }

    #[test]
    fn test_archive_clears_trash_and_schedule() {
        let mut cta = scheduled_cta();
        trash(&mut cta, now());
        assert_eq!(archive(&mut cta), TransitionOutcome::Applied);
        assert_eq!(cta.status, CtaStatus::Archived);
        assert!(cta.schedule_start.is_none());
        assert_trash_invariant(&cta);
    }

    #[test]
    fn test_restore_rejects_trash_target() {
        let mut cta = scheduled_cta();
        trash(&mut cta, now());
        assert!(restore(&mut cta, CtaStatus::Trash, now()).is_err());
        assert_eq!(cta.status, CtaStatus::Trash);
    }

    #[test]
    fn test_restore_clears_trashed_at() {
        let mut cta = scheduled_cta();
        trash(&mut cta, now());
        let outcome = restore(&mut cta, CtaStatus::Published, now()).unwrap();
        assert_eq!(outcome, TransitionOutcome::Applied);
        assert_eq!(cta.status, CtaStatus::Published);
        assert_eq!(cta.published_at, Some(now()));
        assert_trash_invariant(&cta);
    }

    #[test]
    fn test_restore_of_live_cta_is_not_applicable() {
        let mut cta = scheduled_cta();
        let outcome = restore(&mut cta, CtaStatus::Draft, now()).unwrap();
        assert_eq!(outcome, TransitionOutcome::NotApplicable);
        assert_eq!(cta.status, CtaStatus::Scheduled);
    }

    #[test]
    fn test_scheduled_first_active_is_start_midnight() {
        let mut cta = scheduled_cta();
        normalize_for_save(&mut cta, now());
        assert_eq!(
            cta.first_active_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
        assert!(cta.published_at.is_none());
    }

    #[test]
    fn test_publish_sets_timestamps_once() {
        let mut cta = Cta::new_draft(now());
        cta.status = CtaStatus::Published;
        normalize_for_save(&mut cta, now());
        assert_eq!(cta.published_at, Some(now()));
        assert_eq!(cta.first_active_at, Some(now()));

        let later = now() + chrono::Duration::days(5);
        normalize_for_save(&mut cta, later);
        assert_eq!(cta.published_at, Some(now()));
    }

    #[test]
    fn test_disabled_publish_does_not_set_timestamps() {
        let mut cta = Cta::new_draft(now());
        cta.status = CtaStatus::Published;
        cta.is_enabled = false;
        normalize_for_save(&mut cta, now());
        assert!(cta.published_at.is_none());
        assert!(cta.first_active_at.is_none());
    }

    #[test]
    fn test_schedule_cleared_unless_date_range() {
        let mut cta = scheduled_cta();
        cta.targeting = TargetingMode::Always;
        normalize_for_save(&mut cta, now());
        assert!(cta.schedule_start.is_none());

        let mut cta = scheduled_cta();
        cta.status = CtaStatus::Draft;
        normalize_for_save(&mut cta, now());
        assert!(cta.schedule_end.is_none());

        let mut cta = scheduled_cta();
        cta.status = CtaStatus::Published;
        normalize_for_save(&mut cta, now());
        assert!(cta.schedule_start.is_some());
    }

    #[test]
    fn test_normalize_repairs_trash_invariant() {
        let mut cta = Cta::new_draft(now());
        cta.status = CtaStatus::Trash;
        normalize_for_save(&mut cta, now());
        assert_trash_invariant(&cta);

        cta.status = CtaStatus::Draft;
        normalize_for_save(&mut cta, now());
        assert_trash_invariant(&cta);
    }
}
