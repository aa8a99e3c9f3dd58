use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::storage::models::{Cta, CtaStatus};
use crate::utils::{start_of_day, start_of_next_day};

/// Presentation-facing lifecycle label, derived from status, schedule and `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Draft,
    Upcoming,
    Live,
    Expired,
    Archived,
    Trashed,
}

/// 计算 CTA 当前的展示阶段
///
/// 排期以 UTC 日期为单位：开始于 `schedule_start` 当天零点，
/// `schedule_end` 当天整天仍算在窗口内。
pub fn compute_effective_phase(cta: &Cta, now: DateTime<Utc>) -> Phase {
    match cta.status {
        CtaStatus::Trash => Phase::Trashed,
        CtaStatus::Archived => Phase::Archived,
        CtaStatus::Draft => Phase::Draft,
        CtaStatus::Scheduled => Phase::Upcoming,
        CtaStatus::Published => {
            if let Some(start) = cta.schedule_start
                && now < start_of_day(start)
            {
                return Phase::Upcoming;
            }
            if let Some(end) = cta.schedule_end
                && now >= start_of_next_day(end)
            {
                return Phase::Expired;
            }
            Phase::Live
        }
    }
}

/// Upcoming and within 24 hours of its start. Presentation hint only.
pub fn is_starting_soon(cta: &Cta, now: DateTime<Utc>) -> bool {
    if compute_effective_phase(cta, now) != Phase::Upcoming {
        return false;
    }
    cta.schedule_start
        .is_some_and(|start| now >= start_of_day(start) - Duration::hours(24))
}
