//! 时间窗口工具
//!
//! 纯函数：日期差、午夜换算、窗口截断以及宽松的日期解析。
//! 所有时间均按 UTC 处理；CTA 排期是日期精度（`NaiveDate`）。

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// 闭区间时间窗口 `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `[now - days, now]`
    pub fn last_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: days_ago(now, days),
            end: now,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// 两个日期相差的天数（`to - from`，可为负）
pub fn day_diff(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// 两个时间点之间完整的天数（向下取整）
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}

/// `now` 往前推 `days` 天
pub fn days_ago(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

/// 日期当天 00:00:00 UTC
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// 次日 00:00:00 UTC，作为当天的排他上界
pub fn start_of_next_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1)
}

/// 截断窗口：`start` 不早于 `floor`；截断后 `start > end` 时令 `end = start`
pub fn clamp_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    floor: Option<DateTime<Utc>>,
) -> TimeWindow {
    let start = match floor {
        Some(floor) if start < floor => floor,
        _ => start,
    };
    let end = if start > end { start } else { end };
    TimeWindow { start, end }
}

/// 宽松解析日期，支持 YYYY-MM-DD 与 RFC3339（取日期部分）
///
/// 空串或格式错误返回 `None`，调用方把它当作“未设置”处理。
pub fn parse_date_lenient(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

/// 宽松解析时间点，支持 RFC3339 与 YYYY-MM-DD（当天零点）
pub fn parse_datetime_lenient(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .map(start_of_day)
        })
}
