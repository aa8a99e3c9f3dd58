//! Analytics retention settings
//!
//! The settings blob keeps its historical flat shape
//! (`retention`, `retention_custom_days`, `retention_previous_days`,
//! `retention_changed_at`, `retention_grace_until`). Reading goes through
//! [`RawAnalyticsSettings`], which is the one place malformed values are
//! normalized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::warn;

/// 保留类别不合法时使用的天数
pub const FALLBACK_RETENTION_DAYS: u32 = 7;

/// Retention category as chosen by the user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum RetentionCategory {
    #[strum(serialize = "1")]
    OneDay,
    #[default]
    #[strum(serialize = "7")]
    SevenDays,
    #[strum(serialize = "14")]
    FourteenDays,
    #[strum(serialize = "30")]
    ThirtyDays,
    #[strum(serialize = "60")]
    SixtyDays,
    #[strum(serialize = "90")]
    NinetyDays,
    #[strum(serialize = "180")]
    HalfYear,
    #[strum(serialize = "365")]
    OneYear,
    #[strum(serialize = "custom")]
    Custom,
    #[strum(serialize = "unlimited")]
    Unlimited,
}

impl RetentionCategory {
    /// Unknown input becomes the 7 day default.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed.parse().unwrap_or_else(|_| {
            warn!("Unknown retention category '{}', using default", trimmed);
            Self::default()
        })
    }

    /// 固定类别对应的天数；custom 返回 None，unlimited 返回 Some(0)
    pub fn fixed_days(self) -> Option<u32> {
        match self {
            Self::OneDay => Some(1),
            Self::SevenDays => Some(7),
            Self::FourteenDays => Some(14),
            Self::ThirtyDays => Some(30),
            Self::SixtyDays => Some(60),
            Self::NinetyDays => Some(90),
            Self::HalfYear => Some(180),
            Self::OneYear => Some(365),
            Self::Unlimited => Some(0),
            Self::Custom => None,
        }
    }
}

/// Edition in effect, limiting which categories may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RetentionTier {
    #[default]
    Basic,
    Extended,
}

impl RetentionTier {
    pub fn allows(self, category: RetentionCategory) -> bool {
        match self {
            Self::Extended => true,
            Self::Basic => matches!(
                category,
                RetentionCategory::OneDay
                    | RetentionCategory::SevenDays
                    | RetentionCategory::FourteenDays
                    | RetentionCategory::ThirtyDays
            ),
        }
    }

    pub fn allowed_categories(self) -> Vec<RetentionCategory> {
        RetentionCategory::iter().filter(|c| self.allows(*c)).collect()
    }
}

/// 收窄保留期后的宽限期状态，三个字段同时存在或同时缺失
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionGrace {
    /// Widest window in effect before the narrowing sequence
    pub previous_days: u32,
    /// First narrowing of the current sequence
    pub changed_at: DateTime<Utc>,
    /// `changed_at + previous_days`
    pub grace_until: DateTime<Utc>,
}

impl RetentionGrace {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.grace_until
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawAnalyticsSettings", into = "RawAnalyticsSettings")]
pub struct AnalyticsSettings {
    pub retention: RetentionCategory,
    /// Used only when `retention` is `Custom`
    pub retention_custom_days: Option<u32>,
    /// System-owned; user input never sets it directly
    pub grace: Option<RetentionGrace>,
}

impl AnalyticsSettings {
    pub fn new(retention: RetentionCategory) -> Self {
        Self {
            retention,
            retention_custom_days: None,
            grace: None,
        }
    }

    pub fn custom(days: u32) -> Self {
        Self {
            retention: RetentionCategory::Custom,
            retention_custom_days: Some(days),
            grace: None,
        }
    }

    /// Days implied by the category, ignoring tier limits. 0 means unlimited.
    ///
    /// A custom category without a positive day count is invalid and yields
    /// the fallback.
    pub fn configured_days(&self) -> u32 {
        match self.retention.fixed_days() {
            Some(days) => days,
            None => self
                .retention_custom_days
                .filter(|d| *d > 0)
                .unwrap_or(FALLBACK_RETENTION_DAYS),
        }
    }

    /// Whether the user-facing choice is the same, ignoring grace state.
    pub fn same_choice(&self, other: &Self) -> bool {
        if self.retention != other.retention {
            return false;
        }
        self.retention != RetentionCategory::Custom
            || self.retention_custom_days == other.retention_custom_days
    }

    pub fn is_mid_grace(&self, now: DateTime<Utc>) -> bool {
        self.grace.is_some_and(|g| g.is_active(now))
    }
}

/// 存储层的扁平形状，字段都可能缺失或格式错误
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAnalyticsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_custom_days: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_previous_days: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_changed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_grace_until: Option<String>,
}

fn lenient_days(value: Option<&serde_json::Value>) -> Option<u32> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(crate::utils::parse_datetime_lenient)
}

impl From<RawAnalyticsSettings> for AnalyticsSettings {
    fn from(raw: RawAnalyticsSettings) -> Self {
        let retention = raw
            .retention
            .as_deref()
            .map(RetentionCategory::normalize)
            .unwrap_or_default();
        let retention_custom_days = lenient_days(raw.retention_custom_days.as_ref());

        let mut settings = AnalyticsSettings {
            retention,
            retention_custom_days,
            grace: None,
        };

        let grace = match (
            lenient_days(raw.retention_previous_days.as_ref()),
            lenient_timestamp(raw.retention_changed_at.as_deref()),
            lenient_timestamp(raw.retention_grace_until.as_deref()),
        ) {
            (Some(previous_days), Some(changed_at), Some(grace_until)) => Some(RetentionGrace {
                previous_days,
                changed_at,
                grace_until,
            }),
            _ => None,
        };

        // 宽限期只在 previous_days 大于当前天数时有意义
        let current = settings.configured_days();
        settings.grace = grace.filter(|g| current > 0 && g.previous_days > current);
        settings
    }
}

impl From<AnalyticsSettings> for RawAnalyticsSettings {
    fn from(settings: AnalyticsSettings) -> Self {
        let custom_days = match settings.retention {
            RetentionCategory::Custom => settings.retention_custom_days,
            _ => None,
        };
        RawAnalyticsSettings {
            retention: Some(settings.retention.to_string()),
            retention_custom_days: custom_days.map(serde_json::Value::from),
            retention_previous_days: settings
                .grace
                .map(|g| serde_json::Value::from(g.previous_days)),
            retention_changed_at: settings.grace.map(|g| g.changed_at.to_rfc3339()),
            retention_grace_until: settings.grace.map(|g| g.grace_until.to_rfc3339()),
        }
    }
}
