use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::warn;
use uuid::Uuid;

use super::sections::{CtaBehavior, CtaContent, CtaStyle};

/// 持久化的 CTA 状态
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CtaStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
    Archived,
    Trash,
}

/// 何时展示 CTA
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetingMode {
    #[default]
    Always,
    /// 仅在 schedule_start..=schedule_end 之间展示
    DateRange,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CtaType {
    #[default]
    Popup,
    Banner,
    Inline,
    SlideIn,
}

/// Parse an externally supplied enum value, falling back to the default.
///
/// This is the single place where untrusted strings become closed enums;
/// internal code never constructs these from strings.
pub(crate) fn normalize_enum<T>(field: &str, raw: &str) -> T
where
    T: std::str::FromStr + Default,
{
    let trimmed = raw.trim();
    match trimmed.parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            if !trimmed.is_empty() {
                warn!("Unknown {} value '{}', using default", field, trimmed);
            }
            T::default()
        }
    }
}

impl CtaStatus {
    pub fn normalize(raw: &str) -> Self {
        normalize_enum("status", raw)
    }

    /// 这些状态下排期字段没有意义
    pub fn clears_schedule(self) -> bool {
        matches!(self, Self::Draft | Self::Archived | Self::Trash)
    }
}

impl TargetingMode {
    pub fn normalize(raw: &str) -> Self {
        normalize_enum("targeting", raw)
    }
}

impl CtaType {
    pub fn normalize(raw: &str) -> Self {
        normalize_enum("cta type", raw)
    }
}

/// A promotional call-to-action record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cta {
    /// 0 until the store assigns one
    pub id: i64,
    pub uuid: Uuid,
    pub slug: String,
    pub title: String,
    pub name: String,
    pub status: CtaStatus,
    pub targeting: TargetingMode,
    pub cta_type: CtaType,
    pub content: CtaContent,
    pub style: CtaStyle,
    pub behavior: CtaBehavior,
    pub schedule_start: Option<NaiveDate>,
    pub schedule_end: Option<NaiveDate>,
    pub is_enabled: bool,
    pub is_demo: bool,
    pub trashed_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub first_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cta {
    /// 新建 CTA 的默认值：草稿、启用、非演示
    pub fn new_draft(now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            uuid: Uuid::new_v4(),
            slug: String::new(),
            title: String::new(),
            name: String::new(),
            status: CtaStatus::Draft,
            targeting: TargetingMode::Always,
            cta_type: CtaType::Popup,
            content: CtaContent::default(),
            style: CtaStyle::default(),
            behavior: CtaBehavior::default(),
            schedule_start: None,
            schedule_end: None,
            is_enabled: true,
            is_demo: false,
            trashed_at: None,
            published_at: None,
            first_active_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Text the slug is derived from: the title, or the internal name when
    /// the title is blank.
    pub fn slug_source(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_values() {
        assert_eq!(CtaStatus::normalize("published"), CtaStatus::Published);
        assert_eq!(CtaStatus::normalize(" Trash "), CtaStatus::Trash);
        assert_eq!(TargetingMode::normalize("date_range"), TargetingMode::DateRange);
        assert_eq!(CtaType::normalize("slide_in"), CtaType::SlideIn);
    }

    #[test]
    fn test_normalize_unknown_values_fall_back() {
        assert_eq!(CtaStatus::normalize("pending"), CtaStatus::Draft);
        assert_eq!(CtaStatus::normalize(""), CtaStatus::Draft);
        assert_eq!(TargetingMode::normalize("geo"), TargetingMode::Always);
        assert_eq!(CtaType::normalize("modal"), CtaType::Popup);
    }

    #[test]
    fn test_status_string_forms() {
        assert_eq!(CtaStatus::Scheduled.as_ref(), "scheduled");
        assert_eq!(TargetingMode::DateRange.to_string(), "date_range");
    }

    #[test]
    fn test_slug_source_falls_back_to_name() {
        let mut cta = Cta::new_draft(Utc::now());
        cta.name = "Spring promo".into();
        assert_eq!(cta.slug_source(), "Spring promo");
        cta.title = "Spring Sale".into();
        assert_eq!(cta.slug_source(), "Spring Sale");
    }
}
