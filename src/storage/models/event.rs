use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::utils::page_url_hash;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
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
pub enum EventType {
    Impression,
    Click,
    Close,
    Conversion,
    #[default]
    Other,
}

impl EventType {
    pub fn normalize(raw: &str) -> Self {
        super::cta::normalize_enum("event type", raw)
    }
}

/// 已写入的事件（只追加，不修改）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub cta_id: i64,
    pub event_type: EventType,
    pub occurred_at: DateTime<Utc>,
    pub page_url: Option<String>,
    pub page_url_hash: Option<String>,
    pub page_title: Option<String>,
    pub visitor_id: Option<i64>,
}

/// An event about to be recorded
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub cta_id: i64,
    pub event_type: EventType,
    pub occurred_at: DateTime<Utc>,
    pub page_url: Option<String>,
    pub page_url_hash: Option<String>,
    pub page_title: Option<String>,
    pub visitor_id: Option<i64>,
}

impl NewEvent {
    pub fn new(cta_id: i64, event_type: EventType, occurred_at: DateTime<Utc>) -> Self {
        Self {
            cta_id,
            event_type,
            occurred_at,
            page_url: None,
            page_url_hash: None,
            page_title: None,
            visitor_id: None,
        }
    }

    /// Attach the page the event happened on; blank URLs are ignored.
    pub fn with_page(mut self, url: &str, title: Option<&str>) -> Self {
        let url = url.trim();
        if url.is_empty() {
            return self;
        }
        self.page_url = Some(url.to_string());
        self.page_url_hash = Some(page_url_hash(url));
        self.page_title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_visitor(mut self, visitor_id: i64) -> Self {
        self.visitor_id = Some(visitor_id);
        self
    }
}

// ============================================================
// Aggregation rows returned by EventStore
// ============================================================

/// 单日计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// `(cta_id, event_type)` 分组计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtaEventCount {
    pub cta_id: i64,
    pub event_type: EventType,
    pub count: u64,
}

/// `(cta_id, page, event_type)` 分组计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEventCount {
    pub cta_id: i64,
    pub page_url_hash: String,
    pub page_url: String,
    pub page_title: Option<String>,
    pub event_type: EventType,
    pub count: u64,
}
