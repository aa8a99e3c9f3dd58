use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Nested rollup of the events in one window
///
/// All maps are ordered, so two snapshots over the same events serialize
/// identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub total_clicks: u64,
    pub last_click: Option<DateTime<Utc>>,
    pub clicks_by_date: BTreeMap<NaiveDate, u64>,
    pub ctas: BTreeMap<i64, CtaRollup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CtaRollup {
    /// Empty when the CTA no longer exists
    pub title: String,
    pub clicks: u64,
    pub impressions: u64,
    /// Keyed by page URL hash
    pub pages: BTreeMap<String, PageRollup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageRollup {
    pub url: String,
    pub title: String,
    pub clicks: u64,
    pub impressions: u64,
}

impl Snapshot {
    pub fn total_impressions(&self) -> u64 {
        self.ctas.values().map(|c| c.impressions).sum()
    }
}
