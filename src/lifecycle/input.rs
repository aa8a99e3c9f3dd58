//! External CTA input
//!
//! Everything arrives as loose strings/JSON; [`CtaInput::apply_to`] is the
//! boundary where it becomes typed. Omitted fields keep their current value.

use serde::Deserialize;
use serde_json::Value;

use crate::storage::models::{Cta, CtaStatus, CtaType, TargetingMode, merge_onto};
use crate::utils::parse_date_lenient;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CtaInput {
    pub title: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub targeting: Option<String>,
    pub cta_type: Option<String>,
    /// YYYY-MM-DD; empty or malformed clears the bound
    pub schedule_start: Option<String>,
    pub schedule_end: Option<String>,
    pub is_enabled: Option<bool>,
    pub is_demo: Option<bool>,
    pub content: Option<Value>,
    pub style: Option<Value>,
    pub behavior: Option<Value>,
}

impl CtaInput {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    /// Normalized status the caller asked for, if any
    pub fn requested_status(&self) -> Option<CtaStatus> {
        self.status.as_deref().map(CtaStatus::normalize)
    }

    fn supplies_schedule(&self) -> bool {
        [&self.schedule_start, &self.schedule_end]
            .into_iter()
            .flatten()
            .any(|raw| parse_date_lenient(raw).is_some())
    }

    /// Merge the supplied fields into `cta`
    ///
    /// A valid schedule date on a scheduled or published CTA implies
    /// date-range targeting when the input names no targeting mode.
    ///
    /// Section JSON is overlaid key by key onto the current section, so a
    /// partial `{"headline": "…"}` keeps the other content fields.
    pub fn apply_to(&self, cta: &mut Cta) {
        if let Some(title) = &self.title {
            cta.title = title.trim().to_string();
        }
        if let Some(name) = &self.name {
            cta.name = name.trim().to_string();
        }
        if let Some(status) = self.requested_status() {
            cta.status = status;
        }
        if let Some(targeting) = &self.targeting {
            cta.targeting = TargetingMode::normalize(targeting);
        }
        if let Some(cta_type) = &self.cta_type {
            cta.cta_type = CtaType::normalize(cta_type);
        }
        if let Some(start) = &self.schedule_start {
            cta.schedule_start = parse_date_lenient(start);
        }
        if let Some(end) = &self.schedule_end {
            cta.schedule_end = parse_date_lenient(end);
        }
        // 未指定 targeting 但给了有效日期且状态可排期，按日期范围处理
        if self.targeting.is_none() && self.supplies_schedule() && !cta.status.clears_schedule() {
            cta.targeting = TargetingMode::DateRange;
        }
        if let Some(enabled) = self.is_enabled {
            cta.is_enabled = enabled;
        }
        if let Some(demo) = self.is_demo {
            cta.is_demo = demo;
        }
        if let Some(content) = &self.content {
            cta.content = merge_onto(&cta.content, content);
        }
        if let Some(style) = &self.style {
            cta.style = merge_onto(&cta.style, style);
        }
        if let Some(behavior) = &self.behavior {
            cta.behavior = merge_onto(&cta.behavior, behavior);
        }
    }
}
