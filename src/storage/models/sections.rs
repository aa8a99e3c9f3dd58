//! CTA 内容 / 样式 / 行为分区
//!
//! 每个分区在数据库里存成一段 JSON。读取时与默认值合并：缺失的键、
//! 未知的键以及类型不对的值都会回落到默认值，不会让整条记录读失败。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaContent {
    pub headline: String,
    pub body: String,
    pub button_text: String,
    pub button_url: Option<String>,
}

impl Default for CtaContent {
    fn default() -> Self {
        Self {
            headline: String::new(),
            body: String::new(),
            button_text: "Learn more".to_string(),
            button_url: None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Layout {
    #[default]
    Centered,
    Left,
    Right,
    Fullscreen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaStyle {
    pub layout: Layout,
    pub background_color: String,
    pub text_color: String,
    pub button_color: String,
}

impl Default for CtaStyle {
    fn default() -> Self {
        Self {
            layout: Layout::Centered,
            background_color: "#ffffff".to_string(),
            text_color: "#1f2937".to_string(),
            button_color: "#2563eb".to_string(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Trigger {
    #[default]
    PageLoad,
    Delay,
    Scroll,
    ExitIntent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaBehavior {
    pub trigger: Trigger,
    /// Only used by `Trigger::Delay`
    pub delay_seconds: u32,
    /// Only used by `Trigger::Scroll`
    pub scroll_percent: u8,
    /// 每个访客最多展示次数，None 表示不限
    pub max_impressions_per_visitor: Option<u32>,
}

impl Default for CtaBehavior {
    fn default() -> Self {
        Self {
            trigger: Trigger::PageLoad,
            delay_seconds: 0,
            scroll_percent: 50,
            max_impressions_per_visitor: None,
        }
    }
}

impl Layout {
    pub fn normalize(raw: &str) -> Self {
        super::cta::normalize_enum("layout", raw)
    }
}

impl Trigger {
    pub fn normalize(raw: &str) -> Self {
        super::cta::normalize_enum("trigger", raw)
    }
}

/// Parse a stored section blob, filling every missing or invalid key from
/// `T::default()`.
pub fn merge_with_defaults<T>(raw: &str) -> T
where
    T: Default + Clone + Serialize + DeserializeOwned,
{
    match serde_json::from_str::<Value>(raw) {
        Ok(stored) => merge_onto(&T::default(), &stored),
        Err(_) => T::default(),
    }
}

/// Overlay the keys of `patch` onto `base` one at a time
///
/// Keys `base` does not know are ignored. A key whose value would make the
/// section fail to deserialize (wrong type, unknown enum variant) keeps the
/// base value instead.
pub fn merge_onto<T>(base: &T, patch: &Value) -> T
where
    T: Clone + Serialize + DeserializeOwned,
{
    let Ok(Value::Object(mut merged)) = serde_json::to_value(base) else {
        return base.clone();
    };
    let Value::Object(patch) = patch else {
        return base.clone();
    };

    for (key, value) in patch {
        let Some(previous) = merged.get(key).cloned() else {
            continue;
        };
        merged.insert(key.clone(), value.clone());
        if decode::<T>(&merged).is_none() {
            merged.insert(key.clone(), previous);
        }
    }

    decode(&merged).unwrap_or_else(|| base.clone())
}

fn decode<T: DeserializeOwned>(map: &Map<String, Value>) -> Option<T> {
    serde_json::from_value(Value::Object(map.clone())).ok()
}
