//! Dashboard highlights derived from a snapshot

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Rollup of the 7 day window
    pub snapshot: Snapshot,
    pub clicks_7d: u64,
    pub impressions_7d: u64,
    pub click_through_rate_7d: f64,
    pub clicks_14d: u64,
    pub impressions_14d: u64,
    pub clicks_30d: u64,
    pub impressions_30d: u64,
    pub top_page: Option<TopPage>,
    pub most_impressed: Option<CtaHighlight>,
    pub most_clicked: Option<CtaHighlight>,
    pub best_ctr: Option<CtaRate>,
    pub unique_impression_visitors: u64,
    pub unique_click_visitors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPage {
    pub cta_id: i64,
    pub url: String,
    pub title: String,
    pub clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CtaHighlight {
    pub cta_id: i64,
    pub title: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaRate {
    pub cta_id: i64,
    pub title: String,
    pub clicks: u64,
    pub impressions: u64,
    pub rate: f64,
}

/// clicks / impressions, 0 when there were no impressions
pub fn rate(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        0.0
    } else {
        clicks as f64 / impressions as f64
    }
}

// 以下函数在并列时保留先出现的一项（按 cta_id 升序，页面按哈希升序）

/// Page with the most clicks across all CTAs
pub fn top_page(snapshot: &Snapshot) -> Option<TopPage> {
    let mut best: Option<TopPage> = None;
    for (cta_id, cta) in &snapshot.ctas {
        for page in cta.pages.values() {
            if page.clicks > best.as_ref().map_or(0, |b| b.clicks) {
                best = Some(TopPage {
                    cta_id: *cta_id,
                    url: page.url.clone(),
                    title: page.title.clone(),
                    clicks: page.clicks,
                });
            }
        }
    }
    best
}

fn most_by(snapshot: &Snapshot, metric: impl Fn(u64, u64) -> u64) -> Option<CtaHighlight> {
    let mut best: Option<CtaHighlight> = None;
    for (cta_id, cta) in &snapshot.ctas {
        let count = metric(cta.clicks, cta.impressions);
        if count > best.as_ref().map_or(0, |b| b.count) {
            best = Some(CtaHighlight {
                cta_id: *cta_id,
                title: cta.title.clone(),
                count,
            });
        }
    }
    best
}

pub fn most_impressed(snapshot: &Snapshot) -> Option<CtaHighlight> {
    most_by(snapshot, |_, impressions| impressions)
}

pub fn most_clicked(snapshot: &Snapshot) -> Option<CtaHighlight> {
    most_by(snapshot, |clicks, _| clicks)
}

/// Highest click-through rate among CTAs with at least one impression
pub fn best_ctr(snapshot: &Snapshot) -> Option<CtaRate> {
    let mut best: Option<CtaRate> = None;
    for (cta_id, cta) in &snapshot.ctas {
        if cta.impressions == 0 {
            continue;
        }
        let r = rate(cta.clicks, cta.impressions);
        if best.as_ref().is_none_or(|b| r > b.rate) {
            best = Some(CtaRate {
                cta_id: *cta_id,
                title: cta.title.clone(),
                clicks: cta.clicks,
                impressions: cta.impressions,
                rate: r,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::snapshot::{CtaRollup, PageRollup};

    fn rollup(title: &str, clicks: u64, impressions: u64) -> CtaRollup {
        CtaRollup {
            title: title.to_string(),
            clicks,
            impressions,
            ..CtaRollup::default()
        }
    }

    fn snapshot(rows: Vec<(i64, CtaRollup)>) -> Snapshot {
        Snapshot {
            ctas: rows.into_iter().collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_rate() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 4), 0.25);
    }

    #[test]
    fn test_best_ctr_tie_keeps_first_seen() {
        let s = snapshot(vec![
            (2, rollup("b", 1, 2)),
            (5, rollup("e", 2, 4)),
            (9, rollup("i", 0, 10)),
        ]);
        let best = best_ctr(&s).unwrap();
        assert_eq!(best.cta_id, 2);
        assert_eq!(best.rate, 0.5);
    }

    #[test]
    fn test_best_ctr_skips_ctas_without_impressions() {
        let s = snapshot(vec![(1, rollup("a", 3, 0)), (2, rollup("b", 1, 10))]);
        assert_eq!(best_ctr(&s).unwrap().cta_id, 2);
        assert!(best_ctr(&snapshot(vec![(1, rollup("a", 3, 0))])).is_none());
    }

    #[test]
    fn test_most_clicked_and_impressed() {
        let s = snapshot(vec![
            (1, rollup("a", 5, 100)),
            (2, rollup("b", 9, 50)),
            (3, rollup("c", 9, 100)),
        ]);
        assert_eq!(most_clicked(&s).unwrap().cta_id, 2);
        assert_eq!(most_impressed(&s).unwrap().cta_id, 1);
    }

    #[test]
    fn test_highlights_need_nonzero_counts() {
        let s = snapshot(vec![(1, rollup("a", 0, 0))]);
        assert!(most_clicked(&s).is_none());
        assert!(most_impressed(&s).is_none());
        assert!(top_page(&s).is_none());
    }

    #[test]
    fn test_top_page_across_ctas() {
        let mut a = rollup("a", 3, 0);
        a.pages.insert(
            "h1".into(),
            PageRollup {
                url: "https://example.com/a".into(),
                title: "A".into(),
                clicks: 3,
                impressions: 0,
            },
        );
        let mut b = rollup("b", 7, 0);
        b.pages.insert(
            "h2".into(),
            PageRollup {
                url: "https://example.com/b".into(),
                title: "B".into(),
                clicks: 7,
                impressions: 0,
            },
        );
        let top = top_page(&snapshot(vec![(1, a), (2, b)])).unwrap();
        assert_eq!(top.cta_id, 2);
        assert_eq!(top.url, "https://example.com/b");
        assert_eq!(top.clicks, 7);
    }
}
