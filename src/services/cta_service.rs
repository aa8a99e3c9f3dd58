//! CTA management service
//!
//! Loads a CTA from the store, runs the lifecycle engine over it and writes
//! the result back. `now` is always passed in by the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::errors::{CtaError, Result};
use crate::lifecycle::{self, CtaInput, Phase, TransitionOutcome};
use crate::storage::CtaStore;
use crate::storage::models::{Cta, CtaStatus};

pub struct CtaService {
    store: Arc<dyn CtaStore>,
}

impl CtaService {
    pub fn new(store: Arc<dyn CtaStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Cta>> {
        self.store.get_cta(id).await
    }

    /// Create a CTA with defaults applied and return its id
    pub async fn create(&self, input: &CtaInput, now: DateTime<Utc>) -> Result<i64> {
        let mut cta = Cta::new_draft(now);
        input.apply_to(&mut cta);

        if cta.title.is_empty() && cta.name.is_empty() {
            return Err(CtaError::validation("A CTA needs a title or a name"));
        }

        // 演示 CTA 不能进入回收站或归档
        if cta.is_demo && matches!(cta.status, CtaStatus::Trash | CtaStatus::Archived) {
            warn!(
                "Demo CTA cannot be created as {}, using draft",
                cta.status
            );
            cta.status = CtaStatus::Draft;
        }

        lifecycle::normalize_for_save(&mut cta, now);
        cta.slug = self.unique_slug(cta.slug_source(), None).await?;

        let id = self.store.insert_cta(&cta).await?;
        info!(
            "CtaService: created CTA {} '{}' ({})",
            id, cta.slug, cta.status
        );
        Ok(id)
    }

    /// Merge `input` into an existing CTA
    ///
    /// Moving a demo CTA to trash or archive is refused with
    /// `DemoProtected` and nothing is written.
    pub async fn update(
        &self,
        id: i64,
        input: &CtaInput,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        let Some(mut cta) = self.store.get_cta(id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };

        let previous_title = cta.title.clone();
        let previous_name = cta.name.clone();
        input.apply_to(&mut cta);

        if cta.is_demo && matches!(cta.status, CtaStatus::Trash | CtaStatus::Archived) {
            return Ok(TransitionOutcome::DemoProtected);
        }
        if cta.title.is_empty() && cta.name.is_empty() {
            return Err(CtaError::validation("A CTA needs a title or a name"));
        }

        let title_changed = cta.title != previous_title;
        let name_changed = cta.name != previous_name && cta.title.is_empty();
        if title_changed || name_changed {
            let slug = self.unique_slug(cta.slug_source(), Some(id)).await?;
            if slug != cta.slug {
                debug!("CtaService: slug of CTA {} '{}' -> '{}'", id, cta.slug, slug);
                cta.slug = slug;
            }
        }

        lifecycle::normalize_for_save(&mut cta, now);
        cta.updated_at = now;

        if !self.store.save_cta(&cta).await? {
            return Ok(TransitionOutcome::NotFound);
        }
        info!("CtaService: updated CTA {} ({})", id, cta.status);
        Ok(TransitionOutcome::Applied)
    }

    pub async fn trash(&self, id: i64, now: DateTime<Utc>) -> Result<TransitionOutcome> {
        self.transition(id, now, "trashed", |cta| lifecycle::trash(cta, now))
            .await
    }

    pub async fn archive(&self, id: i64, now: DateTime<Utc>) -> Result<TransitionOutcome> {
        self.transition(id, now, "archived", lifecycle::archive)
            .await
    }

    /// Restore from trash into `target`; `target = Trash` is a validation error
    pub async fn restore(
        &self,
        id: i64,
        target: CtaStatus,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        if target == CtaStatus::Trash {
            return Err(CtaError::validation("Cannot restore a CTA into the trash"));
        }
        let Some(mut cta) = self.store.get_cta(id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };

        let outcome = lifecycle::restore(&mut cta, target, now)?;
        if outcome.is_applied() {
            cta.updated_at = now;
            self.store.save_cta(&cta).await?;
            info!("CtaService: restored CTA {} as {}", id, target);
        }
        Ok(outcome)
    }

    /// Hard delete, allowed for every CTA including demos
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self.store.delete_cta(id).await?;
        if deleted {
            info!("CtaService: deleted CTA {}", id);
        }
        Ok(deleted)
    }

    pub async fn get_effective_phase(&self, id: i64, now: DateTime<Utc>) -> Result<Option<Phase>> {
        let cta = self.store.get_cta(id).await?;
        Ok(cta.map(|c| lifecycle::compute_effective_phase(&c, now)))
    }

    /// Promote scheduled CTAs whose start date has arrived
    ///
    /// Meant to be called by an external scheduler. Returns the number of
    /// CTAs published.
    pub async fn publish_due(&self, now: DateTime<Utc>) -> Result<u64> {
        let due = self.store.scheduled_due(now.date_naive()).await?;
        let mut published = 0u64;

        for mut cta in due {
            cta.status = CtaStatus::Published;
            lifecycle::normalize_for_save(&mut cta, now);
            cta.updated_at = now;
            if self.store.save_cta(&cta).await? {
                published += 1;
                debug!("CtaService: published scheduled CTA {}", cta.id);
            }
        }

        if published > 0 {
            info!("CtaService: published {} scheduled CTAs", published);
        }
        Ok(published)
    }

    /// CTAs counted toward limits (demos and trash excluded)
    pub async fn count_countable(&self) -> Result<u64> {
        self.store.count_countable().await
    }

    async fn transition<F>(
        &self,
        id: i64,
        now: DateTime<Utc>,
        action: &str,
        apply: F,
    ) -> Result<TransitionOutcome>
    where
        F: FnOnce(&mut Cta) -> TransitionOutcome + Send,
    {
        let Some(mut cta) = self.store.get_cta(id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };

        let outcome = apply(&mut cta);
        match outcome {
            TransitionOutcome::Applied => {
                cta.updated_at = now;
                self.store.save_cta(&cta).await?;
                info!("CtaService: {} CTA {}", action, id);
            }
            TransitionOutcome::DemoProtected => {
                debug!("CtaService: CTA {} is a demo, not {}", id, action);
            }
            _ => {}
        }
        Ok(outcome)
    }

    async fn unique_slug(&self, source: &str, exclude_id: Option<i64>) -> Result<String> {
        let base = lifecycle::sanitize_slug(source);
        let taken = self.store.slugs_with_base(&base, exclude_id).await?;
        Ok(lifecycle::disambiguate_slug(&base, &taken))
    }
}
