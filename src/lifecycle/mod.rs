//! CTA lifecycle engine
//!
//! Pure functions over a [`Cta`](crate::storage::models::Cta) and `now`:
//! phase derivation, status transitions and slug generation. Persistence
//! lives in [`CtaService`](crate::services::CtaService).

mod input;
mod phase;
pub mod slug;
mod transition;

pub use input::CtaInput;
pub use phase::{Phase, compute_effective_phase, is_starting_soon};
pub use slug::{disambiguate_slug, sanitize_slug};
pub use transition::{TransitionOutcome, archive, clear_schedule, normalize_for_save, restore, trash};
