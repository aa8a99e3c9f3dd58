//! Domain records shared by the stores and engines

mod cta;
mod event;
mod sections;

pub use cta::{Cta, CtaStatus, CtaType, TargetingMode};
pub use event::{CtaEventCount, DailyCount, Event, EventType, NewEvent, PageEventCount};
pub use sections::{
    CtaBehavior, CtaContent, CtaStyle, Layout, Trigger, merge_onto, merge_with_defaults,
};
