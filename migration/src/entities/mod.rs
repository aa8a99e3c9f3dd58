pub mod app_setting;
pub mod cta;
pub mod cta_event;

pub use app_setting::Entity as AppSettingEntity;
pub use cta::Entity as CtaEntity;
pub use cta_event::Entity as CtaEventEntity;
