//! Service layer for business logic
//!
//! Services own their store dependencies (constructor injection) and are
//! shared by the CLI and any embedding application.

mod cta_service;

pub use cta_service::CtaService;
