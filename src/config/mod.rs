//! Static configuration
//!
//! Loaded once at startup from an optional TOML file and `CTA__*` environment
//! variables, then passed explicitly to whatever needs it.

mod structs;

pub use structs::*;
