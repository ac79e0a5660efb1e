//! Configuration loading and schema definitions
//!
//! TOML file first, environment variables on top, validation last.

mod loader;
mod schema;

pub use loader::{apply_env_overrides, Config, CONFIG_CANDIDATES};
pub use schema::*;
