//! # quill-config
//!
//! TOML-backed configuration for the Quill assistant core. Every section
//! carries serde defaults so a missing or partial `quill.toml` still yields
//! a working config.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    BrainConfig, LoggingConfig, QuillConfig, ResearchConfig, SchedulerConfig, ServicesConfig,
};
