//! Shared types, error model, and configuration for SalesIntel.
//!
//! This crate is the foundation depended on by all other SalesIntel crates.
//! It provides:
//! - [`SalesIntelError`]: the unified error type
//! - Domain types ([`Identity`], [`Report`], [`Contact`], [`OutreachDraft`])
//! - Configuration ([`AppConfig`], config loading)
//! - The [`TextGenerator`] capability

pub mod config;
pub mod error;
pub mod generation;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GeminiConfig, StagesConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, SalesIntelError};
pub use generation::{GenerationRequest, TextGenerator};
pub use types::{
    CompanyProfile, Contact, Identity, OutreachDraft, Report, ReportSections, ReportStatus,
    SessionId, display_name,
};
