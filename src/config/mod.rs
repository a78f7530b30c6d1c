//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RuleSet::compile (regex rules, all-or-nothing)
//!     → LoadedConfig (validated, immutable)
//!
//! On file change (--watch):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → new RuleSet swapped in atomically
//!     → failures keep the current rules
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError, LoadedConfig};
pub use schema::{
    CookiePathConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, ReplacementConfig,
    TimeoutConfig, UpstreamConfig,
};
pub use validation::ValidationError;
