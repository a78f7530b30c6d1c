//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rewrite, http, config
//!     → tracing macros (structured fields)
//!     → logging.rs (EnvFilter + fmt or JSON layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Per-cookie detail only at trace level

pub mod logging;
