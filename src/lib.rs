//! Cookie path rewriting filter for HTTP responses.
//!
//! Rewrites the `Path` attribute of outgoing `Set-Cookie` headers using
//! anchored regex rules with `{{group}}` substitution. The filter is a tower
//! layer, so it drops into any axum or hyper service stack:
//!
//! ```no_run
//! use cookie_path_rewrite::{CookiePathLayer, ReplacementConfig, RuleSet};
//!
//! let rules = RuleSet::compile(&[ReplacementConfig {
//!     name_regex: None,
//!     original: "/(?P<app>[^/]+)".into(),
//!     replacement: "/apps/{{app}}".into(),
//! }])?;
//! let layer = CookiePathLayer::new(rules);
//! # let _ = layer;
//! # Ok::<(), cookie_path_rewrite::RuleError>(())
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::{LoadedConfig, ProxyConfig, ReplacementConfig};
pub use http::{CookiePathLayer, CookiePathService, HttpServer, SharedRules};
pub use lifecycle::Shutdown;
pub use rewrite::{RewriteSummary, RuleError, RuleSet};
