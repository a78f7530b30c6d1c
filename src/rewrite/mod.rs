//! Cookie path rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Rule compilation (at startup / reload):
//!     ReplacementConfig[]
//!     → rule.rs (anchor & compile regexes, declaration order)
//!     → RuleSet (immutable, shared via Arc)
//!
//! Per response:
//!     Set-Cookie header values
//!     → set_cookie.rs (parse, drop malformed)
//!     → RuleSet::rewrite_path (pipeline over every rule)
//!     → set_cookie.rs (re-serialize in original order)
//! ```
//!
//! # Design Decisions
//! - Only the Path attribute is ever changed
//! - Every matching rule applies in turn; the last match decides the path
//! - Malformed cookies are dropped rather than surfaced as errors

pub mod rule;
pub mod set_cookie;

pub use rule::{CompiledRule, PatternField, RuleError, RuleSet};
pub use set_cookie::RewriteSummary;
