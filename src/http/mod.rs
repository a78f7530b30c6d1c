//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, timeout)
//!     → forward to upstream (unchanged request)
//!     → cookie_path.rs (rewrite Set-Cookie paths on the response head)
//!     → Send to client
//! ```

pub mod cookie_path;
pub mod server;

pub use cookie_path::{CookiePathLayer, CookiePathService, SharedRules};
pub use server::HttpServer;
