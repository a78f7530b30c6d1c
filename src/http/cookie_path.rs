//! Cookie path rewriting middleware.
//!
//! # Responsibilities
//! - Wrap the next service in the chain transparently
//! - Rewrite `Set-Cookie` paths once the response head is complete
//! - Leave status, other headers and the streaming body untouched
//!
//! # Design Decisions
//! - The inner response future resolving is the header-flush point: headers
//!   are final but nothing has been written to the client yet
//! - Rules are loaded once per response from a shared `ArcSwap`, so a reload
//!   never affects a response mid-rewrite

use std::sync::Arc;
use std::task::{Context, Poll};

use arc_swap::ArcSwap;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::rewrite::RuleSet;

/// Hot-swappable handle to the active rule set.
pub type SharedRules = Arc<ArcSwap<RuleSet>>;

/// Layer that applies [`CookiePathService`] to the wrapped service.
#[derive(Clone, Debug)]
pub struct CookiePathLayer {
    rules: SharedRules,
}

impl CookiePathLayer {
    /// Create a layer with a fixed rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self::from_shared(Arc::new(ArcSwap::from_pointee(rules)))
    }

    /// Create a layer reading rules from a handle that may be swapped later.
    pub fn from_shared(rules: SharedRules) -> Self {
        Self { rules }
    }

    /// The handle this layer reads rules from.
    pub fn shared_rules(&self) -> SharedRules {
        self.rules.clone()
    }
}

impl<S> Layer<S> for CookiePathLayer {
    type Service = CookiePathService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CookiePathService {
            inner,
            rules: self.rules.clone(),
        }
    }
}

/// Service that rewrites `Set-Cookie` paths on responses from `S`.
#[derive(Clone, Debug)]
pub struct CookiePathService<S> {
    inner: S,
    rules: SharedRules,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CookiePathService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let rules = self.rules.clone();
        let response = self.inner.call(request);

        Box::pin(async move {
            let mut response = response.await?;

            let summary = rules.load().rewrite_set_cookies(response.headers_mut());
            if summary.seen > 0 {
                tracing::debug!(
                    status = %response.status(),
                    seen = summary.seen,
                    rewritten = summary.rewritten,
                    dropped = summary.dropped,
                    "Rewrote Set-Cookie headers"
                );
            }

            Ok(response)
        })
    }
}
