//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (cookie path rewriting, timeout, tracing)
//! - Forward every request unchanged to the single upstream
//! - Apply rule reloads without restarting

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{LoadedConfig, ProxyConfig};
use crate::http::cookie_path::{CookiePathLayer, SharedRules};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
}

/// HTTP server hosting the cookie path filter.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    rules: SharedRules,
}

impl HttpServer {
    /// Create a new HTTP server from a loaded configuration.
    pub fn new(loaded: LoadedConfig) -> Result<Self, InvalidUri> {
        let LoadedConfig { config, rules } = loaded;
        let upstream = Authority::from_str(&config.upstream.address)?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = AppState { client, upstream };

        let rules: SharedRules = Arc::new(ArcSwap::from_pointee(rules));
        let router = Self::build_router(&config, state, rules.clone());

        Ok(Self {
            router,
            config,
            rules,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState, rules: SharedRules) -> Router {
        Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state)
            .layer(CookiePathLayer::from_shared(rules))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `updates` replace the active rule set.
    /// Listener and upstream changes only take effect after a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        mut updates: mpsc::UnboundedReceiver<LoadedConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            rules = self.rules.load().len(),
            "HTTP server starting"
        );

        let rules = self.rules.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = updates.recv() => match update {
                        Some(loaded) => {
                            tracing::info!(rules = loaded.rules.len(), "Cookie path rules reloaded");
                            rules.store(Arc::new(loaded.rules));
                        }
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward the request unchanged to the upstream.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, "Could not build upstream URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };

    tracing::debug!(method = %parts.method, uri = %parts.uri, "Forwarding request");

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %state.upstream, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
