//! HTTP host for the framework (front controller).
//!
//! # Responsibilities
//! - Create Axum Router that sends every path to the dispatcher
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run each dispatch on a blocking thread with its own `Worker`
//! - Route uncaught errors through the top-level handler
//! - Turn the committed header set and body into an HTTP response

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Method, Uri},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::error::{handle_uncaught, Error};
use crate::framework::Framework;
use crate::http::headers::HeaderSet;
use crate::request::Worker;
use crate::routing::url;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub framework: Arc<Framework>,
}

/// HTTP server hosting one framework.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(framework: Arc<Framework>, config: ServerConfig) -> Self {
        let router = Self::build_router(&config, AppState { framework });
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(front_controller))
            .route("/{*path}", any(front_controller))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Dispatch one inbound request. Blocking; runs on its own worker.
pub fn serve(framework: Arc<Framework>, method: Method, path: &str) -> (HeaderSet, String) {
    let worker = Worker::new(framework);
    let mut headers = HeaderSet::new();
    let inbound = url::strip_base(worker.framework(), path);

    let result = worker.request(inbound).and_then(|request| {
        let mut request = request.with_method(method);
        request.dispatch(&mut headers)
    });

    let body = match result {
        Ok(body) => body,
        Err(err) => handle_uncaught(worker.framework(), err, &mut headers),
    };
    headers.commit();
    (headers, body)
}

async fn front_controller(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let path = uri.path().to_string();
    tracing::debug!(method = %method, path = %path, "Dispatching request");

    let framework = state.framework.clone();
    let blocking_path = path.clone();
    let joined = tokio::task::spawn_blocking(move || serve(framework, method, &blocking_path)).await;

    let (headers, body) = match joined {
        Ok(served) => served,
        Err(join_err) => {
            tracing::error!(path = %path, error = %join_err, "Dispatch task failed");
            let mut headers = HeaderSet::new();
            let err = Error::programmer(format!("Dispatch of '{}' did not complete", path))
                .caused_by(Error::environment(join_err.to_string()));
            let body = handle_uncaught(&state.framework, err, &mut headers);
            headers.commit();
            (headers, body)
        }
    };

    to_response(&headers, body)
}

/// Build the HTTP response for a committed header set.
pub fn to_response(headers: &HeaderSet, body: String) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = headers.status_code();

    for (name, value) in headers.fields() {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().append(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::{Header, HeaderSink};
    use axum::http::StatusCode;

    #[test]
    fn test_to_response() {
        let mut headers = HeaderSet::new();
        headers.send(Header::status(StatusCode::SEE_OTHER));
        headers.send(Header::field("Location", "/users"));
        headers.send(Header::field("Bad Name", "x"));
        headers.commit();

        let response = to_response(&headers, "moved".into());
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/users");
        assert_eq!(response.headers().len(), 1);
    }
}
