use crate::api;
use crate::infrastructure::config::{BindAddress, Settings};
use crate::service::MergeService;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::future::Future;
use tokio::net::TcpListener;

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Clone)]
struct AllowedOrigin(HeaderValue);

impl AllowedOrigin {
    fn new(origin: &str) -> Self {
        let value = HeaderValue::from_str(origin).unwrap_or_else(|_| {
            tracing::warn!(origin, "Invalid allowed origin, falling back to *");
            HeaderValue::from_static("*")
        });
        Self(value)
    }
}

/// Adds CORS headers to every response and answers preflight requests.
async fn cors(State(origin): State<AllowedOrigin>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.0);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    response
}

/// Builds the application router: health checks plus the REST API.
pub fn app(service: MergeService, allowed_origin: &str) -> Router {
    Router::new()
        .route("/health/live", get(health_check))
        .route("/health/ready", get(health_check))
        .merge(api::routes())
        .layer(middleware::from_fn_with_state(
            AllowedOrigin::new(allowed_origin),
            cors,
        ))
        .with_state(service)
}

/// Serves `app` on an already bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while running.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Runs the HTTP server with the Prometheus endpoint until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the metrics recorder cannot be installed, the address
/// cannot be bound, or the server fails while running.
pub async fn run_server<F>(
    config: &Settings,
    service: MergeService,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {e}"))?;

    let app = app(service, &config.server.allowed_origin)
        .route("/metrics", get(move || std::future::ready(handle.render())));

    let addr = BindAddress::from(&config.server).to_socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    serve(listener, app, shutdown).await
}
