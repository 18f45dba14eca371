//! Router assembly and server lifecycle

use std::future::Future;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::FileValidatorConfig;
use crate::error::ApiError;
use crate::handlers::{method_not_allowed, preflight, upload_file, validate_file};
use crate::health::health_check;
use crate::middleware::{serve_upload, CorsHeadersLayer};
use crate::state::AppState;

/// Builds the application router
///
/// Routes:
/// - `/health`, any method
/// - `POST|OPTIONS /validate`
/// - `POST|OPTIONS /upload`, body capped at `uploads.form_memory_limit`
/// - `GET {uploads.url_prefix}/{filename}` when `uploads.serve_files` is set
///
/// Other methods on these paths answer `405`, unknown paths `404`. Every
/// response, errors included, carries the CORS headers.
pub fn router(state: AppState) -> Router {
    let uploads = &state.config().uploads;
    let body_limit = uploads.form_memory_limit;

    let mut router = Router::new()
        .route("/health", any(health_check))
        .route(
            "/validate",
            post(validate_file)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/upload",
            post(upload_file)
                .options(preflight)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(body_limit)),
        );

    if uploads.serve_files {
        let path = format!("{}/{{filename}}", uploads.url_prefix.trim_end_matches('/'));
        router = router.route(&path, get(serve_upload).fallback(method_not_allowed));
    }

    router
        .fallback(not_found)
        .layer(CorsHeadersLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn not_found() -> ApiError {
    ApiError::NotFound("404 page not found".to_string())
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM
///
/// # Errors
///
/// Returns an error if the uploads path is unusable, the address cannot be
/// bound, or the server fails while running.
pub async fn serve(config: FileValidatorConfig) -> anyhow::Result<()> {
    let addr = config.service.bind_address();
    let state = AppState::new(config).context("Failed to initialize upload storage")?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    serve_on(listener, state, shutdown_signal()).await
}

/// Serves on an already-bound listener until `shutdown` resolves
///
/// In-flight requests are allowed to finish after `shutdown` fires.
///
/// # Errors
///
/// Returns an error if the server fails while running.
pub async fn serve_on<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    tracing::info!(
        address = %local_addr,
        uploads_dir = %state.config().uploads.dir.display(),
        max_file_size = state.config().policy.max_file_size(),
        "{} listening",
        state.config().service.name
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(temp: &TempDir, serve_files: bool) -> AppState {
        let mut config = FileValidatorConfig::default();
        config.uploads.dir = temp.path().join("uploads");
        config.uploads.serve_files = serve_files;
        AppState::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found_with_cors() {
        let temp = TempDir::new().unwrap();
        let app = router(test_state(&temp, true));

        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_file_route_disabled() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("uploads")).unwrap();
        std::fs::write(temp.path().join("uploads/cat.png"), b"png").unwrap();
        let app = router(test_state(&temp, false));

        let request = Request::builder()
            .uri("/uploads/cat.png")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_answers_every_method() {
        let temp = TempDir::new().unwrap();
        let app = router(test_state(&temp, true));

        for method in [Method::GET, Method::POST, Method::OPTIONS, Method::DELETE] {
            let request = Request::builder()
                .method(method.clone())
                .uri("/health")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{method}");
            let body = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["status"], "healthy", "{method}");
        }
    }

    #[tokio::test]
    async fn test_serve_on_stops_on_shutdown() {
        let temp = TempDir::new().unwrap();
        let state = test_state(&temp, true);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve_on(listener, state, async {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
