//! Permissive CORS headers
//!
//! Adds the same three headers to every response, including errors,
//! preflight answers and `405` responses:
//! - `Access-Control-Allow-Origin: *`
//! - `Access-Control-Allow-Methods: POST, GET, OPTIONS`
//! - `Access-Control-Allow-Headers: Content-Type`
//!
//! The headers are static; no origin negotiation takes place.
//!
//! # Example
//!
//! ```rust,no_run
//! # use file_validator::middleware::CorsHeadersLayer;
//! # use axum::Router;
//! let app: Router<()> = Router::new().layer(CorsHeadersLayer::new());
//! ```

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, Response},
};

/// Value of `Access-Control-Allow-Origin`
pub const ALLOW_ORIGIN: &str = "*";

/// Value of `Access-Control-Allow-Methods`
pub const ALLOW_METHODS: &str = "POST, GET, OPTIONS";

/// Value of `Access-Control-Allow-Headers`
pub const ALLOW_HEADERS: &str = "Content-Type";

/// CORS headers middleware layer
#[derive(Debug, Clone, Copy, Default)]
pub struct CorsHeadersLayer;

impl CorsHeadersLayer {
    /// Create a new CORS headers layer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> tower::Layer<S> for CorsHeadersLayer {
    type Service = CorsHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorsHeadersMiddleware { inner }
    }
}

/// CORS headers middleware service
#[derive(Debug, Clone)]
pub struct CorsHeadersMiddleware<S> {
    inner: S,
}

impl<S> tower::Service<Request<Body>> for CorsHeadersMiddleware<S>
where
    S: tower::Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;
            add_cors_headers(&mut response);
            Ok(response)
        })
    }
}

/// Add the CORS headers to a response, replacing any existing values
fn add_cors_headers(response: &mut Response<Body>) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}
