//! Middleware and file serving
//!
//! - [`CorsHeadersLayer`]: static CORS headers on every response
//! - [`serve_upload`]: returns stored uploads with cache headers

pub mod cors;
pub mod file_serving;

pub use cors::{CorsHeadersLayer, CorsHeadersMiddleware};
pub use file_serving::serve_upload;
