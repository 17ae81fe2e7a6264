//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. API headers (nosniff, no-store, etc.)

pub mod cart_session;
pub mod headers;
pub mod request_id;
pub mod session;

pub use cart_session::CartSession;
pub use headers::api_headers_middleware;
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
