//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (when origins are configured)
//! 5. Rate limiting on login (governor)
//!
//! Authentication is not a layer: handlers take [`RequireAuth`],
//! [`RequireLeader`] or [`RequireDirector`] as extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{RequireAuth, RequireDirector, RequireLeader};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
