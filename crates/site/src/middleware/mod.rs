//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, main binary only)
//! 2. `TraceLayer` (request tracing)
//! 3. CSP nonce (per-request nonce for inline scripts)
//! 4. Security headers (CSP using that nonce, framing, sniffing)
//! 5. Session layer (tower-sessions, in-memory store)
//!
//! The dashboard guard is an extractor, not a layer; see [`guard`].

pub mod csp;
pub mod guard;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use guard::{GuardState, Identity, RequireAdmin};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
