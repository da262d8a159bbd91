//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`, capture errors and transactions)
//! 2. CORS (any origin, no credentials)
//! 3. `TimeoutLayer` (request deadline, `408` on expiry)
//! 4. `TraceLayer` (request span with method, uri, status, latency)
//! 5. Request ID (recorded into the trace span, echoed in the response)

pub mod cors;
pub mod request_id;

pub use cors::cors_layer;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
