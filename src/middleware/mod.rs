//! HTTP middleware: request IDs and bearer sessions.

pub mod auth;
pub mod request_id;

pub use auth::CurrentSession;
pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId};
