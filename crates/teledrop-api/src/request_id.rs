//! Request ID generation (§10.1).

use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Generates time-ordered UUIDv7 request correlation IDs, so log lines for
/// the same request sort chronologically alongside everything else in this
/// codebase that keys off UUIDv7.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}
