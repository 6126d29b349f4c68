use futures::future::BoxFuture;
use serde_json::Value;

use crate::api::response::ApiResponse;

/// The raw network seam.
///
/// Implementations must resolve every call with an [`ApiResponse`] — a
/// transport failure is reported through
/// [`ApiResponse::network_failure`](crate::api::response::ApiResponse::network_failure),
/// never by erroring out of the future.
pub trait ApiRequester: Send + Sync {
    /// Issues `command` with `params` and resolves with the response.
    fn send(&self, command: &str, params: Value) -> BoxFuture<'_, ApiResponse>;
}
