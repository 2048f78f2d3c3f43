//! Lifecycle callbacks around outgoing operation requests.

use std::time::Duration;

use crate::document::HttpMethod;
use crate::error::OpenApiError;
use crate::executor::HttpRequest;

/// Callbacks for request execution; every method defaults to a no-op.
pub trait RequestHooks: Send + Sync {
    fn on_request_start(&self, _operation: &str, _request: &HttpRequest) {}

    fn on_request_success(
        &self,
        _operation: &str,
        _method: HttpMethod,
        _status: u16,
        _elapsed: Duration,
    ) {
    }

    fn on_request_failure(
        &self,
        _operation: &str,
        _method: HttpMethod,
        _error: &OpenApiError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default)]
pub struct NoopRequestHooks;

impl RequestHooks for NoopRequestHooks {}
