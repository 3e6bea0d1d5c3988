//! Per-request context threaded through the pipeline.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Correlation id and cancellation signal of one caller request.
///
/// Cloning is cheap; clones share the same cancellation token. Cancelling the
/// context aborts token acquisition and in-flight origin calls made on its
/// behalf, but never delays the return of a rate-limit token.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Context with a fresh random request id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4().to_string())
    }

    /// Context carrying an id assigned upstream (e.g. an HTTP request id header).
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Tie this context to a parent token: cancelling the parent cancels it.
    #[must_use]
    pub fn child_of(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Cancel every operation running under this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_contexts_get_distinct_ids() {
        assert_ne!(
            RequestContext::new().request_id(),
            RequestContext::new().request_id()
        );
    }

    #[test]
    fn clones_share_cancellation() {
        let ctx = RequestContext::with_request_id("req-7");
        let clone = ctx.clone();
        ctx.cancel();
        assert!(clone.is_cancelled());
        assert_eq!(clone.request_id(), "req-7");
    }

    #[test]
    fn parent_cancellation_propagates() {
        let parent = CancellationToken::new();
        let ctx = RequestContext::new().child_of(&parent);
        parent.cancel();
        assert!(ctx.is_cancelled());
    }
}
