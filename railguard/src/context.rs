//! Caller-supplied run context.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Opaque context threaded unchanged through a run and every nested
/// guardrail run.
///
/// The runner never mutates it. It carries two caller-owned things:
///
/// - arbitrary application data, retrievable by type with [`data`](Self::data);
/// - an optional [`CancellationToken`]. Cancelling it aborts the run,
///   including any classifier run still in flight, with
///   [`AgentError::Cancelled`](crate::agent::AgentError::Cancelled).
///
/// A run started with [`RunConfig::tracing_disabled`](crate::agent::RunConfig)
/// hands its nested runs a clone marked untraced, so classifier runs open
/// no `agent_run` span either.
///
/// Cloning is cheap; clones share the same data and token.
#[derive(Clone, Default)]
pub struct RunContext {
    data: Option<Arc<dyn Any + Send + Sync>>,
    cancellation: Option<CancellationToken>,
    tracing_disabled: bool,
}

impl RunContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach application data.
    #[must_use]
    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Application data, if present and of type `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref()
    }

    /// The cancellation token, if one was attached.
    #[must_use]
    pub const fn cancellation_token(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Returns `true` if runs under this context open no tracing span.
    #[must_use]
    pub const fn tracing_disabled(&self) -> bool {
        self.tracing_disabled
    }

    pub(crate) fn untraced(&self) -> Self {
        Self {
            tracing_disabled: true,
            ..self.clone()
        }
    }

    /// Returns `true` if an attached token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("has_data", &self.data.is_some())
            .field("cancellable", &self.cancellation.is_some())
            .field("tracing_disabled", &self.tracing_disabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Customer {
        id: u64,
    }

    #[test]
    fn test_data_downcast() {
        let ctx = RunContext::new().with_data(Customer { id: 7 });
        assert_eq!(ctx.data::<Customer>(), Some(&Customer { id: 7 }));
        assert!(ctx.data::<String>().is_none());
        assert!(RunContext::new().data::<Customer>().is_none());
    }

    #[test]
    fn test_clones_share_cancellation() {
        let token = CancellationToken::new();
        let ctx = RunContext::new().with_cancellation(token.clone());
        let nested = ctx.clone();
        assert!(!nested.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(nested.is_cancelled());
    }

    #[test]
    fn test_untraced_keeps_data_and_token() {
        let token = CancellationToken::new();
        let ctx = RunContext::new()
            .with_data(Customer { id: 7 })
            .with_cancellation(token.clone());
        let untraced = ctx.untraced();

        assert!(!ctx.tracing_disabled());
        assert!(untraced.tracing_disabled());
        assert_eq!(untraced.data::<Customer>(), Some(&Customer { id: 7 }));
        token.cancel();
        assert!(untraced.is_cancelled());
    }
}
