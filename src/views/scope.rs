use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lifetime of a view. Work started through the scope is abandoned once the
/// view is torn down, so late responses never reach dead state.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

/// Cloneable handle that can tear a scope down from elsewhere, e.g. the
/// router when navigating away.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    token: CancellationToken,
}

impl ScopeHandle {
    pub fn teardown(&self) {
        self.token.cancel();
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            token: self.token.clone(),
        }
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Runs `fut` unless the scope ends first; `None` means it was cut short.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }

    /// Background work tied to the scope.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = self.token.child_token();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                out = fut => Some(out),
            }
        })
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn run_completes_while_open() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { 42 }).await, Some(42));
    }

    #[tokio::test]
    async fn teardown_aborts_pending_work() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.teardown();
        });
        let out = scope.run(std::future::pending::<()>()).await;
        assert!(out.is_none());
        assert!(scope.is_closed());
        // closed scopes refuse new work
        assert_eq!(scope.run(async { 1 }).await, None);
    }

    #[tokio::test]
    async fn dropping_scope_cancels_spawned_work() {
        let scope = ViewScope::new();
        let task = scope.spawn(std::future::pending::<()>());
        drop(scope);
        assert_eq!(task.await.unwrap(), None);
    }
}
