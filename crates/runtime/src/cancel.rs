//! Sibling cancellation for fail-fast mode.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation scopes a unit observes.
///
/// A unit sees every scope of its ancestors' blocks plus the scope of the
/// block it was spawned by, so cancelling an outer block also stops units of
/// blocks nested inside it. The default token has no scopes and is never
/// cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    scopes: Vec<Arc<AtomicBool>>,
}

impl CancelToken {
    /// A token that additionally observes a fresh scope.
    pub fn child(&self) -> Self {
        let mut scopes = self.scopes.clone();
        scopes.push(Arc::new(AtomicBool::new(false)));
        Self { scopes }
    }

    /// Cancel the innermost scope.
    pub fn cancel(&self) {
        if let Some(scope) = self.scopes.last() {
            scope.store(true, Ordering::Release);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.scopes.iter().any(|s| s.load(Ordering::Acquire))
    }

    /// Whether any scope is being observed at all.
    pub fn is_active(&self) -> bool {
        !self.scopes.is_empty()
    }
}
