// Last-call-wins debouncing for async actions
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;

/// Default quiescence window
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

type Action<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

/// Delays an async action until calls stop coming
///
/// Every `call` cancels whatever is still waiting and starts the window over,
/// so only the most recent argument ever reaches the action. Superseded
/// arguments are dropped, never queued. Once the window has elapsed the
/// action runs on its own task and a later call can no longer stop it.
///
/// Must be used from inside a tokio runtime.
pub struct Debouncer<T> {
    window: Duration,
    action: Action<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(window: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            window,
            action: Arc::new(move |arg| action(arg).boxed()),
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `arg`, replacing anything still waiting
    pub fn call(&self, arg: T) {
        let action = Arc::clone(&self.action);
        let window = self.window;

        let mut pending = self.lock_pending();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            tokio::spawn(action(arg));
        }));
    }

    /// Drop the waiting call, if any. Returns whether one was dropped.
    pub fn cancel(&self) -> bool {
        match self.lock_pending().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// A call is waiting for its window to elapse
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
