use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shutdown request shared between a window and its population task.
///
/// The window sets it when it is closed; the task polls it at its
/// cancellation points and stops early.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
