use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-slot interrupt signal shared between the evaluator and the
/// front end. Raising it aborts the running command at its next
/// suspension point; the slot is drained when a new command starts.
#[derive(Clone, Debug, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        InterruptFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation of the running command.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Consume the signal if it is set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn drain(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
