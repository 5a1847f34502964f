use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag through which an editor asks a running search to stop, for instance when the
/// window is closed. Clones observe the same flag, so one can be handed to a quit handler on
/// another thread while the search holds the other.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
