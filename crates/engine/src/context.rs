use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run-wide state shared by every worker and module call
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask workers to stop before their next account
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let context = RunContext::new();
        let clone = context.clone();
        assert!(!clone.is_cancelled());

        context.cancel();
        assert!(clone.is_cancelled());
    }
}
