//! Cooperative cancellation of a running solve.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A shareable interrupt flag.
///
/// Clones share the same flag, so a token can be handed to a solver
/// and tripped from another thread.   The solver checks the flag at the
/// top of every iteration and around every evaluator call, and stops
/// with [`Aborted`](crate::solver::SolverStatus::Aborted) once it is
/// set.
#[derive(Debug, Clone, Default)]
pub struct InterruptToken {
    interrupted: Arc<AtomicBool>,
}

impl InterruptToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token that is also tripped by Ctrl-C (SIGINT).
    ///
    /// The handler is process global, so this can succeed only once
    /// per process.
    #[cfg(feature = "ctrlc")]
    pub fn with_ctrlc() -> Result<Self, ctrlc::Error> {
        let token = Self::new();
        ctrlc::set_handler({
            let token = token.clone();
            move || token.interrupt()
        })?;
        Ok(token)
    }

    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Clear the flag so that the token can be reused.
    pub fn reset(&self) {
        self.interrupted.store(false, Ordering::SeqCst);
    }
}

#[test]
fn test_interrupt_token_shared() {
    let token = InterruptToken::new();
    let other = token.clone();
    assert!(!token.is_interrupted());

    std::thread::spawn(move || other.interrupt())
        .join()
        .unwrap();
    assert!(token.is_interrupted());

    token.reset();
    assert!(!token.is_interrupted());
}
