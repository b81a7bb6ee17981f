use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Poll until the stop flag is raised. Without one, forever.
    UntilStopped,
    /// Stop after this many iterations, or earlier on the stop flag.
    MaxIterations(u64),
}

/// Decides, before each poll iteration, whether the loop keeps going.
pub struct LoopController {
    mode: LoopMode,
    stop_flag: Arc<AtomicBool>,
    iterations: u64,
}

impl LoopController {
    pub fn new(mode: LoopMode, stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            mode,
            stop_flag,
            iterations: 0,
        }
    }

    /// Runs until the process is killed.
    pub fn forever() -> Self {
        Self::new(LoopMode::UntilStopped, Arc::new(AtomicBool::new(false)))
    }

    pub fn record_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// The shared stop flag alone, ignoring the iteration limit.
    pub fn stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    pub fn should_stop(&self) -> bool {
        if self.stop_requested() {
            return true;
        }
        match self.mode {
            LoopMode::UntilStopped => false,
            LoopMode::MaxIterations(max) => self.iterations >= max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forever_never_stops_on_its_own() {
        let mut ctrl = LoopController::forever();
        for _ in 0..10_000 {
            ctrl.record_iteration();
        }
        assert!(!ctrl.should_stop());
    }

    #[test]
    fn iteration_limit() {
        let mut ctrl = LoopController::new(LoopMode::MaxIterations(2), Arc::new(AtomicBool::new(false)));
        assert!(!ctrl.should_stop());
        ctrl.record_iteration();
        assert!(!ctrl.should_stop());
        ctrl.record_iteration();
        assert!(ctrl.should_stop());
    }

    #[test]
    fn stop_flag_wins() {
        let flag = Arc::new(AtomicBool::new(false));
        let ctrl = LoopController::new(LoopMode::UntilStopped, flag.clone());
        flag.store(true, Ordering::Relaxed);
        assert!(ctrl.should_stop());
    }

    #[test]
    fn reached_limit_is_not_a_stop_request() {
        let mut ctrl = LoopController::new(LoopMode::MaxIterations(1), Arc::new(AtomicBool::new(false)));
        ctrl.record_iteration();
        assert!(ctrl.should_stop());
        assert!(!ctrl.stop_requested());
    }
}
