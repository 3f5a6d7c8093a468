//! Step observer trait for monitoring world stepping.

/// Trait for observing simulation steps.
///
/// Implement this trait to monitor solver progress (debug overlays, frame
/// statistics, profiling). All methods have default no-op implementations.
pub trait StepObserver {
    /// Called after all dynamic bodies have been integrated for a sub-step.
    fn on_integrate(&mut self) {}

    /// Called after each contact solver iteration with the number of
    /// penetrating pairs resolved during that iteration.
    fn on_contact_iteration(&mut self, _iteration: usize, _contacts: usize) {}

    /// Called when a full fixed step is complete.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}

/// Counts steps and contacts; the scene reports these per frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepCounter {
    pub steps: u32,
    pub sub_steps: u32,
    pub contacts: u32,
}

impl StepObserver for StepCounter {
    fn on_integrate(&mut self) {
        self.sub_steps += 1;
    }

    fn on_contact_iteration(&mut self, _iteration: usize, contacts: usize) {
        self.contacts += contacts as u32;
    }

    fn on_step_complete(&mut self) {
        self.steps += 1;
    }
}
