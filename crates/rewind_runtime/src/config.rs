//! Stepper configuration.

use rewind_language::DEFAULT_MAX_CALL_DEPTH;

/// Default bound on commands executed by one `step_forward` or `to_end`.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Settings a [`Stepper`](crate::Stepper) is created with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepperConfig {
    /// Whether assignments pause for a guess.
    pub prediction_mode: bool,
    /// Commands one run may execute before giving up.
    pub max_steps: usize,
    /// Nested user-function calls allowed.
    pub max_call_depth: usize,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            prediction_mode: false,
            max_steps: DEFAULT_MAX_STEPS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl StepperConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prediction mode on, everything else default.
    #[must_use]
    pub fn quiz() -> Self {
        Self::default().with_prediction_mode(true)
    }

    /// Sets whether assignments pause for a guess.
    #[must_use]
    pub const fn with_prediction_mode(mut self, enabled: bool) -> Self {
        self.prediction_mode = enabled;
        self
    }

    /// Sets the command budget. Zero is treated as one.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = if max_steps == 0 { 1 } else { max_steps };
        self
    }

    /// Sets the recursion limit.
    #[must_use]
    pub const fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
