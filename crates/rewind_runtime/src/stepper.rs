//! The bidirectional stepper.
//!
//! A [`Stepper`] owns one compiled program, its [`ExecutionState`], and the
//! undo history. Stepping forward runs commands until one visible command
//! has executed; stepping back undoes commands until the state is the one
//! right after the previous visible command. Every forward step can
//! therefore be reversed exactly.
//!
//! In prediction mode, an assignment pauses the step it belongs to. The
//! paused command has already run; its undo record is held aside until the
//! guess is submitted and only then joins the history.

use rewind_foundation::{Error, Result};
use rewind_language::{
    Command, ExecutionState, InputProvider, NoInput, ProgramTree, UndoRecord, execute, parse,
};
use tracing::{debug, instrument, warn};

use crate::config::StepperConfig;
use crate::prediction::{self, PredictionOutcome};
use crate::snapshot::{self, Snapshot, SnapshotValue};

/// One executed command.
#[derive(Clone, Debug)]
struct HistoryEntry {
    /// Program counter before the command ran.
    pc: usize,
    undo: UndoRecord,
    visible: bool,
}

/// Steps a compiled program forward and backward.
pub struct Stepper<I: InputProvider = NoInput> {
    config: StepperConfig,
    program: Vec<Command>,
    state: ExecutionState,
    history: Vec<HistoryEntry>,
    paused: Option<HistoryEntry>,
    parse_error: Option<Error>,
    last_prediction: Option<PredictionOutcome>,
    input: I,
}

impl Stepper<NoInput> {
    /// Creates an empty stepper whose programs cannot read input.
    #[must_use]
    pub fn new(config: StepperConfig) -> Self {
        Self::with_input(config, NoInput)
    }
}

impl Default for Stepper<NoInput> {
    fn default() -> Self {
        Self::new(StepperConfig::default())
    }
}

impl<I: InputProvider> Stepper<I> {
    /// Creates an empty stepper that answers `input()` from `input`.
    pub fn with_input(config: StepperConfig, input: I) -> Self {
        let state = fresh_state(&config);
        Self {
            config,
            program: Vec::new(),
            state,
            history: Vec::new(),
            paused: None,
            parse_error: None,
            last_prediction: None,
            input,
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Parses and compiles `source`, replacing the current program.
    ///
    /// On failure the stepper holds an empty program and remembers the
    /// syntax error for [`snapshot`](Self::snapshot).
    ///
    /// # Errors
    /// Returns the syntax error.
    #[instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    pub fn load(&mut self, source: &str) -> Result<()> {
        let compiled = parse(source).and_then(|program| program.compile_program());
        self.install(compiled)
    }

    /// Compiles an already parsed tree, replacing the current program.
    ///
    /// # Errors
    /// Returns the compilation error.
    pub fn load_tree(&mut self, tree: &impl ProgramTree) -> Result<()> {
        self.install(tree.compile_program())
    }

    fn install(&mut self, compiled: Result<Vec<Command>>) -> Result<()> {
        self.state = fresh_state(&self.config);
        self.history.clear();
        self.paused = None;
        self.last_prediction = None;
        match compiled {
            Ok(program) => {
                debug!(commands = program.len(), "program loaded");
                self.program = program;
                self.parse_error = None;
                Ok(())
            }
            Err(err) => {
                debug!(%err, "program rejected");
                self.program = Vec::new();
                self.parse_error = Some(err.clone());
                Err(err)
            }
        }
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Runs commands until a visible one has executed.
    ///
    /// Returns `true` if a visible command ran or a prediction pause began.
    /// Returns `false` at the end of the program, when an error is raised,
    /// while paused, and when the step budget runs out.
    pub fn step_forward(&mut self) -> bool {
        let mut budget = self.config.max_steps;
        self.advance(&mut budget)
    }

    fn advance(&mut self, budget: &mut usize) -> bool {
        if self.paused.is_some() {
            return false;
        }
        while self.state.error().is_none() {
            let pc = self.state.program_counter();
            let Some(command) = self.program.get(pc) else {
                return false;
            };
            if *budget == 0 {
                warn!(pc, max_steps = self.config.max_steps, "step budget exhausted");
                return false;
            }
            *budget -= 1;

            let visible = command.is_visible();
            match execute(command, &mut self.state, &mut self.input) {
                Ok(undo) => {
                    let entry = HistoryEntry { pc, undo, visible };
                    if let Some(pending) = &self.state.prediction().pending {
                        debug!(pc, variable = %pending.variable, "waiting for prediction");
                        self.paused = Some(entry);
                        return true;
                    }
                    self.commit(entry);
                    if visible {
                        return true;
                    }
                }
                Err(err) => {
                    debug!(pc, %err, "program halted");
                    self.state.set_error(err);
                    self.history.push(HistoryEntry {
                        pc,
                        undo: UndoRecord::Failed,
                        visible: true,
                    });
                    return false;
                }
            }
        }
        false
    }

    /// Records an executed command and moves past it.
    fn commit(&mut self, entry: HistoryEntry) {
        if self.state.program_counter() == entry.pc {
            self.state.set_program_counter(entry.pc + 1);
        }
        self.history.push(entry);
    }

    /// Returns to the state right after the previous visible command.
    ///
    /// While paused, this abandons the paused step instead.
    pub fn step_back(&mut self) -> bool {
        let moved = match self.paused.take() {
            Some(entry) => {
                self.revert(entry);
                true
            }
            None => match self.history.pop() {
                Some(entry) => {
                    self.revert(entry);
                    true
                }
                None => false,
            },
        };
        while self.history.last().is_some_and(|entry| !entry.visible) {
            if let Some(entry) = self.history.pop() {
                self.revert(entry);
            }
        }
        moved
    }

    fn revert(&mut self, entry: HistoryEntry) {
        entry.undo.apply(&mut self.state);
        self.state.set_program_counter(entry.pc);
    }

    /// Grades a guess for the paused assignment and resumes.
    ///
    /// Returns `false` if nothing is paused or `variable` is not the one
    /// being predicted.
    pub fn submit_prediction(&mut self, variable: &str, guess: &str) -> bool {
        let Some(pending) = self.state.prediction().pending.clone() else {
            return false;
        };
        if pending.variable != variable {
            return false;
        }
        let Some(entry) = self.paused.take() else {
            return false;
        };
        let outcome = prediction::grade(&pending.variable, guess, &pending.correct_value);
        debug!(variable, correct = outcome.correct, "prediction graded");
        self.last_prediction = Some(outcome);
        self.state.take_pending_prediction();
        self.commit(entry);
        true
    }

    /// Steps forward until the program ends, fails, pauses, or the step
    /// budget runs out.
    ///
    /// Returns the number of steps taken.
    pub fn to_end(&mut self) -> usize {
        let mut budget = self.config.max_steps;
        let mut steps = 0;
        while self.advance(&mut budget) {
            steps += 1;
            if self.paused.is_some() {
                break;
            }
        }
        steps
    }

    /// Steps back to the start of the program.
    pub fn to_beginning(&mut self) {
        while self.step_back() {}
    }

    /// Turns prediction mode on or off.
    ///
    /// Turning it off while paused resumes without grading.
    pub fn set_prediction_mode(&mut self, enabled: bool) {
        self.config.prediction_mode = enabled;
        self.state.set_prediction_mode(enabled);
        if !enabled {
            if let Some(entry) = self.paused.take() {
                self.state.take_pending_prediction();
                self.commit(entry);
            }
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns true if `step_forward` can make progress.
    #[must_use]
    pub fn can_step_forward(&self) -> bool {
        self.parse_error.is_none()
            && self.paused.is_none()
            && self.state.error().is_none()
            && self.state.program_counter() < self.program.len()
    }

    /// Returns true if `step_back` can make progress.
    #[must_use]
    pub fn can_step_backward(&self) -> bool {
        self.paused.is_some() || !self.history.is_empty()
    }

    /// Returns true while an assignment waits for a guess.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.paused.is_some()
    }

    /// Commands executed so far.
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.history.len()
    }

    /// The compiled program.
    #[must_use]
    pub fn program(&self) -> &[Command] {
        &self.program
    }

    /// The live execution state.
    #[must_use]
    pub const fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// The current configuration.
    #[must_use]
    pub const fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Why the last load failed, if it did.
    #[must_use]
    pub const fn parse_error(&self) -> Option<&Error> {
        self.parse_error.as_ref()
    }

    /// The most recently graded guess.
    #[must_use]
    pub const fn last_prediction(&self) -> Option<&PredictionOutcome> {
        self.last_prediction.as_ref()
    }

    /// The input provider.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Copies out everything a presentation layer shows.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let pending = state.prediction().pending.as_ref();
        Snapshot {
            variables: snapshot::copy_bindings(&state.active_scope().bindings),
            outputs: state.outputs().to_vec(),
            can_step_forward: self.can_step_forward(),
            can_step_backward: self.can_step_backward(),
            current_step: self.current_step(),
            total_steps: self.program.len(),
            highlighted_statement: state.current_statement(),
            highlighted_expression: state.current_expression(),
            functions: Snapshot::functions_of(state.functions()),
            scopes: Snapshot::scopes_of(state.scopes()),
            loop_iterations: state
                .loop_cursors()
                .iter()
                .map(|(name, cursor)| (name.clone(), *cursor))
                .collect(),
            error: state.error().cloned(),
            parse_error: self.parse_error.as_ref().map(ToString::to_string),
            waiting_for_prediction: self.paused.is_some(),
            prediction_variable: pending.map(|p| p.variable.clone()),
            prediction_correct_value: pending.map(|p| SnapshotValue::from_value(&p.correct_value)),
            last_prediction: self.last_prediction.clone(),
        }
    }
}

fn fresh_state(config: &StepperConfig) -> ExecutionState {
    let mut state = ExecutionState::new().with_max_call_depth(config.max_call_depth);
    state.set_prediction_mode(config.prediction_mode);
    state
}
