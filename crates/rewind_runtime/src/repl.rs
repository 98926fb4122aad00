//! The interactive terminal stepper.
//!
//! A program is loaded from a file, then walked with single-letter
//! commands: `n` steps forward, `b` steps back. Colon commands jump to
//! either end, toggle prediction mode, answer a prediction, and inspect
//! the state. `input()` inside the program reads through the same editor.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use rewind_foundation::{Error, Result};
use rewind_language::InputProvider;

use crate::config::StepperConfig;
use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::error::{HostError, HostResult};
use crate::snapshot::Snapshot;
use crate::stepper::Stepper;

// =============================================================================
// Editor-backed input
// =============================================================================

/// Answers `input()` by reading a line from the editor.
pub struct EditorInput<E: LineEditor> {
    editor: E,
}

impl<E: LineEditor> EditorInput<E> {
    /// Wraps `editor`.
    pub const fn new(editor: E) -> Self {
        Self { editor }
    }

    /// The wrapped editor.
    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }
}

impl<E: LineEditor> InputProvider for EditorInput<E> {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        match self.editor.read_line(prompt) {
            Ok(ReadResult::Line(line)) => Ok(line),
            Ok(ReadResult::Interrupted | ReadResult::Eof) => {
                Err(Error::runtime("EOF when reading a line"))
            }
            Err(err) => Err(Error::runtime(err.to_string())),
        }
    }
}

// =============================================================================
// Repl
// =============================================================================

/// The interactive stepper.
pub struct Repl<E: LineEditor = RustylineEditor> {
    stepper: Stepper<EditorInput<E>>,

    /// Source of the loaded program, for showing the current line.
    source: String,

    /// Outputs already shown to the user.
    shown_outputs: usize,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(config: StepperConfig) -> HostResult<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, config))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E, config: StepperConfig) -> Self {
        Self {
            stepper: Stepper::with_input(config, EditorInput::new(editor)),
            source: String::new(),
            shown_outputs: 0,
            show_banner: true,
            prompt: "rewind> ".to_string(),
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the stepper.
    #[must_use]
    pub const fn stepper(&self) -> &Stepper<EditorInput<E>> {
        &self.stepper
    }

    /// Returns a snapshot of the stepper.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.stepper.snapshot()
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> HostResult<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            let prompt = if self.stepper.is_waiting() {
                "guess> ".to_string()
            } else {
                self.prompt.clone()
            };
            let line = match self.stepper.input_mut().editor_mut().read_line(&prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => break,
            };
            if !line.trim().is_empty() {
                self.stepper.input_mut().editor_mut().add_history(&line);
            }

            match self.handle(&line) {
                Ok(Some(reply)) => {
                    if !reply.is_empty() {
                        println!("{reply}");
                    }
                }
                Ok(None) => break,
                Err(e) => print_error(&e),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Handles one line of input.
    ///
    /// Returns the text to show, or `None` to exit. While a prediction is
    /// pending, a line that is not a command is taken as the guess.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or the program does not
    /// compile.
    pub fn handle(&mut self, line: &str) -> HostResult<Option<String>> {
        let line = line.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let reply = match command {
            "" | "n" | "next" => {
                if self.stepper.is_waiting() {
                    return Ok(Some(self.prediction_prompt()));
                }
                self.stepper.step_forward();
                self.describe()
            }
            "b" | "back" => {
                self.stepper.step_back();
                self.describe()
            }
            ":end" => {
                self.stepper.to_end();
                self.describe()
            }
            ":start" => {
                self.stepper.to_beginning();
                self.describe()
            }
            ":predict" => match argument {
                "on" => {
                    self.stepper.set_prediction_mode(true);
                    "prediction mode on".to_string()
                }
                "off" => {
                    self.stepper.set_prediction_mode(false);
                    "prediction mode off".to_string()
                }
                _ => "usage: :predict on|off".to_string(),
            },
            ":guess" => self.guess(argument),
            ":state" => self.render_state(),
            ":program" if argument.is_empty() => self.render_program(),
            ":program" => self.render_function(argument),
            ":load" => {
                if argument.is_empty() {
                    "usage: :load <file>".to_string()
                } else {
                    self.load_file(argument)?;
                    self.describe()
                }
            }
            ":help" | ":h" => help_text().to_string(),
            ":quit" | ":q" => return Ok(None),
            _ if self.stepper.is_waiting() && !command.starts_with(':') => self.guess(line),
            _ => format!("unknown command '{command}' (try :help)"),
        };
        Ok(Some(reply))
    }

    /// Loads and compiles a program file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not compile.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> HostResult<()> {
        let path = path.as_ref();
        let source =
            fs::read_to_string(path).map_err(|e| HostError::io("failed to read", path, e))?;
        self.load_source(&source)
    }

    /// Compiles `source` as the current program.
    ///
    /// # Errors
    ///
    /// Returns the syntax error if it does not compile.
    pub fn load_source(&mut self, source: &str) -> HostResult<()> {
        self.source = source.to_string();
        self.shown_outputs = 0;
        self.stepper.load(source)?;
        Ok(())
    }

    fn guess(&mut self, raw: &str) -> String {
        let Some(variable) = self
            .stepper
            .state()
            .prediction()
            .pending
            .as_ref()
            .map(|p| p.variable.clone())
        else {
            return "nothing to predict".to_string();
        };
        if raw.is_empty() {
            return self.prediction_prompt();
        }
        self.stepper.submit_prediction(&variable, raw);
        let mut out = String::new();
        if let Some(outcome) = self.stepper.last_prediction() {
            if outcome.correct {
                let _ = writeln!(out, "\x1b[32mcorrect!\x1b[0m {variable} = {}", outcome.expected);
            } else {
                let _ = writeln!(
                    out,
                    "\x1b[31mnot quite:\x1b[0m {variable} = {} (you said {})",
                    outcome.expected, outcome.guess
                );
            }
        }
        out.push_str(&self.describe());
        out
    }

    fn prediction_prompt(&self) -> String {
        match &self.stepper.state().prediction().pending {
            Some(pending) => format!(
                "predict the new value of {} (type it, or :guess <value>)",
                pending.variable
            ),
            None => String::new(),
        }
    }

    /// Describes where the program is after a step.
    fn describe(&mut self) -> String {
        let mut out = String::new();
        let state = self.stepper.state();

        if let Some(span) = state.current_statement() {
            for (number, text) in self.source_lines(span.start_line, span.end_line) {
                let _ = writeln!(out, "\x1b[1m{number:>4} |\x1b[0m {text}");
            }
        }

        let outputs = state.outputs();
        if outputs.len() < self.shown_outputs {
            self.shown_outputs = outputs.len();
        }
        for line in &outputs[self.shown_outputs..] {
            let _ = writeln!(out, "{line}");
        }
        self.shown_outputs = outputs.len();

        if let Some(err) = state.error() {
            let _ = writeln!(out, "\x1b[31m{err}\x1b[0m");
        } else if self.stepper.is_waiting() {
            let _ = writeln!(out, "{}", self.prediction_prompt());
        } else if !self.stepper.can_step_forward() {
            let _ = writeln!(out, "(end of program)");
        }
        let _ = write!(
            out,
            "\x1b[2m[step {}/{}]\x1b[0m",
            self.stepper.current_step(),
            self.stepper.program().len()
        );
        out
    }

    fn source_lines(&self, start: u32, end: u32) -> Vec<(u32, &str)> {
        (start..=end)
            .zip(self.source.lines().skip(start.saturating_sub(1) as usize))
            .collect()
    }

    fn render_state(&self) -> String {
        let snapshot = self.stepper.snapshot();
        let mut out = String::new();
        for scope in &snapshot.scopes {
            let _ = writeln!(out, "\x1b[1m{}\x1b[0m", scope.name);
            for (name, value) in &scope.variables {
                let _ = writeln!(out, "  {name} = {}", value.repr());
            }
        }
        if !snapshot.functions.is_empty() {
            let _ = writeln!(out, "\x1b[1mfunctions\x1b[0m");
            for function in &snapshot.functions {
                let _ = writeln!(out, "  {}({})", function.name, function.params.join(", "));
            }
        }
        for (variable, cursor) in &snapshot.loop_iterations {
            let _ = writeln!(out, "  loop over {variable}: next item {cursor}");
        }
        if let Some(err) = &snapshot.parse_error {
            let _ = writeln!(out, "\x1b[31m{err}\x1b[0m");
        }
        let _ = write!(
            out,
            "outputs: {} line(s), step {}/{}",
            snapshot.outputs.len(),
            snapshot.current_step,
            snapshot.total_steps
        );
        out
    }

    fn render_program(&self) -> String {
        let pc = self.stepper.state().program_counter();
        let mut out = String::new();
        for (index, command) in self.stepper.program().iter().enumerate() {
            let marker = if index == pc { "=>" } else { "  " };
            let _ = writeln!(out, "{marker} {index:>4}  {command}");
        }
        out.trim_end().to_string()
    }

    fn render_function(&self, name: &str) -> String {
        let Some(function) = self.stepper.state().functions().get(name) else {
            return format!("no function named '{name}' has been defined");
        };
        let pc = self.stepper.state().program_counter();
        let mut out = String::new();
        let body = function.body(self.stepper.program());
        for (offset, command) in body.iter().enumerate() {
            let index = function.start_index + offset;
            let marker = if index == pc { "=>" } else { "  " };
            let _ = writeln!(out, "{marker} {index:>4}  {command}");
        }
        out.trim_end().to_string()
    }

    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mRewind\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
        println!("Step with n / b. Type :help for commands, Ctrl+D to exit.\n");
        let _ = io::stdout().flush();
    }
}

fn print_error(error: &HostError) {
    eprintln!("\x1b[31mError: {error}\x1b[0m");
}

const fn help_text() -> &'static str {
    "\
n, <enter>       step forward
b                step back
:end             run to the end (or the next prediction)
:start           rewind to the beginning
:predict on|off  pause at every assignment for a guess
:guess <value>   answer the pending prediction
:state           show scopes, functions, and loops
:program         list the compiled commands
:program <name>  list a defined function's body
:load <file>     load a program
:quit            exit"
}
