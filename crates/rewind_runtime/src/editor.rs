//! Line editor abstraction for the terminal stepper.
//!
//! The stepper front end talks to a [`LineEditor`], so tests can drive it
//! with canned lines while the binary uses rustyline.

use std::borrow::Cow;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};

use crate::error::{HostError, HostResult};
use crate::highlight::SourceHighlighter;

/// Result of reading a line from the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> HostResult<ReadResult>;

    /// Add a line to history.
    fn add_history(&mut self, line: &str);
}

/// Words offered by tab completion.
const COMMANDS: &[&str] = &[
    ":end",
    ":start",
    ":predict on",
    ":predict off",
    ":guess ",
    ":state",
    ":program",
    ":load ",
    ":help",
    ":quit",
];

/// Helper for rustyline that provides completion, hints, highlighting, and validation.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct StepperHelper {
    #[rustyline(Completer)]
    completer: CommandCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: BracketValidator,
    highlighter: SourceHighlighter,
}

impl Highlighter for StepperHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completes stepper commands, and file paths after `:load`.
struct CommandCompleter {
    file_completer: FilenameCompleter,
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with(":load ") {
            return self.file_completer.complete(line, pos, ctx);
        }
        let word = &line[..pos];
        if !word.starts_with(':') {
            return Ok((pos, Vec::new()));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|command| command.starts_with(word))
            .map(|command| Pair {
                display: (*command).to_string(),
                replacement: (*command).to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

/// Validator for bracket matching (enables multi-line input).
#[derive(Default)]
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if open_brackets(ctx.input()) > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Counts brackets left open, ignoring quoted text and comments.
pub(crate) fn open_brackets(input: &str) -> i32 {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escape_next = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => break,
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<StepperHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new() -> HostResult<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(editor_error)?
            .build();

        let helper = StepperHelper {
            completer: CommandCompleter {
                file_completer: FilenameCompleter::new(),
            },
            hinter: HistoryHinter::new(),
            validator: BracketValidator,
            highlighter: SourceHighlighter::new(),
        };

        let mut editor = Editor::with_config(config).map_err(editor_error)?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

fn editor_error(err: ReadlineError) -> HostError {
    HostError::Editor(err.to_string())
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> HostResult<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(editor_error(e)),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}
