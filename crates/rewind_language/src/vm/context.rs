//! Input sources for the `input()` built-in.
//!
//! The VM never reads a terminal directly; it asks an [`InputProvider`].
//! The REPL plugs in a line editor, tests plug in [`ScriptedInput`].

use std::collections::VecDeque;

use rewind_foundation::{Error, Result};

// =============================================================================
// InputProvider Trait
// =============================================================================

/// Supplies lines to `input()`.
pub trait InputProvider {
    /// Reads one line, showing `prompt` first.
    ///
    /// # Errors
    /// Returns an error if no more input is available.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

fn end_of_input() -> Error {
    Error::runtime("EOF when reading a line")
}

// =============================================================================
// NoInput
// =============================================================================

/// A provider with nothing to read.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInput;

impl InputProvider for NoInput {
    fn read_line(&mut self, _prompt: &str) -> Result<String> {
        Err(end_of_input())
    }
}

// =============================================================================
// ScriptedInput
// =============================================================================

/// A provider that replays canned lines and records the prompts it saw.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    /// Creates a provider that will answer with `lines`, in order.
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl InputProvider for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.lines.pop_front().ok_or_else(end_of_input)
    }
}
