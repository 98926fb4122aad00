//! f-string evaluation.
//!
//! Name segments are plain lookups. Expression segments are parsed and
//! compiled with the ordinary expression compiler, then run to completion on
//! a scratch state whose globals are a deep copy of every visible binding.
//! Nothing the segment does can reach the real state.

use rewind_foundation::{Error, Result, Value};
use tracing::trace;

use super::context::InputProvider;
use super::run;
use crate::compiler::Compile;
use crate::parser::parse_expression;
use crate::state::ExecutionState;
use crate::template::{Template, TemplatePart};

/// Renders `template` against the variables visible in `state`.
pub(crate) fn render(
    template: &Template,
    state: &ExecutionState,
    input: &mut dyn InputProvider,
) -> Result<String> {
    let mut out = String::new();
    for part in &template.parts {
        match part {
            TemplatePart::Literal(text) => out.push_str(text),
            TemplatePart::Name(name) => {
                let value = state.lookup(name).ok_or_else(|| Error::name_error(name))?;
                out.push_str(&value.to_string());
            }
            TemplatePart::Expression(source) => {
                out.push_str(&evaluate(source, state, input)?.to_string());
            }
        }
    }
    Ok(out)
}

fn evaluate(source: &str, state: &ExecutionState, input: &mut dyn InputProvider) -> Result<Value> {
    trace!(source, "evaluating f-string segment");
    let commands = parse_expression(source)?.compile()?;
    let mut scratch = ExecutionState::with_globals(state.merged_bindings());
    run(&commands, &mut scratch, input)?;
    scratch
        .stack
        .pop()
        .ok_or_else(|| Error::runtime("f-string expression produced no value"))
}
