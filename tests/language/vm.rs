//! Integration tests for the command VM
//!
//! Tests whole programs through `run`, `execute`, and `eval`.

use rewind_foundation::{ErrorKind, Value};
use rewind_language::{ExecutionState, NoInput, ScriptedInput, compile, eval, execute, run};

fn outputs(source: &str) -> Vec<String> {
    let commands = compile(source).unwrap();
    let mut state = ExecutionState::new();
    run(&commands, &mut state, &mut NoInput).unwrap();
    state.outputs().to_vec()
}

fn failure(source: &str) -> (ErrorKind, Vec<String>) {
    let commands = compile(source).unwrap();
    let mut state = ExecutionState::new();
    let err = run(&commands, &mut state, &mut NoInput).unwrap_err();
    (err.kind, state.outputs().to_vec())
}

// =============================================================================
// Programs
// =============================================================================

#[test]
fn fizzbuzz() {
    let source = "\
for i in range(1, 16):
    if i % 15 == 0:
        print('FizzBuzz')
    elif i % 3 == 0:
        print('Fizz')
    elif i % 5 == 0:
        print('Buzz')
    else:
        print(i)
";
    let lines = outputs(source);
    assert_eq!(lines.len(), 15);
    assert_eq!(lines[2], "Fizz");
    assert_eq!(lines[9], "Buzz");
    assert_eq!(lines[14], "FizzBuzz");
}

#[test]
fn bubble_sort() {
    let source = "\
xs = [5, 2, 9, 1]
n = len(xs)
for i in range(n):
    for j in range(n - i - 1):
        if xs[j] > xs[j + 1]:
            xs[j], xs[j + 1] = xs[j + 1], xs[j]
print(xs)
";
    // Tuple-style swaps only bind names, so sort through a temporary.
    assert!(compile(source).is_err());

    let source = "\
xs = [5, 2, 9, 1]
n = len(xs)
for i in range(n):
    for j in range(n - i - 1):
        if xs[j] > xs[j + 1]:
            tmp = xs[j]
            xs[j] = xs[j + 1]
            xs[j + 1] = tmp
print(xs)
";
    assert_eq!(outputs(source), ["[1, 2, 5, 9]"]);
}

#[test]
fn fibonacci_with_swap() {
    let source = "a, b = 0, 1\nfor _ in range(10):\n    a, b = b, a + b\nprint(a)\n";
    assert_eq!(outputs(source), ["55"]);
}

#[test]
fn recursive_functions() {
    let source = "\
def fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)
print(fib(10))
";
    assert_eq!(outputs(source), ["55"]);
}

#[test]
fn fstrings_see_locals() {
    let source = "def greet(name):\n    return f\"hi {name}!\"\nprint(greet('Ada'))\n";
    assert_eq!(outputs(source), ["hi Ada!"]);
}

#[test]
fn fstrings_see_every_active_frame() {
    let source = "\
a = 1
def g():
    return f\"{a + 0}\"
def f():
    a = 5
    return g()
print(f())
print(g())
";
    assert_eq!(outputs(source), ["5", "1"]);
}

#[test]
fn input_reads_scripted_lines() {
    let commands = compile("a = int(input('a? '))\nb = int(input('b? '))\nprint(a + b)\n").unwrap();
    let mut state = ExecutionState::new();
    let mut input = ScriptedInput::new(["3", "4"]);
    run(&commands, &mut state, &mut input).unwrap();
    assert_eq!(state.outputs(), ["7"]);
    assert_eq!(input.prompts(), ["a? ", "b? "]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn name_error_stops_before_output() {
    let (kind, printed) = failure("print(y)\n");
    assert!(matches!(kind, ErrorKind::Name(_)));
    assert!(printed.is_empty());
}

#[test]
fn output_before_a_failure_is_kept() {
    let (kind, printed) = failure("print(1)\nprint(1 / 0)\nprint(2)\n");
    assert!(matches!(kind, ErrorKind::ZeroDivision(_)));
    assert_eq!(printed, ["1"]);
}

#[test]
fn error_kinds() {
    assert!(matches!(failure("x = [1][3]\n").0, ErrorKind::Index(_)));
    assert!(matches!(failure("x = 1 + 'a'\n").0, ErrorKind::Type(_)));
    assert!(matches!(failure("x = int('abc')\n").0, ErrorKind::Runtime(_)));
    assert!(matches!(failure("break\n").0, ErrorKind::Runtime(_)));
    assert!(matches!(failure("x = 'abcd' * 2 ** 62\n").0, ErrorKind::Runtime(_)));
    assert!(matches!(failure("x = [0] * 2 ** 40\n").0, ErrorKind::Runtime(_)));
}

#[test]
fn errors_name_their_line() {
    let commands = compile("x = 1\ny = x / 0\n").unwrap();
    let mut state = ExecutionState::new();
    let err = run(&commands, &mut state, &mut NoInput).unwrap_err();
    assert_eq!(err.location.line, Some(2));
}

// =============================================================================
// Undo
// =============================================================================

#[test]
fn undo_records_restore_each_step() {
    let commands = compile("xs = [1]\nxs.append(2)\nxs[0] += 5\nprint(xs)\n").unwrap();
    let mut state = ExecutionState::new();
    while let Some(command) = commands.get(state.program_counter()) {
        let pc = state.program_counter();
        let before = state.deep_copy();
        let undo = execute(command, &mut state, &mut NoInput).unwrap();
        let after = state.deep_copy();
        undo.apply(&mut state);
        assert_eq!(state, before, "undo of {command} diverged");

        execute(command, &mut state, &mut NoInput).unwrap();
        assert_eq!(state, after);
        if state.program_counter() == pc {
            state.set_program_counter(pc + 1);
        }
    }
    assert_eq!(state.outputs(), ["[6, 2]"]);
}

#[test]
fn deep_copies_do_not_share_lists() {
    let commands = compile("xs = [1, 2]\n").unwrap();
    let mut state = ExecutionState::new();
    run(&commands, &mut state, &mut NoInput).unwrap();
    let copy = state.deep_copy();

    let more = compile("xs.append(3)\n").unwrap();
    state.set_program_counter(0);
    run(&more, &mut state, &mut NoInput).unwrap();

    assert_eq!(state.lookup("xs").unwrap().repr(), "[1, 2, 3]");
    assert_eq!(copy.lookup("xs").unwrap().repr(), "[1, 2]");
}

#[test]
fn eval_evaluates_one_expression() {
    assert_eq!(eval("len([3, 8, 1]) * 2 - 1").unwrap(), Value::Int(5));
    assert_eq!(eval("'a' * 3").unwrap(), Value::string("aaa"));
    assert_eq!(eval("[1, 2] == [1, 2]").unwrap(), Value::Bool(true));
}
