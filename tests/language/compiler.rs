//! Integration tests for the compiler
//!
//! Tests command layout invariants over whole programs.

use rewind_language::{Command, compile, jump_target};

const PROGRAMS: &[&str] = &[
    "x = 1\nif x > 0:\n    print('pos')\nelif x < 0:\n    print('neg')\nelse:\n    print('zero')\n",
    "total = 0\nfor i in range(5):\n    if i == 3:\n        break\n    total += i\n",
    "n = 10\nwhile n > 0:\n    n -= 3\n    if n % 2 == 0:\n        continue\n    print(n)\n",
    "def fact(n):\n    if n <= 1:\n        return 1\n    return n * fact(n - 1)\nprint(fact(5))\n",
    "xs = [3, 1, 2]\nfor a in xs:\n    for b in xs:\n        print(a * b)\n",
];

fn relative_offsets(command: &Command) -> Vec<isize> {
    match command {
        Command::Jump(n) | Command::ConditionalJump(n) => vec![*n],
        Command::PushLoopBounds {
            continue_offset,
            break_offset,
            ..
        } => vec![*continue_offset, *break_offset],
        _ => Vec::new(),
    }
}

#[test]
fn every_jump_lands_inside_the_program() {
    for source in PROGRAMS {
        let commands = compile(source).unwrap();
        for (index, command) in commands.iter().enumerate() {
            for offset in relative_offsets(command) {
                let target = jump_target(index, offset)
                    .unwrap_or_else(|| panic!("{command} at {index} jumps before the start"));
                assert!(
                    target <= commands.len(),
                    "{command} at {index} jumps past the end of {source:?}"
                );
            }
        }
    }
}

#[test]
fn every_statement_opens_with_a_highlight() {
    let commands = compile("a = 1\nb = 2\nprint(a + b)\n").unwrap();
    let statements = commands
        .iter()
        .filter(|command| matches!(command, Command::HighlightStatement(_)))
        .count();
    assert_eq!(statements, 3);
    assert!(matches!(commands[0], Command::HighlightStatement(_)));
}

#[test]
fn loops_are_bracketed() {
    for source in PROGRAMS {
        let commands = compile(source).unwrap();
        let enters = commands
            .iter()
            .filter(|command| matches!(command, Command::PushLoopBounds { .. }))
            .count();
        let exits = commands
            .iter()
            .filter(|command| matches!(command, Command::PopLoopBounds))
            .count();
        assert_eq!(enters, exits, "unbalanced loop brackets in {source:?}");
    }
}

#[test]
fn function_body_is_skipped_at_definition() {
    let commands = compile("def f(a):\n    return a\nprint(f(2))\n").unwrap();
    let define = commands
        .iter()
        .position(|command| matches!(command, Command::DefineFunction(_)))
        .unwrap();
    let Command::DefineFunction(template) = &commands[define] else {
        unreachable!();
    };
    assert_eq!(template.params, ["a"]);
    let Command::Jump(offset) = commands[define + 1] else {
        panic!("definition should be followed by a jump over the body");
    };
    let landing = jump_target(define + 1, offset).unwrap();
    assert_eq!(landing, define + 2 + template.body_len);
}

#[test]
fn listing_reads_like_assembly() {
    let listing: Vec<String> = compile("x = 2\nprint(x)\n")
        .unwrap()
        .iter()
        .filter(|command| {
            !matches!(
                command,
                Command::HighlightStatement(_) | Command::HighlightExpression(_)
            )
        })
        .map(ToString::to_string)
        .collect();
    assert_eq!(listing, ["push 2", "assign x =", "load x", "call print/1", "pop"]);
}

#[test]
fn compile_rejects_what_cannot_run() {
    assert!(compile("a, b = 1\n").unwrap_err().is_parse_failure());
    assert!(compile("xs.shuffle()\n").is_err());
}
