//! Property tests for reversible stepping
//!
//! Generated programs are stepped forward to the end, recording every
//! state, then stepped back; each backward step must land exactly on the
//! recorded state.

use proptest::prelude::*;
use rewind_language::ExecutionState;
use rewind_runtime::{Stepper, StepperConfig};

const PRELUDE: &str = "\
a = 1
b = 2
xs = [3, 1]
def twice(n):
    return n * 2
";

// =============================================================================
// Generators
// =============================================================================

fn simple_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..10).prop_map(|n| format!("a = a + {n}")),
        (0i64..5).prop_map(|n| format!("b = a * {n} - b")),
        (0i64..3).prop_map(|n| format!("b = b // {n}")),
        Just("a -= b".to_string()),
        Just("a, b = b, a".to_string()),
        Just("xs.append(a)".to_string()),
        Just("xs.sort()".to_string()),
        Just("xs[0] = b".to_string()),
        Just("xs[-1] += 1".to_string()),
        Just("b = twice(a)".to_string()),
        Just("print(a, b)".to_string()),
        Just("print(f\"{a}-{len(xs)}\")".to_string()),
        (0i64..6).prop_map(|n| format!("print(xs[{n}])")),
        Just("s = str(a) + '!'".to_string()),
    ]
}

fn indent(lines: &str) -> String {
    lines
        .lines()
        .map(|line| format!("    {line}\n"))
        .collect()
}

fn statement() -> impl Strategy<Value = String> {
    let simple = simple_statement().prop_map(|line| format!("{line}\n"));
    simple.prop_recursive(2, 12, 3, |inner| {
        let body = prop::collection::vec(inner, 1..3).prop_map(|lines| indent(&lines.concat()));
        prop_oneof![
            body.clone()
                .prop_map(|body| format!("if a > b:\n{body}")),
            (body.clone(), body.clone())
                .prop_map(|(then, other)| format!("if a % 2 == 0:\n{then}else:\n{other}")),
            ((0i64..4), body.clone())
                .prop_map(|(n, body)| format!("for i in range({n}):\n{body}")),
            body.clone()
                .prop_map(|body| format!("for x in xs[:3]:\n    if x > 5:\n        break\n{body}")),
            body.prop_map(|body| format!("k = 0\nwhile k < 3:\n    k += 1\n{body}")),
        ]
    })
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(statement(), 1..6)
        .prop_map(|statements| format!("{PRELUDE}{}", statements.concat()))
}

// =============================================================================
// Helpers
// =============================================================================

fn stepper(source: &str, config: StepperConfig) -> Stepper {
    let mut stepper = Stepper::new(config.with_max_steps(20_000));
    stepper.load(source).unwrap();
    stepper
}

fn forward_states(stepper: &mut Stepper) -> Vec<ExecutionState> {
    let mut states = vec![stepper.state().deep_copy()];
    while stepper.can_step_forward() && stepper.step_forward() {
        states.push(stepper.state().deep_copy());
    }
    states
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_programs_compile(source in program()) {
        prop_assert!(stepper(&source, StepperConfig::new()).can_step_forward());
    }

    #[test]
    fn stepping_back_retraces_every_state(source in program()) {
        let mut stepper = stepper(&source, StepperConfig::new());
        let states = forward_states(&mut stepper);
        let final_state = stepper.state().deep_copy();

        for expected in states.iter().rev().skip(1) {
            prop_assert!(stepper.step_back());
            prop_assert_eq!(stepper.state(), expected);
        }
        prop_assert!(!stepper.step_back());
        prop_assert_eq!(stepper.current_step(), 0);

        let replayed = forward_states(&mut stepper);
        prop_assert_eq!(replayed, states);
        prop_assert_eq!(stepper.state(), &final_state);
    }

    #[test]
    fn exhausted_directions_are_idempotent(source in program()) {
        let mut stepper = stepper(&source, StepperConfig::new());
        stepper.to_end();
        let end = stepper.state().deep_copy();
        let end_step = stepper.current_step();
        if !stepper.can_step_forward() {
            prop_assert!(!stepper.step_forward());
            prop_assert_eq!(stepper.state(), &end);
            prop_assert_eq!(stepper.current_step(), end_step);
        }

        stepper.to_beginning();
        let start = stepper.state().deep_copy();
        prop_assert!(!stepper.can_step_backward());
        prop_assert!(!stepper.step_back());
        prop_assert_eq!(stepper.state(), &start);
    }

    #[test]
    fn answering_predictions_does_not_change_results(source in program()) {
        let mut plain = stepper(&source, StepperConfig::new());
        plain.to_end();

        let mut quiz = stepper(&source, StepperConfig::quiz());
        while quiz.step_forward() {
            if let Some(variable) = quiz.snapshot().prediction_variable {
                prop_assert!(quiz.submit_prediction(&variable, "0"));
            }
        }

        prop_assert_eq!(quiz.state().outputs(), plain.state().outputs());
        prop_assert_eq!(quiz.snapshot().variables, plain.snapshot().variables);
        prop_assert_eq!(
            quiz.state().error().map(|e| e.kind.clone()),
            plain.state().error().map(|e| e.kind.clone())
        );
    }
}
