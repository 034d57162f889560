use crate::__tests__::env_from_json;
use crate::examples::outcome::{outcome_dsl, OutcomeAction};
use crate::representable::Representable;
use crate::{Action, DslError, Environment, EvalNode, Evaluable, EvaluableKind, Value};
use serde_json::json;
use std::sync::Arc;

fn outcome_action(code: i64) -> Evaluable {
    Evaluable::with_contents(
        EvaluableKind::Action,
        vec![
            EvalNode::Leaf(Representable::Action(Arc::new(OutcomeAction))),
            EvalNode::Leaf(Representable::Operand(
                crate::representable::Operand::Int(code),
            )),
        ],
    )
}

#[test]
fn outcome_action_accepts_only_known_codes() {
    let action = OutcomeAction;
    assert!(action.validate_args(&[Value::Int(1)]));
    assert!(action.validate_args(&[Value::Int(3)]));
    assert!(!action.validate_args(&[Value::Int(4)]));
    assert!(!action.validate_args(&[Value::Str("1".into())]));
    assert!(!action.validate_args(&[Value::Int(1), Value::Int(2)]));
}

#[test]
fn validates_a_single_outcome() {
    let dsl = outcome_dsl(Environment::new()).unwrap();
    let outcome = dsl.validate("IF 2 > 1 THEN OUTCOME(3)").unwrap();
    assert!(outcome.is_valid, "{:?}", outcome.error);
    assert_eq!(outcome.actions, vec![outcome_action(3)]);
    assert!(outcome.error.is_none());
}

#[test]
fn two_actions_behind_one_then_are_a_syntax_error() {
    let dsl = outcome_dsl(Environment::new()).unwrap();
    let outcome = dsl.validate("IF 2 > 1 THEN OUTCOME(2) OUTCOME(3)").unwrap();
    assert!(!outcome.is_valid);
    assert!(outcome.actions.is_empty());
    assert!(matches!(outcome.error, Some(DslError::Syntax(_))));
}

#[test]
fn unknown_outcome_code_is_a_validation_error() {
    let dsl = outcome_dsl(Environment::new()).unwrap();
    let outcome = dsl.validate("IF 2 > 1 THEN OUTCOME(4)").unwrap();
    assert!(!outcome.is_valid);
    assert!(outcome.actions.is_empty());
    assert!(matches!(outcome.error, Some(DslError::Validation(_))));
}

#[test]
fn validates_a_full_program() {
    let env = env_from_json(json!({
        "Answers": [{"Text": "Pass"}, {"Text": "Fail"}, {"Text": "Pass"}],
        "Score": 0.9,
    }));
    let dsl = outcome_dsl(env).unwrap();
    let outcome = dsl
        .validate(
            "IF COUNT(Answers.Text == 'Fail') > 0 THEN OUTCOME(1)\
             ELSE OUTCOME(2)\
             IF Score > 0.85 THEN OUTCOME(3)",
        )
        .unwrap();
    assert!(outcome.is_valid, "{:?}", outcome.error);
    assert_eq!(
        outcome.actions,
        vec![outcome_action(1), outcome_action(2), outcome_action(3)]
    );
}

#[test]
fn executes_a_full_program() {
    let env = env_from_json(json!({
        "Answers": [{"Text": "Pass"}, {"Text": "Fail"}],
        "Score": 0.9,
    }));
    let dsl = outcome_dsl(env).unwrap();
    assert_eq!(
        dsl.execute(
            "IF COUNT(Answers.Text == 'Fail') > 0 THEN OUTCOME(1)\
             ELSE OUTCOME(2)\
             IF Score > 0.85 THEN OUTCOME(3)",
        )
        .unwrap(),
        vec![Value::Int(1), Value::Int(3)]
    );
}
