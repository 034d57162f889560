use super::env_from_json;
use crate::representable::{
    FunctionOperator, Operand, Operator, Representable, ReturnAction, UnaryOperator,
};
use crate::{
    Dsl, DslError, Environment, EvalNode, Evaluable, EvaluableKind, Grammar, Lexer,
    NonTerminalKind, Parser, Production, SymbolKind, TerminalDef, TerminalKind, Value,
};
use serde_json::json;
use std::sync::Arc;

fn dsl_with(env: Environment) -> Dsl {
    Dsl::new().with_environment(env)
}

fn return_action() -> EvalNode {
    EvalNode::Leaf(Representable::Action(Arc::new(ReturnAction)))
}

fn int(n: i64) -> EvalNode {
    EvalNode::Leaf(Representable::Operand(Operand::Int(n)))
}

fn action(contents: Vec<EvalNode>) -> Evaluable {
    Evaluable::with_contents(EvaluableKind::Action, contents)
}

mod validate {
    use super::*;

    #[test]
    fn null_outcome() {
        let outcome = Dsl::new()
            .validate("IF 2 > 1 THEN RETURN(3) ELSE RETURN(None)")
            .unwrap();
        assert!(outcome.is_valid);
        assert_eq!(
            outcome.actions,
            vec![
                action(vec![return_action(), int(3)]),
                action(vec![
                    return_action(),
                    EvalNode::Leaf(Representable::Operand(Operand::None)),
                ]),
            ]
        );
        assert!(outcome.error.is_none());
    }

    #[test]
    fn single_outcome() {
        let outcome = Dsl::new().validate("IF 2 > 1 THEN RETURN(3)").unwrap();
        assert!(outcome.is_valid);
        assert_eq!(outcome.actions, vec![action(vec![return_action(), int(3)])]);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn two_outcomes() {
        let outcome = Dsl::new()
            .validate("IF 1.2 > 3.4 THEN RETURN(5) IF 8 > 6.7 THEN RETURN(9)")
            .unwrap();
        assert!(outcome.is_valid);
        assert_eq!(
            outcome.actions,
            vec![
                action(vec![return_action(), int(5)]),
                action(vec![return_action(), int(9)]),
            ]
        );
    }

    #[test]
    fn three_outcomes() {
        let outcome = Dsl::new()
            .validate("IF 1.2 > 3.4 THEN RETURN(5) IF 8 > 6.7 THEN RETURN(9) ELSE RETURN(3)")
            .unwrap();
        assert!(outcome.is_valid);
        assert_eq!(
            outcome.actions,
            vec![
                action(vec![return_action(), int(5)]),
                action(vec![return_action(), int(9)]),
                action(vec![return_action(), int(3)]),
            ]
        );
    }

    #[test]
    fn invalid_syntax_is_captured() {
        for input in [
            "IF 2 £$@ == #~?? 2 THEN RETURN(1)",
            "IF IF THEN RETURN(2)",
            "IF 2 > 1 THEN ELSE",
            "IF 1 == 1 THEN RETURN(3) ELSE RETURN(4) IF",
        ] {
            let outcome = Dsl::new().validate(input).unwrap();
            assert!(!outcome.is_valid, "input: {}", input);
            assert!(outcome.actions.is_empty(), "input: {}", input);
            assert!(
                matches!(outcome.error, Some(DslError::Syntax(_))),
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn count_ladder() {
        let dsl = dsl_with(env_from_json(json!({"Answers": ["F1", "F2", "F1", "F1"]})));
        let outcome = dsl
            .validate(
                "IF COUNT(Answers == 'F4') > 0 THEN RETURN(5)\
                 IF COUNT(Answers == 'F3') > 0 THEN RETURN(4)\
                 IF COUNT(Answers == 'F2') > 0 THEN RETURN(3)\
                 IF COUNT(Answers == 'F1') > 0 THEN RETURN(2)\
                 ELSE RETURN(None)",
            )
            .unwrap();
        assert!(outcome.is_valid);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn included_symbol_with_a_custom_factor_rule() {
        let foo_symbol = TerminalDef::new(TerminalKind::Custom("FooFunc"), r"FooFunc\(", |_| {
            Representable::Operator(Operator::Unary(UnaryOperator::Function(
                FunctionOperator::new("FooFunc", |x| match x.as_int() {
                    Some(n) => Ok(Value::Int(n % 3 + 1)),
                    None => Err(DslError::Runtime("FooFunc expects an integer.".into())),
                }),
            )))
        });

        let mut foo_grammar = Grammar::base();
        {
            use SymbolKind::{NonTerminal as N, Terminal as T};
            foo_grammar.set_rule(
                NonTerminalKind::Factor,
                vec![
                    Production::new([
                        T(TerminalKind::Custom("FooFunc")),
                        N(NonTerminalKind::ConditionExpr),
                        T(TerminalKind::RightParenthesis),
                    ]),
                    Production::new([
                        T(TerminalKind::Variable),
                        T(TerminalKind::Attribute),
                        T(TerminalKind::Attribute),
                    ]),
                    Production::new([
                        T(TerminalKind::Variable),
                        T(TerminalKind::Indexing),
                        T(TerminalKind::Attribute),
                    ]),
                    Production::new([T(TerminalKind::Variable), T(TerminalKind::Attribute)]),
                    Production::new([T(TerminalKind::Variable), T(TerminalKind::Indexing)]),
                    Production::new([N(NonTerminalKind::Operand)]),
                ],
            );
        }

        let plain_outcome = Dsl::new()
            .validate("IF FooFunc(3) == 1 THEN RETURN(3)")
            .unwrap();
        assert!(!plain_outcome.is_valid);
        assert!(matches!(plain_outcome.error, Some(DslError::Syntax(_))));

        let lexer = Lexer::builder().include(foo_symbol).build().unwrap();
        let dsl = Dsl::new()
            .with_lexer(lexer)
            .with_parser(Parser::new(foo_grammar));
        let outcome = dsl.validate("IF FooFunc(3) == 1 THEN RETURN(3)").unwrap();
        assert!(outcome.is_valid, "{:?}", outcome.error);
        assert_eq!(outcome.actions, vec![action(vec![return_action(), int(3)])]);

        assert_eq!(
            dsl.execute("IF FooFunc(3) == 1 THEN RETURN(3)").unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn excluded_symbol_is_a_syntax_error() {
        let lexer = Lexer::builder()
            .exclude(TerminalKind::Plus)
            .build()
            .unwrap();
        let outcome = Dsl::new()
            .with_lexer(lexer)
            .validate("IF 1 + 2 == 3 THEN RETURN(3)")
            .unwrap();
        assert!(!outcome.is_valid);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn multiple_arg_return_structure() {
        let outcome = Dsl::new().validate("IF TRUE THEN RETURN(1,2,3)").unwrap();
        assert!(outcome.is_valid);
        assert_eq!(
            outcome.actions,
            vec![action(vec![
                return_action(),
                int(1),
                EvalNode::Tree(Evaluable::with_contents(
                    EvaluableKind::ActionArg,
                    vec![int(2), int(3)],
                )),
            ])]
        );
    }

    #[test]
    fn return_list_structure() {
        let outcome = Dsl::new().validate("IF TRUE THEN RETURN([1,2,3])").unwrap();
        assert!(outcome.is_valid);
        assert_eq!(
            outcome.actions,
            vec![action(vec![
                return_action(),
                EvalNode::Tree(Evaluable::with_contents(
                    EvaluableKind::List,
                    vec![
                        int(1),
                        EvalNode::Tree(Evaluable::with_contents(
                            EvaluableKind::ListArg,
                            vec![int(2), int(3)],
                        )),
                    ],
                )),
            ])]
        );
    }

    #[test]
    fn non_evaluable_root_is_a_validation_error() {
        let outcome = Dsl::new()
            .with_start_symbol(NonTerminalKind::Operand)
            .validate("TRUE")
            .unwrap();
        assert!(!outcome.is_valid);
        assert!(outcome.actions.is_empty());
        assert!(matches!(outcome.error, Some(DslError::Validation(_))));
    }

    #[test]
    fn missing_variable_argument_propagates_as_runtime_error() {
        let error = Dsl::new()
            .validate("IF 1 > 0 THEN RETURN(missing)")
            .unwrap_err();
        assert!(matches!(error, DslError::Runtime(_)), "{:?}", error);
    }
}

mod execute {
    use super::*;

    #[test]
    fn null_outcome() {
        assert_eq!(
            Dsl::new()
                .execute("IF 0 > 1 THEN RETURN(3) ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Null]
        );
    }

    #[test]
    fn single_if_statement() {
        assert_eq!(
            Dsl::new().execute("IF 2 > 1 THEN RETURN(3)").unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn elif_statement() {
        assert_eq!(
            Dsl::new()
                .execute("IF 1 > 2 THEN RETURN(3) ELIF 8 > 6.7 THEN RETURN(9)")
                .unwrap(),
            vec![Value::Int(9)]
        );
    }

    #[test]
    fn two_if_statements() {
        assert_eq!(
            Dsl::new()
                .execute("IF 2 > 1 THEN RETURN(3) IF 3 > 2 THEN RETURN(4)")
                .unwrap(),
            vec![Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn else_statement() {
        assert_eq!(
            Dsl::new()
                .execute("IF 1 > 2 THEN RETURN(3) IF 4 > 5 THEN RETURN(6) ELSE RETURN(7)")
                .unwrap(),
            vec![Value::Int(7)]
        );
    }

    #[test]
    fn parenthesis() {
        assert_eq!(
            Dsl::new().execute("IF (1 + 2) == 3 THEN RETURN(3)").unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn nested_parenthesis() {
        let dsl = dsl_with(env_from_json(json!({"FooVar": true})));
        assert_eq!(
            dsl.execute("IF ((1 + 2) == 3) == FooVar THEN RETURN(3)")
                .unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(
            Dsl::new()
                .execute("IF 1 + 2 * 3 == 7 THEN RETURN(1) ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Int(1)]
        );
        assert_eq!(
            Dsl::new()
                .execute("IF (1 + 2) * 3 == 9 THEN RETURN(1) ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Int(1)]
        );
    }

    #[test]
    fn not_operator() {
        assert_eq!(
            Dsl::new()
                .execute("IF NOT 1 > 2 THEN RETURN('bar') ELSE RETURN(3)")
                .unwrap(),
            vec![Value::Str("bar".into())]
        );
    }

    #[test]
    fn or_operator() {
        assert_eq!(
            Dsl::new().execute("IF 1 > 2 OR 2 > 1 THEN RETURN(3)").unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn and_operator() {
        assert_eq!(
            Dsl::new()
                .execute("IF 3 > 2 AND 2 > 3 THEN RETURN(3) ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Null]
        );
    }

    #[test]
    fn not_and_or_precedence() {
        assert_eq!(
            Dsl::new()
                .execute("IF 0 == 1 OR NOT 2 == 3 AND 4 > 3 THEN RETURN('foo') ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Str("foo".into())]
        );
    }

    #[test]
    fn count_function() {
        let dsl = dsl_with(env_from_json(json!({"BooList": [true, false, true]})));
        assert_eq!(
            dsl.execute("IF COUNT(BooList) == 2 THEN RETURN(1)").unwrap(),
            vec![Value::Int(1)]
        );
    }

    #[test]
    fn indexing() {
        let dsl = dsl_with(env_from_json(json!({"alphabet": ["a", "b", "c"]})));
        assert_eq!(
            dsl.execute("IF alphabet[2] == 'b' THEN RETURN('b') ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Str("b".into())]
        );
    }

    #[test]
    fn attribute_on_a_map() {
        let dsl = dsl_with(env_from_json(json!({"foo": {"bar": 1}})));
        assert_eq!(
            dsl.execute("IF foo.bar == 1 THEN RETURN(1)").unwrap(),
            vec![Value::Int(1)]
        );
    }

    #[test]
    fn attribute_over_a_list() {
        let dsl = dsl_with(env_from_json(
            json!({"a": [{"bar": 1}, {"bar": 2}, {"bar": 3}]}),
        ));
        assert_eq!(
            dsl.execute("IF COUNT(a.bar == 1) == 1 THEN RETURN(1)").unwrap(),
            vec![Value::Int(1)]
        );
    }

    #[test]
    fn stacked_attributes_do_not_collapse() {
        let dsl = dsl_with(env_from_json(json!({"foo": {"bar": {"cool": 1}}})));
        assert_eq!(
            dsl.execute("IF foo.bar == 1 THEN RETURN(1) ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Null]
        );
    }

    #[test]
    fn stacked_attributes_resolve() {
        let dsl = dsl_with(env_from_json(json!({"foo": {"bar": {"cool": 1}}})));
        assert_eq!(
            dsl.execute("IF foo.bar.cool == 1 THEN RETURN(1) ELSE RETURN(2)")
                .unwrap(),
            vec![Value::Int(1)]
        );
    }

    #[test]
    fn variable_in_the_action() {
        let dsl = dsl_with(env_from_json(
            json!({"TotalScore": 0.9, "output": "foobar"}),
        ));
        assert_eq!(
            dsl.execute("IF TotalScore > 0.8 THEN RETURN(output)").unwrap(),
            vec![Value::Str("foobar".into())]
        );
    }

    #[test]
    fn newlines_are_whitespace() {
        assert_eq!(
            Dsl::new().execute("IF 2 == 2 \n THEN RETURN(1)").unwrap(),
            vec![Value::Int(1)]
        );
    }

    #[test]
    fn invalid_characters_raise() {
        let error = Dsl::new()
            .execute("IF 2 £$@ == #~?? 2 THEN RETURN(1)")
            .unwrap_err();
        assert!(matches!(error, DslError::Syntax(_)), "{:?}", error);
    }

    #[test]
    fn filtering_by_one_attribute() {
        let dsl = dsl_with(env_from_json(
            json!({"foo": [{"bar": 1}, {"bar": 2}, {"bar": 2}]}),
        ));
        assert_eq!(
            dsl.execute("IF COUNT(foo.bar == 2) == 2 THEN RETURN(3) ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn filtering_by_two_attributes() {
        let dsl = dsl_with(env_from_json(json!({
            "a": [{"b": 1, "c": "d"}, {"b": 2, "c": "d"}, {"b": 2, "c": "e"}]
        })));
        assert_eq!(
            dsl.execute("IF COUNT(a.b == 2 AND a.c == 'd') == 1 THEN RETURN(3) ELSE RETURN(None)")
                .unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn filtering_with_a_negation() {
        let dsl = dsl_with(env_from_json(json!({
            "a": [{"b": 3, "c": "d"}, {"b": 2, "c": "d"}, {"b": 2, "c": "e"}]
        })));
        assert_eq!(
            dsl.execute(
                "IF COUNT(a.b == 2 AND NOT a.c == 'd') == 1 THEN RETURN(3) ELSE RETURN(None)"
            )
            .unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn count_ladder_fires_two_branches() {
        let dsl = dsl_with(env_from_json(json!({"Answers": ["F1", "F2", "F1", "F1"]})));
        assert_eq!(
            dsl.execute(
                "IF COUNT(Answers == 'F4') > 0 THEN RETURN(4)\
                 IF COUNT(Answers == 'F3') > 0 THEN RETURN(3)\
                 IF COUNT(Answers == 'F2') > 0 THEN RETURN(2)\
                 IF COUNT(Answers == 'F1') > 0 THEN RETURN(1)\
                 ELSE RETURN(None)"
            )
            .unwrap(),
            vec![Value::Int(2), Value::Int(1)]
        );
    }

    #[test]
    fn count_ladder_falls_through_to_else() {
        let dsl = dsl_with(env_from_json(json!({"Answers": ["F0", "F0", "F0", "F0"]})));
        assert_eq!(
            dsl.execute(
                "IF COUNT(Answers == 'F4') > 0 THEN RETURN(4)\
                 IF COUNT(Answers == 'F3') > 0 THEN RETURN(3)\
                 IF COUNT(Answers == 'F2') > 0 THEN RETURN(2)\
                 IF COUNT(Answers == 'F1') > 0 THEN RETURN(1)\
                 ELSE RETURN(None)"
            )
            .unwrap(),
            vec![Value::Null]
        );
    }

    #[test]
    fn nested_actions_cannot_be_parsed() {
        let error = Dsl::new()
            .execute("IF 3 > 2 THEN RETURN(RETURN(3))")
            .unwrap_err();
        assert!(error.message().contains("Input cannot be parsed."), "{}", error);
    }

    #[test]
    fn sequential_actions_cannot_be_parsed() {
        let error = Dsl::new()
            .execute("IF 3 > 2 THEN RETURN(1) RETURN(2)")
            .unwrap_err();
        assert!(error.message().contains("Input cannot be parsed."), "{}", error);
    }

    #[test]
    fn count_divided_as_a_factor() {
        let dsl = dsl_with(env_from_json(json!({
            "Answers": [
                {"Text": "Pass", "OptionNumId": 1},
                {"Text": "Fail", "OptionNumId": 2},
                {"Text": "Fail", "OptionNumId": 1},
            ]
        })));
        assert_eq!(
            dsl.execute("IF COUNT(Answers.Text == 'Fail') / 3 > 0.2 THEN RETURN(3)")
                .unwrap(),
            vec![Value::Int(3)]
        );
    }

    #[test]
    fn multiple_arg_return_yields_a_sequence() {
        assert_eq!(
            Dsl::new().execute("IF TRUE THEN RETURN(1,2,3)").unwrap(),
            vec![Value::List(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
            ])]
        );
    }

    #[test]
    fn return_list() {
        assert_eq!(
            Dsl::new().execute("IF TRUE THEN RETURN([1,2,3])").unwrap(),
            vec![Value::List(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
            ])]
        );
    }

    #[test]
    fn list_condition_and_list_result() {
        assert_eq!(
            Dsl::new()
                .execute("IF COUNT([1,0,1]) == 2 THEN RETURN([1,2,3])")
                .unwrap(),
            vec![Value::List(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
            ])]
        );
    }

    #[test]
    fn nested_lists_keep_a_leading_nest() {
        assert_eq!(
            Dsl::new().execute("IF TRUE THEN RETURN([[1,2],2,3])").unwrap(),
            vec![Value::List(vec![
                Value::List(vec![Value::Int(1), Value::Int(2)]),
                Value::Int(2),
                Value::Int(3),
            ])]
        );
    }

    #[test]
    fn missing_variable_is_a_runtime_error() {
        let error = Dsl::new()
            .execute("IF missing > 1 THEN RETURN(1)")
            .unwrap_err();
        assert!(matches!(error, DslError::Runtime(_)), "{:?}", error);
        assert!(error.message().contains("missing does not exist."), "{}", error);
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let error = Dsl::new().execute("IF 1 / 0 > 1 THEN RETURN(1)").unwrap_err();
        assert!(matches!(error, DslError::Runtime(_)), "{:?}", error);
    }

    #[test]
    fn cached_trees_re_evaluate_against_new_environments() {
        let dsl = Dsl::new();
        let tree = dsl
            .construct("IF Score > 0.8 THEN RETURN(1) ELSE RETURN(2)")
            .unwrap();

        let mut high = Environment::new();
        high.define("Score", Value::Float(0.9));
        let mut low = Environment::new();
        low.define("Score", Value::Float(0.5));

        assert_eq!(
            tree.evaluate(&high).unwrap(),
            crate::Evaluation::Values(vec![Value::Int(1)])
        );
        assert_eq!(
            tree.evaluate(&low).unwrap(),
            crate::Evaluation::Values(vec![Value::Int(2)])
        );
    }
}
