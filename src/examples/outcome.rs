//! A custom `OUTCOME(n)` action family.
//!
//! Programs look like `IF Score > 0.85 THEN OUTCOME(3)`. The action only accepts the
//! outcome codes 1, 2 and 3, and its grammar rule restricts the argument to a single
//! operand, so `OUTCOME(1,2)` is already a syntax error.

use crate::representable::Representable;
use crate::{
    Action, Dsl, DslError, Environment, Grammar, Lexer, NonTerminalKind, Parser, Production,
    SymbolKind, TerminalDef, TerminalKind, Value,
};
use std::sync::Arc;

/// The terminal kind of the `OUTCOME(` symbol.
pub const OUTCOME_SYMBOL: TerminalKind = TerminalKind::Custom("OutcomeLiteral");

/// An action returning one of a closed set of outcome codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeAction;

impl Action for OutcomeAction {
    fn name(&self) -> &'static str {
        "OUTCOME"
    }

    fn validate_args(&self, args: &[Value]) -> bool {
        matches!(args, [Value::Int(code)] if (1..=3).contains(code))
    }

    fn execute(&self, mut args: Vec<Value>) -> Result<Value, DslError> {
        match args.len() {
            1 => Ok(args.remove(0)),
            n => Err(DslError::Runtime(format!(
                "OUTCOME takes exactly one argument, found {}.",
                n
            ))),
        }
    }
}

/// The lexer definition of the `OUTCOME(` symbol.
pub fn outcome_symbol() -> TerminalDef {
    TerminalDef::new(OUTCOME_SYMBOL, r"OUTCOME\(", |_| {
        Representable::Action(Arc::new(OutcomeAction))
    })
}

/// The base grammar with the action rule swapped for the `OUTCOME` family.
pub fn outcome_grammar() -> Grammar {
    use SymbolKind::Terminal as T;

    let mut grammar = Grammar::base();
    grammar.set_rule(
        NonTerminalKind::Action,
        vec![
            Production::new([
                T(OUTCOME_SYMBOL),
                T(TerminalKind::Variable),
                T(TerminalKind::RightParenthesis),
            ]),
            Production::new([
                T(OUTCOME_SYMBOL),
                T(TerminalKind::Str),
                T(TerminalKind::RightParenthesis),
            ]),
            Production::new([
                T(OUTCOME_SYMBOL),
                T(TerminalKind::Integer),
                T(TerminalKind::RightParenthesis),
            ]),
            Production::new([
                T(OUTCOME_SYMBOL),
                T(TerminalKind::Float),
                T(TerminalKind::RightParenthesis),
            ]),
            Production::new([
                T(OUTCOME_SYMBOL),
                T(TerminalKind::Bool),
                T(TerminalKind::RightParenthesis),
            ]),
            Production::new([
                T(OUTCOME_SYMBOL),
                T(TerminalKind::None),
                T(TerminalKind::RightParenthesis),
            ]),
        ],
    );
    grammar
}

/// Assemble a complete engine for `OUTCOME` programs over the given environment.
pub fn outcome_dsl(environment: Environment) -> Result<Dsl, crate::ImplementationError> {
    let lexer = Lexer::builder().include(outcome_symbol()).build()?;
    Ok(Dsl::new()
        .with_lexer(lexer)
        .with_parser(Parser::new(outcome_grammar()))
        .with_environment(environment))
}
