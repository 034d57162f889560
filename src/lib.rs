//! `rule-dsl` is an embeddable rule engine to validate and execute programs written in a
//! small conditional expression language.
//!
//! # Overview
//!
//! A program is a block of `IF <condition> THEN <action>` statements, optionally chained
//! with `ELIF` and `ELSE` branches. Conditions are boolean/arithmetic expressions over
//! literals and host supplied variables; actions return arbitrary [values](Value) to the
//! host. Executing a block yields the ordered list of results of every branch that fired.
//!
//! The engine is assembled from small, individually reusable pieces:
//!
//! * a symbol catalog of [terminal kinds](TerminalKind), each carrying a regex pattern and
//!   a factory for the [Representable] it stands for,
//! * a declarative [Grammar] mapping each [non-terminal kind](NonTerminalKind) to an
//!   ordered list of [productions](Production),
//! * a [Lexer] which compiles the active catalog into one union regex and produces a
//!   [Token] stream,
//! * a [Parser] which expands the grammar top-down over the token stream into a concrete
//!   [parse tree](ParseNode), memoizing rejected productions while backtracking,
//! * a [reducer](reduce) which collapses the parse tree into a tree of [Evaluable] nodes,
//! * and the [Evaluable] tree itself, which evaluates against an [Environment].
//!
//! The [Dsl] facade wires the stages together and exposes [validate](Dsl::validate) and
//! [execute](Dsl::execute).
//!
//! # Example
//!
//! ```
//! use rule_dsl::{Dsl, Environment, Value};
//!
//! let mut env = Environment::new();
//! env.define("Answers", Value::List(vec![
//!     Value::Str("F1".into()),
//!     Value::Str("F2".into()),
//!     Value::Str("F1".into()),
//! ]));
//!
//! let dsl = Dsl::new().with_environment(env);
//!
//! let outputs = dsl
//!     .execute(
//!         "IF COUNT(Answers == 'F2') > 1 THEN RETURN(2) \
//!          ELIF COUNT(Answers == 'F1') == 2 THEN RETURN(1) \
//!          ELSE RETURN(None)",
//!     )
//!     .unwrap();
//! assert_eq!(outputs, vec![Value::Int(1)]);
//! ```
//!
//! # Host extension
//!
//! Hosts can register additional terminal symbols on the lexer, replace grammar rules on
//! the parser, and plug custom [Action] implementations into the action rule. The
//! [examples] module builds a complete `OUTCOME(n)` action family this way.
//!
//! # License
//! [rule-dsl](crate) is provided under the MIT or Apache-2.0 license.

mod dsl;
mod env;
mod error;
mod evaluable;
pub mod examples;
mod grammar;
mod lexer;
mod parser;
mod reducer;
pub mod representable;
mod symbols;
mod tree;
mod util;
mod value;

#[cfg(test)]
mod __tests__;

use once_cell::sync::OnceCell;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

pub use env::Environment;
pub use evaluable::{EvalNode, Evaluable, EvaluableKind, Evaluation};
pub use reducer::reduce;
pub use representable::{
    BinaryOperator, FunctionOperator, Keyword, Operand, Operator, Punctuator, Representable,
    UnaryOperator,
};
pub use symbols::{base_symbols, NonTerminalKind, SymbolKind, TerminalKind};
pub use tree::ParseNode;
pub use util::{Log, Position, Source};
pub use value::Value;

/// A callback a host wires into the action rule of the grammar.
///
/// Actions are the only side-effecting constructs of the language. They may appear solely
/// behind `THEN`/`ELSE`, never inside expressions, so the evaluation order of actions is
/// the source order of their statements.
pub trait Action: Debug + Send + Sync {
    /// Name of the action family, used for display and equality.
    fn name(&self) -> &'static str;

    /// Whether the literal argument values are acceptable for this action.
    fn validate_args(&self, args: &[Value]) -> bool;

    /// Run the action with the evaluated, flattened arguments.
    fn execute(&self, args: Vec<Value>) -> Result<Value, DslError>;
}

/// Element of the tokenized input.
///
/// Two tokens are equal iff they carry the same [TerminalKind] and the same lexeme; the
/// span fields only feed error positions.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TerminalKind,
    pub lexeme: String,
    pub start: usize,
    pub end: usize,
}

/// A terminal symbol definition: a [TerminalKind] together with its regex pattern and the
/// factory producing the [Representable] a matched lexeme stands for.
#[derive(Clone)]
pub struct TerminalDef {
    kind: TerminalKind,
    pattern: Cow<'static, str>,
    factory: Arc<dyn Fn(&str) -> Representable + Send + Sync>,
}

/// The ordered list of active [TerminalDef]s of a [Lexer].
///
/// Order is load bearing: the union regex matches alternatives first to last, so
/// multi-character symbols must precede their one-character prefixes and the catch-all
/// invalid symbol must come last.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    defs: Vec<TerminalDef>,
}

/// An immutable ordered sequence of symbol kinds; one alternative of a grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    body: Box<[SymbolKind]>,
}

/// A mapping from each [NonTerminalKind] to its ordered list of [productions](Production).
///
/// The parser tries productions in listed order, which is how precedence and
/// associativity are encoded; longer right-recursive productions are listed before their
/// shorter prefixes.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: HashMap<NonTerminalKind, Vec<Production>>,
}

/// The configurable tokenizer.
///
/// A lexer is built from the base symbol catalog, host included symbols (prepended, so
/// they take priority), and host excluded kinds. The active catalog is compiled into a
/// single union regex of named groups; scanning yields one token per non-overlapping
/// match and skips whitespace implicitly.
pub struct Lexer {
    catalog: SymbolCatalog,
    pattern: Regex,
    group_names: Vec<String>,
    log: OnceCell<Log<&'static str>>,
}

/// Configuration collected before compiling a [Lexer].
pub struct LexerBuilder {
    base: Vec<TerminalDef>,
    inclusions: Vec<TerminalDef>,
    exclusions: Vec<TerminalKind>,
}

/// The grammar driven recursive descent parser.
///
/// Expansion is top-down with backtracking; `(production, position)` pairs that failed
/// are memoized per call so no production is retried at the same input position.
pub struct Parser {
    grammar: Grammar,
    log: OnceCell<Log<&'static str>>,
}

/// The facade composing lexer, parser, reducer and evaluator.
pub struct Dsl {
    lexer: Lexer,
    parser: Parser,
    start_symbol: NonTerminalKind,
    environment: Environment,
}

/// Result of [Dsl::validate]: the valid flag, every action evaluable found in the
/// program, and the syntax or validation error if there was one.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub actions: Vec<Evaluable>,
    pub error: Option<DslError>,
}

/// An error raised while turning input text into results.
#[derive(Debug, Clone, PartialEq)]
pub enum DslError {
    /// Unknown lexeme, or the parser could not consume the full token stream.
    Syntax(String),
    /// An action rejected its arguments, or the program did not reduce to an evaluable.
    Validation(String),
    /// Evaluation failed: dangling operands or operators, unresolved variable lookup,
    /// invalid action wrapper, bad operand types.
    Runtime(String),
    /// An internal invariant was violated; indicates a malformed hand-built tree.
    Generic(String),
}

/// An error returned due to failed validation of host configuration, e.g. an invalid or
/// nullable regex pattern for an included symbol.
#[derive(Debug)]
pub struct ImplementationError {
    message: String,
    what: String,
}
