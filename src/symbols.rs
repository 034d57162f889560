//! The closed symbol catalog: terminal kinds with their regex patterns and representable
//! factories, and non-terminal kinds with the evaluable variants they reduce to.

use crate::representable::{
    BinaryOperator, FunctionOperator, Keyword, Operand, Operator, Punctuator, Representable,
    ReturnAction, UnaryOperator,
};
use crate::{DslError, EvaluableKind, SymbolCatalog, TerminalDef, Token};
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A named class of token.
///
/// The base kinds are listed in lexing priority order by [base_symbols]; hosts register
/// further kinds through [Custom](TerminalKind::Custom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TerminalKind {
    Indexing,
    LeftSquareBracket,
    RightSquareBracket,
    Comma,
    Return,
    If,
    Elif,
    Then,
    Else,
    Count,
    Div,
    Mult,
    Mod,
    Plus,
    Minus,
    GreaterThanOrEqual,
    LessThanOrEqual,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
    Not,
    And,
    Or,
    LeftParenthesis,
    RightParenthesis,
    Bool,
    None,
    Str,
    Attribute,
    Variable,
    Float,
    Integer,
    /// Catch-all for unknown non-whitespace runs; always last in the catalog so unknown
    /// input surfaces as a syntax error instead of being skipped.
    Invalid,
    /// A host registered kind, identified by name.
    Custom(&'static str),
}

/// A named grammar variable; reduces to one [EvaluableKind].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminalKind {
    Block,
    IfStatement,
    ElifStatement,
    Action,
    ActionArg,
    ConditionExpr,
    ConditionTerm,
    ConditionFactor,
    Condition,
    Expression,
    Term,
    Factor,
    Operand,
    List,
    ListArg,
}

/// Either side of a production body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Terminal(TerminalKind),
    NonTerminal(NonTerminalKind),
}

impl NonTerminalKind {
    /// Every kind, in the order the grammar is rendered.
    pub const ALL: [NonTerminalKind; 15] = [
        NonTerminalKind::Block,
        NonTerminalKind::IfStatement,
        NonTerminalKind::ElifStatement,
        NonTerminalKind::Action,
        NonTerminalKind::ActionArg,
        NonTerminalKind::ConditionExpr,
        NonTerminalKind::ConditionTerm,
        NonTerminalKind::ConditionFactor,
        NonTerminalKind::Condition,
        NonTerminalKind::Expression,
        NonTerminalKind::Term,
        NonTerminalKind::Factor,
        NonTerminalKind::Operand,
        NonTerminalKind::List,
        NonTerminalKind::ListArg,
    ];

    /// The evaluable variant this non-terminal reduces to.
    ///
    /// The whole expression family shares [EvaluableKind::Expression]; operator
    /// precedence comes from the nesting of the grammar, not from per-kind variants.
    pub fn evaluable_kind(&self) -> EvaluableKind {
        match self {
            NonTerminalKind::Block => EvaluableKind::Block,
            NonTerminalKind::IfStatement => EvaluableKind::IfStatement,
            NonTerminalKind::ElifStatement => EvaluableKind::ElifStatement,
            NonTerminalKind::Action => EvaluableKind::Action,
            NonTerminalKind::ActionArg => EvaluableKind::ActionArg,
            NonTerminalKind::List => EvaluableKind::List,
            NonTerminalKind::ListArg => EvaluableKind::ListArg,
            NonTerminalKind::ConditionExpr
            | NonTerminalKind::ConditionTerm
            | NonTerminalKind::ConditionFactor
            | NonTerminalKind::Condition
            | NonTerminalKind::Expression
            | NonTerminalKind::Term
            | NonTerminalKind::Factor
            | NonTerminalKind::Operand => EvaluableKind::Expression,
        }
    }
}

impl Display for TerminalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalKind::Custom(name) => write!(f, "{}", name),
            kind => write!(f, "{:?}", kind),
        }
    }
}

impl Display for NonTerminalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Terminal(kind) => write!(f, "{}", kind),
            SymbolKind::NonTerminal(kind) => write!(f, "{}", kind),
        }
    }
}

impl From<TerminalKind> for SymbolKind {
    fn from(kind: TerminalKind) -> Self {
        SymbolKind::Terminal(kind)
    }
}

impl From<NonTerminalKind> for SymbolKind {
    fn from(kind: NonTerminalKind) -> Self {
        SymbolKind::NonTerminal(kind)
    }
}

impl TerminalDef {
    /// Define a terminal symbol from its kind, regex pattern and representable factory.
    pub fn new<F>(kind: TerminalKind, pattern: impl Into<Cow<'static, str>>, factory: F) -> Self
    where
        F: Fn(&str) -> Representable + Send + Sync + 'static,
    {
        Self {
            kind,
            pattern: pattern.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn kind(&self) -> TerminalKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The representable a matched lexeme of this kind stands for.
    pub fn represent(&self, lexeme: &str) -> Representable {
        (self.factory)(lexeme)
    }
}

impl Debug for TerminalDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalDef")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl SymbolCatalog {
    pub(crate) fn new(defs: Vec<TerminalDef>) -> Self {
        Self { defs }
    }

    pub fn defs(&self) -> &[TerminalDef] {
        &self.defs
    }

    pub fn get(&self, kind: TerminalKind) -> Option<&TerminalDef> {
        self.defs.iter().find(|def| def.kind == kind)
    }

    pub fn contains(&self, kind: TerminalKind) -> bool {
        self.get(kind).is_some()
    }

    /// Dispatch a token to its representable through the owning definition's factory.
    pub fn representable(&self, token: &Token) -> Result<Representable, DslError> {
        if token.kind == TerminalKind::Invalid {
            return Err(DslError::Generic(format!(
                "Invalid token '{}' has no representation.",
                token.lexeme
            )));
        }
        match self.get(token.kind) {
            Some(def) => Ok(def.represent(&token.lexeme)),
            None => Err(DslError::Generic(format!(
                "Token kind {} is not part of the active catalog.",
                token.kind
            ))),
        }
    }
}

/// The base terminal catalog in priority order.
///
/// Multi-character symbols precede their one-character prefixes (`>=` before `>`,
/// `COUNT(` before the variable pattern) and [TerminalKind::Invalid] absorbs anything
/// left over.
pub fn base_symbols() -> Vec<TerminalDef> {
    vec![
        TerminalDef::new(TerminalKind::Indexing, r"\[\d+\]", |lexeme| {
            let position = lexeme[1..lexeme.len() - 1].parse().unwrap_or(u64::MAX);
            Representable::Operator(Operator::Unary(UnaryOperator::Indexing(position)))
        }),
        TerminalDef::new(TerminalKind::LeftSquareBracket, r"\[", |_| {
            Representable::Punctuator(Punctuator::LeftSquareBracket)
        }),
        TerminalDef::new(TerminalKind::RightSquareBracket, r"\]", |_| {
            Representable::Punctuator(Punctuator::RightSquareBracket)
        }),
        TerminalDef::new(TerminalKind::Comma, r",", |_| {
            Representable::Punctuator(Punctuator::Comma)
        }),
        TerminalDef::new(TerminalKind::Return, r"RETURN\(", |_| {
            Representable::Action(Arc::new(ReturnAction))
        }),
        TerminalDef::new(TerminalKind::If, r"IF", |_| {
            Representable::Keyword(Keyword::If)
        }),
        TerminalDef::new(TerminalKind::Elif, r"ELIF", |_| {
            Representable::Keyword(Keyword::Elif)
        }),
        TerminalDef::new(TerminalKind::Then, r"THEN", |_| {
            Representable::Keyword(Keyword::Then)
        }),
        TerminalDef::new(TerminalKind::Else, r"ELSE", |_| {
            Representable::Keyword(Keyword::Else)
        }),
        TerminalDef::new(TerminalKind::Count, r"COUNT\(", |_| {
            Representable::Operator(Operator::Unary(UnaryOperator::Function(
                FunctionOperator::count(),
            )))
        }),
        TerminalDef::new(TerminalKind::Div, r"/", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::Div))
        }),
        TerminalDef::new(TerminalKind::Mult, r"\*", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::Mult))
        }),
        TerminalDef::new(TerminalKind::Mod, r"%", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::Mod))
        }),
        TerminalDef::new(TerminalKind::Plus, r"\+", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::Plus))
        }),
        TerminalDef::new(TerminalKind::Minus, r"-", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::Minus))
        }),
        TerminalDef::new(TerminalKind::GreaterThanOrEqual, r">=", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::GreaterThanOrEqual))
        }),
        TerminalDef::new(TerminalKind::LessThanOrEqual, r"<=", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::LessThanOrEqual))
        }),
        TerminalDef::new(TerminalKind::LessThan, r"<", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::LessThan))
        }),
        TerminalDef::new(TerminalKind::GreaterThan, r">", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::GreaterThan))
        }),
        TerminalDef::new(TerminalKind::Equal, r"==", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::Equal))
        }),
        TerminalDef::new(TerminalKind::NotEqual, r"!=", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::NotEqual))
        }),
        TerminalDef::new(TerminalKind::Not, r"NOT", |_| {
            Representable::Operator(Operator::Unary(UnaryOperator::Not))
        }),
        TerminalDef::new(TerminalKind::And, r"AND", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::And))
        }),
        TerminalDef::new(TerminalKind::Or, r"OR", |_| {
            Representable::Operator(Operator::Binary(BinaryOperator::Or))
        }),
        TerminalDef::new(TerminalKind::LeftParenthesis, r"\(", |_| {
            Representable::Punctuator(Punctuator::LeftParenthesis)
        }),
        TerminalDef::new(TerminalKind::RightParenthesis, r"\)", |_| {
            Representable::Punctuator(Punctuator::RightParenthesis)
        }),
        TerminalDef::new(TerminalKind::Bool, r"TRUE|FALSE", |lexeme| {
            Representable::Operand(Operand::Bool(lexeme == "TRUE"))
        }),
        TerminalDef::new(TerminalKind::None, r"None", |_| {
            Representable::Operand(Operand::None)
        }),
        TerminalDef::new(TerminalKind::Str, r#"'[^']*'|"[^"]*""#, |lexeme| {
            Representable::Operand(Operand::Str(unquote(lexeme)))
        }),
        TerminalDef::new(TerminalKind::Attribute, r"\.[A-Za-z]\w*", |lexeme| {
            Representable::Operator(Operator::Unary(UnaryOperator::Attribute(
                lexeme[1..].to_string(),
            )))
        }),
        TerminalDef::new(TerminalKind::Variable, r"[A-Za-z]\w*", |lexeme| {
            Representable::Operand(Operand::Variable(lexeme.to_string()))
        }),
        TerminalDef::new(TerminalKind::Float, r"\d+\.\d+", |lexeme| {
            Representable::Operand(Operand::Float(lexeme.parse().unwrap_or(0.0)))
        }),
        TerminalDef::new(TerminalKind::Integer, r"\d+", |lexeme| {
            // Digit runs beyond the i64 range degrade to a float.
            Representable::Operand(match lexeme.parse::<i64>() {
                Ok(value) => Operand::Int(value),
                Err(_) => Operand::Float(lexeme.parse().unwrap_or(f64::INFINITY)),
            })
        }),
        TerminalDef::new(TerminalKind::Invalid, r"[^ \n]+", |lexeme| {
            // Unreachable in the pipeline; the lexer rejects invalid tokens up front.
            Representable::Operand(Operand::Str(lexeme.to_string()))
        }),
    ]
}

fn unquote(lexeme: &str) -> String {
    let bytes = lexeme.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'\'' || bytes[0] == b'"')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        lexeme[1..lexeme.len() - 1].to_string()
    } else {
        lexeme.to_string()
    }
}
