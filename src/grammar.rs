use crate::{Grammar, NonTerminalKind, Production, SymbolKind, TerminalKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Write};

impl Production {
    /// Create a production from its ordered body of symbol kinds.
    pub fn new(body: impl IntoIterator<Item = SymbolKind>) -> Self {
        Self {
            body: body.into_iter().collect(),
        }
    }

    pub fn body(&self) -> &[SymbolKind] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, symbol) in self.body.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

static BASE_GRAMMAR: Lazy<Grammar> = Lazy::new(build_base_grammar);

impl Default for Grammar {
    fn default() -> Self {
        Grammar::base()
    }
}

impl Grammar {
    /// The base statement/expression grammar, started from [NonTerminalKind::Block].
    pub fn base() -> Self {
        BASE_GRAMMAR.clone()
    }

    /// A grammar without any rules; every rule must be supplied through
    /// [set_rule](Grammar::set_rule).
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Replace the alternatives of a rule.
    ///
    /// The listed order is the order the parser tries them in, so longer productions
    /// must precede the prefixes they extend.
    pub fn set_rule(&mut self, kind: NonTerminalKind, productions: Vec<Production>) -> &mut Self {
        self.rules.insert(kind, productions);
        self
    }

    /// The ordered alternatives of a rule.
    pub fn productions(&self, kind: NonTerminalKind) -> &[Production] {
        match self.rules.get(&kind) {
            Some(productions) => productions,
            None => {
                if cfg!(debug_assertions) {
                    panic!("No productions are set for {}.", kind);
                }
                &[]
            }
        }
    }

    pub fn has_rule(&self, kind: NonTerminalKind) -> bool {
        self.rules.contains_key(&kind)
    }

    /// Render the grammar as a human readable rule listing.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut writer = String::new();
        for kind in NonTerminalKind::ALL {
            let productions = match self.rules.get(&kind) {
                Some(productions) => productions,
                None => continue,
            };
            writeln!(writer, "{}", kind)?;
            for (index, production) in productions.iter().enumerate() {
                if index == 0 {
                    writeln!(writer, "{:>6} {}", ":", production)?;
                } else {
                    writeln!(writer, "{:>6} {}", "|", production)?;
                }
            }
            writeln!(writer)?;
        }
        Ok(writer)
    }
}

fn build_base_grammar() -> Grammar {
    use NonTerminalKind::*;
    use SymbolKind::{NonTerminal as N, Terminal as T};
    use TerminalKind::*;

    let mut grammar = Grammar::empty();
    grammar.set_rule(
        Block,
        vec![
            Production::new([N(IfStatement), N(Block)]),
            Production::new([N(IfStatement)]),
        ],
    );
    grammar.set_rule(
        IfStatement,
        vec![
            Production::new([
                T(If),
                N(ConditionExpr),
                T(Then),
                N(Action),
                N(ElifStatement),
            ]),
            Production::new([T(If), N(ConditionExpr), T(Then), N(Action)]),
        ],
    );
    grammar.set_rule(
        ElifStatement,
        vec![
            Production::new([T(Else), N(Action)]),
            Production::new([
                T(Elif),
                N(ConditionExpr),
                T(Then),
                N(Action),
                N(ElifStatement),
            ]),
            Production::new([T(Elif), N(ConditionExpr), T(Then), N(Action)]),
        ],
    );
    grammar.set_rule(
        Action,
        vec![
            Production::new([T(Return), N(Operand), T(RightParenthesis)]),
            Production::new([T(Return), N(Operand), N(ActionArg)]),
        ],
    );
    grammar.set_rule(
        ActionArg,
        vec![
            Production::new([T(Comma), N(Operand), T(RightParenthesis)]),
            Production::new([T(Comma), N(Operand), N(ActionArg)]),
        ],
    );
    grammar.set_rule(
        ConditionExpr,
        vec![
            Production::new([N(ConditionTerm), T(Or), N(ConditionExpr)]),
            Production::new([N(ConditionTerm)]),
        ],
    );
    grammar.set_rule(
        ConditionTerm,
        vec![
            Production::new([N(ConditionFactor), T(And), N(ConditionExpr)]),
            Production::new([N(ConditionFactor)]),
        ],
    );
    grammar.set_rule(
        ConditionFactor,
        vec![
            Production::new([T(Not), N(Condition)]),
            Production::new([T(Bool)]),
            Production::new([N(Condition)]),
        ],
    );
    grammar.set_rule(
        Condition,
        vec![
            Production::new([N(Expression), T(Equal), N(Condition)]),
            Production::new([N(Expression), T(NotEqual), N(Condition)]),
            Production::new([N(Expression), T(GreaterThan), N(Condition)]),
            Production::new([N(Expression), T(LessThan), N(Condition)]),
            Production::new([N(Expression), T(LessThanOrEqual), N(Condition)]),
            Production::new([N(Expression), T(GreaterThanOrEqual), N(Condition)]),
            Production::new([N(Expression)]),
        ],
    );
    grammar.set_rule(
        Expression,
        vec![
            Production::new([N(Term), T(Plus), N(Expression)]),
            Production::new([N(Term), T(Minus), N(Expression)]),
            Production::new([N(Term)]),
        ],
    );
    grammar.set_rule(
        Term,
        vec![
            Production::new([N(Factor), T(Mult), N(Expression)]),
            Production::new([N(Factor), T(Div), N(Expression)]),
            Production::new([N(Factor), T(Mod), N(Expression)]),
            Production::new([N(Factor)]),
        ],
    );
    grammar.set_rule(
        Factor,
        vec![
            Production::new([T(Count), N(ConditionExpr), T(RightParenthesis)]),
            Production::new([T(Variable), T(Attribute), T(Attribute)]),
            Production::new([T(Variable), T(Indexing), T(Attribute)]),
            Production::new([T(Variable), T(Attribute)]),
            Production::new([T(Variable), T(Indexing)]),
            Production::new([N(Operand)]),
            Production::new([
                T(LeftParenthesis),
                N(Condition),
                T(RightParenthesis),
            ]),
        ],
    );
    grammar.set_rule(
        Operand,
        vec![
            Production::new([T(Variable)]),
            Production::new([T(Integer)]),
            Production::new([T(Float)]),
            Production::new([T(Str)]),
            Production::new([T(Bool)]),
            Production::new([T(TerminalKind::None)]),
            Production::new([N(List)]),
        ],
    );
    grammar.set_rule(
        List,
        vec![
            Production::new([
                T(LeftSquareBracket),
                N(Operand),
                T(RightSquareBracket),
            ]),
            Production::new([T(LeftSquareBracket), N(Operand), N(ListArg)]),
        ],
    );
    grammar.set_rule(
        ListArg,
        vec![
            Production::new([T(Comma), N(Operand), T(RightSquareBracket)]),
            Production::new([T(Comma), N(Operand), N(ListArg)]),
        ],
    );
    grammar
}
