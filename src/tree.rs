use crate::{NonTerminalKind, Token};
use ptree::TreeItem;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};

/// Concrete parse tree of the tokenized input.
///
/// Leaves are the tokens themselves, in input order; interior nodes carry the
/// non-terminal kind the parser expanded. A well formed tree consumes every input token
/// exactly once.
#[derive(Clone, PartialEq)]
pub enum ParseNode {
    Terminal(Token),
    NonTerminal {
        kind: NonTerminalKind,
        children: Vec<ParseNode>,
    },
}

impl ParseNode {
    pub fn non_terminal(kind: NonTerminalKind, children: Vec<ParseNode>) -> Self {
        ParseNode::NonTerminal { kind, children }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ParseNode::Terminal(_))
    }

    pub fn children(&self) -> &[ParseNode] {
        match self {
            ParseNode::Terminal(_) => &[],
            ParseNode::NonTerminal { children, .. } => children,
        }
    }

    /// Number of tokens the tree consumed.
    pub fn terminal_count(&self) -> usize {
        match self {
            ParseNode::Terminal(_) => 1,
            ParseNode::NonTerminal { children, .. } => {
                children.iter().map(ParseNode::terminal_count).sum()
            }
        }
    }

    /// Find the first node for a given non-terminal kind searching through all nested
    /// children.
    pub fn find_tree_with_kind(&self, kind: NonTerminalKind) -> Option<&ParseNode> {
        match self {
            ParseNode::Terminal(_) => None,
            ParseNode::NonTerminal {
                kind: own,
                children,
            } => {
                if *own == kind {
                    Some(self)
                } else {
                    children
                        .iter()
                        .find_map(|child| child.find_tree_with_kind(kind))
                }
            }
        }
    }

    pub fn contains_kind(&self, kind: NonTerminalKind) -> bool {
        self.find_tree_with_kind(kind).is_some()
    }

    /// Search through all nested nodes and return the first match.
    pub fn find_tree<TF: Fn(&ParseNode) -> bool>(&self, predicate: &TF) -> Option<&ParseNode> {
        if predicate(self) {
            Some(self)
        } else {
            self.children()
                .iter()
                .find_map(|child| child.find_tree(predicate))
        }
    }

    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl Debug for ParseNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseNode::Terminal(token) => {
                f.debug_tuple("Terminal").field(token).finish()
            }
            ParseNode::NonTerminal { kind, children } => {
                let mut debug_struct = f.debug_struct("NonTerminal");
                debug_struct.field("kind", kind);
                if !children.is_empty() {
                    debug_struct.field("children", children);
                }
                debug_struct.finish()
            }
        }
    }
}

impl TreeItem for ParseNode {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self {
            ParseNode::Terminal(token) => {
                write!(f, "{:?} '{}' # {}-{}", token.kind, token.lexeme, token.start, token.end)
            }
            ParseNode::NonTerminal { kind, .. } => write!(f, "{}", kind),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(ParseNode::children(self))
    }
}

impl Token {
    pub fn new(kind: crate::TerminalKind, lexeme: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            start,
            end,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.lexeme == other.lexeme
    }
}

impl Eq for Token {}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("")
            .field(&self.kind)
            .field(&self.lexeme)
            .finish()
    }
}
