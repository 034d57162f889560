//! Collapses a concrete parse tree into the evaluable tree the interpreter runs.

use crate::{DslError, EvalNode, Evaluable, NonTerminalKind, ParseNode, SymbolCatalog};

/// Reduce a parse tree into evaluable nodes.
///
/// A terminal reduces to its representable. At a non-terminal, children whose
/// representable is a punctuator are dropped; if more than one child survives, or the
/// node is the block symbol (a block always keeps its wrapper, even around a single
/// statement), the node's evaluable variant is instantiated around the reduced
/// survivors. A lone survivor is passed through unwrapped, which is what collapses the
/// precedence chains of the expression grammar.
pub fn reduce(node: &ParseNode, catalog: &SymbolCatalog) -> Result<Vec<EvalNode>, DslError> {
    match node {
        ParseNode::Terminal(token) => Ok(vec![EvalNode::Leaf(catalog.representable(token)?)]),
        ParseNode::NonTerminal { kind, children } => {
            let mut survivors: Vec<&ParseNode> = Vec::new();
            for child in children {
                if let ParseNode::Terminal(token) = child {
                    if catalog.representable(token)?.is_punctuator() {
                        continue;
                    }
                }
                survivors.push(child);
            }

            if survivors.len() > 1 || *kind == NonTerminalKind::Block {
                let mut evaluable = Evaluable::new(kind.evaluable_kind());
                for survivor in survivors {
                    evaluable.extend(reduce(survivor, catalog)?);
                }
                Ok(vec![EvalNode::Tree(evaluable)])
            } else {
                match survivors.first() {
                    Some(survivor) => reduce(survivor, catalog),
                    None => Err(DslError::Generic(format!(
                        "Nothing left to reduce under {}.",
                        kind
                    ))),
                }
            }
        }
    }
}
