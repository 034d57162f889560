use crate::{Grammar, NonTerminalKind, Production, SymbolKind, TerminalKind};
use std::collections::HashSet;

#[test]
fn productions_are_value_equal() {
    use SymbolKind::{NonTerminal as N, Terminal as T};
    let a = Production::new([T(TerminalKind::If), N(NonTerminalKind::ConditionExpr)]);
    let b = Production::new([T(TerminalKind::If), N(NonTerminalKind::ConditionExpr)]);
    let c = Production::new([T(TerminalKind::If)]);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn productions_hash_by_body() {
    use SymbolKind::Terminal as T;
    let mut set = HashSet::new();
    set.insert(Production::new([T(TerminalKind::If)]));
    set.insert(Production::new([T(TerminalKind::If)]));
    set.insert(Production::new([T(TerminalKind::Then)]));
    assert_eq!(set.len(), 2);
}

#[test]
fn base_grammar_has_every_rule() {
    let grammar = Grammar::base();
    for kind in NonTerminalKind::ALL {
        assert!(grammar.has_rule(kind), "missing rule for {}", kind);
    }
}

#[test]
fn base_grammar_rule_shapes() {
    let grammar = Grammar::base();
    assert_eq!(grammar.productions(NonTerminalKind::Block).len(), 2);
    assert_eq!(grammar.productions(NonTerminalKind::ElifStatement).len(), 3);
    assert_eq!(grammar.productions(NonTerminalKind::Condition).len(), 7);
    assert_eq!(grammar.productions(NonTerminalKind::Factor).len(), 7);
    assert_eq!(grammar.productions(NonTerminalKind::Operand).len(), 7);

    // Longer right-recursive alternatives come first; the bare fallback is last.
    let expression = grammar.productions(NonTerminalKind::Expression);
    assert_eq!(expression[0].len(), 3);
    assert_eq!(expression[expression.len() - 1].len(), 1);
}

#[test]
fn set_rule_replaces_the_alternatives() {
    use SymbolKind::Terminal as T;
    let mut grammar = Grammar::base();
    grammar.set_rule(
        NonTerminalKind::Action,
        vec![Production::new([T(TerminalKind::Return)])],
    );
    assert_eq!(grammar.productions(NonTerminalKind::Action).len(), 1);
}

#[test]
fn renders_a_rule_listing() {
    let rendered = Grammar::base().render().unwrap();
    assert!(rendered.contains("Block"), "{}", rendered);
    assert!(rendered.contains(": IfStatement Block"), "{}", rendered);
    assert!(rendered.contains("| IfStatement"), "{}", rendered);
}
