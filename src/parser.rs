use crate::util::Log;
use crate::{DslError, Grammar, NonTerminalKind, ParseNode, Parser, Production, SymbolKind, Token};
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};

/// Per-call parsing state: the rejection memo and the furthest token the expansion
/// reached, used for error reporting. Discarded when [Parser::parse] returns.
struct ParseState {
    rejected: HashMap<Production, HashSet<usize>>,
    max_pointer: usize,
}

impl ParseState {
    fn new() -> Self {
        Self {
            rejected: HashMap::new(),
            max_pointer: 0,
        }
    }

    fn is_rejected(&self, production: &Production, origin: usize) -> bool {
        self.rejected
            .get(production)
            .map_or(false, |origins| origins.contains(&origin))
    }

    fn reject(&mut self, production: &Production, origin: usize) {
        self.rejected
            .entry(production.clone())
            .or_default()
            .insert(origin);
    }

    fn note_progress(&mut self, pointer: usize) {
        if self.max_pointer < pointer {
            self.max_pointer = pointer;
        }
    }

    fn failure_message(&self, tokens: &[Token]) -> String {
        match tokens.get(self.max_pointer) {
            Some(token) => format!(
                "Input cannot be parsed. Unexpected '{}' at offset {}.",
                token.lexeme, token.start
            ),
            None => "Input cannot be parsed. Unexpected end of input.".to_string(),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(Grammar::base())
    }
}

impl Parser {
    /// The start symbol used when the facade does not override it.
    pub const DEFAULT_START_SYMBOL: NonTerminalKind = NonTerminalKind::Block;

    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            log: OnceCell::new(),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Set a log label to debug the parser.
    /// Based on the level of the [Log], the parser will report expansion results.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Parse a token stream from the given start symbol into a concrete parse tree.
    ///
    /// Succeeds only when the expansion is non-empty and consumed every token; anything
    /// short of the full stream is a syntax error.
    pub fn parse(
        &self,
        tokens: &[Token],
        start_symbol: NonTerminalKind,
    ) -> Result<ParseNode, DslError> {
        let mut state = ParseState::new();

        match self.expand(start_symbol, tokens, 0, &mut state) {
            Some((tree, consumed)) if consumed == tokens.len() => {
                #[cfg(debug_assertions)]
                if let Some(debug) = self.log.get() {
                    if debug.order() >= Log::Success(()).order() {
                        println!("[{}; Parse success]: {} tokens", debug, consumed);
                    }
                }
                Ok(tree)
            }
            _ => {
                #[cfg(debug_assertions)]
                if let Some(debug) = self.log.get() {
                    if debug.order() >= Log::Default(()).order() {
                        println!("[{}; Parse failed]: {}", debug, state.failure_message(tokens));
                    }
                }
                Err(DslError::Syntax(state.failure_message(tokens)))
            }
        }
    }

    /// Expand one non-terminal at `origin`, trying its productions in grammar order.
    ///
    /// Returns the node and the number of tokens it consumed, or `None` when every
    /// production failed. A production is abandoned on the first symbol that does not
    /// fit; its partially built children are dropped and the `(production, origin)`
    /// pair is memoized so backtracking never retries it.
    fn expand(
        &self,
        kind: NonTerminalKind,
        tokens: &[Token],
        origin: usize,
        state: &mut ParseState,
    ) -> Option<(ParseNode, usize)> {
        #[cfg(debug_assertions)]
        if let Some(debug) = self.log.get() {
            if debug.order() >= Log::Verbose(()).order() {
                println!("[{}; Expand]: {} at {}", debug, kind, origin);
            }
        }

        for production in self.grammar.productions(kind) {
            if state.is_rejected(production, origin) {
                continue;
            }

            let mut children: Vec<ParseNode> = Vec::new();
            let mut pointer = origin;
            let mut matched = true;

            for symbol in production.body() {
                if pointer >= tokens.len() {
                    matched = false;
                    break;
                }
                match symbol {
                    SymbolKind::Terminal(terminal) => {
                        let current = &tokens[pointer];
                        if current.kind == *terminal {
                            children.push(ParseNode::Terminal(current.clone()));
                            pointer += 1;
                            state.note_progress(pointer);
                        } else {
                            matched = false;
                            break;
                        }
                    }
                    SymbolKind::NonTerminal(nested) => {
                        match self.expand(*nested, tokens, pointer, state) {
                            Some((node, consumed)) if consumed > 0 => {
                                children.push(node);
                                pointer += consumed;
                            }
                            _ => {
                                matched = false;
                                break;
                            }
                        }
                    }
                }
            }

            if matched {
                #[cfg(debug_assertions)]
                if let Some(debug) = self.log.get() {
                    if debug.order() >= Log::Result(()).order() {
                        println!(
                            "[{}; Expanded]: {} consumed {} tokens at {}",
                            debug,
                            kind,
                            pointer - origin,
                            origin
                        );
                    }
                }
                return Some((ParseNode::non_terminal(kind, children), pointer - origin));
            }
            state.reject(production, origin);
        }

        None
    }
}
