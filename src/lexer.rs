use crate::symbols::base_symbols;
use crate::util::{Log, Source};
use crate::{DslError, ImplementationError, Lexer, LexerBuilder, SymbolCatalog, TerminalDef};
use crate::{TerminalKind, Token};
use once_cell::sync::OnceCell;
use regex::Regex;

impl Default for LexerBuilder {
    fn default() -> Self {
        Self {
            base: base_symbols(),
            inclusions: Vec::new(),
            exclusions: Vec::new(),
        }
    }
}

impl LexerBuilder {
    /// Register an extra terminal symbol.
    ///
    /// Inclusions are prepended to the base catalog, so a host can shadow lower-priority
    /// kinds without reordering the base.
    pub fn include(mut self, def: TerminalDef) -> Self {
        self.inclusions.push(def);
        self
    }

    /// Remove a kind from the active catalog.
    pub fn exclude(mut self, kind: TerminalKind) -> Self {
        self.exclusions.push(kind);
        self
    }

    /// Replace the base catalog entirely.
    pub fn base(mut self, defs: Vec<TerminalDef>) -> Self {
        self.base = defs;
        self
    }

    /// Validate every pattern and compile the union regex.
    ///
    /// Each pattern must be a valid regex and must not match the empty string; a
    /// nullable pattern would stall the scanner.
    pub fn build(self) -> Result<Lexer, ImplementationError> {
        let LexerBuilder {
            base,
            inclusions,
            exclusions,
        } = self;

        let mut active: Vec<TerminalDef> = Vec::new();
        for def in inclusions.into_iter().chain(base) {
            if exclusions.contains(&def.kind()) {
                continue;
            }
            if active.iter().any(|existing| existing.kind() == def.kind()) {
                continue;
            }
            active.push(def);
        }

        for def in &active {
            let single = Regex::new(def.pattern()).map_err(|err| {
                ImplementationError::new(
                    "PatternError".into(),
                    format!(
                        "Pattern for {} should be a valid regex expression. {:?}",
                        def.kind(),
                        err
                    ),
                )
            })?;
            if single.is_match("") {
                return Err(ImplementationError::new(
                    "PatternError".into(),
                    format!(
                        "Regex expression '{}' for {} should not be nullable.",
                        def.pattern(),
                        def.kind()
                    ),
                ));
            }
        }

        let group_names: Vec<String> = (0..active.len()).map(|i| format!("t{}", i)).collect();
        let union = active
            .iter()
            .zip(&group_names)
            .map(|(def, name)| format!("(?P<{}>{})", name, def.pattern()))
            .collect::<Vec<String>>()
            .join("|");
        let pattern = Regex::new(&union).map_err(|err| {
            ImplementationError::new(
                "PatternError".into(),
                format!("Union pattern failed to compile. {:?}", err),
            )
        })?;

        Ok(Lexer {
            catalog: SymbolCatalog::new(active),
            pattern,
            group_names,
            log: OnceCell::new(),
        })
    }
}

impl Default for Lexer {
    fn default() -> Self {
        match LexerBuilder::default().build() {
            Ok(lexer) => lexer,
            Err(_) => panic!("Base symbol catalog failed to compile."),
        }
    }
}

impl Lexer {
    /// A lexer over the base symbol catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> LexerBuilder {
        LexerBuilder::default()
    }

    /// The active ordered symbol catalog; the reducer dispatches tokens to their
    /// representables through it.
    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// Set a log label to debug the lexer.
    /// Based on the level of the [Log], the lexer will report per-token results.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Split the input into an ordered token stream.
    ///
    /// The scanner walks the input left to right yielding one token per
    /// non-overlapping match of the union regex; text not covered by any pattern
    /// (whitespace) is skipped implicitly. Any token of the invalid kind rejects the
    /// whole stream.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, DslError> {
        let source = Source::new(input);
        let mut tokens: Vec<Token> = Vec::new();

        #[cfg(debug_assertions)]
        let debug = self.log.get().map_or(Log::None, |label| *label);

        for captures in self.pattern.captures_iter(input) {
            for (index, name) in self.group_names.iter().enumerate() {
                if let Some(m) = captures.name(name) {
                    let def = &self.catalog.defs()[index];
                    let token = Token::new(def.kind(), m.as_str(), m.start(), m.end());

                    #[cfg(debug_assertions)]
                    if debug.order() >= Log::Verbose(()).order() {
                        println!(
                            "[{}; Lexeme]: {:?} '{}' at {}",
                            debug,
                            token.kind,
                            token.lexeme,
                            source.position_at(token.start)
                        );
                    }

                    tokens.push(token);
                    break;
                }
            }
        }

        self.validate_tokens(&tokens, &source)?;

        #[cfg(debug_assertions)]
        if debug.order() >= Log::Success(()).order() {
            println!("[{}; Tokenization success]: {} tokens", debug, tokens.len());
        }

        Ok(tokens)
    }

    fn validate_tokens(&self, tokens: &[Token], source: &Source) -> Result<(), DslError> {
        for token in tokens {
            if token.kind == TerminalKind::Invalid {
                #[cfg(debug_assertions)]
                if let Some(debug) = self.log.get() {
                    if debug.order() >= Log::Default(()).order() {
                        println!(
                            "[{}; Tokenization failed]: '{}' at {}",
                            debug,
                            token.lexeme,
                            source.position_at(token.start)
                        );
                    }
                }
                return Err(DslError::Syntax(format!(
                    "Unknown syntax {} at {}.",
                    token.lexeme,
                    source.position_at(token.start)
                )));
            }
        }
        Ok(())
    }
}
