use crate::representable::Representable;
use crate::{
    reduce, Dsl, DslError, Environment, EvalNode, Evaluable, EvaluableKind, Evaluation, Lexer,
    NonTerminalKind, Parser, ValidationOutcome, Value,
};

impl Default for Dsl {
    fn default() -> Self {
        Self::new()
    }
}

impl Dsl {
    /// A rule engine over the base symbol catalog and grammar, starting at the block
    /// symbol with an empty environment.
    pub fn new() -> Self {
        Self {
            lexer: Lexer::new(),
            parser: Parser::default(),
            start_symbol: Parser::DEFAULT_START_SYMBOL,
            environment: Environment::new(),
        }
    }

    /// Swap in a host configured lexer.
    pub fn with_lexer(mut self, lexer: Lexer) -> Self {
        self.lexer = lexer;
        self
    }

    /// Swap in a parser over a host configured grammar.
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    /// Start parsing from a non-terminal other than the block symbol.
    pub fn with_start_symbol(mut self, start_symbol: NonTerminalKind) -> Self {
        self.start_symbol = start_symbol;
        self
    }

    /// Bind the variable environment evaluations run against.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Run lexer, parser and reducer and return the evaluable tree of the program.
    ///
    /// The tree may be cached by the caller and re-evaluated against different
    /// environments through [Evaluable::evaluate].
    pub fn construct(&self, input: &str) -> Result<Evaluable, DslError> {
        let tokens = self.lexer.tokenize(input)?;
        let parse_tree = self.parser.parse(&tokens, self.start_symbol)?;
        let mut reduced = reduce(&parse_tree, self.lexer.catalog())?;
        match reduced.pop() {
            Some(EvalNode::Tree(evaluable)) => Ok(evaluable),
            Some(EvalNode::Leaf(leaf)) => Err(DslError::Validation(format!(
                "{} is not an evaluable.",
                leaf
            ))),
            None => Err(DslError::Generic("Reduction produced no output.".into())),
        }
    }

    /// Check that the input is well formed and that every action accepts its literal
    /// arguments.
    ///
    /// Syntax and validation errors are captured in the outcome; runtime errors (e.g. a
    /// variable argument missing from the environment) propagate.
    pub fn validate(&self, input: &str) -> Result<ValidationOutcome, DslError> {
        let evaluable = match self.construct(input) {
            Ok(evaluable) => evaluable,
            Err(error) if error.is_captured_by_validate() => {
                return Ok(ValidationOutcome::failure(error))
            }
            Err(error) => return Err(error),
        };
        match self.actions(&evaluable) {
            Ok(actions) => Ok(ValidationOutcome::success(actions)),
            Err(error) if error.is_captured_by_validate() => {
                Ok(ValidationOutcome::failure(error))
            }
            Err(error) => Err(error),
        }
    }

    /// Evaluate the program and return the ordered action results.
    pub fn execute(&self, input: &str) -> Result<Vec<Value>, DslError> {
        let evaluable = self.construct(input)?;
        match evaluable.evaluate(&self.environment)? {
            Evaluation::Values(values) => Ok(values),
            Evaluation::Value(value) => Ok(vec![value]),
            Evaluation::NoMatch => Ok(Vec::new()),
        }
    }

    /// Collect every action evaluable in the tree, validating each one's literal
    /// arguments on the way.
    pub fn actions(&self, evaluable: &Evaluable) -> Result<Vec<Evaluable>, DslError> {
        let mut actions: Vec<Evaluable> = Vec::new();
        self.collect_actions(evaluable, &mut actions)?;
        Ok(actions)
    }

    fn collect_actions(
        &self,
        evaluable: &Evaluable,
        found: &mut Vec<Evaluable>,
    ) -> Result<(), DslError> {
        for item in evaluable.contents() {
            if let EvalNode::Tree(child) = item {
                if child.kind() == EvaluableKind::Action {
                    self.validate_action(child)?;
                    found.push(child.clone());
                } else {
                    self.collect_actions(child, found)?;
                }
            }
        }
        Ok(())
    }

    /// Run an action's own argument validation over its literal arguments: operand
    /// leaves and list evaluables. Chained argument tails are not flattened here; they
    /// only unfold at execution time.
    fn validate_action(&self, action: &Evaluable) -> Result<(), DslError> {
        let contents = action.contents();
        let act = match contents.first() {
            Some(EvalNode::Leaf(Representable::Action(act))) => act,
            Some(node) => {
                return Err(DslError::Runtime(format!(
                    "{} is not a valid Action.",
                    node
                )))
            }
            None => return Err(DslError::Runtime("Action evaluable is empty.".into())),
        };
        let mut args: Vec<Value> = Vec::new();
        for item in &contents[1..] {
            match item {
                EvalNode::Leaf(Representable::Operand(operand)) => {
                    args.push(operand.true_value(&self.environment)?)
                }
                EvalNode::Tree(tree) if tree.kind() == EvaluableKind::List => {
                    args.push(tree.evaluate(&self.environment)?.into_value()?)
                }
                _ => {}
            }
        }
        if act.validate_args(&args) {
            Ok(())
        } else {
            Err(DslError::Validation(format!(
                "Action {} has invalid arguments {:?}.",
                act.name(),
                args
            )))
        }
    }
}

impl ValidationOutcome {
    pub fn success(actions: Vec<Evaluable>) -> Self {
        Self {
            is_valid: true,
            actions,
            error: None,
        }
    }

    pub fn failure(error: DslError) -> Self {
        Self {
            is_valid: false,
            actions: Vec::new(),
            error: Some(error),
        }
    }
}
