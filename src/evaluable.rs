//! The evaluable tree: the abstract syntax the reducer produces and the interpreter
//! runs.

use crate::representable::{Keyword, Operator, Representable};
use crate::{DslError, Environment, Value};
use ptree::TreeItem;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

/// The variant of an [Evaluable], fixing its evaluation contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluableKind {
    Block,
    IfStatement,
    ElifStatement,
    Action,
    ActionArg,
    List,
    ListArg,
    Expression,
}

/// An interior node of the reduced program tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluable {
    kind: EvaluableKind,
    contents: Vec<EvalNode>,
}

/// A child of an [Evaluable]: another evaluable, or a representable leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalNode {
    Leaf(Representable),
    Tree(Evaluable),
}

/// The result of evaluating an [Evaluable].
///
/// `NoMatch` is the dedicated sentinel for an `IF`/`ELIF` whose condition was false and
/// which has no fallback branch; it is never conflated with [Value::Null].
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Value(Value),
    Values(Vec<Value>),
    NoMatch,
}

impl Evaluation {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Evaluation::NoMatch)
    }

    /// Collapse the evaluation into a single value; a sequence becomes a list value.
    pub fn into_value(self) -> Result<Value, DslError> {
        match self {
            Evaluation::Value(value) => Ok(value),
            Evaluation::Values(values) => Ok(Value::List(values)),
            Evaluation::NoMatch => Err(DslError::Generic(
                "An unmatched IF result cannot be used as a value.".into(),
            )),
        }
    }
}

impl Evaluable {
    pub fn new(kind: EvaluableKind) -> Self {
        Self {
            kind,
            contents: Vec::new(),
        }
    }

    pub fn with_contents(kind: EvaluableKind, contents: Vec<EvalNode>) -> Self {
        Self { kind, contents }
    }

    pub fn kind(&self) -> EvaluableKind {
        self.kind
    }

    pub fn contents(&self) -> &[EvalNode] {
        &self.contents
    }

    pub fn push(&mut self, node: EvalNode) {
        self.contents.push(node);
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = EvalNode>) {
        self.contents.extend(nodes);
    }

    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(&EvalNode::Tree(self.clone()))
    }

    /// Evaluate the node against a variable environment.
    ///
    /// The tree itself is immutable; the same tree can be evaluated against any number
    /// of environments.
    pub fn evaluate(&self, environment: &Environment) -> Result<Evaluation, DslError> {
        match self.kind {
            EvaluableKind::Block => self.evaluate_block(environment),
            EvaluableKind::IfStatement | EvaluableKind::ElifStatement => {
                self.evaluate_branch(environment)
            }
            EvaluableKind::Action => self.evaluate_action(environment),
            EvaluableKind::ActionArg | EvaluableKind::ListArg => self.evaluate_args(environment),
            EvaluableKind::List => self.evaluate_list(environment),
            EvaluableKind::Expression => self.evaluate_expression(environment),
        }
    }

    /// Evaluate every statement in order; results of fired branches are appended and
    /// nested non-empty block results are spliced in flat.
    fn evaluate_block(&self, environment: &Environment) -> Result<Evaluation, DslError> {
        let mut outputs: Vec<Value> = Vec::new();
        for item in &self.contents {
            let tree = match item {
                EvalNode::Tree(tree) => tree,
                EvalNode::Leaf(_) => continue,
            };
            match tree.kind {
                EvaluableKind::IfStatement => match tree.evaluate(environment)? {
                    Evaluation::NoMatch => {}
                    Evaluation::Value(value) => outputs.push(value),
                    Evaluation::Values(_) => {
                        return Err(DslError::Generic(
                            "An IF statement produced a result sequence.".into(),
                        ))
                    }
                },
                EvaluableKind::Block => {
                    if let Evaluation::Values(values) = tree.evaluate(environment)? {
                        if !values.is_empty() {
                            outputs.extend(values);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(Evaluation::Values(outputs))
    }

    /// Shared contract of `IF` and `ELIF` statements; an `ELIF` additionally accepts
    /// the unconditional `ELSE <action>` shape.
    fn evaluate_branch(&self, environment: &Environment) -> Result<Evaluation, DslError> {
        if self.kind == EvaluableKind::ElifStatement {
            if let [head, action_node] = self.contents.as_slice() {
                if keyword_of(head) == Some(Keyword::Else) {
                    let action = tree_of_kind(action_node, EvaluableKind::Action)
                        .ok_or_else(|| self.malformed())?;
                    return action.evaluate(environment);
                }
            }
        }

        let expected = if self.kind == EvaluableKind::IfStatement {
            Keyword::If
        } else {
            Keyword::Elif
        };
        let (condition_node, action_node, elif_node) = match self.contents.as_slice() {
            [head, condition, then, action]
                if keyword_of(head) == Some(expected) && keyword_of(then) == Some(Keyword::Then) =>
            {
                (condition, action, None)
            }
            [head, condition, then, action, elif]
                if keyword_of(head) == Some(expected) && keyword_of(then) == Some(Keyword::Then) =>
            {
                (condition, action, Some(elif))
            }
            _ => return Err(self.malformed()),
        };
        let action =
            tree_of_kind(action_node, EvaluableKind::Action).ok_or_else(|| self.malformed())?;

        // A condition is an operand leaf or an expression; a bare list literal is not
        // accepted here.
        let holds = match condition_node {
            EvalNode::Leaf(Representable::Operand(operand)) => {
                operand.true_value(environment)?.is_truthy()
            }
            EvalNode::Tree(tree) if tree.kind == EvaluableKind::Expression => {
                tree.evaluate(environment)?.into_value()?.is_truthy()
            }
            _ => return Err(self.malformed()),
        };

        if holds {
            return action.evaluate(environment);
        }
        match elif_node {
            Some(node) => tree_of_kind(node, EvaluableKind::ElifStatement)
                .ok_or_else(|| self.malformed())?
                .evaluate(environment),
            None => Ok(Evaluation::NoMatch),
        }
    }

    /// Invoke the leading action with the flattened argument values: operands resolve,
    /// lists stay nested, argument chains are spliced in flat.
    fn evaluate_action(&self, environment: &Environment) -> Result<Evaluation, DslError> {
        let action = match self.contents.first() {
            Some(EvalNode::Leaf(Representable::Action(action))) => action.clone(),
            Some(node) => {
                return Err(DslError::Runtime(format!(
                    "{} is not a valid Action.",
                    node
                )))
            }
            None => return Err(DslError::Runtime("Action evaluable is empty.".into())),
        };

        let mut args: Vec<Value> = Vec::new();
        for item in &self.contents[1..] {
            match item {
                EvalNode::Leaf(Representable::Operand(operand)) => {
                    args.push(operand.true_value(environment)?)
                }
                EvalNode::Tree(tree) if tree.kind == EvaluableKind::List => {
                    args.push(tree.evaluate(environment)?.into_value()?)
                }
                EvalNode::Tree(tree) => extend_values(&mut args, tree.evaluate(environment)?)?,
                EvalNode::Leaf(_) => {}
            }
        }
        action.execute(args).map(Evaluation::Value)
    }

    /// Flatten an argument chain into a sequence of values.
    fn evaluate_args(&self, environment: &Environment) -> Result<Evaluation, DslError> {
        let mut values: Vec<Value> = Vec::new();
        for item in &self.contents {
            match item {
                EvalNode::Leaf(Representable::Operand(operand)) => {
                    values.push(operand.true_value(environment)?)
                }
                EvalNode::Tree(tree) => extend_values(&mut values, tree.evaluate(environment)?)?,
                EvalNode::Leaf(_) => {}
            }
        }
        Ok(Evaluation::Values(values))
    }

    /// Build a list value: operands and nested lists are appended, a trailing argument
    /// chain is spliced in flat.
    fn evaluate_list(&self, environment: &Environment) -> Result<Evaluation, DslError> {
        let mut items: Vec<Value> = Vec::new();
        for item in &self.contents {
            match item {
                EvalNode::Leaf(Representable::Operand(operand)) => {
                    items.push(operand.true_value(environment)?)
                }
                EvalNode::Tree(tree) if tree.kind == EvaluableKind::List => {
                    items.push(tree.evaluate(environment)?.into_value()?)
                }
                EvalNode::Tree(tree) => extend_values(&mut items, tree.evaluate(environment)?)?,
                EvalNode::Leaf(_) => {}
            }
        }
        Ok(Evaluation::Value(Value::List(items)))
    }

    /// Two-queue reduction of an expression node.
    ///
    /// Children are walked in order: operators enqueue on one queue, resolved operands
    /// on the other. After each child, a unary operator at the head applies to the
    /// rightmost operand; a binary operator applies to the two leftmost. The grammar's
    /// nesting guarantees at most one effective operator at a time, so both queues must
    /// resolve to exactly one operand and no operators.
    fn evaluate_expression(&self, environment: &Environment) -> Result<Evaluation, DslError> {
        let mut operators: VecDeque<Operator> = VecDeque::new();
        let mut operands: VecDeque<Value> = VecDeque::new();

        for item in &self.contents {
            match item {
                EvalNode::Leaf(Representable::Operator(operator)) => {
                    operators.push_back(operator.clone())
                }
                EvalNode::Tree(tree) => {
                    operands.push_back(tree.evaluate(environment)?.into_value()?)
                }
                EvalNode::Leaf(Representable::Operand(operand)) => {
                    operands.push_back(operand.true_value(environment)?)
                }
                EvalNode::Leaf(_) => {}
            }

            let ready = match operators.front() {
                Some(Operator::Unary(_)) => !operands.is_empty(),
                Some(Operator::Binary(_)) => operands.len() > 1,
                None => false,
            };
            if !ready {
                continue;
            }
            match operators.pop_front() {
                Some(Operator::Unary(unary)) => {
                    if let Some(x) = operands.pop_back() {
                        operands.push_back(unary.evaluate(x)?);
                    }
                }
                Some(Operator::Binary(binary)) => {
                    if let (Some(x), Some(y)) = (operands.pop_front(), operands.pop_front()) {
                        operands.push_back(binary.evaluate(x, y)?);
                    }
                }
                None => {}
            }
        }

        if !operators.is_empty() {
            return Err(DslError::Runtime(format!(
                "Expression evaluation has left unused operators {:?}.",
                operators
            )));
        }
        if operands.len() != 1 {
            return Err(DslError::Runtime(
                "Expression did not collapse to a single value.".into(),
            ));
        }
        match operands.pop_front() {
            Some(value) => Ok(Evaluation::Value(value)),
            None => Err(DslError::Generic("Expression produced no value.".into())),
        }
    }

    fn malformed(&self) -> DslError {
        let statement = match self.kind {
            EvaluableKind::IfStatement => "IF",
            EvaluableKind::ElifStatement => "ELIF",
            _ => "branch",
        };
        DslError::Runtime(format!(
            "Cannot evaluate {} statement {}.",
            statement, self
        ))
    }
}

fn keyword_of(node: &EvalNode) -> Option<Keyword> {
    match node {
        EvalNode::Leaf(Representable::Keyword(keyword)) => Some(*keyword),
        _ => None,
    }
}

fn tree_of_kind(node: &EvalNode, kind: EvaluableKind) -> Option<&Evaluable> {
    match node {
        EvalNode::Tree(tree) if tree.kind == kind => Some(tree),
        _ => None,
    }
}

fn extend_values(target: &mut Vec<Value>, evaluation: Evaluation) -> Result<(), DslError> {
    match evaluation {
        Evaluation::Values(values) => {
            target.extend(values);
            Ok(())
        }
        Evaluation::Value(Value::List(values)) => {
            target.extend(values);
            Ok(())
        }
        Evaluation::Value(other) => Err(DslError::Runtime(format!(
            "Cannot flatten {} into an argument sequence.",
            other
        ))),
        Evaluation::NoMatch => Err(DslError::Generic(
            "An unmatched IF result cannot be used as a value.".into(),
        )),
    }
}

impl Display for EvaluableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Display for Evaluable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.kind)?;
        for (index, item) in self.contents.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, ")")
    }
}

impl Display for EvalNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalNode::Leaf(representable) => write!(f, "{}", representable),
            EvalNode::Tree(evaluable) => write!(f, "{}", evaluable),
        }
    }
}

impl TreeItem for EvalNode {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self {
            EvalNode::Leaf(representable) => write!(f, "{}", representable),
            EvalNode::Tree(evaluable) => write!(f, "{}", evaluable.kind),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        match self {
            EvalNode::Leaf(_) => Cow::Owned(Vec::new()),
            EvalNode::Tree(evaluable) => Cow::from(&evaluable.contents),
        }
    }
}
