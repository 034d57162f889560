use super::{BinaryOperator, FunctionOperator, Operator, UnaryOperator};
use crate::{DslError, Value};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

impl Operator {
    pub fn precedence(&self) -> i8 {
        match self {
            Operator::Unary(op) => op.precedence(),
            Operator::Binary(op) => op.precedence(),
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::Unary(_))
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Unary(op) => write!(f, "{}", op),
            Operator::Binary(op) => write!(f, "{}", op),
        }
    }
}

impl UnaryOperator {
    pub fn precedence(&self) -> i8 {
        match self {
            UnaryOperator::Not => 2,
            UnaryOperator::Indexing(_) => 6,
            UnaryOperator::Attribute(_) => 6,
            UnaryOperator::Function(function) => function.precedence(),
        }
    }

    /// Apply the operator to its single operand.
    pub fn evaluate(&self, x: Value) -> Result<Value, DslError> {
        match self {
            UnaryOperator::Not => match x {
                Value::List(items) => Ok(Value::List(
                    items
                        .iter()
                        .map(|item| Value::Bool(!item.is_truthy()))
                        .collect(),
                )),
                value => Ok(Value::Bool(!value.is_truthy())),
            },
            UnaryOperator::Indexing(position) => index_value(*position, &x),
            UnaryOperator::Attribute(name) => match &x {
                Value::List(items) => items
                    .iter()
                    .map(|item| attribute_of(name, item))
                    .collect::<Result<Vec<Value>, DslError>>()
                    .map(Value::List),
                value => attribute_of(name, value),
            },
            UnaryOperator::Function(function) => function.evaluate(x),
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Not => write!(f, "NOT"),
            UnaryOperator::Indexing(position) => write!(f, "[{}]", position),
            UnaryOperator::Attribute(name) => write!(f, ".{}", name),
            UnaryOperator::Function(function) => write!(f, "{}", function),
        }
    }
}

impl BinaryOperator {
    pub fn precedence(&self) -> i8 {
        match self {
            BinaryOperator::Div | BinaryOperator::Mult | BinaryOperator::Mod => 5,
            BinaryOperator::Plus | BinaryOperator::Minus => 4,
            BinaryOperator::GreaterThanOrEqual
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::Equal
            | BinaryOperator::NotEqual => 3,
            BinaryOperator::And => 1,
            BinaryOperator::Or => 0,
        }
    }

    /// Apply the operator to a left and a right operand.
    ///
    /// Comparison operators broadcast over lists (element-wise against a scalar, zipped
    /// between two lists, truncating to the shorter one). `AND`/`OR` zip two lists
    /// element-wise and otherwise pick an operand by truthiness without coercing it to a
    /// boolean.
    pub fn evaluate(&self, x: Value, y: Value) -> Result<Value, DslError> {
        match self {
            BinaryOperator::Div => divide(&x, &y),
            BinaryOperator::Mult => multiply(&x, &y),
            BinaryOperator::Mod => modulo(&x, &y),
            BinaryOperator::Plus => add(&x, &y),
            BinaryOperator::Minus => subtract(&x, &y),
            BinaryOperator::Equal => broadcast(&x, &y, &|a, b| Ok(Value::Bool(a.loose_eq(b)))),
            BinaryOperator::NotEqual => broadcast(&x, &y, &|a, b| Ok(Value::Bool(!a.loose_eq(b)))),
            BinaryOperator::GreaterThan => {
                broadcast(&x, &y, &|a, b| ordered(a, b, Ordering::is_gt))
            }
            BinaryOperator::LessThan => broadcast(&x, &y, &|a, b| ordered(a, b, Ordering::is_lt)),
            BinaryOperator::GreaterThanOrEqual => {
                broadcast(&x, &y, &|a, b| ordered(a, b, Ordering::is_ge))
            }
            BinaryOperator::LessThanOrEqual => {
                broadcast(&x, &y, &|a, b| ordered(a, b, Ordering::is_le))
            }
            BinaryOperator::And => match (x, y) {
                (Value::List(a), Value::List(b)) => Ok(Value::List(
                    a.into_iter()
                        .zip(b)
                        .map(|(i, j)| if !i.is_truthy() { i } else { j })
                        .collect(),
                )),
                (a, b) => Ok(if !a.is_truthy() { a } else { b }),
            },
            BinaryOperator::Or => match (x, y) {
                (Value::List(a), Value::List(b)) => Ok(Value::List(
                    a.into_iter()
                        .zip(b)
                        .map(|(i, j)| if i.is_truthy() { i } else { j })
                        .collect(),
                )),
                (a, b) => Ok(if a.is_truthy() { a } else { b }),
            },
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            BinaryOperator::Div => "/",
            BinaryOperator::Mult => "*",
            BinaryOperator::Mod => "%",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        };
        write!(f, "{}", text)
    }
}

impl FunctionOperator {
    /// Create a named function operator backed by the given callback.
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(Value) -> Result<Value, DslError> + Send + Sync + 'static,
    {
        Self {
            name,
            precedence: -1,
            apply: Arc::new(apply),
        }
    }

    /// The built-in `COUNT` function: the numeric sum of a list, counting booleans
    /// as `0`/`1`.
    pub fn count() -> Self {
        Self::new("COUNT", count_values)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn precedence(&self) -> i8 {
        self.precedence
    }

    pub fn evaluate(&self, x: Value) -> Result<Value, DslError> {
        (self.apply)(x)
    }
}

impl Debug for FunctionOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionOperator")
            .field("name", &self.name)
            .field("precedence", &self.precedence)
            .finish()
    }
}

impl Display for FunctionOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)
    }
}

impl PartialEq for FunctionOperator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn count_values(x: Value) -> Result<Value, DslError> {
    let items = match x {
        Value::List(items) => items,
        other => {
            return Err(DslError::Runtime(format!(
                "COUNT expects a list, found {}.",
                other.type_name()
            )))
        }
    };
    let mut int_sum: i64 = 0;
    let mut float_sum: f64 = 0.0;
    let mut seen_float = false;
    for item in &items {
        match item {
            Value::Bool(b) => int_sum += *b as i64,
            Value::Int(n) => int_sum = int_sum.saturating_add(*n),
            Value::Float(n) => {
                seen_float = true;
                float_sum += n;
            }
            other => {
                return Err(DslError::Runtime(format!(
                    "COUNT cannot sum a {} element.",
                    other.type_name()
                )))
            }
        }
    }
    if seen_float {
        Ok(Value::Float(float_sum + int_sum as f64))
    } else {
        Ok(Value::Int(int_sum))
    }
}

fn index_value(position: u64, x: &Value) -> Result<Value, DslError> {
    if position == 0 {
        return Err(DslError::Runtime(
            "Index 0 is out of range; indexing is 1-based.".into(),
        ));
    }
    let index = (position - 1) as usize;
    match x {
        Value::List(items) => items
            .get(index)
            .cloned()
            .ok_or_else(|| DslError::Runtime(format!("Index {} is out of range.", position))),
        Value::Str(s) => s
            .chars()
            .nth(index)
            .map(|c| Value::Str(c.to_string()))
            .ok_or_else(|| DslError::Runtime(format!("Index {} is out of range.", position))),
        other => Err(DslError::Runtime(format!(
            "Cannot index a {}.",
            other.type_name()
        ))),
    }
}

fn attribute_of(name: &str, value: &Value) -> Result<Value, DslError> {
    match value {
        Value::Map(entries) => entries
            .get(name)
            .cloned()
            .ok_or_else(|| DslError::Runtime(format!("Attribute {} does not exist.", name))),
        other => Err(DslError::Runtime(format!(
            "Cannot access attribute {} on a {}.",
            name,
            other.type_name()
        ))),
    }
}

/// Apply `f` element-wise when either side is a list, zipping two lists and truncating
/// to the shorter one; apply it directly on two scalars.
fn broadcast(
    x: &Value,
    y: &Value,
    f: &dyn Fn(&Value, &Value) -> Result<Value, DslError>,
) -> Result<Value, DslError> {
    match (x, y) {
        (Value::List(a), Value::List(b)) => a
            .iter()
            .zip(b.iter())
            .map(|(i, j)| f(i, j))
            .collect::<Result<Vec<Value>, DslError>>()
            .map(Value::List),
        (Value::List(a), scalar) => a
            .iter()
            .map(|i| f(i, scalar))
            .collect::<Result<Vec<Value>, DslError>>()
            .map(Value::List),
        (scalar, Value::List(b)) => b
            .iter()
            .map(|j| f(scalar, j))
            .collect::<Result<Vec<Value>, DslError>>()
            .map(Value::List),
        (a, b) => f(a, b),
    }
}

fn ordered(x: &Value, y: &Value, accept: fn(Ordering) -> bool) -> Result<Value, DslError> {
    ordering_of(x, y).map(|ordering| Value::Bool(accept(ordering)))
}

fn ordering_of(x: &Value, y: &Value) -> Result<Ordering, DslError> {
    if let (Value::Str(a), Value::Str(b)) = (x, y) {
        return Ok(a.cmp(b));
    }
    if let (Some(a), Some(b)) = (x.as_int(), y.as_int()) {
        return Ok(a.cmp(&b));
    }
    match (x.as_number(), y.as_number()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(|| {
            DslError::Runtime(format!("Cannot order {} against {}.", x, y))
        }),
        _ => Err(DslError::Runtime(format!(
            "Cannot compare a {} with a {}.",
            x.type_name(),
            y.type_name()
        ))),
    }
}

fn incompatible(operator: &str, x: &Value, y: &Value) -> DslError {
    DslError::Runtime(format!(
        "Cannot apply '{}' to a {} and a {}.",
        operator,
        x.type_name(),
        y.type_name()
    ))
}

fn add(x: &Value, y: &Value) -> Result<Value, DslError> {
    match (x, y) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
        (Value::List(a), Value::List(b)) => {
            let mut joined = a.clone();
            joined.extend(b.iter().cloned());
            Ok(Value::List(joined))
        }
        _ => {
            if let (Some(a), Some(b)) = (x.as_int(), y.as_int()) {
                return Ok(match a.checked_add(b) {
                    Some(sum) => Value::Int(sum),
                    None => Value::Float(a as f64 + b as f64),
                });
            }
            match (x.as_number(), y.as_number()) {
                (Some(a), Some(b)) => Ok(Value::Float(a + b)),
                _ => Err(incompatible("+", x, y)),
            }
        }
    }
}

fn subtract(x: &Value, y: &Value) -> Result<Value, DslError> {
    if let (Some(a), Some(b)) = (x.as_int(), y.as_int()) {
        return Ok(match a.checked_sub(b) {
            Some(difference) => Value::Int(difference),
            None => Value::Float(a as f64 - b as f64),
        });
    }
    match (x.as_number(), y.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Float(a - b)),
        _ => Err(incompatible("-", x, y)),
    }
}

fn multiply(x: &Value, y: &Value) -> Result<Value, DslError> {
    if let (Some(a), Some(b)) = (x.as_int(), y.as_int()) {
        return Ok(match a.checked_mul(b) {
            Some(product) => Value::Int(product),
            None => Value::Float(a as f64 * b as f64),
        });
    }
    match (x.as_number(), y.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Float(a * b)),
        _ => Err(incompatible("*", x, y)),
    }
}

/// True division: the result is always a float, like the source language of the
/// programs' host values.
fn divide(x: &Value, y: &Value) -> Result<Value, DslError> {
    match (x.as_number(), y.as_number()) {
        (Some(a), Some(b)) => {
            if b == 0.0 {
                Err(DslError::Runtime("Division by zero.".into()))
            } else {
                Ok(Value::Float(a / b))
            }
        }
        _ => Err(incompatible("/", x, y)),
    }
}

/// Remainder with the sign of the divisor.
fn modulo(x: &Value, y: &Value) -> Result<Value, DslError> {
    if let (Some(a), Some(b)) = (x.as_int(), y.as_int()) {
        if b == 0 {
            return Err(DslError::Runtime("Division by zero.".into()));
        }
        let mut remainder = a % b;
        if remainder != 0 && (remainder < 0) != (b < 0) {
            remainder += b;
        }
        return Ok(Value::Int(remainder));
    }
    match (x.as_number(), y.as_number()) {
        (Some(a), Some(b)) => {
            if b == 0.0 {
                Err(DslError::Runtime("Division by zero.".into()))
            } else {
                Ok(Value::Float(a - b * (a / b).floor()))
            }
        }
        _ => Err(incompatible("%", x, y)),
    }
}
