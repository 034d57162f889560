use super::Operand;
use crate::{DslError, Environment, Value};
use std::fmt::{Display, Formatter};

impl Operand {
    /// Resolve the operand to its runtime value.
    ///
    /// Literals resolve to themselves; a variable resolves against the environment and
    /// fails with a runtime error if the name is absent.
    pub fn true_value(&self, environment: &Environment) -> Result<Value, DslError> {
        match self {
            Operand::None => Ok(Value::Null),
            Operand::Bool(b) => Ok(Value::Bool(*b)),
            Operand::Str(s) => Ok(Value::Str(s.clone())),
            Operand::Int(n) => Ok(Value::Int(*n)),
            Operand::Float(n) => Ok(Value::Float(*n)),
            Operand::Variable(name) => match environment.get(name) {
                Some(value) => Ok(value.clone()),
                None => Err(DslError::Runtime(format!("{} does not exist.", name))),
            },
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Operand::Variable(_))
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::None => write!(f, "None"),
            Operand::Bool(true) => write!(f, "TRUE"),
            Operand::Bool(false) => write!(f, "FALSE"),
            Operand::Str(s) => write!(f, "'{}'", s),
            Operand::Int(n) => write!(f, "{}", n),
            Operand::Float(n) => write!(f, "{}", n),
            Operand::Variable(name) => write!(f, "{}", name),
        }
    }
}
