use crate::{DslError, ImplementationError};
use std::fmt::{Display, Formatter};

impl DslError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, DslError::Syntax(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DslError::Validation(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, DslError::Runtime(_))
    }

    /// Whether [Dsl::validate](crate::Dsl::validate) captures this error in its outcome
    /// instead of propagating it.
    pub fn is_captured_by_validate(&self) -> bool {
        self.is_syntax() || self.is_validation()
    }

    pub fn message(&self) -> &str {
        match self {
            DslError::Syntax(m)
            | DslError::Validation(m)
            | DslError::Runtime(m)
            | DslError::Generic(m) => m,
        }
    }
}

impl Display for DslError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DslError::Syntax(m) => write!(f, "SyntaxError: {}", m),
            DslError::Validation(m) => write!(f, "ValidationError: {}", m),
            DslError::Runtime(m) => write!(f, "RuntimeError: {}", m),
            DslError::Generic(m) => write!(f, "DslError: {}", m),
        }
    }
}

impl std::error::Error for DslError {}

impl ImplementationError {
    pub fn new(what: String, message: String) -> Self {
        Self { message, what }
    }

    pub fn what(&self) -> &str {
        &self.what
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ImplementationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImplementationError: {}-{}", self.what, self.message)
    }
}

impl std::error::Error for ImplementationError {}
