// ABOUTME: Error types for parsing and evaluation failures

use thiserror::Error;

/// The single runtime error channel. Errors bubble unwound through the
/// evaluator and are caught at the top-level driver, which prints them and
/// continues with the next form; no construct recovers errors internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("{function}: expected {expected}, got {actual}")]
    WrongType {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("{function}: expected {expected} argument{}, got {actual}", if expected == "1" { "" } else { "s" })]
    WrongArity {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Integer overflow in {function}")]
    IntegerOverflow { function: String },

    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("Undefined function: {0}")]
    UndefinedFunction(String),

    #[error("{0}")]
    Misc(String),
}

impl RuntimeError {
    /// Cheap tag for driver-side presentation/tests, mirroring the kind
    /// taxonomy without a second parallel enum.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::UndefinedVariable(_) => "UndefinedVariable",
            RuntimeError::WrongType { .. } => "WrongType",
            RuntimeError::WrongArity { .. } => "WrongArity",
            RuntimeError::DivisionByZero => "DivisionByZero",
            RuntimeError::IntegerOverflow { .. } => "IntegerOverflow",
            RuntimeError::SyntaxError(_) => "SyntaxError",
            RuntimeError::UndefinedFunction(_) => "UndefinedFunction",
            RuntimeError::Misc(_) => "Misc",
        }
    }

    pub fn wrong_type(function: &str, expected: &str, actual: &str) -> Self {
        RuntimeError::WrongType {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn wrong_arity(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        RuntimeError::WrongArity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }
}
