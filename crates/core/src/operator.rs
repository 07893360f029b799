use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Operators in the order they are tried when scanning recognized text.
/// The first one whose symbol is present wins, regardless of position.
pub const SCAN_ORDER: [Operator; 4] = [
    Operator::Add,
    Operator::Subtract,
    Operator::Multiply,
    Operator::Divide,
];

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => 'x',
            Operator::Divide => '/',
        }
    }

    /// Apply the operator with checked `i64` arithmetic.
    /// Division truncates toward zero.
    pub fn apply(self, left: i64, right: i64) -> Result<i64, EvalError> {
        let result = match self {
            Operator::Add => left.checked_add(right),
            Operator::Subtract => left.checked_sub(right),
            Operator::Multiply => left.checked_mul(right),
            Operator::Divide => {
                if right == 0 {
                    return Err(EvalError::DivideByZero);
                }
                left.checked_div(right)
            }
        };
        result.ok_or(EvalError::Overflow(self, left, right))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Division by zero")]
    DivideByZero,
    #[error("Arithmetic overflow: {1} {0} {2}")]
    Overflow(Operator, i64, i64),
}
