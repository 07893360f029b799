pub mod expression;
pub mod operator;
pub mod problem;

pub use expression::{evaluate, normalize, Evaluation, FRAGMENT_SEPARATOR};
pub use operator::{EvalError, Operator, SCAN_ORDER};
pub use problem::{solve, ProblemRecord};
