use serde::{Deserialize, Serialize};
use std::fmt;

use super::expression::{evaluate, normalize, Evaluation};
use super::operator::EvalError;

/// A solved problem: the canonical expression text and its integer result.
///
/// Serialized field names (`problem`, `result`) are part of the on-disk
/// formats and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    problem: String,
    result: i64,
}

impl ProblemRecord {
    pub fn new(problem: impl Into<String>, result: i64) -> Self {
        ProblemRecord {
            problem: problem.into(),
            result,
        }
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn result(&self) -> i64 {
        self.result
    }
}

impl fmt::Display for ProblemRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.problem, self.result)
    }
}

/// Normalize recognized fragments, evaluate them and build the record.
pub fn solve<S: AsRef<str>>(fragments: &[S]) -> Result<(Evaluation, ProblemRecord), EvalError> {
    let problem = normalize(fragments);
    let evaluation = evaluate(&problem)?;
    let record = ProblemRecord::new(problem, evaluation.result);
    Ok((evaluation, record))
}
