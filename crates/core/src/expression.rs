use serde::{Deserialize, Serialize};

use super::operator::{EvalError, Operator, SCAN_ORDER};

/// Separator placed between recognized fragments. It is neither a digit nor
/// an operator, so it is dropped again during cleanup.
pub const FRAGMENT_SEPARATOR: &str = ",";

/// Join OCR fragments into one canonical, whitespace-free, lower-case string.
pub fn normalize<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<&str>>()
        .join(FRAGMENT_SEPARATOR)
        .chars()
        .filter(|c| !c.is_whitespace() && !FRAGMENT_SEPARATOR.contains(*c))
        .collect::<String>()
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub operator: Operator,
    pub result: i64,
}

/// Locate the operator in `text`, split the digits around it and compute.
///
/// Operators are resolved by [`SCAN_ORDER`], not by position: `"3+4-1"`
/// evaluates as `3 + 41`. With no operator the split index is 0 and the
/// operator is `Add`; the first character is still skipped as if it were
/// the operator. Operands that contain no digits, or too many to fit an
/// `i64`, count as 0.
pub fn evaluate(text: &str) -> Result<Evaluation, EvalError> {
    let (operator, split) = resolve_operator(text);

    let skip = text[split..].chars().next().map_or(0, char::len_utf8);
    let left = operand(&text[..split]);
    let right = operand(&text[split + skip..]);

    let result = operator.apply(left, right)?;
    Ok(Evaluation { operator, result })
}

fn resolve_operator(text: &str) -> (Operator, usize) {
    SCAN_ORDER
        .into_iter()
        .find_map(|op| text.find(op.symbol()).map(|idx| (op, idx)))
        .unwrap_or((Operator::Add, 0))
}

fn operand(source: &str) -> i64 {
    let digits: String = source.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str) -> (Operator, i64) {
        let e = evaluate(text).unwrap();
        (e.operator, e.result)
    }

    // ── normalize ─────────────────────────────────────────────────────────────

    #[test]
    fn normalize_joins_and_strips_whitespace() {
        assert_eq!(normalize(&["12+7"]), "12+7");
        assert_eq!(normalize(&["12", " + ", "7"]), "12+7");
    }

    #[test]
    fn normalize_lowercases() {
        assert_eq!(normalize(&["6 X 7"]), "6x7");
    }

    #[test]
    fn normalize_removes_tabs_and_newlines() {
        assert_eq!(normalize(&["1\t0\n/ 2"]), "10/2");
    }

    #[test]
    fn normalize_drops_commas_inside_fragments() {
        assert_eq!(normalize(&["1,000", "+2"]), "1000+2");
    }

    #[test]
    fn normalize_empty_input() {
        let empty: [&str; 0] = [];
        assert_eq!(normalize(&empty), "");
        assert_eq!(normalize(&[""]), "");
    }

    #[test]
    fn normalized_fragments_evaluate() {
        assert_eq!(eval(&normalize(&["12", " + ", "7"])), (Operator::Add, 19));
        assert_eq!(eval(&normalize(&["20", "-", "5"])), (Operator::Subtract, 15));
    }

    // ── evaluate ──────────────────────────────────────────────────────────────

    #[test]
    fn evaluate_each_operator() {
        assert_eq!(eval("12+7"), (Operator::Add, 19));
        assert_eq!(eval("20-5"), (Operator::Subtract, 15));
        assert_eq!(eval("6x7"), (Operator::Multiply, 42));
        assert_eq!(eval("10/2"), (Operator::Divide, 5));
    }

    #[test]
    fn evaluate_divide_by_zero() {
        assert_eq!(evaluate("10/0"), Err(EvalError::DivideByZero));
        assert_eq!(evaluate("10/abc"), Err(EvalError::DivideByZero));
    }

    #[test]
    fn evaluate_empty_takes_default_path() {
        assert_eq!(eval(""), (Operator::Add, 0));
    }

    #[test]
    fn add_wins_over_subtract_regardless_of_position() {
        // right operand source is "4-1" → digits "41"
        assert_eq!(eval("3+4-1"), (Operator::Add, 44));
        assert_eq!(eval("3-4+1"), (Operator::Add, 35));
    }

    #[test]
    fn scan_order_is_add_subtract_multiply_divide() {
        assert_eq!(eval("8/2x3").0, Operator::Multiply);
        assert_eq!(eval("8/2-3").0, Operator::Subtract);
        assert_eq!(eval("8x2-3").0, Operator::Subtract);
    }

    #[test]
    fn operator_at_index_zero_is_found() {
        assert_eq!(eval("+5"), (Operator::Add, 5));
        assert_eq!(eval("-5"), (Operator::Subtract, -5));
    }

    #[test]
    fn missing_operator_skips_first_character() {
        assert_eq!(eval("7"), (Operator::Add, 0));
        assert_eq!(eval("12"), (Operator::Add, 2));
        assert_eq!(eval("abc"), (Operator::Add, 0));
    }

    #[test]
    fn missing_operator_skips_multibyte_first_character() {
        assert_eq!(eval("é42"), (Operator::Add, 42));
    }

    #[test]
    fn noise_is_filtered_from_operands() {
        assert_eq!(eval("a1b2+c3,"), (Operator::Add, 15));
        assert_eq!(eval("12,+,7"), (Operator::Add, 19));
    }

    #[test]
    fn empty_operands_are_zero() {
        assert_eq!(eval("+"), (Operator::Add, 0));
        assert_eq!(eval("x9"), (Operator::Multiply, 0));
        assert_eq!(eval("9-"), (Operator::Subtract, 9));
    }

    #[test]
    fn oversized_operand_is_zero() {
        assert_eq!(eval("99999999999999999999+1"), (Operator::Add, 1));
    }

    #[test]
    fn overflow_is_an_error() {
        assert!(matches!(
            evaluate("9223372036854775807+1"),
            Err(EvalError::Overflow(Operator::Add, _, _))
        ));
    }

    #[test]
    fn division_truncates() {
        assert_eq!(eval("7/2"), (Operator::Divide, 3));
    }

    #[test]
    fn single_operator_expressions_recover_result() {
        let cases = [(0i64, 0i64), (1, 1), (17, 4), (250, 5), (1000, 999)];
        for (a, b) in cases {
            for op in SCAN_ORDER {
                if op == Operator::Divide && b == 0 {
                    continue;
                }
                let text = format!("{a}{}{b}", op.symbol());
                let expected = match op {
                    Operator::Add => a + b,
                    Operator::Subtract => a - b,
                    Operator::Multiply => a * b,
                    Operator::Divide => a / b,
                };
                assert_eq!(eval(&text), (op, expected), "text: {text}");
            }
        }
    }

    #[test]
    fn evaluation_serializes_operator_name() {
        let json = serde_json::to_string(&evaluate("2x3").unwrap()).unwrap();
        assert_eq!(json, r#"{"operator":"Multiply","result":6}"#);
    }
}
