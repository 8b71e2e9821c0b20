//! Spoken arithmetic ("calculate 2 plus 2")

use super::arith;

/// Reply when the expression cannot be evaluated
pub const CALCULATION_FAILED: &str =
    "I couldn't perform that calculation. Please try again with a simpler calculation.";

/// Spoken operator words and their symbols, applied in order
const OPERATOR_WORDS: [(&str, &str); 5] = [
    ("divided by", "/"),
    ("multiplied by", "*"),
    ("plus", "+"),
    ("minus", "-"),
    ("times", "*"),
];

/// Evaluates spoken arithmetic
#[derive(Debug, Default, Clone, Copy)]
pub struct CalculationHandler;

impl CalculationHandler {
    /// Evaluate the expression following "calculate" and describe the result
    #[must_use]
    pub fn handle(&self, command: &str) -> String {
        let expression = to_expression(command);

        match arith::evaluate(&expression) {
            Ok(value) => {
                tracing::debug!(%expression, value, "calculated");
                format!("The result is {}", format_number(value))
            }
            Err(e) => {
                tracing::debug!(%expression, error = %e, "calculation rejected");
                CALCULATION_FAILED.to_string()
            }
        }
    }
}

/// Strip the keyword and turn operator words into symbols
fn to_expression(command: &str) -> String {
    let tail = command
        .find("calculate")
        .map_or(command, |pos| &command[pos + "calculate".len()..]);

    OPERATOR_WORDS
        .iter()
        .fold(tail.trim().to_string(), |expr, (word, symbol)| {
            expr.replace(word, symbol)
        })
}

/// Render integral values without a fractional part
fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{value}")
}
