use crate::value::{Value, parse_number};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison applied between a referenced value and a rule's literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
}

impl Operator {
    pub const ALL: [Operator; 12] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterEqual,
        Operator::LessEqual,
    ];

    /// The wire name of the operator, as stored in form documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessEqual => "less_equal",
        }
    }

    /// Symbol used in human-readable traces.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            other => other.as_str(),
        }
    }

    /// Whether the operator ignores the rule's comparison value.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }

    /// Applies the operator to a resolved value.
    ///
    /// String operators are case-sensitive and work on [`Value::as_text`].
    /// Ordering operators coerce both sides to numbers; a failed coercion makes
    /// the rule false instead of raising an error.
    pub fn apply(&self, found: &Value, expected: &str) -> bool {
        match self {
            Operator::IsEmpty => found.is_empty(),
            Operator::IsNotEmpty => !found.is_empty(),
            Operator::Equals => found.as_text() == expected,
            Operator::NotEquals => found.as_text() != expected,
            Operator::Contains => found.as_text().contains(expected),
            Operator::NotContains => !found.as_text().contains(expected),
            Operator::StartsWith => found.as_text().starts_with(expected),
            Operator::EndsWith => found.as_text().ends_with(expected),
            Operator::GreaterThan => compare_numbers(found, expected, |a, b| a > b),
            Operator::LessThan => compare_numbers(found, expected, |a, b| a < b),
            Operator::GreaterEqual => compare_numbers(found, expected, |a, b| a >= b),
            Operator::LessEqual => compare_numbers(found, expected, |a, b| a <= b),
        }
    }
}

fn compare_numbers<F>(found: &Value, expected: &str, f: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (found.as_number(), parse_number(expected)) {
        (Some(lhs), Some(rhs)) => f(lhs, rhs),
        _ => false,
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single comparison between a referenced field or variable and a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Field identifier or variable name.
    pub depends_on: String,
    #[serde(rename = "condition")]
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
}

impl Rule {
    pub fn new(depends_on: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            depends_on: depends_on.into(),
            operator,
            value: value.into(),
        }
    }

    /// A rule for the operators that take no comparison value.
    pub fn unary(depends_on: impl Into<String>, operator: Operator) -> Self {
        Self::new(depends_on, operator, String::new())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.is_unary() {
            write!(f, "${} {}", self.depends_on, self.operator.symbol())
        } else {
            write!(
                f,
                "${} {} \"{}\"",
                self.depends_on,
                self.operator.symbol(),
                self.value
            )
        }
    }
}
