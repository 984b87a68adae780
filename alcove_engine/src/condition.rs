//! Restricted conditions for `<if>` elements.
//!
//! A condition is exactly one comparison, `path op literal`, such as
//! `player.intelligence >= 5` or `player.talent == 'Iris'`. There are no
//! boolean combinators or function calls, and nothing is ever executed.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use pest::Parser;
use pest::error::LineColLocation;
use pest_derive::Parser as PestParser;
use thiserror::Error;

use crate::context::{Context, Value};

#[derive(PestParser)]
#[grammar = "src/condition.pest"]
struct ConditionParser;

/// Comparison operator. `===` and `!==` parse as `==` and `!=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "==" | "===" => Operator::Eq,
            "!=" | "!==" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntax error in a condition expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{expr}`: {message}")]
pub struct ConditionSyntaxError {
    pub expr: String,
    pub message: String,
}

impl ConditionSyntaxError {
    fn shape(expr: &str, message: &str) -> Self {
        Self {
            expr: expr.to_string(),
            message: format!("unexpected grammar shape: {message}"),
        }
    }
}

/// Errors evaluating a parsed condition against a context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown context path '{path}'")]
    UnknownPath { path: String },
    #[error("'{path}' is a {found}, but the condition compares it with a {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("operator {operator} cannot order {kind} values ('{path}')")]
    Unordered {
        path: String,
        operator: Operator,
        kind: &'static str,
    },
}

/// A parsed `path op literal` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: String,
    pub operator: Operator,
    pub literal: Value,
}

impl Condition {
    /// Parse condition text.
    ///
    /// # Errors
    /// Returns a [`ConditionSyntaxError`] for anything but a single comparison.
    pub fn parse(expr: &str) -> Result<Self, ConditionSyntaxError> {
        let mut pairs = ConditionParser::parse(Rule::condition, expr).map_err(|e| {
            let column = match e.line_col {
                LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
            };
            ConditionSyntaxError {
                expr: expr.to_string(),
                message: format!("{} at column {column}", e.variant.message()),
            }
        })?;
        let condition = pairs
            .next()
            .ok_or_else(|| ConditionSyntaxError::shape(expr, "expected condition"))?;
        let mut inner = condition.into_inner();

        let path = inner
            .next()
            .ok_or_else(|| ConditionSyntaxError::shape(expr, "expected path"))?
            .as_str()
            .to_string();
        let operator = inner
            .next()
            .and_then(|op| Operator::from_symbol(op.as_str()))
            .ok_or_else(|| ConditionSyntaxError::shape(expr, "expected operator"))?;
        let literal = inner
            .next()
            .ok_or_else(|| ConditionSyntaxError::shape(expr, "expected literal"))?;

        let literal = match literal.as_rule() {
            Rule::string => Value::Text(literal.into_inner().next().map_or("", |p| p.as_str()).to_string()),
            Rule::number => Value::Number(literal.as_str().parse().map_err(|_| ConditionSyntaxError {
                expr: expr.to_string(),
                message: format!("invalid number '{}'", literal.as_str()),
            })?),
            Rule::boolean => Value::Bool(literal.as_str() == "true"),
            _ => return Err(ConditionSyntaxError::shape(expr, "expected string, number or boolean")),
        };

        Ok(Self {
            path,
            operator,
            literal,
        })
    }

    /// Evaluate against a context. Values are compared strictly: a number is
    /// never equal to a string, and NaN only satisfies `!=`.
    ///
    /// # Errors
    /// See [`EvalError`].
    pub fn evaluate(&self, ctx: &Context) -> Result<bool, EvalError> {
        let Some(actual) = ctx.get(&self.path) else {
            return Err(EvalError::UnknownPath { path: self.path.clone() });
        };
        match (actual, &self.literal) {
            (Value::Number(a), Value::Number(b)) => Ok(match a.partial_cmp(b) {
                Some(ordering) => self.operator.holds(ordering),
                None => self.operator == Operator::Ne,
            }),
            (Value::Text(a), Value::Text(b)) => Ok(self.operator.holds(a.as_str().cmp(b.as_str()))),
            (Value::Bool(a), Value::Bool(b)) => match self.operator {
                Operator::Eq => Ok(a == b),
                Operator::Ne => Ok(a != b),
                operator => Err(EvalError::Unordered {
                    path: self.path.clone(),
                    operator,
                    kind: actual.kind(),
                }),
            },
            (found, expected) => Err(EvalError::TypeMismatch {
                path: self.path.clone(),
                expected: expected.kind(),
                found: found.kind(),
            }),
        }
    }
}

impl FromStr for Condition {
    type Err = ConditionSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.path, self.operator)?;
        match &self.literal {
            Value::Text(s) if s.contains('\'') => write!(f, "\"{s}\""),
            Value::Text(s) => write!(f, "'{s}'"),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Context {
        Context::new()
            .with("player.intelligence", 5)
            .with("player.talent", "Iris")
            .with("player.alive", true)
            .with("this.weight", f64::NAN)
    }

    fn eval(expr: &str) -> Result<bool, EvalError> {
        Condition::parse(expr).expect("valid condition").evaluate(&player())
    }

    #[test]
    fn parses_each_operator() {
        for (expr, op) in [
            ("a.b == 1", Operator::Eq),
            ("a.b === 1", Operator::Eq),
            ("a.b != 1", Operator::Ne),
            ("a.b !== 1", Operator::Ne),
            ("a.b > 1", Operator::Gt),
            ("a.b >= 1", Operator::Ge),
            ("a.b < 1", Operator::Lt),
            ("a.b <= 1", Operator::Le),
        ] {
            assert_eq!(Condition::parse(expr).expect(expr).operator, op, "{expr}");
        }
    }

    #[test]
    fn parses_literals() {
        let c: Condition = "player.talent === 'Iris'".parse().expect("valid");
        assert_eq!(c.literal, Value::Text("Iris".into()));
        let c: Condition = r#"  player.name=="O'Brien"  "#.parse().expect("valid");
        assert_eq!(c.literal, Value::Text("O'Brien".into()));
        assert_eq!(c.to_string(), r#"player.name == "O'Brien""#);
        let c: Condition = "this.temp > -2.5".parse().expect("valid");
        assert_eq!(c.literal, Value::Number(-2.5));
        let c: Condition = "player.alive != false".parse().expect("valid");
        assert_eq!(c.literal, Value::Bool(false));
    }

    #[test]
    fn rejects_combinators_calls_and_garbage() {
        for expr in [
            "player.intelligence >= 5 && player.strength < 3",
            "player.hasItem('KEY')",
            "player.intelligence",
            "5 == player.intelligence",
            "player.talent == Iris",
            "player.talent == 'Iris",
            "",
        ] {
            let err = Condition::parse(expr).expect_err(expr);
            assert_eq!(err.expr, expr);
        }
    }

    #[test]
    fn numeric_comparisons() {
        assert_eq!(eval("player.intelligence >= 5"), Ok(true));
        assert_eq!(eval("player.intelligence > 5"), Ok(false));
        assert_eq!(eval("player.intelligence < 5.5"), Ok(true));
        assert_eq!(eval("player.intelligence == 5.0"), Ok(true));
    }

    #[test]
    fn nan_only_satisfies_not_equal() {
        assert_eq!(eval("this.weight == 1"), Ok(false));
        assert_eq!(eval("this.weight >= 1"), Ok(false));
        assert_eq!(eval("this.weight != 1"), Ok(true));
    }

    #[test]
    fn strings_compare_strictly() {
        assert_eq!(eval("player.talent == 'Iris'"), Ok(true));
        assert_eq!(eval("player.talent == 'iris'"), Ok(false));
        assert_eq!(eval("player.talent < 'J'"), Ok(true));
    }

    #[test]
    fn no_coercion_between_kinds() {
        assert_eq!(
            eval("player.intelligence == '5'"),
            Err(EvalError::TypeMismatch {
                path: "player.intelligence".into(),
                expected: "string",
                found: "number",
            })
        );
        assert!(matches!(eval("player.alive == 1"), Err(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn booleans_support_equality_only() {
        assert_eq!(eval("player.alive == true"), Ok(true));
        assert!(matches!(
            eval("player.alive > false"),
            Err(EvalError::Unordered { operator: Operator::Gt, .. })
        ));
    }

    #[test]
    fn unknown_path_is_an_error() {
        assert_eq!(
            eval("player.strength > 1"),
            Err(EvalError::UnknownPath {
                path: "player.strength".into()
            })
        );
    }
}
