use miette::Diagnostic;
use thiserror::Error;

use crate::{
    CalcError,
    lex::{Function, tokenize},
    parse::{BinaryOp, Expr, parse},
};

/// Fractional decimal digits kept in every result.
pub const FRACTION_DIGITS: i32 = 10;

/// Largest `n` whose factorial is finite in an `f64`.
pub const MAX_FACTORIAL: u32 = 170;

const INTEGER_TOLERANCE: f64 = 1e-9;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Division by zero")]
    #[diagnostic(code(calc::eval::division_by_zero))]
    DivisionByZero,

    #[error("`{operation}` is undefined for this argument")]
    #[diagnostic(code(calc::eval::domain_error))]
    DomainError { operation: &'static str },

    #[error("Result is too large")]
    #[diagnostic(
        code(calc::eval::overflow),
        help("factorials are only defined up to 170!")
    )]
    Overflow,

    #[error("Result is not a finite number")]
    #[diagnostic(code(calc::eval::non_finite))]
    NonFinite,
}

impl Function {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Asin => x.asin(),
            Function::Acos => x.acos(),
            Function::Atan => x.atan(),
            Function::Log10 => x.log10(),
            Function::Ln => x.ln(),
            Function::Sqrt => x.sqrt(),
        }
    }
}

/// Evaluates `expr` and rounds the result to [`FRACTION_DIGITS`] places.
pub fn evaluate(expr: &Expr) -> Result<f64, EvalError> {
    let value = eval_expression(expr)?;
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(round_fraction(value))
}

/// Runs the whole pipeline over raw input text.
pub fn evaluate_str(text: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(text)?;
    let expr = parse(&tokens)?;
    Ok(evaluate(&expr)?)
}

fn eval_expression(expr: &Expr) -> Result<f64, EvalError> {
    Ok(match expr {
        Expr::Literal(n) => *n,
        Expr::ConstantRef(constant) => constant.value(),
        Expr::UnaryMinus(expr) => -eval_expression(expr)?,
        Expr::BinaryOp(op, lhs, rhs) => {
            let lhs = eval_expression(lhs)?;
            let rhs = eval_expression(rhs)?;
            match op {
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Sub => lhs - rhs,
                BinaryOp::Mul => lhs * rhs,
                BinaryOp::Div => {
                    if rhs == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    lhs / rhs
                }
                BinaryOp::Mod => {
                    if rhs == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    lhs % rhs
                }
                BinaryOp::Pow => {
                    let value = lhs.powf(rhs);
                    if value.is_nan() && !lhs.is_nan() && !rhs.is_nan() {
                        return Err(EvalError::DomainError { operation: "^" });
                    }
                    value
                }
            }
        }
        Expr::Factorial(expr) => factorial(eval_expression(expr)?)?,
        Expr::Percent(expr) => eval_expression(expr)? * 0.01,
        Expr::Call(function, arg) => {
            let arg = eval_expression(arg)?;
            let value = function.apply(arg);
            if value.is_nan() && !arg.is_nan() {
                return Err(EvalError::DomainError {
                    operation: function.name(),
                });
            }
            value
        }
    })
}

/// `n!` for a non-negative integral `n`.
///
/// `n` counts as integral when it lies within `1e-9` of the nearest integer.
pub fn factorial(n: f64) -> Result<f64, EvalError> {
    if n.is_nan() || n < 0.0 {
        return Err(EvalError::DomainError { operation: "!" });
    }
    if n.is_infinite() {
        return Err(EvalError::Overflow);
    }
    let rounded = n.round();
    if (n - rounded).abs() >= INTEGER_TOLERANCE {
        return Err(EvalError::DomainError { operation: "!" });
    }
    if rounded > f64::from(MAX_FACTORIAL) {
        return Err(EvalError::Overflow);
    }

    // rounded is in 0..=170 here
    let n = rounded as u32;
    Ok((2..=n).fold(1.0, |acc, k| acc * f64::from(k)))
}

/// Rounds half to even at the tenth fractional digit.
///
/// Once the value scaled by `10^10` no longer has fractional bits, the
/// rounding goes through the exact decimal expansion instead.
pub fn round_fraction(value: f64) -> f64 {
    let scale = 10f64.powi(FRACTION_DIGITS);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    if scaled.abs() < 2f64.powi(52) {
        return scaled.round_ties_even() / scale;
    }
    format!("{value:.prec$}", prec = FRACTION_DIGITS as usize)
        .parse()
        .unwrap_or(value)
}
