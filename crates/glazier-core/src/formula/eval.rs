//! Tree-walking evaluator for parsed formulas.
//!
//! Pure f64 arithmetic. Division by zero and domain errors produce
//! infinities or NaN; the caller rejects those results.

use crate::formula::parser::{BinaryOp, Expr, Function, UnaryOp};

/// Evaluates `expr` with `total` bound to the given value.
pub fn evaluate(expr: &Expr, total: f64) -> f64 {
    match expr {
        Expr::Number(value) => *value,
        Expr::Total => total,
        Expr::Unary(op, operand) => {
            let value = evaluate(operand, total);
            match op {
                UnaryOp::Plus => value,
                UnaryOp::Neg => -value,
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let a = evaluate(lhs, total);
            let b = evaluate(rhs, total);
            match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::FloorDiv => (a / b).floor(),
                // Floored modulo: the result takes the sign of the divisor.
                BinaryOp::Mod => a - b * (a / b).floor(),
                BinaryOp::Pow => a.powf(b),
            }
        }
        Expr::Call(function, args) => {
            let values: Vec<f64> = args.iter().map(|arg| evaluate(arg, total)).collect();
            call(*function, &values)
        }
    }
}

/// Applies a whitelisted function. Arity was checked at parse time.
fn call(function: Function, args: &[f64]) -> f64 {
    let x = args.first().copied().unwrap_or(f64::NAN);
    let y = args.get(1).copied();

    match function {
        Function::Abs => x.abs(),
        Function::Ceil => x.ceil(),
        Function::Floor => x.floor(),
        Function::Round => match y {
            Some(digits) => {
                let scale = 10f64.powi(digits.trunc() as i32);
                (x * scale).round() / scale
            }
            None => x.round(),
        },
        Function::Trunc => x.trunc(),
        Function::Sqrt => x.sqrt(),
        Function::Cbrt => x.cbrt(),
        Function::Exp => x.exp(),
        Function::Ln => x.ln(),
        Function::Log => match y {
            Some(base) => x.log(base),
            None => x.ln(),
        },
        Function::Log10 => x.log10(),
        Function::Log2 => x.log2(),
        Function::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
        Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Function::Pow => x.powf(y.unwrap_or(f64::NAN)),
        Function::Hypot => x.hypot(y.unwrap_or(f64::NAN)),
    }
}
