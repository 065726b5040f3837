//! Recursive-descent parser for custom pricing formulas.
//!
//! ## Grammar
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '//' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary (('**' | '^') unary)?          right-associative
//! primary := NUMBER
//!          | 'total' | 'pi' | 'e'
//!          | FUNCTION '(' expr (',' expr)* ')'
//!          | '(' expr ')'
//! ```
//!
//! The only names that parse are the bound variable, the two constants and
//! the function whitelist. There is no syntax for strings, attributes,
//! indexing, assignment or definitions, so nothing but arithmetic can be
//! expressed.

use std::f64::consts::{E, PI};

use crate::error::FormulaError;
use crate::formula::lexer::{tokenize, Token, TokenKind};

/// Deepest nesting of parentheses, calls and unary operators accepted.
pub const MAX_DEPTH: usize = 64;

/// The variable bound to the wholesale total.
pub const TOTAL_VARIABLE: &str = "total";

// =============================================================================
// AST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

/// Whitelisted math functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Ceil,
    Floor,
    /// `round(x)` or `round(x, digits)`.
    Round,
    Trunc,
    Sqrt,
    Cbrt,
    Exp,
    Ln,
    /// `log(x)` is natural log, `log(x, base)` any base.
    Log,
    Log10,
    Log2,
    Min,
    Max,
    Pow,
    Hypot,
}

const FUNCTIONS: &[(&str, Function)] = &[
    ("abs", Function::Abs),
    ("ceil", Function::Ceil),
    ("floor", Function::Floor),
    ("round", Function::Round),
    ("trunc", Function::Trunc),
    ("sqrt", Function::Sqrt),
    ("cbrt", Function::Cbrt),
    ("exp", Function::Exp),
    ("ln", Function::Ln),
    ("log", Function::Log),
    ("log10", Function::Log10),
    ("log2", Function::Log2),
    ("min", Function::Min),
    ("max", Function::Max),
    ("pow", Function::Pow),
    ("hypot", Function::Hypot),
];

impl Function {
    pub fn lookup(name: &str) -> Option<Function> {
        FUNCTIONS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, function)| *function)
    }

    pub fn name(self) -> &'static str {
        FUNCTIONS
            .iter()
            .find(|(_, function)| *function == self)
            .map_or("?", |(name, _)| name)
    }

    /// Accepted argument counts, as (min, max, description).
    fn arity(self) -> (usize, usize, &'static str) {
        match self {
            Function::Round | Function::Log => (1, 2, "1 or 2"),
            Function::Pow | Function::Hypot => (2, 2, "2"),
            Function::Min | Function::Max => (1, usize::MAX, "at least 1"),
            _ => (1, 1, "1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Total,
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

// =============================================================================
// Parser
// =============================================================================

/// Parses a formula into an expression tree.
pub fn parse(source: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    parser.expect_end()?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always ends with End, and End is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.pos += 1;
        }
        token
    }

    fn unexpected<T>(&self, expected: &'static str) -> Result<T, FormulaError> {
        let token = self.peek();
        Err(FormulaError::UnexpectedToken {
            found: token.kind.describe(),
            expected,
            offset: token.offset,
        })
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), FormulaError> {
        if self.peek().kind == kind {
            self.advance();
            Ok(())
        } else {
            self.unexpected(expected)
        }
    }

    fn expect_end(&self) -> Result<(), FormulaError> {
        if self.peek().kind == TokenKind::End {
            Ok(())
        } else {
            self.unexpected("an operator or end of expression")
        }
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::TooDeep { max: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::SlashSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        let op = match self.peek().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.unary()?;
        self.leave();
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.primary()?;
        if matches!(self.peek().kind, TokenKind::StarStar | TokenKind::Caret) {
            self.advance();
            self.enter()?;
            let exponent = self.unary()?;
            self.leave();
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            TokenKind::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.expr()?;
                self.leave();
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.advance();
                self.name(name, token.offset)
            }
            _ => self.unexpected("a number, 'total', a function or '('"),
        }
    }

    fn name(&mut self, name: String, offset: usize) -> Result<Expr, FormulaError> {
        let is_call = self.peek().kind == TokenKind::LParen;

        let constant = match name.as_str() {
            TOTAL_VARIABLE => Some(Expr::Total),
            "pi" => Some(Expr::Number(PI)),
            "e" => Some(Expr::Number(E)),
            _ => None,
        };
        if let Some(expr) = constant {
            if is_call {
                return Err(FormulaError::NotCallable { name });
            }
            return Ok(expr);
        }

        let function = Function::lookup(&name).ok_or(FormulaError::UnknownName {
            name: name.clone(),
            offset,
        })?;
        if !is_call {
            return Err(FormulaError::BareFunction { name });
        }

        self.advance();
        self.enter()?;
        let mut args = vec![self.expr()?];
        while self.peek().kind == TokenKind::Comma {
            self.advance();
            args.push(self.expr()?);
        }
        self.leave();
        self.expect(TokenKind::RParen, "',' or ')'")?;

        let (min, max, expected) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(FormulaError::Arity {
                name: function.name(),
                expected,
                got: args.len(),
            });
        }

        Ok(Expr::Call(function, args))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Box<Expr> {
        Box::new(Expr::Number(v))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse("total * 2 + 50").unwrap(),
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Binary(BinaryOp::Mul, Box::new(Expr::Total), num(2.0))),
                num(50.0),
            )
        );
    }

    #[test]
    fn test_power_is_right_associative_and_binds_tighter_than_minus() {
        assert_eq!(
            parse("-2 ** 3 ^ 2").unwrap(),
            Expr::Unary(
                UnaryOp::Neg,
                Box::new(Expr::Binary(
                    BinaryOp::Pow,
                    num(2.0),
                    Box::new(Expr::Binary(BinaryOp::Pow, num(3.0), num(2.0))),
                )),
            )
        );
    }

    #[test]
    fn test_calls_and_constants() {
        let expr = parse("max(total / 0.28, 25) + round(pi, 2)").unwrap();
        match expr {
            Expr::Binary(BinaryOp::Add, lhs, rhs) => {
                assert!(matches!(*lhs, Expr::Call(Function::Max, ref a) if a.len() == 2));
                assert!(matches!(*rhs, Expr::Call(Function::Round, ref a) if a.len() == 2));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        for source in [
            "import os",
            "__import__('os')",
            "os.system",
            "eval(total)",
            "exec(total)",
            "lambda x: x",
            "new Object()",
            "total.constructor",
            "Function(total)",
            "globals",
        ] {
            assert!(parse(source).is_err(), "{} should not parse", source);
        }

        assert_eq!(
            parse("import os"),
            Err(FormulaError::UnknownName {
                name: "import".into(),
                offset: 0
            })
        );
        assert!(matches!(
            parse("total + __builtins__"),
            Err(FormulaError::UnknownName { offset: 8, .. })
        ));
    }

    #[test]
    fn test_name_misuse() {
        assert_eq!(
            parse("sqrt + 1"),
            Err(FormulaError::BareFunction {
                name: "sqrt".into()
            })
        );
        assert_eq!(
            parse("total(2)"),
            Err(FormulaError::NotCallable {
                name: "total".into()
            })
        );
        assert_eq!(
            parse("pow(total)"),
            Err(FormulaError::Arity {
                name: "pow",
                expected: "2",
                got: 1
            })
        );
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(parse("(total"), Err(FormulaError::UnexpectedToken { .. })));
        assert!(matches!(parse("total 2"), Err(FormulaError::UnexpectedToken { .. })));
        assert!(matches!(parse("total *"), Err(FormulaError::UnexpectedToken { .. })));
        assert!(matches!(parse("min()"), Err(FormulaError::UnexpectedToken { .. })));
        assert!(matches!(parse(""), Err(FormulaError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}total{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&deep), Err(FormulaError::TooDeep { max: MAX_DEPTH }));

        let ok = format!("{}total{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse(&ok), Ok(Expr::Total));

        let negations = format!("{}total", "-".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&negations), Err(FormulaError::TooDeep { max: MAX_DEPTH }));
    }
}
