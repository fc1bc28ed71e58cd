use std::{fmt::Display, iter::Peekable};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::lex::{Constant, Function, Operator, Token, TokenKind};

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unmatched parenthesis")]
    #[diagnostic(
        code(calc::parse::unmatched_paren),
        help("every `(` needs a matching `)`")
    )]
    UnmatchedParen {
        #[label("this parenthesis has no partner")]
        span: SourceSpan,
    },

    #[error("Empty expression")]
    #[diagnostic(
        code(calc::parse::empty_expression),
        help("an expression needs at least one number or constant")
    )]
    EmptyExpression,

    #[error("Unexpected {found}")]
    #[diagnostic(code(calc::parse::unexpected_token))]
    UnexpectedToken {
        found: String,
        #[label("here")]
        span: SourceSpan,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    ConstantRef(Constant),
    UnaryMinus(Box<Expr>),
    BinaryOp(BinaryOp, Box<Expr>, Box<Expr>),
    Factorial(Box<Expr>),
    Percent(Box<Expr>),
    Call(Function, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Pow => write!(f, "^"),
            BinaryOp::Mod => write!(f, "mod"),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(n) => write!(f, "{n}"),
            Expr::ConstantRef(Constant::Pi) => write!(f, "π"),
            Expr::ConstantRef(Constant::E) => write!(f, "e"),
            Expr::UnaryMinus(expr) => write!(f, "(- {expr})"),
            Expr::BinaryOp(op, lhs, rhs) => write!(f, "({op} {lhs} {rhs})"),
            Expr::Factorial(expr) => write!(f, "(! {expr})"),
            Expr::Percent(expr) => write!(f, "(% {expr})"),
            Expr::Call(function, arg) => write!(f, "({} {arg})", function.name()),
        }
    }
}

pub struct Parser<'a, 'de> {
    tokens: Peekable<std::iter::Copied<std::slice::Iter<'a, Token<'de>>>>,
    end: usize,
}

/// Builds the expression tree for a complete token sequence.
pub fn parse(tokens: &[Token<'_>]) -> Result<Expr, ParseError> {
    check_operands(tokens)?;
    check_parens(tokens)?;
    Parser::new(tokens).parse()
}

fn check_operands(tokens: &[Token<'_>]) -> Result<(), ParseError> {
    let has_operand = tokens.iter().any(|token| match token.kind {
        TokenKind::Number => token.literal.bytes().any(|b| b.is_ascii_digit()),
        TokenKind::Constant(_) => true,
        _ => false,
    });
    if has_operand {
        Ok(())
    } else {
        Err(ParseError::EmptyExpression)
    }
}

fn check_parens(tokens: &[Token<'_>]) -> Result<(), ParseError> {
    let mut open = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::LeftParen => open.push(token.span()),
            TokenKind::RightParen => {
                if open.pop().is_none() {
                    return Err(ParseError::UnmatchedParen { span: token.span() });
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(span) => Err(ParseError::UnmatchedParen { span }),
        None => Ok(()),
    }
}

impl<'a, 'de> Parser<'a, 'de> {
    pub fn new(tokens: &'a [Token<'de>]) -> Self {
        let end = tokens
            .last()
            .map_or(0, |token| token.offset + token.literal.len());
        Parser {
            tokens: tokens.iter().copied().peekable(),
            end,
        }
    }

    pub fn parse(mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_within(0)?;
        match self.tokens.next() {
            None => Ok(expr),
            Some(token) => Err(unexpected(&token)),
        }
    }

    fn eof(&self) -> ParseError {
        ParseError::UnexpectedToken {
            found: "end of input".to_string(),
            span: SourceSpan::from(self.end..self.end),
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token<'de>, ParseError> {
        match self.tokens.next() {
            Some(token) if token.kind == expected => Ok(token),
            Some(token) => Err(unexpected(&token)),
            None => Err(self.eof()),
        }
    }

    pub fn parse_within(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let Some(lhs) = self.tokens.next() else {
            return Err(self.eof());
        };

        let mut lhs = match lhs.kind {
            TokenKind::Number => match lhs.literal.parse() {
                Ok(n) => Expr::Literal(n),
                Err(_) => return Err(unexpected(&lhs)),
            },
            TokenKind::Constant(constant) => Expr::ConstantRef(constant),
            TokenKind::LeftParen => {
                let inner = self.parse_within(0)?;
                self.expect(TokenKind::RightParen)?;
                inner
            }
            TokenKind::Function(function) => {
                self.expect(TokenKind::LeftParen)?;
                let arg = self.parse_within(0)?;
                self.expect(TokenKind::RightParen)?;
                Expr::Call(function, Box::new(arg))
            }
            TokenKind::Operator(Operator::Minus) => {
                let ((), r_bp) = prefix_binding_power();
                let rhs = self.parse_within(r_bp)?;
                Expr::UnaryMinus(Box::new(rhs))
            }
            _ => return Err(unexpected(&lhs)),
        };

        loop {
            let Some(token) = self.tokens.peek().copied() else {
                break;
            };

            if let Some((l_bp, ())) = postfix_binding_power(token.kind) {
                if l_bp < min_bp {
                    break;
                }
                self.tokens.next();
                lhs = match token.kind {
                    TokenKind::Factorial => Expr::Factorial(Box::new(lhs)),
                    _ => Expr::Percent(Box::new(lhs)),
                };
                continue;
            }

            let op = match token.kind {
                TokenKind::Operator(Operator::Plus) => BinaryOp::Add,
                TokenKind::Operator(Operator::Minus) => BinaryOp::Sub,
                TokenKind::Operator(Operator::Times) => BinaryOp::Mul,
                TokenKind::Operator(Operator::Divide) => BinaryOp::Div,
                TokenKind::Operator(Operator::Power) => BinaryOp::Pow,
                TokenKind::ModKeyword => BinaryOp::Mod,
                TokenKind::RightParen => break,
                _ => return Err(unexpected(&token)),
            };

            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.tokens.next();

            let rhs = self.parse_within(r_bp)?;
            lhs = Expr::BinaryOp(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }
}

fn unexpected(token: &Token<'_>) -> ParseError {
    ParseError::UnexpectedToken {
        found: format!("token `{}`", token.literal),
        span: token.span(),
    }
}

// Prefix minus binds tighter than the suffixes, so `-3!` is `(-3)!` and
// `-2^2` is `(-2)^2`.
fn prefix_binding_power() -> ((), u8) {
    ((), 9)
}

fn postfix_binding_power(kind: TokenKind) -> Option<(u8, ())> {
    match kind {
        TokenKind::Factorial | TokenKind::PercentSuffix => Some((7, ())),
        _ => None,
    }
}

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Add | BinaryOp::Sub => (1, 2),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (3, 4),
        BinaryOp::Pow => (6, 5),
    }
}
