use miette::Diagnostic;
use thiserror::Error;

pub mod convert;
pub mod eval;
pub mod format;
pub mod lex;
pub mod parse;
pub mod session;

pub use convert::Conversion;
pub use eval::{EvalError, evaluate, evaluate_str};
pub use lex::{Lexer, Token, TokenKind, TokenizeError, tokenize};
pub use parse::{Expr, ParseError, Parser, parse};
pub use session::{HistoryEntry, Session, SessionConfig, Snapshot};

/// Any failure of the tokenize, parse, evaluate pipeline.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),
}
