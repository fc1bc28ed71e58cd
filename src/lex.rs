use std::fmt::Display;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum TokenizeError {
    #[error("Unknown character '{ch}'")]
    #[diagnostic(
        code(calc::tokenize::unknown_character),
        help("remove or correct the character: `{ch}`")
    )]
    UnknownCharacter {
        ch: char,
        #[label("this character")]
        span: SourceSpan,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of `literal` in the lexed text.
    pub offset: usize,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.literal.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Operator(Operator),
    Function(Function),
    Constant(Constant),
    LeftParen,
    RightParen,
    Factorial,
    PercentSuffix,
    ModKeyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log10,
    Ln,
    Sqrt,
}

impl Function {
    /// Spelling at the input level; `log` is base ten.
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Log10 => "log",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

// Longest spellings first so that `asin` wins over a shorter prefix.
// A run of letters is cut into these words, so `emod2` reads as `e mod 2`.
const WORDS: &[(&str, TokenKind)] = &[
    ("mod", TokenKind::ModKeyword),
    ("asin", TokenKind::Function(Function::Asin)),
    ("acos", TokenKind::Function(Function::Acos)),
    ("atan", TokenKind::Function(Function::Atan)),
    ("sqrt", TokenKind::Function(Function::Sqrt)),
    ("sin", TokenKind::Function(Function::Sin)),
    ("cos", TokenKind::Function(Function::Cos)),
    ("tan", TokenKind::Function(Function::Tan)),
    ("log", TokenKind::Function(Function::Log10)),
    ("ln", TokenKind::Function(Function::Ln)),
    ("e", TokenKind::Constant(Constant::E)),
];

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number => write!(f, "NUMBER {lit}"),
            TokenKind::Operator(_) => write!(f, "OPERATOR {lit}"),
            TokenKind::Function(_) => write!(f, "FUNCTION {lit}"),
            TokenKind::Constant(_) => write!(f, "CONSTANT {lit}"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit}"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit}"),
            TokenKind::Factorial => write!(f, "FACTORIAL {lit}"),
            TokenKind::PercentSuffix => write!(f, "PERCENT {lit}"),
            TokenKind::ModKeyword => write!(f, "MOD {lit}"),
        }
    }
}

pub struct Lexer<'de> {
    rest: &'de str,
    pub byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            rest: input,
            byte: 0,
        }
    }
}

/// Lexes the whole input, stopping at the first unknown character.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>, TokenizeError> {
    Lexer::new(text).collect()
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let start = self.byte;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Start {
                Word,
                Number,
            }

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset: start,
                }))
            };

            let started = match c {
                '(' => return process(TokenKind::LeftParen),
                ')' => return process(TokenKind::RightParen),
                '+' => return process(TokenKind::Operator(Operator::Plus)),
                '-' => return process(TokenKind::Operator(Operator::Minus)),
                '*' | '×' => return process(TokenKind::Operator(Operator::Times)),
                '/' => return process(TokenKind::Operator(Operator::Divide)),
                '^' => return process(TokenKind::Operator(Operator::Power)),
                '!' => return process(TokenKind::Factorial),
                '%' => return process(TokenKind::PercentSuffix),
                'π' => return process(TokenKind::Constant(Constant::Pi)),
                'a'..='z' => Start::Word,
                '0'..='9' | '.' => Start::Number,
                c if c.is_whitespace() => continue,
                c => {
                    return Some(Err(TokenizeError::UnknownCharacter {
                        ch: c,
                        span: SourceSpan::from(start..self.byte),
                    }));
                }
            };

            match started {
                Start::Word => {
                    let matched = WORDS
                        .iter()
                        .find(|(word, _)| cur.starts_with(*word))
                        .copied();

                    let Some((word, kind)) = matched else {
                        return Some(Err(TokenizeError::UnknownCharacter {
                            ch: c,
                            span: SourceSpan::from(start..self.byte),
                        }));
                    };

                    let literal = &cur[..word.len()];
                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    return Some(Ok(Token {
                        kind,
                        literal,
                        offset: start,
                    }));
                }
                Start::Number => {
                    let first_non_digit = cur
                        .find(|c| !matches!(c, '0'..='9' | '.'))
                        .unwrap_or(cur.len());

                    let mut literal = &cur[..first_non_digit];

                    // a second dot starts a new token
                    let mut dotted = literal.splitn(3, '.');
                    if let (Some(one), Some(two), Some(_)) =
                        (dotted.next(), dotted.next(), dotted.next())
                    {
                        literal = &literal[..one.len() + two.len() + 1];
                    }

                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    return Some(Ok(Token {
                        kind: TokenKind::Number,
                        literal,
                        offset: start,
                    }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn literals(text: &str) -> Vec<&str> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|token| token.literal)
            .collect()
    }

    #[test]
    fn numbers_take_at_most_one_dot() {
        assert_eq!(literals("12.5"), vec!["12.5"]);
        assert_eq!(literals("1.2.3"), vec!["1.2", ".3"]);
        assert_eq!(literals("5."), vec!["5."]);
    }

    #[test]
    fn operators_and_suffixes() {
        assert_eq!(
            kinds("3+4×2*1/(5)^2!%-1"),
            vec![
                TokenKind::Number,
                TokenKind::Operator(Operator::Plus),
                TokenKind::Number,
                TokenKind::Operator(Operator::Times),
                TokenKind::Number,
                TokenKind::Operator(Operator::Times),
                TokenKind::Number,
                TokenKind::Operator(Operator::Divide),
                TokenKind::LeftParen,
                TokenKind::Number,
                TokenKind::RightParen,
                TokenKind::Operator(Operator::Power),
                TokenKind::Number,
                TokenKind::Factorial,
                TokenKind::PercentSuffix,
                TokenKind::Operator(Operator::Minus),
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn function_names_use_longest_match() {
        assert_eq!(
            kinds("asin(1)"),
            vec![
                TokenKind::Function(Function::Asin),
                TokenKind::LeftParen,
                TokenKind::Number,
                TokenKind::RightParen,
            ]
        );
        assert_eq!(literals("sqrt(4)+ln(e)")[0], "sqrt");
        assert_eq!(
            kinds("sine"),
            vec![
                TokenKind::Function(Function::Sin),
                TokenKind::Constant(Constant::E),
            ]
        );
    }

    #[test]
    fn constants() {
        assert_eq!(
            kinds("π×e"),
            vec![
                TokenKind::Constant(Constant::Pi),
                TokenKind::Operator(Operator::Times),
                TokenKind::Constant(Constant::E),
            ]
        );
    }

    #[test]
    fn mod_is_a_word_anywhere_in_a_letter_run() {
        assert_eq!(
            kinds("10mod3"),
            vec![TokenKind::Number, TokenKind::ModKeyword, TokenKind::Number]
        );
        assert_eq!(kinds("10 mod 3"), kinds("10mod3"));
        assert_eq!(
            kinds("emod2"),
            vec![
                TokenKind::Constant(Constant::E),
                TokenKind::ModKeyword,
                TokenKind::Number,
            ]
        );
        assert_eq!(
            kinds("πmode"),
            vec![
                TokenKind::Constant(Constant::Pi),
                TokenKind::ModKeyword,
                TokenKind::Constant(Constant::E),
            ]
        );
        assert!(matches!(
            tokenize("emox"),
            Err(TokenizeError::UnknownCharacter { ch: 'm', .. })
        ));
    }

    #[test]
    fn offsets_count_bytes() {
        let tokens = tokenize("π×2").unwrap();
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 'π'.len_utf8());
        assert_eq!(tokens[2].offset, 'π'.len_utf8() + '×'.len_utf8());
        assert_eq!(tokens[2].span(), SourceSpan::from(4..5));
    }

    #[test]
    fn unknown_characters_are_rejected() {
        assert_eq!(
            tokenize("2#3"),
            Err(TokenizeError::UnknownCharacter {
                ch: '#',
                span: SourceSpan::from(1..2),
            })
        );
        assert!(tokenize("x").is_err());
        assert!(tokenize("SIN(1)").is_err());
    }

    #[test]
    fn lexing_resumes_after_an_error() {
        let tokens: Vec<_> = Lexer::new("1#2").filter_map(Result::ok).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].literal, "2");
    }
}
