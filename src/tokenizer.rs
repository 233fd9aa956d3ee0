use crate::error::{Error, Result};
use crate::tree::Value;
use std::fmt;
use std::iter::FusedIterator;

/// A half-open byte range into the source formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Offset of the first byte
    pub start: usize,
    /// Offset one past the last byte
    pub end: usize,
}

impl Span {
    /// Create a span from its bounds
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// The smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A binary operator kind
///
/// Each operator is its own kind so a rewrite rule can match one operator, or
/// one precedence level, specifically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `^`
    Pow,
}

impl Op {
    /// The character this operator is spelled with
    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
            Op::Pow => '^',
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A parsed token label
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Any operand: a literal, a named reference, or an already combined
    /// subexpression
    ///
    /// Literals and references are born as values so the rewrite rules treat
    /// leaves and reduced subexpressions identically.
    Value(Value),
    /// A binary operator
    Op(Op),
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// An identifier immediately followed by `(`
    Function(String),
    /// The argument separator inside a call
    Comma,
}

/// A token paired with its location in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was lexed
    pub kind: TokenKind,
    /// Where it came from
    pub span: Span,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Length of the numeric literal at the start of `inp`, if any
///
/// Digits with at most one decimal point; a lone `.` is not a number.
fn number_len(inp: &str) -> Option<usize> {
    let mut seen_decimal = false;
    let len = inp
        .char_indices()
        .find(|&(_, c)| match c {
            '.' if !seen_decimal => {
                seen_decimal = true;
                false
            }
            '0'..='9' => false,
            _ => true,
        })
        .map(|(i, _)| i)
        .unwrap_or(inp.len());
    (len > 1 || (!seen_decimal && len > 0)).then_some(len)
}

/// Length of the identifier at the start of `inp`, if any
fn ident_len(inp: &str) -> Option<usize> {
    let first = inp.chars().next()?;
    if !first.is_ascii_alphabetic() && first != '_' {
        return None;
    }
    Some(
        inp.char_indices()
            .find(|&(_, c)| !c.is_ascii_alphanumeric() && c != '_')
            .map(|(i, _)| i)
            .unwrap_or(inp.len()),
    )
}

/// A tokenizer over a formula string
///
/// Yields `Result<Token, Error>` and fuses after the first error, so
/// collecting into a `Result<Vec<_>>` stops at the offending character.
///
/// # Example
/// ```
/// use shader_equation::{TokenKind, Tokenizer};
///
/// let tokens: Vec<_> = Tokenizer::new("(1 + x)").map(|token| token.unwrap()).collect();
/// assert_eq!(tokens.len(), 5);
/// assert_eq!(tokens[0].kind, TokenKind::OpenParen);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over a formula
    pub fn new(src: &'a str) -> Self {
        Tokenizer { src, pos: 0 }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        let start = self.pos;
        let c = trimmed.chars().next()?;

        let kind = match c {
            '+' => Some(TokenKind::Op(Op::Add)),
            '-' => Some(TokenKind::Op(Op::Sub)),
            '*' => Some(TokenKind::Op(Op::Mul)),
            '/' => Some(TokenKind::Op(Op::Div)),
            '^' => Some(TokenKind::Op(Op::Pow)),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = kind {
            self.pos += c.len_utf8();
            return Some(Ok(Token::new(kind, Span::new(start, self.pos))));
        }

        if let Some(len) = number_len(trimmed) {
            self.pos += len;
            return Some(match trimmed[..len].parse::<f64>() {
                Ok(num) => Ok(Token::new(
                    TokenKind::Value(Value::Constant(num)),
                    Span::new(start, self.pos),
                )),
                // not reachable: number_len only accepts digits and one dot
                Err(_) => Err(Error::Lex { offset: start, found: c }),
            });
        }

        if let Some(len) = ident_len(trimmed) {
            self.pos += len;
            let kind = if trimmed[len..].starts_with('(') {
                TokenKind::Function(trimmed[..len].to_owned())
            } else {
                TokenKind::Value(Value::Variable(trimmed[..len].to_owned()))
            };
            return Some(Ok(Token::new(kind, Span::new(start, self.pos))));
        }

        // no token starts here; fuse so iteration ends after the error
        self.pos = self.src.len();
        Some(Err(Error::Lex { offset: start, found: c }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.src.len() - self.pos))
    }
}

impl<'a> FusedIterator for Tokenizer<'a> {}

#[cfg(test)]
mod tests {
    use super::{Op, Span, Token, TokenKind, Tokenizer};
    use crate::error::Error;
    use crate::tree::Value;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Tokenizer::new(src).map(|token| token.unwrap().kind).collect()
    }

    #[test]
    fn operators_and_values() {
        assert_eq!(
            kinds("1 + 2*x"),
            [
                TokenKind::Value(Value::Constant(1.0)),
                TokenKind::Op(Op::Add),
                TokenKind::Value(Value::Constant(2.0)),
                TokenKind::Op(Op::Mul),
                TokenKind::Value(Value::Variable("x".into())),
            ]
        );
    }

    #[test]
    fn function_needs_immediate_paren() {
        assert_eq!(kinds("min(x, y)")[0], TokenKind::Function("min".into()));
        assert_eq!(
            kinds("min (x)")[0],
            TokenKind::Value(Value::Variable("min".into())),
        );
    }

    #[test]
    fn number_forms() {
        assert_eq!(kinds("1.5"), [TokenKind::Value(Value::Constant(1.5))]);
        assert_eq!(kinds(".5"), [TokenKind::Value(Value::Constant(0.5))]);
        assert_eq!(kinds("2."), [TokenKind::Value(Value::Constant(2.0))]);
    }

    #[test]
    fn lone_dot_is_an_error() {
        let err = Tokenizer::new("1 + .")
            .collect::<crate::Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err, Error::Lex { offset: 4, found: '.' });
    }

    #[test]
    fn unknown_character_offset() {
        let err = Tokenizer::new("2 % 3")
            .collect::<crate::Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err, Error::Lex { offset: 2, found: '%' });
    }

    #[test]
    fn spans_cover_the_source() {
        let tokens: Vec<Token> = Tokenizer::new(" 10+x ").map(|token| token.unwrap()).collect();
        let spans: Vec<Span> = tokens.iter().map(|token| token.span).collect();
        assert_eq!(spans, [Span::new(1, 3), Span::new(3, 4), Span::new(4, 5)]);
    }
}
