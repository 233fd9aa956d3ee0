//! The ordered rewrite rules that give the token sequence its grammar
//!
//! Each rule pairs a window pattern with a reducer. The table order *is* the
//! precedence order: the engine tries rules top to bottom and fires the first
//! one that matches anywhere, so a rule earlier in [`RULES`] binds tighter
//! than everything after it.
use crate::error::{Error, Result};
use crate::symbol::SymbolTable;
use crate::tokenizer::{Op, Token, TokenKind};
use crate::tree::{Call, Combined, Negated, Value};

/// Matches a single token kind inside a rule pattern
#[derive(Clone, Copy)]
pub(crate) enum Matcher {
    /// Any value token, leaf or combined
    Value,
    /// An operator drawn from this set; a set groups one precedence level
    Op(&'static [Op]),
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
}

impl Matcher {
    fn matches(self, kind: &TokenKind) -> bool {
        match (self, kind) {
            (Matcher::Value, TokenKind::Value(_)) => true,
            (Matcher::Op(ops), TokenKind::Op(op)) => ops.contains(op),
            (Matcher::OpenParen, TokenKind::OpenParen) => true,
            (Matcher::CloseParen, TokenKind::CloseParen) => true,
            _ => false,
        }
    }
}

/// How a rule recognizes its window in the token sequence
#[derive(Clone, Copy)]
pub(crate) enum Pattern {
    /// A fixed-length window of matchers
    Window(&'static [Matcher]),
    /// A fixed-length window that only matches in operand position: at the
    /// start of the sequence or right after an operator, `(` or `,`. Keeps
    /// `1-2` and `(8-3)-2` subtractions while `2*-3` negates.
    Prefix(&'static [Matcher]),
    /// `name(value, value, ...)`: variable length, at least one argument
    Call,
}

/// Reduces the matched window to its replacement tokens
///
/// Reducers are pure over exactly the window they matched and always return
/// fewer tokens than they consumed, so sequence length strictly decreases.
pub(crate) type Reducer = fn(Vec<Token>, &SymbolTable) -> Result<Vec<Token>>;

/// A rewrite rule: a window pattern plus the reduction applied to it
pub(crate) struct Rule {
    pub(crate) name: &'static str,
    pub(crate) pattern: Pattern,
    pub(crate) reduce: Reducer,
}

impl Rule {
    /// Length of the window this rule matches at `at`, if it matches there
    pub(crate) fn match_len(&self, tokens: &[Token], at: usize) -> Option<usize> {
        match self.pattern {
            Pattern::Window(pattern) => window_len(pattern, tokens, at),
            Pattern::Prefix(pattern) => {
                let operand_position = at == 0
                    || matches!(
                        tokens[at - 1].kind,
                        TokenKind::Op(_) | TokenKind::OpenParen | TokenKind::Comma
                    );
                if operand_position {
                    window_len(pattern, tokens, at)
                } else {
                    None
                }
            }
            Pattern::Call => call_len(tokens, at),
        }
    }
}

const POW: &[Op] = &[Op::Pow];
const MUL_DIV: &[Op] = &[Op::Mul, Op::Div];
const MINUS: &[Op] = &[Op::Sub];
const ADD_SUB: &[Op] = &[Op::Add, Op::Sub];

/// The rule table, strongest binding first
///
/// The call rule sits above parenthesis collapse so the collapse cannot strip
/// a call's own argument parens out from under it. Operators sharing a level
/// share a rule; with separate rules, priority would beat position and
/// `6/2*3` would reduce the `*` first.
pub(crate) static RULES: [Rule; 6] = [
    Rule {
        name: "call",
        pattern: Pattern::Call,
        reduce: reduce_call,
    },
    Rule {
        name: "parens",
        pattern: Pattern::Window(&[Matcher::OpenParen, Matcher::Value, Matcher::CloseParen]),
        reduce: reduce_paren,
    },
    Rule {
        name: "pow",
        pattern: Pattern::Window(&[Matcher::Value, Matcher::Op(POW), Matcher::Value]),
        reduce: reduce_binary,
    },
    Rule {
        name: "mul-div",
        pattern: Pattern::Window(&[Matcher::Value, Matcher::Op(MUL_DIV), Matcher::Value]),
        reduce: reduce_binary,
    },
    Rule {
        name: "negate",
        pattern: Pattern::Prefix(&[Matcher::Op(MINUS), Matcher::Value]),
        reduce: reduce_negate,
    },
    Rule {
        name: "add-sub",
        pattern: Pattern::Window(&[Matcher::Value, Matcher::Op(ADD_SUB), Matcher::Value]),
        reduce: reduce_binary,
    },
];

fn window_len(pattern: &[Matcher], tokens: &[Token], at: usize) -> Option<usize> {
    let window = tokens.get(at..at + pattern.len())?;
    pattern
        .iter()
        .zip(window)
        .all(|(matcher, token)| matcher.matches(&token.kind))
        .then_some(pattern.len())
}

fn call_len(tokens: &[Token], at: usize) -> Option<usize> {
    let kind = |idx: usize| tokens.get(idx).map(|token| &token.kind);
    if !matches!(kind(at)?, TokenKind::Function(_))
        || !matches!(kind(at + 1)?, TokenKind::OpenParen)
        || !matches!(kind(at + 2)?, TokenKind::Value(_))
    {
        return None;
    }
    let mut idx = at + 3;
    loop {
        match kind(idx)? {
            TokenKind::CloseParen => return Some(idx - at + 1),
            TokenKind::Comma => match kind(idx + 1)? {
                TokenKind::Value(_) => idx += 2,
                _ => return None,
            },
            _ => return None,
        }
    }
}

// Window shapes below are guaranteed by the patterns above; the unreachable
// arms state that invariant.

fn take_value(token: Token) -> Value {
    match token.kind {
        TokenKind::Value(value) => value,
        _ => unreachable!("pattern matched a non-value operand"),
    }
}

/// `value op value` → one combined value
fn reduce_binary(window: Vec<Token>, _symbols: &SymbolTable) -> Result<Vec<Token>> {
    debug_assert_eq!(window.len(), 3);
    let mut window = window.into_iter();
    let (left, op, right) = match (window.next(), window.next(), window.next()) {
        (Some(left), Some(op), Some(right)) => (left, op, right),
        _ => unreachable!("binary window is three tokens"),
    };
    let op = match op.kind {
        TokenKind::Op(op) => op,
        _ => unreachable!("pattern matched a non-operator"),
    };
    let span = left.span.to(right.span);
    let combined = Combined::new(take_value(left), op, take_value(right));
    Ok(vec![Token::new(TokenKind::Value(combined.into()), span)])
}

/// `( value )` → the value, its span widened over the parens
fn reduce_paren(window: Vec<Token>, _symbols: &SymbolTable) -> Result<Vec<Token>> {
    debug_assert_eq!(window.len(), 3);
    let span = window[0].span.to(window[2].span);
    let value = match window.into_iter().nth(1) {
        Some(token) => take_value(token),
        None => unreachable!("paren window is three tokens"),
    };
    Ok(vec![Token::new(TokenKind::Value(value), span)])
}

/// `- value` in operand position → the negated value
fn reduce_negate(window: Vec<Token>, _symbols: &SymbolTable) -> Result<Vec<Token>> {
    debug_assert_eq!(window.len(), 2);
    let span = window[0].span.to(window[1].span);
    let value = match window.into_iter().nth(1) {
        Some(token) => take_value(token),
        None => unreachable!("negate window is two tokens"),
    };
    Ok(vec![Token::new(
        TokenKind::Value(Negated::new(value).into()),
        span,
    )])
}

/// `name(value, ...)` → a call value; resolves the name and checks arity
fn reduce_call(window: Vec<Token>, symbols: &SymbolTable) -> Result<Vec<Token>> {
    debug_assert!(window.len() >= 4);
    let span = window[0].span.to(window[window.len() - 1].span);
    let offset = window[0].span.start;
    let mut window = window.into_iter();
    let name = match window.next().map(|token| token.kind) {
        Some(TokenKind::Function(name)) => name,
        _ => unreachable!("call window starts with a function name"),
    };
    let args: Vec<Value> = window
        .filter_map(|token| match token.kind {
            TokenKind::Value(value) => Some(value),
            _ => None,
        })
        .collect();
    let expected = symbols
        .function(&name)
        .ok_or_else(|| Error::UnknownIdentifier {
            name: name.clone(),
            offset,
        })?;
    if args.len() != expected {
        return Err(Error::TypeMismatch {
            name,
            expected,
            found: args.len(),
            offset,
        });
    }
    Ok(vec![Token::new(
        TokenKind::Value(Call::new(name, args).into()),
        span,
    )])
}

#[cfg(test)]
mod tests {
    use super::RULES;
    use crate::tokenizer::{Token, Tokenizer};

    fn tokens(src: &str) -> Vec<Token> {
        Tokenizer::new(src).collect::<crate::Result<_>>().unwrap()
    }

    #[test]
    fn table_order_is_the_precedence_order() {
        let names: Vec<_> = RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(names, ["call", "parens", "pow", "mul-div", "negate", "add-sub"]);
    }

    #[test]
    fn binary_rule_needs_both_operands() {
        let seq = tokens("1+");
        let add_sub = &RULES[5];
        assert_eq!(add_sub.match_len(&seq, 0), None);
    }

    #[test]
    fn negate_only_matches_in_operand_position() {
        let negate = &RULES[4];
        let seq = tokens("1-2");
        assert_eq!(negate.match_len(&seq, 1), None);
        let seq = tokens("1--2");
        assert_eq!(negate.match_len(&seq, 1), None);
        assert_eq!(negate.match_len(&seq, 2), Some(2));
        // a close paren before the minus marks a binary position even while
        // the group is still unreduced
        let seq = tokens("(8-3)-2");
        assert_eq!(negate.match_len(&seq, 5), None);
        // after an open paren or comma the minus is unary
        let seq = tokens("min(-1,-2)");
        assert_eq!(negate.match_len(&seq, 2), Some(2));
        assert_eq!(negate.match_len(&seq, 5), Some(2));
    }

    #[test]
    fn call_pattern_spans_the_argument_list() {
        let call = &RULES[0];
        let seq = tokens("min(1, 2)");
        assert_eq!(call.match_len(&seq, 0), Some(6));
        // unreduced arguments block the match until they collapse
        let seq = tokens("min(1+2, 3)");
        assert_eq!(call.match_len(&seq, 0), None);
    }

    #[test]
    fn empty_argument_lists_do_not_match() {
        let seq = tokens("f()");
        assert_eq!(RULES[0].match_len(&seq, 0), None);
    }

    #[test]
    fn paren_collapse_needs_a_reduced_body() {
        let parens = &RULES[1];
        let seq = tokens("(1)");
        assert_eq!(parens.match_len(&seq, 0), Some(3));
        let seq = tokens("(1+2)");
        assert_eq!(parens.match_len(&seq, 0), None);
    }
}
