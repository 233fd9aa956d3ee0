//! The splice-and-rescan engine that reduces a token sequence to one value
use crate::error::{Error, Result};
use crate::rules::RULES;
use crate::symbol::SymbolTable;
use crate::tokenizer::{Op, Token, TokenKind};
use crate::tree::Value;
use log::{debug, trace};

/// Check every name in the sequence against the symbol table
///
/// Runs before rewriting so an unknown name is reported at its own offset
/// even when no rule would ever touch it.
pub(crate) fn resolve(tokens: &[Token], symbols: &SymbolTable) -> Result<()> {
    for token in tokens {
        match &token.kind {
            TokenKind::Value(Value::Variable(name)) if !symbols.variable(name) => {
                return Err(Error::UnknownIdentifier {
                    name: name.clone(),
                    offset: token.span.start,
                });
            }
            TokenKind::Function(name) if symbols.function(name).is_none() => {
                return Err(Error::UnknownIdentifier {
                    name: name.clone(),
                    offset: token.span.start,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Rewrite the sequence until a single value remains
///
/// Each pass fires the first rule in table order with a match anywhere, at
/// its leftmost matching position; priority decides ties between rules, not
/// position. Every reduction strictly shortens the sequence, so the loop
/// terminates for any input.
pub(crate) fn reduce(mut tokens: Vec<Token>, symbols: &SymbolTable) -> Result<Value> {
    debug!("reducing {} tokens", tokens.len());
    loop {
        if tokens.len() == 1 && matches!(tokens[0].kind, TokenKind::Value(_)) {
            match tokens.pop().map(|token| token.kind) {
                Some(TokenKind::Value(value)) => return Ok(value),
                _ => unreachable!("just matched a single value"),
            }
        }

        let matched = RULES.iter().find_map(|rule| {
            (0..tokens.len())
                .find_map(|at| rule.match_len(&tokens, at).map(|len| (rule, at, len)))
        });
        let (rule, at, len) = match matched {
            Some(found) => found,
            None => return Err(stuck_error(&tokens)),
        };

        let window: Vec<Token> = tokens.drain(at..at + len).collect();
        let replacement = (rule.reduce)(window, symbols)?;
        debug_assert!(replacement.len() < len, "a reduction must shrink the sequence");
        trace!(
            "{} fired at {}, {} tokens left",
            rule.name,
            at,
            tokens.len() + replacement.len()
        );
        tokens.splice(at..at, replacement);
    }
}

/// Classify a sequence no rule can reduce
fn stuck_error(tokens: &[Token]) -> Error {
    // unbalanced grouping dominates: report the first paren that cannot pair
    let mut opens = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::OpenParen => opens.push(token.span.start),
            TokenKind::CloseParen => {
                if opens.pop().is_none() {
                    return Error::UnmatchedParenthesis {
                        offset: token.span.start,
                    };
                }
            }
            _ => {}
        }
    }
    if let Some(&offset) = opens.first() {
        return Error::UnmatchedParenthesis { offset };
    }
    Error::NoRuleApplies {
        offset: stuck_offset(tokens),
    }
}

/// Find the leftmost token that breaks the operand/operator alternation
///
/// Commas are legal separators only between a call's arguments, so the walk
/// keeps a stack of whether each open group belongs to a call.
fn stuck_offset(tokens: &[Token]) -> usize {
    let mut expect_operand = true;
    let mut call_groups: Vec<bool> = Vec::new();
    let mut was_function = false;
    for token in tokens {
        let function = matches!(token.kind, TokenKind::Function(_));
        match &token.kind {
            TokenKind::Value(_) if expect_operand => expect_operand = false,
            // a minus here could still be unary
            TokenKind::Op(Op::Sub) if expect_operand => {}
            TokenKind::Op(_) if !expect_operand => expect_operand = true,
            TokenKind::Function(_) if expect_operand => {}
            TokenKind::OpenParen if expect_operand => call_groups.push(was_function),
            TokenKind::CloseParen if !expect_operand => {
                call_groups.pop();
            }
            TokenKind::Comma if !expect_operand && call_groups.last() == Some(&true) => {
                expect_operand = true;
            }
            _ => return token.span.start,
        }
        was_function = function;
    }
    // the sequence ran out while an operand was still expected
    tokens.last().map(|token| token.span.end).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::symbol::SymbolTable;
    use crate::compile;

    #[test]
    fn unmatched_open_paren() {
        let err = compile("(2+3", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::UnmatchedParenthesis { offset: 0 });
    }

    #[test]
    fn unmatched_close_paren() {
        let err = compile("2+3)", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::UnmatchedParenthesis { offset: 3 });
    }

    #[test]
    fn leftmost_unclosed_paren_wins() {
        let err = compile("((1)", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::UnmatchedParenthesis { offset: 0 });
    }

    #[test]
    fn trailing_operator_reports_past_it() {
        let err = compile("1+", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 2 });
    }

    #[test]
    fn leading_operator_reports_itself() {
        let err = compile("+1", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 0 });
    }

    #[test]
    fn adjacent_values_report_the_second() {
        let err = compile("1 2", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 2 });
    }

    #[test]
    fn comma_outside_a_call() {
        let err = compile("1,2", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 1 });
        let err = compile("(1,2)", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 2 });
    }

    #[test]
    fn empty_argument_slot() {
        let err = compile("min(1,)", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 6 });
    }

    #[test]
    fn empty_input() {
        let err = compile("", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 0 });
        let err = compile("   ", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 0 });
    }

    #[test]
    fn unknown_variable_offset() {
        let err = compile("foo+1", SymbolTable::builtins()).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownIdentifier {
                name: "foo".into(),
                offset: 0,
            }
        );
    }

    #[test]
    fn unknown_function_offset() {
        let err = compile("1 + bar(2)", SymbolTable::builtins()).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownIdentifier {
                name: "bar".into(),
                offset: 4,
            }
        );
    }

    #[test]
    fn lone_operator() {
        let err = compile("-", SymbolTable::builtins()).unwrap_err();
        assert_eq!(err, Error::NoRuleApplies { offset: 1 });
    }

    #[test]
    fn single_value_needs_no_rule() {
        let tree = compile("7", SymbolTable::builtins()).unwrap();
        assert_eq!(tree, crate::Value::Constant(7.0));
    }
}
