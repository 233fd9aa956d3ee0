//! A term-rewriting compiler from image equations to shader-ready expression
//! trees
//!
//! This crate compiles the arithmetic formulas a user types into an image
//! viewer's equation field, like `"I0 * 0.5 + I1 * 0.5"` to blend two pixel
//! sources or `"clamp(I0 - I1, 0, 1)"` to difference them, into an owned
//! [`Value`][tree::Value] tree that a shader-code generator walks to emit GPU
//! source. The compiler builds a symbolic tree; it never evaluates the
//! formula and knows nothing about the GPU.
//!
//! ## Usage
//!
//! ```
//! use shader_equation::{compile, SymbolTable};
//!
//! let symbols = SymbolTable::with_images(2);
//! let tree = compile("I0 * 0.5 + I1 * 0.5", &symbols)?;
//! # Ok::<(), shader_equation::Error>(())
//! ```
//!
//! Compilation is a pure function from a formula string to a tree or a typed
//! [`Error`]. Every error carries the byte offset of the offending token, so
//! a live editor recompiling on each keystroke can point at the formula text:
//!
//! ```
//! use shader_equation::{compile, Error, SymbolTable};
//!
//! let err = compile("(2 + 3", SymbolTable::builtins()).unwrap_err();
//! assert_eq!(err, Error::UnmatchedParenthesis { offset: 0 });
//! ```
//!
//! ## Grammar
//!
//! Formulas are ordinary infix arithmetic over numbers, named references and
//! function calls:
//!
//! ```txt
//! value ::= number | name | name(expr, ...) | (expr) | -value
//! expr  ::= value | expr op expr            op ::= + | - | * | / | ^
//! ```
//!
//! Binding strength, strongest first: parentheses and calls, `^`, `*` `/`,
//! unary `-`, `+` and binary `-`. Operators of equal strength associate to
//! the left. An identifier is a function name exactly when its `(` follows
//! immediately: `min(x, y)` calls, `min (x)` references a variable named
//! `min`. Which names resolve at all is decided by the caller-supplied
//! [`SymbolTable`]; it ships with the intrinsics the downstream generator
//! understands and is extended with pixel sources and custom functions.
//!
//! ## Design
//!
//! There is no recursive-descent parser here. The tokenizer produces a flat
//! token sequence and an ordered table of rewrite rules is applied to it,
//! Markov style, until exactly one value token remains: each step fires the
//! strongest rule that matches anywhere in the sequence, at its leftmost
//! match. Precedence and associativity fall out of the table order and the
//! leftmost-match policy; there is no separate precedence table to keep in
//! sync. Every rule replaces its window with something strictly shorter, so
//! compilation terminates for any input, and a sequence that stops shrinking
//! before it reaches a single value is precisely a malformed formula: the
//! leftover tokens are classified into a typed [`Error`] with an offset.
//!
//! ## Tree structure
//!
//! The result is rooted at a [`Value`][tree::Value]: leaves are constants
//! and variables, interior nodes are [`Negated`][tree::Negated],
//! [`Combined`][tree::Combined] and [`Call`][tree::Call]. Children are owned
//! by their parents, so the tree is acyclic by construction; walk it with
//! [`Value::walk`][tree::Value::walk] or match on the enum directly. Its
//! `Display` form is fully parenthesized infix and recompiles to a
//! structurally identical tree, which makes trees easy to snapshot in tests
//! and logs. See [`tree`] for details.
#![warn(missing_docs)]
mod error;
mod rewrite;
mod rules;
mod symbol;
mod tokenizer;
pub mod tree;

pub use error::{Error, Result};
pub use symbol::{SymbolTable, BUILTIN_FUNCTIONS};
pub use tokenizer::{Op, Span, Token, TokenKind, Tokenizer};
pub use tree::Value;

/// Compile a formula into its expression tree
///
/// Tokenizes `formula`, resolves every name against `symbols` and rewrites
/// the token sequence down to a single value. Pure and synchronous: no state
/// survives the call, so compiling on every keystroke is fine.
///
/// # Example
/// ```
/// use shader_equation::{compile, SymbolTable};
///
/// let tree = compile("2 + 3 * 4", SymbolTable::builtins())?;
/// assert_eq!(tree.to_string(), "(2 + (3 * 4))");
/// # Ok::<(), shader_equation::Error>(())
/// ```
pub fn compile(formula: &str, symbols: &SymbolTable) -> Result<Value> {
    let tokens = Tokenizer::new(formula).collect::<Result<Vec<_>>>()?;
    compile_tokens(tokens, symbols)
}

/// Compile an already tokenized formula
///
/// The extension point for custom tokenization; [`compile`] is this applied
/// to [`Tokenizer`]'s output.
///
/// # Example
/// ```
/// use shader_equation::{compile_tokens, SymbolTable, Tokenizer};
///
/// let tokens = Tokenizer::new("1 + 1").collect::<shader_equation::Result<Vec<_>>>()?;
/// let tree = compile_tokens(tokens, SymbolTable::builtins())?;
/// # Ok::<(), shader_equation::Error>(())
/// ```
pub fn compile_tokens(tokens: Vec<Token>, symbols: &SymbolTable) -> Result<Value> {
    rewrite::resolve(&tokens, symbols)?;
    rewrite::reduce(tokens, symbols)
}
