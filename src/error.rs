use thiserror::Error;

/// Alias for results produced by compilation
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while compiling a formula
///
/// Every variant carries the byte offset of the offending token so a live
/// equation editor can point at the formula text. Errors are returned, never
/// panicked, and compilation has no side effects, so the host's previous
/// compiled result stays valid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A character that does not start any recognized token
    #[error("unrecognized character `{found}` at offset {offset}")]
    Lex {
        /// Byte offset of the character
        offset: usize,
        /// The character itself
        found: char,
    },

    /// A grouping token left without a matching counterpart
    #[error("unmatched parenthesis at offset {offset}")]
    UnmatchedParenthesis {
        /// Byte offset of the unpaired parenthesis
        offset: usize,
    },

    /// A variable or function name missing from the symbol table
    #[error("unknown identifier `{name}` at offset {offset}")]
    UnknownIdentifier {
        /// The unresolved name
        name: String,
        /// Byte offset of the name
        offset: usize,
    },

    /// A function applied to arguments it does not accept
    #[error("`{name}` takes {expected} argument(s) but {found} were supplied")]
    TypeMismatch {
        /// The function name
        name: String,
        /// Arity the symbol table declares
        expected: usize,
        /// Number of arguments in the formula
        found: usize,
        /// Byte offset of the function name
        offset: usize,
    },

    /// The formula is stuck: no reduction applies anywhere
    #[error("malformed expression at offset {offset}")]
    NoRuleApplies {
        /// Byte offset of the leftmost token that breaks the expression
        offset: usize,
    },
}

impl Error {
    /// Byte offset of the offending token in the source formula
    ///
    /// # Example
    /// ```
    /// use shader_equation::{compile, SymbolTable};
    ///
    /// let err = compile("1 +", SymbolTable::builtins()).unwrap_err();
    /// assert_eq!(err.offset(), 3);
    /// ```
    pub fn offset(&self) -> usize {
        match self {
            Error::Lex { offset, .. }
            | Error::UnmatchedParenthesis { offset }
            | Error::UnknownIdentifier { offset, .. }
            | Error::TypeMismatch { offset, .. }
            | Error::NoRuleApplies { offset } => *offset,
        }
    }
}
