use fnv::{FnvHashMap, FnvHashSet};
use lazy_static::lazy_static;

/// Builtin functions the downstream shader generator understands, with their
/// arities
///
/// Exported as a constant so hosts can display or extend the vocabulary.
pub const BUILTIN_FUNCTIONS: [(&str, usize); 24] = [
    // channel extraction
    ("red", 1),
    ("green", 1),
    ("blue", 1),
    ("alpha", 1),
    // scalar intrinsics
    ("abs", 1),
    ("sqrt", 1),
    ("sin", 1),
    ("cos", 1),
    ("tan", 1),
    ("exp", 1),
    ("log", 1),
    ("floor", 1),
    ("ceil", 1),
    ("frac", 1),
    ("sign", 1),
    ("min", 2),
    ("max", 2),
    ("pow", 2),
    ("atan2", 2),
    ("step", 2),
    ("fmod", 2),
    ("clamp", 3),
    ("lerp", 3),
    ("smoothstep", 3),
];

lazy_static! {
    static ref BUILTINS: SymbolTable = {
        let mut table = SymbolTable::new();
        for (name, arity) in BUILTIN_FUNCTIONS {
            table.define_function(name, arity);
        }
        table
    };
}

/// The names a formula may reference
///
/// The compiler resolves every variable and function against this table; it
/// is the whole configuration surface of a compilation. Tables are cheap to
/// clone and owned by the caller, so a host keeps one per equation editor and
/// extends it as images are loaded.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    variables: FnvHashSet<String>,
    functions: FnvHashMap<String, usize>,
}

impl SymbolTable {
    /// An empty table: nothing resolves
    pub fn new() -> Self {
        Self::default()
    }

    /// The builtin shader intrinsics, without any variables
    ///
    /// # Example
    /// ```
    /// use shader_equation::SymbolTable;
    ///
    /// assert_eq!(SymbolTable::builtins().function("clamp"), Some(3));
    /// assert!(!SymbolTable::builtins().variable("I0"));
    /// ```
    pub fn builtins() -> &'static SymbolTable {
        &BUILTINS
    }

    /// The builtins plus `count` pixel sources named `I0`, `I1`, ...
    ///
    /// # Example
    /// ```
    /// use shader_equation::{compile, SymbolTable};
    ///
    /// let symbols = SymbolTable::with_images(2);
    /// assert!(compile("I0 + I1", &symbols).is_ok());
    /// assert!(compile("I2", &symbols).is_err());
    /// ```
    pub fn with_images(count: usize) -> SymbolTable {
        let mut table = BUILTINS.clone();
        for idx in 0..count {
            table.define_variable(format!("I{}", idx));
        }
        table
    }

    /// Register a variable name
    pub fn define_variable<N>(&mut self, name: N)
    where
        N: Into<String>,
    {
        self.variables.insert(name.into());
    }

    /// Register a function and the number of arguments it takes
    ///
    /// # Example
    /// ```
    /// use shader_equation::{compile, SymbolTable};
    ///
    /// let mut symbols = SymbolTable::with_images(1);
    /// symbols.define_function("gamma", 2);
    /// assert!(compile("gamma(I0, 2.2)", &symbols).is_ok());
    /// ```
    pub fn define_function<N>(&mut self, name: N, arity: usize)
    where
        N: Into<String>,
    {
        self.functions.insert(name.into(), arity);
    }

    /// Whether `name` is a known variable
    pub fn variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    /// The arity of function `name`, if it is known
    pub fn function(&self, name: &str) -> Option<usize> {
        self.functions.get(name).copied()
    }
}
