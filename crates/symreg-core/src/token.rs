//! Token vocabulary for expression sequences.
//!
//! An expression is emitted as the pre-order traversal of its tree, one token
//! per node. Every token has a fixed arity, so the tree shape can always be
//! recovered from the sequence alone.

use std::fmt;

/// Names of trigonometric tokens.
pub const TRIG_NAMES: &[&str] = &["sin", "cos", "tan", "csc", "sec", "cot"];

/// Ordered pairs of mutually inverse unary tokens.
pub const INVERSE_PAIRS: &[(&str, &str)] = &[
    ("exp", "log"),
    ("log", "exp"),
    ("sqrt", "n2"),
    ("n2", "sqrt"),
    ("neg", "neg"),
    ("inv", "inv"),
];

/// Name of the placeholder token for an optimizable constant.
pub const CONST_NAME: &str = "const";

/// Arity of a built-in function name, if it is one.
pub fn builtin_arity(name: &str) -> Option<usize> {
    match name {
        "add" | "sub" | "mul" | "div" | "pow" => Some(2),
        "sin" | "cos" | "tan" | "csc" | "sec" | "cot" | "exp" | "log" | "sqrt" | "n2"
        | "n3" | "n4" | "neg" | "abs" | "inv" | "tanh" | "sigmoid" => Some(1),
        CONST_NAME => Some(0),
        _ => None,
    }
}

/// A single grammar symbol.
///
/// Tokens are immutable once registered in a [`Library`](crate::Library);
/// their id is their position in that library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Display name, unique within a library.
    pub name: String,
    /// Number of children. Zero for terminals.
    pub arity: usize,
    /// Index of the input variable this token reads, if any.
    pub input_var: Option<usize>,
}

impl Token {
    /// Create an operator or terminal token.
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            input_var: None,
        }
    }

    /// Create the token for input variable `index`, named `x{index + 1}`.
    pub fn input(index: usize) -> Self {
        Self {
            name: format!("x{}", index + 1),
            arity: 0,
            input_var: Some(index),
        }
    }

    /// Create the constant placeholder token.
    pub fn constant() -> Self {
        Self::new(CONST_NAME, 0)
    }

    /// Check if this token ends a branch.
    pub fn is_terminal(&self) -> bool {
        self.arity == 0
    }

    /// Check if this token reads an input variable.
    pub fn is_input(&self) -> bool {
        self.input_var.is_some()
    }

    /// Check if this is a trigonometric function.
    pub fn is_trig(&self) -> bool {
        TRIG_NAMES.contains(&self.name.as_str())
    }

    /// Check if this is the constant placeholder.
    pub fn is_const(&self) -> bool {
        self.name == CONST_NAME
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
