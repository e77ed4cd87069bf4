//! Token registry and the derived classification sets used by priors.

use std::collections::{BTreeMap, HashMap};

use crate::error::LibraryError;
use crate::token::{builtin_arity, Token, INVERSE_PAIRS};

/// Ordered, immutable collection of tokens.
///
/// Token ids are indices `0..len()` and never change for the lifetime of the
/// library. All classification sets are computed once at construction and are
/// sorted by id.
#[derive(Debug, Clone)]
pub struct Library {
    tokens: Vec<Token>,
    names: Vec<String>,
    arities: Vec<usize>,
    index: HashMap<String, usize>,
    terminal_tokens: Vec<usize>,
    unary_tokens: Vec<usize>,
    binary_tokens: Vec<usize>,
    trig_tokens: Vec<usize>,
    input_tokens: Vec<usize>,
    float_tokens: Vec<usize>,
    const_token: Option<usize>,
    tokens_of_arity: BTreeMap<usize, Vec<usize>>,
    inverse_tokens: Vec<(usize, usize)>,
    /// Parent code per token: index among non-terminals.
    parent_adjust: Vec<Option<usize>>,
    n_parents: usize,
}

impl Library {
    /// Build a library from tokens in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is registered twice, an arity is above 2,
    /// or an input variable token is not a terminal.
    pub fn new(tokens: Vec<Token>) -> Result<Self, LibraryError> {
        let mut index = HashMap::with_capacity(tokens.len());
        for (id, token) in tokens.iter().enumerate() {
            if token.arity > 2 {
                return Err(LibraryError::InvalidArity {
                    name: token.name.clone(),
                    arity: token.arity,
                });
            }
            if token.is_input() && !token.is_terminal() {
                return Err(LibraryError::InputNotTerminal(token.name.clone()));
            }
            if index.insert(token.name.clone(), id).is_some() {
                return Err(LibraryError::DuplicateToken(token.name.clone()));
            }
        }

        let ids_where = |pred: &dyn Fn(&Token) -> bool| -> Vec<usize> {
            tokens
                .iter()
                .enumerate()
                .filter(|(_, t)| pred(t))
                .map(|(id, _)| id)
                .collect()
        };

        let terminal_tokens = ids_where(&|t| t.arity == 0);
        let unary_tokens = ids_where(&|t| t.arity == 1);
        let binary_tokens = ids_where(&|t| t.arity == 2);
        let trig_tokens = ids_where(&|t| t.is_trig());
        let input_tokens = ids_where(&|t| t.is_input());
        let float_tokens = ids_where(&|t| t.is_terminal() && !t.is_input());
        let const_token = tokens.iter().position(Token::is_const);

        let mut tokens_of_arity: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (id, token) in tokens.iter().enumerate() {
            tokens_of_arity.entry(token.arity).or_default().push(id);
        }

        let inverse_tokens = INVERSE_PAIRS
            .iter()
            .filter_map(|(a, b)| Some((*index.get(*a)?, *index.get(*b)?)))
            .collect();

        let mut n_parents = 0;
        let parent_adjust = tokens
            .iter()
            .map(|t| {
                if t.is_terminal() {
                    None
                } else {
                    n_parents += 1;
                    Some(n_parents - 1)
                }
            })
            .collect();

        Ok(Self {
            names: tokens.iter().map(|t| t.name.clone()).collect(),
            arities: tokens.iter().map(|t| t.arity).collect(),
            tokens,
            index,
            terminal_tokens,
            unary_tokens,
            binary_tokens,
            trig_tokens,
            input_tokens,
            float_tokens,
            const_token,
            tokens_of_arity,
            inverse_tokens,
            parent_adjust,
            n_parents,
        })
    }

    /// Build a library of `n_inputs` input variables followed by named
    /// built-in functions (and `const`), in that order.
    pub fn with_functions<S: AsRef<str>>(
        n_inputs: usize,
        function_set: &[S],
    ) -> Result<Self, LibraryError> {
        let mut tokens: Vec<Token> = (0..n_inputs).map(Token::input).collect();
        for name in function_set {
            let name = name.as_ref();
            let arity =
                builtin_arity(name).ok_or_else(|| LibraryError::TokenNotFound(name.to_owned()))?;
            tokens.push(Token::new(name, arity));
        }
        Self::new(tokens)
    }

    /// Number of tokens, `L`.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the library holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get a token by id.
    pub fn token(&self, id: usize) -> Option<&Token> {
        self.tokens.get(id)
    }

    /// All tokens in id order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token names in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Token arities in id order.
    pub fn arities(&self) -> &[usize] {
        &self.arities
    }

    /// Look up a token id by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Resolve token names to ids.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::TokenNotFound`] for the first unknown name.
    pub fn actionize<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>, LibraryError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.index_of(name)
                    .ok_or_else(|| LibraryError::TokenNotFound(name.to_owned()))
            })
            .collect()
    }

    /// Comma-separated names of `ids`, for descriptions.
    pub fn join_names(&self, ids: &[usize]) -> String {
        ids.iter()
            .map(|&id| self.names[id].as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn terminal_tokens(&self) -> &[usize] {
        &self.terminal_tokens
    }

    pub fn unary_tokens(&self) -> &[usize] {
        &self.unary_tokens
    }

    pub fn binary_tokens(&self) -> &[usize] {
        &self.binary_tokens
    }

    pub fn trig_tokens(&self) -> &[usize] {
        &self.trig_tokens
    }

    pub fn input_tokens(&self) -> &[usize] {
        &self.input_tokens
    }

    /// Terminals that are not input variables.
    pub fn float_tokens(&self) -> &[usize] {
        &self.float_tokens
    }

    pub fn const_token(&self) -> Option<usize> {
        self.const_token
    }

    /// Token ids grouped by arity, in ascending arity order.
    pub fn tokens_of_arity(&self) -> &BTreeMap<usize, Vec<usize>> {
        &self.tokens_of_arity
    }

    /// `(token, inverse)` pairs present in this library.
    pub fn inverse_tokens(&self) -> &[(usize, usize)] {
        &self.inverse_tokens
    }

    /// Parent code of a token, `None` for terminals.
    pub fn parent_adjust(&self, id: usize) -> Option<usize> {
        self.parent_adjust.get(id).copied().flatten()
    }

    /// Parent codes of the non-terminal tokens among `ids`.
    pub fn parent_codes(&self, ids: &[usize]) -> Vec<usize> {
        ids.iter().filter_map(|&id| self.parent_adjust(id)).collect()
    }

    /// Parent code used when a node has no parent.
    pub fn empty_parent(&self) -> usize {
        self.n_parents
    }

    /// Sibling id used when a node has no left sibling.
    pub fn empty_sibling(&self) -> usize {
        self.tokens.len()
    }
}
