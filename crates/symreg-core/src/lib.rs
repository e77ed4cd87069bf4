//! Token library and tree-structure routines for symbolic regression sampling.
//!
//! Expressions are sampled as pre-order token sequences, one token per step.
//! This crate holds the vocabulary side of that process:
//!
//! - [`Token`] and [`Library`]: the registry of symbols with their arities and
//!   the classification sets (terminals, unary, binary, trig, inputs, inverse
//!   pairs) that constraints are written against.
//! - [`tree`]: pure routines deriving parent, sibling, open-slot and ancestor
//!   signals from a batch of partial sequences.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use symreg_core::{Library, StructuralSignals};
//!
//! let library = Library::with_functions(1, &["add", "sin", "const"]).unwrap();
//! let add = library.index_of("add").unwrap();
//! let x1 = library.index_of("x1").unwrap();
//!
//! // add(x1, ·): the next node is add's second argument.
//! let actions = array![[add, x1]];
//! let signals = StructuralSignals::from_actions(actions.view(), &library);
//! assert_eq!(signals.dangling[0], 1);
//! assert_eq!(signals.sibling[0], x1);
//! ```

pub mod error;
pub mod library;
pub mod token;
pub mod tree;

pub use error::LibraryError;
pub use library::Library;
pub use token::{Token, CONST_NAME, INVERSE_PAIRS, TRIG_NAMES};
pub use tree::StructuralSignals;
