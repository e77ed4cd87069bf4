//! Composable priors and hard constraints for autoregressive expression
//! sampling.
//!
//! At every step of generation each configured rule turns the batch of partial
//! sequences into a `(batch, L)` logit adjustment. Hard constraints contribute
//! `-inf` at forbidden tokens, soft priors contribute finite offsets, and
//! [`JointPrior`] sums them before the policy samples.
//!
//! # Building from configuration
//!
//! ```
//! use std::sync::Arc;
//! use ndarray::array;
//! use symreg_core::Library;
//! use symreg_prior::{make_prior, PriorConfig, PriorResources};
//!
//! let library = Arc::new(Library::with_functions(1, &["add", "sin", "cos", "const"]).unwrap());
//! let config = PriorConfig::from_yaml_str("trig: {}\nlength: {max_: 16}\n").unwrap();
//! let mut report = make_prior(library.clone(), &config, &mut PriorResources::new()).unwrap();
//! assert!(report.warnings.is_empty());
//!
//! let sin = library.index_of("sin").unwrap();
//! let cos = library.index_of("cos").unwrap();
//! let prior = report.prior.call_signals(array![[sin]].view());
//! assert_eq!(prior[[0, cos]], f32::NEG_INFINITY);
//! ```

pub mod binding;
pub mod config;
pub mod error;
pub mod factory;
pub mod inverse;
pub mod joint;
pub mod language_model;
pub mod length;
pub mod mask;
pub mod no_inputs;
pub mod prior;
pub mod relational;
pub mod repeat;
pub mod soft;
mod violation;

pub use binding::{MutationMenu, PositionMode, SequencePositionsConstraint};
pub use config::PriorConfig;
pub use error::PriorError;
pub use factory::{make_prior, PriorReport, PriorResources};
pub use inverse::InverseUnaryConstraint;
pub use joint::JointPrior;
pub use language_model::{LanguageModelPrior, SequenceScorer};
pub use length::LengthConstraint;
pub use no_inputs::NoInputsConstraint;
pub use prior::Prior;
pub use relational::{RelationalConstraint, Relationship};
pub use repeat::RepeatConstraint;
pub use soft::{SoftLengthPrior, UniformArityPrior};
pub use symreg_core;
