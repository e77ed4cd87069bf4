//! Forbids a unary token directly under its inverse, e.g. `exp(log(x))`.

use std::sync::Arc;

use ndarray::{Array2, ArrayView1, ArrayView2};
use symreg_core::Library;

use crate::prior::{zeros, Prior};
use crate::relational::{RelationalConstraint, Relationship};

/// One `child` constraint per inverse pair declared by the library.
#[derive(Debug, Clone)]
pub struct InverseUnaryConstraint {
    library: Arc<Library>,
    pairs: Vec<RelationalConstraint>,
}

impl InverseUnaryConstraint {
    pub fn new(library: Arc<Library>) -> Self {
        let pairs = library
            .inverse_tokens()
            .iter()
            .map(|&(target, effector)| {
                RelationalConstraint::new(
                    library.clone(),
                    vec![target],
                    vec![effector],
                    Relationship::Child,
                )
                .with_name("InverseUnaryConstraint")
            })
            .collect();
        Self { library, pairs }
    }
}

impl Prior for InverseUnaryConstraint {
    fn name(&self) -> &'static str {
        "InverseUnaryConstraint"
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn validate(&self) -> Result<(), String> {
        if self.pairs.is_empty() {
            return Err("There are no inverse unary Token pairs in the Library.".to_owned());
        }
        Ok(())
    }

    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        parent: ArrayView1<'_, usize>,
        sibling: ArrayView1<'_, usize>,
        _dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        let mut prior = zeros(actions, &self.library);
        for pair in &self.pairs {
            // Entries are 0 or -inf, so the sum is their union.
            prior += &pair.constrain(actions, parent, sibling);
        }
        prior
    }

    fn describe(&self) -> String {
        self.pairs
            .iter()
            .map(Prior::describe)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
