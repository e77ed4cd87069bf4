//! Aggregation of independent rules into one logit adjustment.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use symreg_core::{Library, StructuralSignals};

use crate::error::PriorError;
use crate::prior::Prior;

/// The sum of every configured rule.
///
/// Rules are applied in insertion order. Since every contribution is either
/// finite or `-inf`, the sum forbids exactly the union of what the rules
/// forbid, and soft offsets accumulate.
pub struct JointPrior {
    library: Arc<Library>,
    priors: Vec<Box<dyn Prior>>,
}

impl JointPrior {
    /// Combine `priors`, all of which must be built over `library`.
    ///
    /// # Errors
    ///
    /// Returns [`PriorError::LibraryMismatch`] if a prior holds a different
    /// library instance.
    pub fn new(library: Arc<Library>, priors: Vec<Box<dyn Prior>>) -> Result<Self, PriorError> {
        if priors.iter().any(|p| !Arc::ptr_eq(p.library(), &library)) {
            return Err(PriorError::LibraryMismatch);
        }
        Ok(Self { library, priors })
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    pub fn len(&self) -> usize {
        self.priors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priors.is_empty()
    }

    /// Names of the component rules, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.priors.iter().map(|p| p.name()).collect()
    }

    /// Adjustment before the first token, shape `(L,)`.
    pub fn initial_prior(&self) -> Array1<f32> {
        let mut prior = Array1::zeros(self.library.len());
        for p in &self.priors {
            prior += &p.initial_prior();
        }
        prior
    }

    /// Adjustment for the next token, shape `(batch, L)`.
    pub fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        parent: ArrayView1<'_, usize>,
        sibling: ArrayView1<'_, usize>,
        dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        let mut prior = Array2::zeros((actions.nrows(), self.library.len()));
        for p in &mut self.priors {
            prior += &p.call(actions, parent, sibling, dangling);
        }
        debug_assert!(
            prior.iter().all(|v| *v != f32::INFINITY && !v.is_nan()),
            "joint prior produced +inf or NaN"
        );
        prior
    }

    /// [`call`](Self::call) with signals derived from `actions`.
    pub fn call_signals(&mut self, actions: ArrayView2<'_, usize>) -> Array2<f32> {
        let signals = StructuralSignals::from_actions(actions, &self.library);
        self.call(
            actions,
            signals.parent.view(),
            signals.sibling.view(),
            signals.dangling.view(),
        )
    }

    /// Every component's description, one or more lines each.
    pub fn describe(&self) -> String {
        self.priors
            .iter()
            .map(|p| p.describe())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Debug for JointPrior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JointPrior")
            .field("library", &self.library.names())
            .field("priors", &self.names())
            .finish()
    }
}
