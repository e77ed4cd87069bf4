//! The capability every rule implements.

use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use symreg_core::Library;

/// A rule contributing an additive logit adjustment at each sampling step.
///
/// Hard constraints contribute `0.0` or `-inf` entries (see
/// [`mask`](crate::mask)); soft priors contribute finite values. No rule may
/// ever contribute `+inf`, so summing contributions can only narrow the set of
/// selectable tokens.
pub trait Prior {
    /// Rule type name, used as the prefix of descriptions and diagnostics.
    fn name(&self) -> &'static str;

    /// The library the rule was built against.
    fn library(&self) -> &Arc<Library>;

    /// Check whether the rule is meaningful for its library and parameters.
    ///
    /// Returns the reason when the rule is degenerate, e.g. a trig
    /// constraint over a library with no trig tokens.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Adjustment applied before the first token is chosen, shape `(L,)`.
    fn initial_prior(&self) -> Array1<f32> {
        Array1::zeros(self.library().len())
    }

    /// Adjustment for the next token, shape `(batch, L)`.
    ///
    /// `actions` holds the tokens chosen so far, one row per sample.
    /// `parent` holds parent codes, `sibling` token ids of left siblings and
    /// `dangling` the open slot count, all for the node about to be sampled.
    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        parent: ArrayView1<'_, usize>,
        sibling: ArrayView1<'_, usize>,
        dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32>;

    /// One or more human-readable lines describing the rule.
    fn describe(&self) -> String {
        format!("{}: No description available.", self.name())
    }
}

/// Zero adjustment for the current batch.
pub(crate) fn zeros(actions: ArrayView2<'_, usize>, library: &Library) -> Array2<f32> {
    Array2::zeros((actions.nrows(), library.len()))
}
