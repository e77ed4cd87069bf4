//! Hard minimum and maximum sequence length.

use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use symreg_core::Library;

use crate::error::PriorError;
use crate::mask::forbid;
use crate::prior::{zeros, Prior};

/// Keeps every completed expression within `[min, max]` tokens.
///
/// The maximum is enforced by refusing operators whose arguments could no
/// longer be closed within the remaining budget. The minimum is enforced by
/// refusing terminals that would close the last open slot too early.
#[derive(Debug, Clone)]
pub struct LengthConstraint {
    library: Arc<Library>,
    min: Option<usize>,
    max: Option<usize>,
}

impl LengthConstraint {
    /// # Errors
    ///
    /// Returns [`PriorError::InvalidParameters`] if neither bound is set.
    pub fn new(
        library: Arc<Library>,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<Self, PriorError> {
        if min.is_none() && max.is_none() {
            return Err(PriorError::invalid(
                "LengthConstraint",
                "At least one of (min_, max_) must not be None.",
            ));
        }
        Ok(Self { library, min, max })
    }
}

impl Prior for LengthConstraint {
    fn name(&self) -> &'static str {
        "LengthConstraint"
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn initial_prior(&self) -> Array1<f32> {
        let mut prior = Array1::zeros(self.library.len());
        if self.min.is_some_and(|min| min > 1) {
            for &t in self.library.terminal_tokens() {
                prior[t] = f32::NEG_INFINITY;
            }
        }
        prior
    }

    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        _parent: ArrayView1<'_, usize>,
        _sibling: ArrayView1<'_, usize>,
        dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        let mut prior = zeros(actions, &self.library);
        // Index of the most recently chosen token.
        let i = actions.ncols() as isize - 1;

        if let Some(max) = self.max {
            let max = max as isize;
            // Nothing can overflow during the first half of the budget.
            if i + 2 >= max / 2 {
                let remaining = max - (i + 1);
                let binary = dangling.mapv(|d| d as isize >= remaining - 1);
                forbid(&mut prior, binary.view(), self.library.binary_tokens());
                let unary = dangling.mapv(|d| d as isize == remaining);
                forbid(&mut prior, unary.view(), self.library.unary_tokens());
            }
        }

        if let Some(min) = self.min {
            if i + 2 < min as isize {
                let closing = dangling.mapv(|d| d == 1);
                forbid(&mut prior, closing.view(), self.library.terminal_tokens());
            }
        }

        prior
    }

    fn describe(&self) -> String {
        let mut lines = Vec::new();
        if let Some(min) = self.min {
            lines.push(format!("{}: Sequences have minimum length {}.", self.name(), min));
        }
        if let Some(max) = self.max {
            lines.push(format!("{}: Sequences have maximum length {}.", self.name(), max));
        }
        lines.join("\n")
    }
}
