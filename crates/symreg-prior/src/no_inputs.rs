//! Forbids finishing an expression that never reads an input variable.

use std::sync::Arc;

use ndarray::{Array2, ArrayView1, ArrayView2, Zip};
use symreg_core::Library;

use crate::mask::{count_in_rows, forbid};
use crate::prior::{zeros, Prior};

/// While a sequence contains no input token, the terminal that would close
/// the last open slot must be an input.
#[derive(Debug, Clone)]
pub struct NoInputsConstraint {
    library: Arc<Library>,
}

impl NoInputsConstraint {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }
}

impl Prior for NoInputsConstraint {
    fn name(&self) -> &'static str {
        "NoInputsConstraint"
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn validate(&self) -> Result<(), String> {
        if self.library.float_tokens().is_empty() {
            return Err("All terminal tokens are input variables, so all \
                        sequences will have an input variable."
                .to_owned());
        }
        Ok(())
    }

    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        _parent: ArrayView1<'_, usize>,
        _sibling: ArrayView1<'_, usize>,
        dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        let inputs = count_in_rows(actions, self.library.input_tokens());
        let mask = Zip::from(&dangling)
            .and(&inputs)
            .map_collect(|&open, &seen| open == 1 && seen == 0);

        let mut prior = zeros(actions, &self.library);
        forbid(&mut prior, mask.view(), self.library.float_tokens());
        prior
    }

    fn describe(&self) -> String {
        format!(
            "{}: Sequences contain at least one input variable Token.",
            self.name()
        )
    }
}
