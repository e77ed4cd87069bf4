//! Adapter for an external sequential scorer.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, ArrayView1, ArrayView2};
use symreg_core::Library;
use tracing::trace;

use crate::prior::Prior;

/// A model that scores the next token given the one just chosen.
///
/// Implementations carry per-sequence decoder state that advances with every
/// call to [`score`](Self::score).
pub trait SequenceScorer {
    /// Drop decoder state before a new batch of sequences.
    fn reset(&mut self);

    /// Logits for the next token, shape `(batch, L)`, given the last token
    /// of every sample.
    fn score(&mut self, last_action: ArrayView1<'_, usize>) -> Array2<f32>;
}

/// Scales a [`SequenceScorer`]'s logits by `weight`.
///
/// The scorer is reset whenever a call sees sequences of length 1. This
/// assumes the prior is invoked strictly in generation order; calling it on
/// arbitrary prefixes desynchronizes the decoder state.
pub struct LanguageModelPrior {
    library: Arc<Library>,
    scorer: Box<dyn SequenceScorer>,
    weight: Option<f32>,
}

impl LanguageModelPrior {
    pub fn new(
        library: Arc<Library>,
        scorer: Box<dyn SequenceScorer>,
        weight: Option<f32>,
    ) -> Self {
        Self {
            library,
            scorer,
            weight,
        }
    }

    pub fn weight(&self) -> Option<f32> {
        self.weight
    }
}

impl fmt::Debug for LanguageModelPrior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageModelPrior")
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

impl Prior for LanguageModelPrior {
    fn name(&self) -> &'static str {
        "LanguageModelPrior"
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn validate(&self) -> Result<(), String> {
        if self.weight.is_none() {
            return Err("Need to specify language model arguments.".to_owned());
        }
        Ok(())
    }

    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        _parent: ArrayView1<'_, usize>,
        _sibling: ArrayView1<'_, usize>,
        _dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        if actions.ncols() == 1 {
            trace!("new sequences, resetting scorer state");
            self.scorer.reset();
        }
        let last = actions.column(actions.ncols() - 1);
        let mut prior = self.scorer.score(last);
        prior *= self.weight.unwrap_or(0.0);
        prior
    }
}
