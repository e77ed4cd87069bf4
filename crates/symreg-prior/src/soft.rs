//! Soft priors: finite logit offsets that reshape, but never forbid.

use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use symreg_core::Library;

use crate::prior::{zeros, Prior};

/// Turns a uniform draw over tokens into a uniform draw over arities.
///
/// Each token is offset by `-ln(n)`, where `n` is the number of tokens that
/// share its arity. The offset never depends on the step.
#[derive(Debug, Clone)]
pub struct UniformArityPrior {
    library: Arc<Library>,
    logit_adjust: Array1<f32>,
}

impl UniformArityPrior {
    pub fn new(library: Arc<Library>) -> Self {
        let mut logit_adjust = Array1::zeros(library.len());
        for tokens in library.tokens_of_arity().values() {
            let offset = -(tokens.len() as f32).ln();
            for &t in tokens {
                logit_adjust[t] = offset;
            }
        }
        Self {
            library,
            logit_adjust,
        }
    }

    pub fn logit_adjust(&self) -> ArrayView1<'_, f32> {
        self.logit_adjust.view()
    }
}

impl Prior for UniformArityPrior {
    fn name(&self) -> &'static str {
        "UniformArityPrior"
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn initial_prior(&self) -> Array1<f32> {
        self.logit_adjust.clone()
    }

    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        _parent: ArrayView1<'_, usize>,
        _sibling: ArrayView1<'_, usize>,
        _dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        Array2::from_shape_fn((actions.nrows(), self.library.len()), |(_, t)| {
            self.logit_adjust[t]
        })
    }

    fn describe(&self) -> String {
        format!("{}: Activated.", self.name())
    }
}

/// Gaussian-shaped pull toward expressions of length `loc`.
///
/// With `t` tokens chosen, the offset is `-(t - loc)^2 / (2 * scale)`. Before
/// `loc` it lowers terminals that would finish the expression; from `loc` on
/// it lowers every non-terminal.
#[derive(Debug, Clone)]
pub struct SoftLengthPrior {
    library: Arc<Library>,
    loc: Option<f32>,
    scale: Option<f32>,
    terminal: Vec<usize>,
    nonterminal: Vec<usize>,
}

impl SoftLengthPrior {
    pub fn new(library: Arc<Library>, loc: Option<f32>, scale: Option<f32>) -> Self {
        let terminal = library.terminal_tokens().to_vec();
        let nonterminal = (0..library.len())
            .filter(|t| !terminal.contains(t))
            .collect();
        Self {
            library,
            loc,
            scale,
            terminal,
            nonterminal,
        }
    }
}

impl Prior for SoftLengthPrior {
    fn name(&self) -> &'static str {
        "SoftLengthPrior"
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn validate(&self) -> Result<(), String> {
        let (Some(loc), Some(scale)) = (self.loc, self.scale) else {
            return Err("'scale' and 'loc' arguments must be specified!".to_owned());
        };
        if !loc.is_finite() || !scale.is_finite() {
            return Err("'scale' and 'loc' must be finite.".to_owned());
        }
        if scale <= 0.0 {
            return Err("'scale' must be positive.".to_owned());
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
        let mut prior = zeros(actions, &self.library);
        let (Some(loc), Some(scale)) = (self.loc, self.scale) else {
            return prior;
        };

        let t = actions.ncols() as f32;
        let adjust = -(t - loc).powi(2) / (2.0 * scale);

        if t < loc {
            for (mut row, &open) in prior.rows_mut().into_iter().zip(dangling.iter()) {
                if open == 1 {
                    for &token in &self.terminal {
                        row[token] += adjust;
                    }
                }
            }
        } else {
            for &token in &self.nonterminal {
                prior.column_mut(token).fill(adjust);
            }
        }

        prior
    }

    fn describe(&self) -> String {
        match (self.loc, self.scale) {
            (Some(loc), Some(scale)) => format!(
                "{}: Sequences are biased toward length {} with scale {}.",
                self.name(),
                loc,
                scale
            ),
            _ => format!("{}: No description available.", self.name()),
        }
    }
}
