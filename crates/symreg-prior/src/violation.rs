//! Replaying complete sequences against a joint prior.
//!
//! Evolutionary operators produce whole sequences rather than sampling token by
//! token. To reject offspring the joint prior would never have generated, the
//! sequence is fed back one prefix at a time and each chosen token is checked
//! against the adjustment for its step.

use ndarray::{aview1, Axis};

use crate::joint::JointPrior;

impl JointPrior {
    /// Index of the first token whose adjustment is `-inf`, if any.
    ///
    /// Step `0` is checked against [`initial_prior`](Self::initial_prior) and
    /// step `k` against [`call_signals`](Self::call_signals) on the first `k`
    /// tokens, in order, so stateful rules see a normal generation.
    pub fn first_violation(&mut self, tokens: &[usize]) -> Option<usize> {
        let first = *tokens.first()?;
        if self.initial_prior()[first] == f32::NEG_INFINITY {
            return Some(0);
        }

        for step in 1..tokens.len() {
            let prefix = aview1(&tokens[..step]).insert_axis(Axis(0));
            let prior = self.call_signals(prefix);
            if prior[[0, tokens[step]]] == f32::NEG_INFINITY {
                return Some(step);
            }
        }
        None
    }

    /// Whether `tokens` breaks any hard constraint.
    pub fn violates(&mut self, tokens: &[usize]) -> bool {
        self.first_violation(tokens).is_some()
    }
}
