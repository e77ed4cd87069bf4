//! Bounds how many times a set of tokens may occur in one sequence.

use std::sync::Arc;

use ndarray::{Array2, ArrayView1, ArrayView2};
use symreg_core::Library;

use crate::error::PriorError;
use crate::mask::{count_in_rows, forbid};
use crate::prior::{zeros, Prior};

/// Caps the total occurrences of `tokens` at `max`.
///
/// Minimum counts are not supported: honoring one requires knowing how much
/// length budget remains, which this rule cannot see.
#[derive(Debug, Clone)]
pub struct RepeatConstraint {
    library: Arc<Library>,
    tokens: Vec<usize>,
    max: usize,
}

impl RepeatConstraint {
    /// # Errors
    ///
    /// Returns [`PriorError::NotImplemented`] if `min` is set and
    /// [`PriorError::InvalidParameters`] if neither bound is set.
    pub fn new(
        library: Arc<Library>,
        tokens: Vec<usize>,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<Self, PriorError> {
        if min.is_some() {
            return Err(PriorError::NotImplemented(
                "RepeatConstraint: Repeat minimum constraints are not yet supported. \
                 This requires knowledge of length constraints."
                    .to_owned(),
            ));
        }
        let max = max.ok_or_else(|| {
            PriorError::invalid(
                "RepeatConstraint",
                "At least one of (min_, max_) must not be None.",
            )
        })?;
        Ok(Self {
            library,
            tokens,
            max,
        })
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl Prior for RepeatConstraint {
    fn name(&self) -> &'static str {
        "RepeatConstraint"
    }

    fn library(&self) -> &Arc<Library> {
        &self.library
    }

    fn call(
        &mut self,
        actions: ArrayView2<'_, usize>,
        _parent: ArrayView1<'_, usize>,
        _sibling: ArrayView1<'_, usize>,
        _dangling: ArrayView1<'_, usize>,
    ) -> Array2<f32> {
        let counts = count_in_rows(actions, &self.tokens);
        let mut prior = zeros(actions, &self.library);
        forbid(&mut prior, counts.mapv(|n| n >= self.max).view(), &self.tokens);
        prior
    }

    fn describe(&self) -> String {
        format!(
            "{}: [{}] cannot occur more than {} times.",
            self.name(),
            self.library.join_names(&self.tokens),
            self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // x1 x2 add const
    fn library() -> Arc<Library> {
        Arc::new(Library::with_functions(2, &["add", "const"]).unwrap())
    }

    #[test]
    fn test_max_once() {
        let mut rule = RepeatConstraint::new(library(), vec![3], None, Some(1)).unwrap();
        let actions = array![[2, 3], [2, 0]];
        let empty = array![0, 0];
        let prior = rule.call(actions.view(), empty.view(), empty.view(), empty.view());

        assert_eq!(prior[[0, 3]], f32::NEG_INFINITY);
        assert_eq!(prior[[0, 0]], 0.0);
        assert_eq!(prior[[1, 3]], 0.0);
    }

    #[test]
    fn test_counts_token_set_jointly() {
        let mut rule = RepeatConstraint::new(library(), vec![0, 1], None, Some(2)).unwrap();
        let actions = array![[2, 0, 2, 1], [2, 0, 2, 2]];
        let empty = array![0, 0];
        let prior = rule.call(actions.view(), empty.view(), empty.view(), empty.view());

        assert_eq!(prior[[0, 0]], f32::NEG_INFINITY);
        assert_eq!(prior[[0, 1]], f32::NEG_INFINITY);
        assert!(prior.row(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_min_not_implemented() {
        let result = RepeatConstraint::new(library(), vec![3], Some(1), None);
        assert!(matches!(result, Err(PriorError::NotImplemented(_))));
    }

    #[test]
    fn test_requires_a_bound() {
        let result = RepeatConstraint::new(library(), vec![3], None, None);
        assert!(matches!(result, Err(PriorError::InvalidParameters { .. })));
    }

    #[test]
    fn test_describe() {
        let rule = RepeatConstraint::new(library(), vec![3], None, Some(2)).unwrap();
        assert_eq!(rule.describe(), "RepeatConstraint: [const] cannot occur more than 2 times.");
    }
}
