//! Hard-exclusion masking shared by every constraint.
//!
//! A constraint never edits logits directly. It produces a `(batch, L)` array
//! that is `0.0` everywhere except `-inf` at the (sample, token) pairs it
//! forbids. Adding that array to raw logits drives the probability of the
//! forbidden tokens to exactly zero after normalization.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Build the constraint array for `mask` and `tokens`.
///
/// With `n_tokens = 5` and `tokens = [1, 2]`, every masked row is
/// `[0.0, -inf, -inf, 0.0, 0.0]` and every other row is all zeros.
pub fn make_constraint(mask: ArrayView1<'_, bool>, tokens: &[usize], n_tokens: usize) -> Array2<f32> {
    let mut prior = Array2::zeros((mask.len(), n_tokens));
    forbid(&mut prior, mask, tokens);
    prior
}

/// Write `-inf` into `prior` at every (masked row, token) pair.
///
/// Applying several masks in sequence is a logical OR: an entry that is
/// already forbidden stays `-inf` and nothing accumulates.
///
/// # Panics
///
/// Panics if `mask.len() != prior.nrows()`.
pub fn forbid(prior: &mut Array2<f32>, mask: ArrayView1<'_, bool>, tokens: &[usize]) {
    assert_eq!(
        mask.len(),
        prior.nrows(),
        "mask length {} != batch size {}",
        mask.len(),
        prior.nrows()
    );
    for (mut row, &hit) in prior.rows_mut().into_iter().zip(mask.iter()) {
        if hit {
            for &token in tokens {
                row[token] = f32::NEG_INFINITY;
            }
        }
    }
}

/// Forbid `tokens` for every row.
pub fn forbid_columns(prior: &mut Array2<f32>, tokens: &[usize]) {
    for &token in tokens {
        prior.column_mut(token).fill(f32::NEG_INFINITY);
    }
}

/// Element-wise membership of `values` in `set`.
pub fn isin(values: ArrayView1<'_, usize>, set: &[usize]) -> Array1<bool> {
    values.mapv(|v| set.contains(&v))
}

/// Number of entries of each row that belong to `set`.
pub fn count_in_rows(actions: ArrayView2<'_, usize>, set: &[usize]) -> Array1<usize> {
    actions
        .rows()
        .into_iter()
        .map(|row| row.iter().filter(|&t| set.contains(t)).count())
        .collect()
}

/// Token ids left selectable by one row of a prior.
pub fn allowed_tokens(prior_row: ArrayView1<'_, f32>) -> Vec<usize> {
    prior_row
        .iter()
        .enumerate()
        .filter(|(_, &v)| v != f32::NEG_INFINITY)
        .map(|(id, _)| id)
        .collect()
}

/// Add a prior row to a logit row in place.
///
/// # Panics
///
/// Panics if `logits.len() != prior_row.len()`.
pub fn apply_to_logits(logits: &mut [f32], prior_row: ArrayView1<'_, f32>) {
    assert_eq!(
        logits.len(),
        prior_row.len(),
        "logits length {} != prior length {}",
        logits.len(),
        prior_row.len()
    );
    for (logit, &adjust) in logits.iter_mut().zip(prior_row.iter()) {
        *logit += adjust;
    }
}
