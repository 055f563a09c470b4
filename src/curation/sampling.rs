//! Uniform sampling helpers shared by seed selection, blending and the
//! fallback paths.

use rand::seq::index;
use rand::Rng;

/// Indices of a uniform sample without replacement, in ascending order.
///
/// `amount` is capped at `length`.
pub fn sample_indices<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    amount: usize,
) -> Vec<usize> {
    let amount = amount.min(length);
    let mut indices = index::sample(rng, length, amount).into_vec();
    indices.sort_unstable();
    indices
}

/// Uniform sample of `amount` items, keeping their relative input order.
pub fn random_sample<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [T],
    amount: usize,
) -> Vec<&'a T> {
    sample_indices(rng, items.len(), amount)
        .into_iter()
        .map(|i| &items[i])
        .collect()
}

/// Uniform sample of `amount` items in random order.
///
/// Any prefix of the result is itself a uniform sample.
pub fn shuffled_sample<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [T],
    amount: usize,
) -> Vec<&'a T> {
    let amount = amount.min(items.len());
    index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| &items[i])
        .collect()
}
