//! Seeded stratified train/test split

use crate::error::{FailcastError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Split row indices into (train, test), preserving the class ratio of `y`
/// in both partitions.
///
/// Shuffling is seeded, so the split is reproducible for a fixed seed.
/// Classes are iterated in sorted order to keep the result independent of
/// hash-map iteration order. Each class keeps at least one row on each side
/// when it has two or more rows.
pub fn stratified_split(
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(FailcastError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }

    let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        class_indices.entry(label.round() as i64).or_default().push(i);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_indices = Vec::new();
    let mut test_indices = Vec::new();

    for indices in class_indices.values() {
        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);

        let test_size = ((shuffled.len() as f64) * test_fraction).round().max(1.0) as usize;
        let test_size = test_size.min(shuffled.len().saturating_sub(1)).max(
            if shuffled.len() > 1 { 1 } else { 0 },
        );

        test_indices.extend_from_slice(&shuffled[..test_size]);
        train_indices.extend_from_slice(&shuffled[test_size..]);
    }

    if train_indices.is_empty() || test_indices.is_empty() {
        return Err(FailcastError::DataError(
            "stratified split produced an empty train or test partition".to_string(),
        ));
    }

    Ok((train_indices, test_indices))
}
