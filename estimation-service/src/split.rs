use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::pipeline::PipelineError;

/// Seeded shuffle of `0..n`.
///
/// The same seed always yields the same order for the same `n`, so a run can
/// be reproduced from its configuration alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededPermutation {
    seed: u64,
}

impl SeededPermutation {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn indices(&self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        order.shuffle(&mut rng);
        order
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Number of items that go to the test side: `ceil(test_size * n)`.
pub fn test_len(n: usize, test_size: f64) -> usize {
    (test_size * n as f64).ceil() as usize
}

/// Shuffle-then-cut split. The first `test_len` positions of the permutation
/// form the test subset, the remainder the training subset.
pub fn train_test_split<T: Clone>(
    items: &[T],
    test_size: f64,
    permutation: &SeededPermutation,
) -> Result<TrainTestSplit<T>, PipelineError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::InsufficientData(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let n = items.len();
    let n_test = test_len(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::InsufficientData(format!(
            "{n} eligible samples with test_size {test_size} leave an empty train or test subset"
        )));
    }

    let order = permutation.indices(n);
    let (test_idx, train_idx) = order.split_at(n_test);

    Ok(TrainTestSplit {
        train: train_idx.iter().map(|&i| items[i].clone()).collect(),
        test: test_idx.iter().map(|&i| items[i].clone()).collect(),
    })
}
