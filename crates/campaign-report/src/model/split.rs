//! Seeded train/test partitioning of row indices.

use crate::error::{ReportError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_size)` rows.
///
/// The first shuffled indices form the test set, the rest the train set.
/// Fails with [`ReportError::InsufficientData`] when either side would be empty.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ReportError::InsufficientData { rows: n, required: 2 });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        // ceil: 7 * 0.2 = 1.4 -> 2
        let split = train_test_split(7, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 5);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(50, 0.2, 1).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let a = train_test_split(30, 0.2, 42).unwrap();
        let b = train_test_split(30, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(30, 0.2, 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_too_small() {
        assert!(matches!(
            train_test_split(1, 0.2, 42),
            Err(ReportError::InsufficientData { rows: 1, .. })
        ));
        assert!(train_test_split(0, 0.2, 42).is_err());
        assert!(train_test_split(2, 0.2, 42).is_ok());
    }
}
