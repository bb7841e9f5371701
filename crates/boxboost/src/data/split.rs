//! Seeded train/test row split.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::model::ConfigError;

/// Held-out split configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOptions {
    /// Fraction of rows held out for evaluation, in (0, 1). Default: 0.2.
    pub test_fraction: f64,
    /// Shuffle seed. Default: 42.
    pub seed: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Row indices of the two sides of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` and hold out `ceil(n_rows * test_fraction)` rows.
///
/// Deterministic for a given seed. Both sides are guaranteed non-empty.
pub fn train_test_split(n_rows: usize, options: &SplitOptions) -> Result<SplitIndices, ConfigError> {
    let fraction = options.test_fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(ConfigError::InvalidTestFraction(fraction));
    }

    let n_test = (n_rows as f64 * fraction).ceil() as usize;
    let n_train = n_rows.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(ConfigError::SplitTooSmall { n_rows });
    }

    let mut permutation: Vec<usize> = (0..n_rows).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(options.seed);
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(n_test);
    Ok(SplitIndices {
        train,
        test: permutation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_every_row_once() {
        let split = train_test_split(101, &SplitOptions::default()).unwrap();
        assert_eq!(split.test.len(), 21);
        assert_eq!(split.train.len(), 80);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        let opts = SplitOptions { test_fraction: 0.3, seed: 7 };
        assert_eq!(train_test_split(50, &opts).unwrap(), train_test_split(50, &opts).unwrap());

        let other = SplitOptions { seed: 8, ..opts };
        assert_ne!(train_test_split(50, &opts).unwrap(), train_test_split(50, &other).unwrap());
    }

    #[test]
    fn rejects_bad_fraction_and_tiny_inputs() {
        let bad = SplitOptions { test_fraction: 1.0, seed: 0 };
        assert_eq!(train_test_split(10, &bad), Err(ConfigError::InvalidTestFraction(1.0)));
        assert_eq!(
            train_test_split(1, &SplitOptions::default()),
            Err(ConfigError::SplitTooSmall { n_rows: 1 })
        );
    }
}
