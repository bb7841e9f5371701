//! Common utilities used across the crate.
//!
//! Parallelism configuration and thread pool setup shared by the occlusion
//! aggregator, the binning step and the tree grower.

use rayon::prelude::*;

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// This is a simple flag passed through components. When `Parallel`,
/// components may use `rayon` parallel iterators; when `Sequential` they must
/// iterate on the calling thread. Results never depend on the choice.
///
/// The actual thread pool is set up at the model API level via `n_threads`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    #[default]
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if rayon pool has multiple threads, sequential otherwise)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map over `iter`, in parallel when allowed. Output order follows input order.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }

    /// Apply `f` to every element of `slice` with its index, in parallel when allowed.
    #[inline]
    pub fn maybe_par_for_each_mut<T, F>(self, slice: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        if self.is_parallel() {
            slice.par_iter_mut().enumerate().for_each(|(i, x)| f(i, x));
        } else {
            slice.iter_mut().enumerate().for_each(|(i, x)| f(i, x));
        }
    }
}

// =============================================================================
// Thread Pool Setup
// =============================================================================

/// Run a closure with the appropriate thread pool.
///
/// Thread count semantics:
/// - `0` = auto (use the global rayon pool)
/// - `1` = sequential (no thread pool)
/// - `n > 1` = use exactly `n` threads
///
/// # Example
///
/// ```
/// use boxboost::run_with_threads;
///
/// let sum = run_with_threads(1, |_| (0..10).sum::<u32>()).unwrap();
/// assert_eq!(sum, 45);
/// ```
pub fn run_with_threads<T: Send>(
    n_threads: usize,
    f: impl FnOnce(Parallelism) -> T + Send,
) -> Result<T, rayon::ThreadPoolBuildError> {
    let parallelism = Parallelism::from_threads(n_threads);

    match (parallelism, n_threads) {
        (Parallelism::Sequential, _) => Ok(f(Parallelism::Sequential)),
        (Parallelism::Parallel, 0) => Ok(f(Parallelism::Parallel)),
        (Parallelism::Parallel, n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            Ok(pool.install(|| f(Parallelism::Parallel)))
        }
    }
}
