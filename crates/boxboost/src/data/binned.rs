//! Quantile binning of feature values for histogram tree growth.
//!
//! Each feature gets a [`BinMapper`] holding sorted cut points. A value `v`
//! falls into bin `#{c : c <= v}`, so splitting after bin `b` is the same as
//! the raw-value test `v < cuts[b]`. Trees trained on bins can therefore be
//! evaluated directly on unbinned features.
//!
//! NaN values get a dedicated missing bin, the last one.

use ndarray::ArrayView2;

use crate::utils::Parallelism;

// ============================================================================
// BinMapper
// ============================================================================

/// Mapping from continuous values of one feature to bin indices.
#[derive(Clone, Debug, PartialEq)]
pub struct BinMapper {
    /// Strictly increasing cut points.
    cuts: Vec<f32>,
}

impl BinMapper {
    /// Compute cut points from the values of one feature.
    ///
    /// With at most `max_bins` distinct values every distinct value gets its
    /// own bin (cuts at midpoints). Otherwise cuts are placed at evenly spaced
    /// quantiles of the sorted values.
    pub fn fit(values: impl Iterator<Item = f32>, max_bins: usize) -> Self {
        let mut sorted: Vec<f32> = values.filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f32::total_cmp);

        let mut distinct = sorted.clone();
        distinct.dedup();

        if distinct.len() <= 1 {
            return Self { cuts: Vec::new() };
        }

        let cuts = if distinct.len() <= max_bins {
            distinct.windows(2).map(|w| midpoint(w[0], w[1])).collect()
        } else {
            let n = sorted.len();
            let mut cuts: Vec<f32> = (1..max_bins).map(|k| sorted[k * n / max_bins]).collect();
            cuts.dedup();
            // A cut at the minimum would leave bin 0 empty.
            cuts.retain(|&c| c > sorted[0]);
            cuts
        };
        Self { cuts }
    }

    /// Number of value bins (excluding the missing bin).
    #[inline]
    pub fn n_value_bins(&self) -> usize {
        self.cuts.len() + 1
    }

    /// Index of the missing-value bin.
    #[inline]
    pub fn missing_bin(&self) -> usize {
        self.n_value_bins()
    }

    /// Number of bins including the missing bin.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.n_value_bins() + 1
    }

    /// Bin index of `value`.
    #[inline]
    pub fn bin(&self, value: f32) -> usize {
        if value.is_nan() {
            self.missing_bin()
        } else {
            self.cuts.partition_point(|&c| c <= value)
        }
    }

    /// Raw-value threshold equivalent to splitting after `bin`.
    ///
    /// After the last value bin this is `f32::MAX`: finite values go left and
    /// only missing values can go right.
    #[inline]
    pub fn threshold(&self, bin: usize) -> f32 {
        self.cuts.get(bin).copied().unwrap_or(f32::MAX)
    }

    pub fn cuts(&self) -> &[f32] {
        &self.cuts
    }
}

fn midpoint(a: f32, b: f32) -> f32 {
    let mid = a + (b - a) / 2.0;
    // Adjacent floats: the midpoint can round onto `a`.
    if mid > a { mid } else { b }
}

// ============================================================================
// BinnedMatrix
// ============================================================================

/// Column-major matrix of bin indices.
///
/// Layout: `bins[feature * n_rows + row]`, so one feature's bins are contiguous.
#[derive(Clone, Debug)]
pub struct BinnedMatrix {
    mappers: Vec<BinMapper>,
    bins: Vec<u16>,
    n_rows: usize,
}

impl BinnedMatrix {
    /// Bin a row-major `(n_rows, n_features)` matrix.
    ///
    /// `max_bins` must fit in `u16` together with the missing bin.
    pub fn from_features(features: ArrayView2<'_, f32>, max_bins: usize, parallelism: Parallelism) -> Self {
        debug_assert!(max_bins >= 2 && max_bins < u16::MAX as usize);
        let (n_rows, n_features) = features.dim();

        let per_feature = parallelism.maybe_par_map(0..n_features, |f| {
            let column = features.column(f);
            let mapper = BinMapper::fit(column.iter().copied(), max_bins);
            let bins: Vec<u16> = column.iter().map(|&v| mapper.bin(v) as u16).collect();
            (mapper, bins)
        });

        let mut mappers = Vec::with_capacity(n_features);
        let mut bins = Vec::with_capacity(n_rows * n_features);
        for (mapper, feature_bins) in per_feature {
            mappers.push(mapper);
            bins.extend(feature_bins);
        }

        Self { mappers, bins, n_rows }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.mappers.len()
    }

    #[inline]
    pub fn mapper(&self, feature: usize) -> &BinMapper {
        &self.mappers[feature]
    }

    /// Bins of every row for one feature.
    #[inline]
    pub fn feature_bins(&self, feature: usize) -> &[u16] {
        let start = feature * self.n_rows;
        &self.bins[start..start + self.n_rows]
    }

    #[inline]
    pub fn bin(&self, row: usize, feature: usize) -> usize {
        self.bins[feature * self.n_rows + row] as usize
    }
}
