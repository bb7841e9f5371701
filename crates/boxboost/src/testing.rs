//! Testing utilities shared by unit and integration tests.
//!
//! Tolerances for float comparisons plus small deterministic fixtures:
//! hand-built detection tables and seeded synthetic ones.

use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::{FeatureMatrix, FeatureTable, FRAME, LABEL, XMAX, XMIN, YMAX, YMIN};
use crate::occlusion::{frame_occlusion_counts, BoxBounds};

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons of O(1) values.
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

/// Same tolerance as f64.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-5;

// =============================================================================
// Fixtures
// =============================================================================

/// Two features: `signal` (the row index) and `noise` (a repeating pattern).
/// The label is 1 for the upper half of `signal`.
pub fn threshold_features(n_rows: usize) -> (FeatureMatrix, Vec<f32>) {
    let values = Array2::from_shape_fn((n_rows, 2), |(i, j)| {
        if j == 0 { i as f32 } else { ((i * 7) % 5) as f32 }
    });
    let labels = (0..n_rows).map(|i| if i >= n_rows / 2 { 1.0 } else { 0.0 }).collect();
    (FeatureMatrix::new(vec!["signal".into(), "noise".into()], values), labels)
}

/// Detection table from `(frame, [xmin, xmax, ymin, ymax], cls)` rows.
pub fn detection_table(rows: &[(f64, [f64; 4], f64)]) -> FeatureTable {
    let bound = |k: usize| rows.iter().map(|r| r.1[k]).collect::<Vec<f64>>();
    FeatureTable::from_columns(vec![
        (FRAME, rows.iter().map(|r| r.0).collect()),
        (XMIN, bound(0)),
        (XMAX, bound(1)),
        (YMIN, bound(2)),
        (YMAX, bound(3)),
        (LABEL, rows.iter().map(|r| r.2).collect()),
    ])
    .expect("fixture columns have equal lengths")
}

/// Seeded random boxes inside a `size x size` image, each at most half as
/// wide and tall as the image.
pub fn random_boxes(n: usize, size: f64, seed: u64) -> Vec<BoxBounds> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let w = rng.random_range(1.0..size / 2.0);
            let h = rng.random_range(1.0..size / 2.0);
            let x = rng.random_range(0.0..size - w);
            let y = rng.random_range(0.0..size - h);
            BoxBounds::new(x, x + w, y, y + h)
        })
        .collect()
}

/// Synthetic detections where tracking fails (`cls = 1`) mostly for boxes
/// that occlude others.
///
/// Columns: `frame, xmin, xmax, ymin, ymax, confidence, cls`. Frames hold
/// between 1 and `max_boxes` boxes. About one in ten labels is flipped.
pub fn synthetic_detections(n_frames: usize, max_boxes: usize, seed: u64) -> FeatureTable {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut columns: [Vec<f64>; 7] = Default::default();

    for frame in 0..n_frames {
        let n_boxes = rng.random_range(1..=max_boxes.max(1));
        let boxes = random_boxes(n_boxes, 100.0, rng.random());
        let counts = frame_occlusion_counts(&boxes);

        for (b, &count) in boxes.iter().zip(&counts) {
            let mut failed = count > 0;
            if rng.random_bool(0.1) {
                failed = !failed;
            }
            let values = [
                frame as f64,
                b.xmin,
                b.xmax,
                b.ymin,
                b.ymax,
                rng.random_range(0.3..1.0),
                if failed { 1.0 } else { 0.0 },
            ];
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
        }
    }

    let [frame, xmin, xmax, ymin, ymax, confidence, cls] = columns;
    FeatureTable::from_columns(vec![
        (FRAME, frame),
        (XMIN, xmin),
        (XMAX, xmax),
        (YMIN, ymin),
        (YMAX, ymax),
        ("confidence", confidence),
        (LABEL, cls),
    ])
    .expect("fixture columns have equal lengths")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_detections_are_deterministic() {
        let a = synthetic_detections(20, 4, 7);
        let b = synthetic_detections(20, 4, 7);
        assert_eq!(a, b);
        assert!(a.n_rows() >= 20);
        assert_eq!(a.n_columns(), 7);
    }

    #[test]
    fn random_boxes_are_well_formed() {
        for b in random_boxes(50, 100.0, 1) {
            assert!(b.xmin < b.xmax && b.ymin < b.ymax);
            assert!(b.xmax <= 100.0 && b.ymax <= 100.0);
        }
    }
}
