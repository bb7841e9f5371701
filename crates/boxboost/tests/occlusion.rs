//! Occlusion feature integration tests.
//!
//! Covers the pairwise test, per-frame counting and the table augmentation,
//! including properties checked with proptest.

use proptest::prelude::*;
use rstest::rstest;

use boxboost::data::{FeatureTable, TableError, FRAME, OCCLUSION, XMAX, XMIN, YMAX, YMIN};
use boxboost::occlusion::{frame_occlusion_counts, occlusion_counts, overlaps, BoxBounds};
use boxboost::testing::{detection_table, random_boxes, synthetic_detections};
use boxboost::{augment_with_occlusion, Parallelism};

// =============================================================================
// Helpers
// =============================================================================

fn occlusion_column(table: &FeatureTable) -> Vec<f64> {
    table.column(OCCLUSION).unwrap().to_vec()
}

fn arb_box() -> impl Strategy<Value = BoxBounds> {
    (0.0..100.0f64, 0.1..50.0f64, 0.0..100.0f64, 0.1..50.0f64)
        .prop_map(|(x, w, y, h)| BoxBounds::new(x, x + w, y, y + h))
}

fn arb_frame(max_boxes: usize) -> impl Strategy<Value = Vec<BoxBounds>> {
    prop::collection::vec(arb_box(), 0..max_boxes)
}

// =============================================================================
// Frame Layouts
// =============================================================================

const OVERLAPPING: [f64; 4] = [0.0, 10.0, 0.0, 10.0];
const OVERLAPPING_SHIFTED: [f64; 4] = [5.0, 15.0, 5.0, 15.0];
const FAR_AWAY: [f64; 4] = [50.0, 60.0, 50.0, 60.0];

#[rstest]
#[case::singleton_last(&[1.0, 1.0, 2.0], vec![1.0, 1.0, 0.0])]
#[case::singleton_first(&[1.0, 2.0, 2.0], vec![0.0, 1.0, 1.0])]
#[case::singleton_middle(&[1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0])]
fn frames_after_a_singleton_are_counted(#[case] frames: &[f64], #[case] expected: Vec<f64>) {
    // Consecutive rows of the same frame are an overlapping pair.
    let boxes = if frames[0] == frames[1] {
        [OVERLAPPING, OVERLAPPING_SHIFTED, FAR_AWAY]
    } else {
        [FAR_AWAY, OVERLAPPING, OVERLAPPING_SHIFTED]
    };
    let rows: Vec<_> = frames.iter().zip(boxes).map(|(&f, b)| (f, b, 0.0)).collect();

    let augmented = augment_with_occlusion(&detection_table(&rows), Parallelism::Sequential).unwrap();
    assert_eq!(occlusion_column(&augmented), expected);
}

#[test]
fn non_contiguous_frames_are_aligned_by_row() {
    let table = detection_table(&[
        (7.0, OVERLAPPING, 0.0),
        (3.0, FAR_AWAY, 0.0),
        (7.0, OVERLAPPING_SHIFTED, 1.0),
        (3.0, OVERLAPPING, 0.0),
        (9.0, OVERLAPPING, 0.0),
    ]);
    let augmented = augment_with_occlusion(&table, Parallelism::Sequential).unwrap();
    assert_eq!(occlusion_column(&augmented), vec![1.0, 0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn three_mutually_overlapping_boxes() {
    let boxes = [
        BoxBounds::new(0.0, 10.0, 0.0, 10.0),
        BoxBounds::new(2.0, 12.0, 2.0, 12.0),
        BoxBounds::new(4.0, 14.0, 4.0, 14.0),
    ];
    assert_eq!(frame_occlusion_counts(&boxes), vec![2, 2, 2]);
}

#[rstest]
#[case::frame(FRAME)]
#[case::xmin(XMIN)]
#[case::xmax(XMAX)]
#[case::ymin(YMIN)]
#[case::ymax(YMAX)]
fn missing_required_column_is_reported(#[case] column: &str) {
    let table = synthetic_detections(5, 3, 4).without_columns(&[column]);
    assert_eq!(
        augment_with_occlusion(&table, Parallelism::Sequential),
        Err(TableError::MissingColumn(column.to_string()))
    );
}

#[test]
fn augmentation_is_idempotent() {
    let table = synthetic_detections(40, 6, 11);
    let once = augment_with_occlusion(&table, Parallelism::Sequential).unwrap();
    let twice = augment_with_occlusion(&once, Parallelism::Sequential).unwrap();

    assert!(!table.has_column(OCCLUSION) && once.has_column(OCCLUSION));
    assert_eq!(once.n_columns(), table.n_columns() + 1);
    assert_eq!(twice.n_columns(), once.n_columns());
    assert_eq!(occlusion_column(&once), occlusion_column(&twice));
}

#[test]
fn parallel_matches_sequential() {
    let table = synthetic_detections(200, 8, 5);
    let seq = augment_with_occlusion(&table, Parallelism::Sequential).unwrap();
    let par = augment_with_occlusion(&table, Parallelism::Parallel).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn other_columns_are_untouched() {
    let table = synthetic_detections(10, 4, 2);
    let augmented = augment_with_occlusion(&table, Parallelism::Sequential).unwrap();
    for column in table.columns() {
        assert_eq!(augmented.column(column.name()).unwrap(), column.values());
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn disjoint_x_spans_never_overlap(a in arb_box(), gap in 0.0..20.0f64, b in arb_box()) {
        let width = b.xmax - b.xmin;
        let right = BoxBounds::new(a.xmax + gap, a.xmax + gap + width, b.ymin, b.ymax);
        prop_assert!(!overlaps(&a, &right));
    }

    #[test]
    fn disjoint_y_spans_never_overlap(a in arb_box(), gap in 0.0..20.0f64, b in arb_box()) {
        let height = b.ymax - b.ymin;
        let below = BoxBounds::new(b.xmin, b.xmax, a.ymax + gap, a.ymax + gap + height);
        prop_assert!(!overlaps(&a, &below));
    }

    #[test]
    fn strictly_nested_box_is_one_sided(outer in arb_box(), fx in 0.1..0.4f64, fy in 0.1..0.4f64) {
        let (w, h) = (outer.xmax - outer.xmin, outer.ymax - outer.ymin);
        let inner = BoxBounds::new(
            outer.xmin + fx * w,
            outer.xmax - fx * w,
            outer.ymin + fy * h,
            outer.ymax - fy * h,
        );
        prop_assert!(overlaps(&outer, &inner));
        prop_assert!(!overlaps(&inner, &outer));
    }

    #[test]
    fn frame_counts_are_bounded_and_paired(boxes in arb_frame(12)) {
        let counts = frame_occlusion_counts(&boxes);
        prop_assert_eq!(counts.len(), boxes.len());

        let max = boxes.len().saturating_sub(1) as u32;
        prop_assert!(counts.iter().all(|&c| c <= max));
        // Every hit increments two counts.
        prop_assert_eq!(counts.iter().sum::<u32>() % 2, 0);
    }

    #[test]
    fn frames_are_counted_independently(first in arb_frame(8), second in arb_frame(8)) {
        let frames: Vec<u32> = std::iter::repeat_n(0, first.len())
            .chain(std::iter::repeat_n(1, second.len()))
            .collect();
        let boxes: Vec<BoxBounds> = first.iter().chain(&second).copied().collect();

        let mut expected = frame_occlusion_counts(&first);
        expected.extend(frame_occlusion_counts(&second));
        prop_assert_eq!(occlusion_counts(&frames, &boxes, Parallelism::Sequential).unwrap(), expected);
    }

    #[test]
    fn interleaving_frames_keeps_row_counts(seed in any::<u64>(), n in 1usize..30) {
        // Alternate rows between two frames and compare with each frame alone.
        let boxes = random_boxes(n, 100.0, seed);
        let frames: Vec<u32> = (0..n as u32).map(|i| i % 2).collect();

        let even: Vec<BoxBounds> = boxes.iter().step_by(2).copied().collect();
        let odd: Vec<BoxBounds> = boxes.iter().skip(1).step_by(2).copied().collect();
        let (even_counts, odd_counts) = (frame_occlusion_counts(&even), frame_occlusion_counts(&odd));

        let counts = occlusion_counts(&frames, &boxes, Parallelism::Parallel).unwrap();
        for (row, &count) in counts.iter().enumerate() {
            let expected = if row % 2 == 0 { even_counts[row / 2] } else { odd_counts[row / 2] };
            prop_assert_eq!(count, expected);
        }
    }
}
