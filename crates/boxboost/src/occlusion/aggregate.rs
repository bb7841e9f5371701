//! Per-frame aggregation of pairwise occlusions.

use std::collections::HashMap;
use std::hash::Hash;

use super::bbox::{overlaps, BoxBounds};
use crate::data::{FeatureTable, TableError, FRAME, OCCLUSION};
use crate::utils::Parallelism;

/// Occlusion counts for the boxes of a single frame, in the given order.
///
/// Every unordered pair `(i, j)` with `i < j` is tested once with
/// [`overlaps(boxes[i], boxes[j])`](overlaps); a hit increments both counts.
/// Frames with fewer than two boxes yield all zeros.
pub fn frame_occlusion_counts(boxes: &[BoxBounds]) -> Vec<u32> {
    let mut counts = vec![0u32; boxes.len()];
    if boxes.len() < 2 {
        return counts;
    }

    for i in 0..boxes.len() - 1 {
        for j in (i + 1)..boxes.len() {
            if overlaps(&boxes[i], &boxes[j]) {
                counts[i] += 1;
                counts[j] += 1;
            }
        }
    }
    counts
}

/// Group row indices by frame key, in first-appearance order of the keys.
///
/// Rows inside a group keep their original relative order.
pub fn group_rows_by_frame<K: Eq + Hash>(frames: &[K]) -> Vec<Vec<usize>> {
    let mut slot_of: HashMap<&K, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (row, key) in frames.iter().enumerate() {
        let slot = *slot_of.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row);
    }
    groups
}

/// Occlusion count for every row, aligned with the input row order.
///
/// Rows are grouped by `frames[row]`; each frame is counted independently
/// with [`frame_occlusion_counts`] and the counts are written back to the
/// rows they came from. A frame with a single box is a zero-count frame and
/// never stops the processing of the frames after it.
///
/// # Errors
///
/// [`TableError::LengthMismatch`] if there is not one frame key per box.
pub fn occlusion_counts<K: Eq + Hash>(
    frames: &[K],
    boxes: &[BoxBounds],
    parallelism: Parallelism,
) -> Result<Vec<u32>, TableError> {
    if frames.len() != boxes.len() {
        return Err(TableError::LengthMismatch {
            column: FRAME.to_string(),
            expected: boxes.len(),
            got: frames.len(),
        });
    }

    let groups = group_rows_by_frame(frames);
    let per_frame = parallelism.maybe_par_map(&groups[..], |rows| {
        let frame_boxes: Vec<BoxBounds> = rows.iter().map(|&r| boxes[r]).collect();
        frame_occlusion_counts(&frame_boxes)
    });

    let mut out = vec![0u32; boxes.len()];
    for (rows, counts) in groups.iter().zip(per_frame) {
        for (&row, count) in rows.iter().zip(counts) {
            out[row] = count;
        }
    }
    Ok(out)
}

/// Return a copy of `table` carrying the `inter_objects_occlusion` column.
///
/// Box bounds are read from the `xmin`, `xmax`, `ymin`, `ymax` columns and
/// frames from `frame`. If the table already has an occlusion column it is
/// recomputed in place, so augmenting twice is a no-op.
///
/// # Errors
///
/// [`TableError::MissingColumn`] if any of the required columns is absent.
pub fn augment_with_occlusion(
    table: &FeatureTable,
    parallelism: Parallelism,
) -> Result<FeatureTable, TableError> {
    let frames = table.frame_keys()?;
    let boxes = table.boxes()?;

    let counts = occlusion_counts(&frames, &boxes, parallelism)?;

    let mut augmented = table.clone();
    augmented.set_column(OCCLUSION, counts.into_iter().map(f64::from).collect())?;
    Ok(augmented)
}
