//! Inter-object occlusion features.
//!
//! Two pieces:
//!
//! - [`overlaps`]: the pairwise edge-inside-span test between two boxes
//! - [`occlusion_counts`] / [`augment_with_occlusion`]: per-frame counting of
//!   how many other boxes each box occludes with, written back as the
//!   `inter_objects_occlusion` column
//!
//! Frames are independent, so counting can run in parallel; the output is
//! always aligned with the input row order.

mod aggregate;
mod bbox;

pub use aggregate::{augment_with_occlusion, frame_occlusion_counts, group_rows_by_frame, occlusion_counts};
pub use bbox::{overlaps, BoxBounds};
