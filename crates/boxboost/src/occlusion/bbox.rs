//! Axis-aligned detection boxes and the pairwise occlusion test.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its four bounds.
///
/// Callers are expected to keep `xmin <= xmax` and `ymin <= ymax`; nothing
/// here enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoxBounds {
    /// Create a box from `[xmin, xmax, ymin, ymax]`, the column order of the
    /// feature tables.
    #[inline]
    pub const fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self { xmin, xmax, ymin, ymax }
    }
}

#[inline]
fn strictly_inside(value: f64, lo: f64, hi: f64) -> bool {
    lo < value && value < hi
}

/// Edge-inside-span occlusion test.
///
/// Returns `true` when one of `b`'s vertical edges lies strictly inside `a`'s
/// open x-span AND one of `b`'s horizontal edges lies strictly inside `a`'s
/// open y-span.
///
/// This is not a general rectangle intersection:
///
/// - only `b`'s edges are tested against `a`, so `a` nested strictly inside
///   `b` is not detected;
/// - spans are open, so boxes that only share an edge (or nest with touching
///   boundaries) never occlude.
///
/// The occlusion counts of trained models depend on exactly this policy.
///
/// ```
/// use boxboost::occlusion::{overlaps, BoxBounds};
///
/// let a = BoxBounds::new(0.0, 10.0, 0.0, 10.0);
/// let b = BoxBounds::new(5.0, 15.0, 5.0, 15.0);
/// assert!(overlaps(&a, &b));
///
/// // `a` inside `c`: none of `c`'s edges fall inside `a`.
/// let c = BoxBounds::new(-5.0, 20.0, -5.0, 20.0);
/// assert!(!overlaps(&a, &c));
/// ```
#[inline]
pub fn overlaps(a: &BoxBounds, b: &BoxBounds) -> bool {
    let x_hit = strictly_inside(b.xmin, a.xmin, a.xmax) || strictly_inside(b.xmax, a.xmin, a.xmax);
    if !x_hit {
        return false;
    }
    strictly_inside(b.ymin, a.ymin, a.ymax) || strictly_inside(b.ymax, a.ymin, a.ymax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const A: BoxBounds = BoxBounds::new(0.0, 10.0, 0.0, 10.0);

    #[rstest]
    #[case::partial_corner(BoxBounds::new(5.0, 15.0, 5.0, 15.0), true)]
    #[case::nested_inside_a(BoxBounds::new(2.0, 8.0, 2.0, 8.0), true)]
    #[case::left_edge_only_in_x(BoxBounds::new(-5.0, 5.0, 2.0, 20.0), true)]
    #[case::disjoint_x(BoxBounds::new(11.0, 20.0, 2.0, 8.0), false)]
    #[case::disjoint_y(BoxBounds::new(2.0, 8.0, 11.0, 20.0), false)]
    #[case::shared_vertical_edge(BoxBounds::new(10.0, 20.0, 2.0, 8.0), false)]
    #[case::shared_horizontal_edge(BoxBounds::new(2.0, 8.0, 10.0, 20.0), false)]
    #[case::identical(A, false)]
    #[case::nested_sharing_both_x_edges(BoxBounds::new(0.0, 10.0, 2.0, 8.0), false)]
    #[case::a_inside_b(BoxBounds::new(-1.0, 11.0, -1.0, 11.0), false)]
    fn overlap_policy(#[case] b: BoxBounds, #[case] expected: bool) {
        assert_eq!(overlaps(&A, &b), expected);
    }

    #[test]
    fn containment_is_asymmetric() {
        let inner = BoxBounds::new(2.0, 8.0, 2.0, 8.0);
        assert!(overlaps(&A, &inner));
        assert!(!overlaps(&inner, &A));
    }

    #[test]
    fn y_span_uses_ymin_of_first_box() {
        // With a.ymin misread as a.xmin (0.0 vs 4.0) this would be flagged.
        let a = BoxBounds::new(0.0, 10.0, 4.0, 10.0);
        let b = BoxBounds::new(5.0, 15.0, 1.0, 3.0);
        assert!(!overlaps(&a, &b));
    }
}
