//! Adaptive spacing and the odd/even centering rule.

use cartograph_core::spec::SpecStats;

/// Gaps used by the tree-shaped layouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Between siblings below the top level
    pub sibling_gap: f32,
    /// Between top-level groups
    pub group_gap: f32,
    /// Between a parent column and its children
    pub column_gap: f32,
}

impl Spacing {
    /// Picks gaps from the specification's size, none below `floor`.
    ///
    /// Busier specifications get more breathing room: the score is
    /// `children × 2 + sub-children × 1.5`.
    pub fn for_stats(stats: &SpecStats, floor: f32) -> Self {
        let score = stats.child_count as f32 * 2.0 + stats.total_grandchildren as f32 * 1.5;
        let (sibling_gap, group_gap, column_gap) = if score > 50.0 {
            (20.0, 30.0, 40.0)
        } else if score > 25.0 {
            (15.0, 25.0, 30.0)
        } else {
            (12.0, 20.0, 25.0)
        };
        Self {
            sibling_gap: f32::max(sibling_gap, floor),
            group_gap: f32::max(group_gap, floor),
            column_gap: f32::max(column_gap, floor),
        }
    }
}

/// Coordinate a parent aligns with, given its children's coordinates in order.
///
/// Odd counts use the median child; even counts use the midpoint of the two
/// central children. Returns `None` without children.
///
/// ```
/// # use cartograph::layout::centering_anchor;
/// assert_eq!(centering_anchor(&[10.0, 20.0, 90.0]), Some(20.0));
/// assert_eq!(centering_anchor(&[10.0, 20.0, 40.0, 90.0]), Some(30.0));
/// assert_eq!(centering_anchor(&[]), None);
/// ```
pub fn centering_anchor(coords: &[f32]) -> Option<f32> {
    let n = coords.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(coords[n / 2]),
        _ => Some((coords[n / 2 - 1] + coords[n / 2]) / 2.0),
    }
}
