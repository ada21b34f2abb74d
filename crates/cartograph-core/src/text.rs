//! Text measurement for node sizing.
//!
//! There is no font rasterizer in the layout path; widths are estimated from
//! per-character factors relative to the font size. Narrow glyphs (`i`, `l`)
//! and wide glyphs (`m`, `W`) get their own factors, everything else uses the
//! average.

use crate::geometry::Size;

/// Line height as a multiple of the font size
pub const LINE_HEIGHT: f32 = 1.2;

/// Padding between text and the node edge, left and right
pub const HORIZONTAL_PADDING: f32 = 12.0;

/// Padding between text and the node edge, top and bottom
pub const VERTICAL_PADDING: f32 = 10.0;

/// Smallest box any node gets, even with empty text
pub const MIN_NODE_SIZE: Size = Size::new(40.0, 24.0);

fn char_width_factor(c: char) -> f32 {
    match c {
        'i' | 'l' => 0.3,
        'I' | 'f' | 't' | 'r' => 0.4,
        'm' | 'w' | 'M' | 'W' => 0.8,
        _ => 0.6,
    }
}

/// Estimated width of a single line of text
pub fn line_width(line: &str, font_size: f32) -> f32 {
    line.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Estimated extent of possibly multi-line text, without padding.
///
/// Lines are separated by `\n`; the widest line determines the width.
///
/// ```
/// # use cartograph_core::text::measure_text;
/// let one = measure_text("Engine", 18.0);
/// let two = measure_text("Engine\nRoom", 18.0);
/// assert_eq!(one.width(), two.width());
/// assert!(two.height() > one.height());
/// ```
pub fn measure_text(text: &str, font_size: f32) -> Size {
    let lines: Vec<&str> = text.trim().lines().collect();
    let line_count = lines.len().max(1) as f32;
    let width = lines
        .iter()
        .map(|line| line_width(line.trim(), font_size))
        .fold(0.0, f32::max);
    Size::new(width, line_count * font_size * LINE_HEIGHT)
}

/// Bounding box of a node displaying `text`, padding and minimum size applied
pub fn node_size(text: &str, font_size: f32) -> Size {
    measure_text(text, font_size)
        .add_padding(HORIZONTAL_PADDING, VERTICAL_PADDING)
        .max(MIN_NODE_SIZE)
}
