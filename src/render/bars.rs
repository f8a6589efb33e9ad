//! Bar renderer: sample buffers to vertical bars on a surface.
//!
//! Stateless per draw call: the caller owns the sample buffer and style and
//! passes both in each time. Buffers shorter than the surface repeat
//! cyclically (`index = bar_index % len`); an empty buffer skips the draw
//! entirely.

use super::color::{resolve_bar_color, Rgba, Theme};
use super::surface::Framebuffer;

/// Narrowest bar the renderer will draw, in logical pixels. Styles asking for
/// less are clamped here so cell width can never reach zero.
pub const MIN_BAR_WIDTH: f32 = 1.0;

/// Extra cells drawn beyond each horizontal edge of a scrolled frame so that
/// motion never reveals an undrawn gap at the boundary.
const SCROLL_MARGIN_CELLS: i64 = 2;

/// Bar geometry and styling for one draw call.
///
/// Construction clamps the geometry (width ≥ [`MIN_BAR_WIDTH`], gap ≥ 0), so a
/// style in hand is always safe to divide by.
#[derive(Debug, Clone)]
pub struct BarStyle {
    bar_width: f32,
    bar_gap: f32,
    /// Explicit bar color; `None` defers to the theme, then neutral gray.
    pub bar_color: Option<Rgba>,
    /// Whether to fade bars out toward the horizontal edges.
    pub fade_edges: bool,
    /// Width of each fade band in logical pixels.
    pub fade_width: f32,
}

impl BarStyle {
    pub fn new(bar_width: f32, bar_gap: f32) -> Self {
        Self {
            bar_width: bar_width.max(MIN_BAR_WIDTH),
            bar_gap: bar_gap.max(0.0),
            bar_color: None,
            fade_edges: true,
            fade_width: 24.0,
        }
    }

    pub fn with_color(mut self, color: Option<Rgba>) -> Self {
        self.bar_color = color;
        self
    }

    pub fn with_fade(mut self, enabled: bool, width: f32) -> Self {
        self.fade_edges = enabled;
        self.fade_width = width.max(0.0);
        self
    }

    pub fn bar_width(&self) -> f32 {
        self.bar_width
    }

    pub fn bar_gap(&self) -> f32 {
        self.bar_gap
    }

    /// Width of one bar cell (bar plus trailing gap). Always positive.
    pub fn cell(&self) -> f32 {
        self.bar_width + self.bar_gap
    }
}

impl Default for BarStyle {
    fn default() -> Self {
        Self::new(4.0, 2.0)
    }
}

/// A resolved bar under a pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarHit {
    pub index: usize,
    pub value: f32,
}

/// Draws `samples` as centered vertical bars across the whole surface.
///
/// One bar per cell, `ceil(width / cell)` cells; short buffers repeat
/// cyclically. Values are clamped to `[0, 1]`; a value of zero draws nothing
/// for that cell. An empty buffer leaves the surface untouched.
pub fn draw_bars(fb: &mut Framebuffer, samples: &[f32], style: &BarStyle, theme: Option<&dyn Theme>) {
    if samples.is_empty() {
        return;
    }
    fb.clear();

    let color = resolve_bar_color(style.bar_color, theme);
    let cell = style.cell();
    let height = fb.height();
    let bars = (fb.width() / cell).ceil() as usize;

    for i in 0..bars {
        let value = samples[i % samples.len()].clamp(0.0, 1.0);
        let bar_height = value * height;
        if bar_height <= 0.0 {
            continue;
        }
        let x = i as f32 * cell;
        let y = (height - bar_height) / 2.0;
        fb.fill_rect(x, y, style.bar_width, bar_height, color);
    }

    if style.fade_edges {
        fb.fade_edges(style.fade_width);
    }
}

/// Draws `samples` shifted left by `offset` logical pixels, wrapping
/// cyclically.
///
/// Cells are drawn from [`SCROLL_MARGIN_CELLS`] before the left edge to the
/// same margin past the right edge; `cell_index = floor((offset + i*cell) /
/// cell) mod len` picks the sample for each, so any offset produces a seamless
/// window into the repeating buffer.
pub fn draw_bars_scrolled(
    fb: &mut Framebuffer,
    samples: &[f32],
    style: &BarStyle,
    theme: Option<&dyn Theme>,
    offset: f32,
) {
    if samples.is_empty() {
        return;
    }
    fb.clear();

    let color = resolve_bar_color(style.bar_color, theme);
    let cell = style.cell();
    let width = fb.width();
    let height = fb.height();
    let bars = (width / cell).ceil() as i64 + SCROLL_MARGIN_CELLS;
    let shift = offset.rem_euclid(cell);
    let len = samples.len() as i64;

    for i in -SCROLL_MARGIN_CELLS..bars {
        let cell_index = ((offset + i as f32 * cell) / cell).floor() as i64;
        let value = samples[cell_index.rem_euclid(len) as usize].clamp(0.0, 1.0);
        let bar_height = value * height;
        let x = i as f32 * cell - shift;
        if bar_height <= 0.0 || x + style.bar_width < 0.0 || x > width {
            continue;
        }
        let y = (height - bar_height) / 2.0;
        fb.fill_rect(x, y, style.bar_width, bar_height, color);
    }

    if style.fade_edges {
        fb.fade_edges(style.fade_width);
    }
}

/// Maps a pointer x (logical pixels from the surface's left edge) to the bar
/// under it.
///
/// Only indices that address the caller's original data are reported; bars
/// past the end of the buffer (cyclic repeats) yield `None`.
pub fn bar_hit(samples: &[f32], style: &BarStyle, x: f32) -> Option<BarHit> {
    if x < 0.0 {
        return None;
    }
    let index = (x / style.cell()).floor() as usize;
    (index < samples.len()).then(|| BarHit {
        index,
        value: samples[index],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::SurfaceSize;

    fn flat_style() -> BarStyle {
        BarStyle::new(4.0, 2.0).with_fade(false, 0.0)
    }

    /// Counts opaque pixels in one physical column.
    fn column_height(fb: &Framebuffer, x: u32) -> u32 {
        (0..fb.physical_height())
            .filter(|&y| fb.pixel(x, y).a != 0)
            .count() as u32
    }

    #[test]
    fn six_bars_cycle_through_three_samples() {
        // Width 36 at cell 6 fits exactly 6 bars.
        let mut fb = Framebuffer::new(SurfaceSize::new(36, 10, 1.0));
        let samples = [0.2, 0.8, 0.5];
        draw_bars(&mut fb, &samples, &flat_style(), None);

        let expected: [f32; 6] = [0.2, 0.8, 0.5, 0.2, 0.8, 0.5];
        for (i, value) in expected.iter().enumerate() {
            let x = i as u32 * 6;
            assert_eq!(
                column_height(&fb, x),
                (value * 10.0).round() as u32,
                "bar {i}"
            );
            // The gap after each bar stays empty.
            assert_eq!(column_height(&fb, x + 4), 0, "gap after bar {i}");
        }
    }

    #[test]
    fn bar_count_rounds_up_to_cover_the_surface() {
        // Width 37 at cell 6 needs ceil(37/6) = 7 bars; the last is clipped.
        let mut fb = Framebuffer::new(SurfaceSize::new(37, 10, 1.0));
        draw_bars(&mut fb, &[1.0], &flat_style(), None);
        assert_eq!(column_height(&fb, 36), 10);
    }

    #[test]
    fn empty_buffer_skips_the_draw() {
        let mut fb = Framebuffer::new(SurfaceSize::new(12, 4, 1.0));
        fb.fill_rect(0.0, 0.0, 12.0, 4.0, Rgba::rgb(7, 7, 7));
        draw_bars(&mut fb, &[], &flat_style(), None);
        assert_eq!(fb.pixel(5, 2), Rgba::rgb(7, 7, 7));
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let mut fb = Framebuffer::new(SurfaceSize::new(12, 10, 1.0));
        draw_bars(&mut fb, &[1.5, -0.3], &flat_style(), None);
        assert_eq!(column_height(&fb, 0), 10);
        assert_eq!(column_height(&fb, 6), 0);
    }

    #[test]
    fn degenerate_geometry_is_clamped_not_divided_by() {
        let style = BarStyle::new(0.0, -3.0);
        assert_eq!(style.bar_width(), MIN_BAR_WIDTH);
        assert_eq!(style.bar_gap(), 0.0);
        assert!(style.cell() > 0.0);
        // Hit testing with the clamped style stays finite.
        assert_eq!(
            bar_hit(&[0.5], &style, 0.0),
            Some(BarHit {
                index: 0,
                value: 0.5
            })
        );
    }

    #[test]
    fn hit_test_reports_only_real_indices() {
        let samples = [0.2, 0.8, 0.5];
        let style = flat_style();
        assert_eq!(
            bar_hit(&samples, &style, 0.0),
            Some(BarHit {
                index: 0,
                value: 0.2
            })
        );
        assert_eq!(
            bar_hit(&samples, &style, 13.0),
            Some(BarHit {
                index: 2,
                value: 0.5
            })
        );
        // Bar 3 exists on screen but aliases sample 0; not reported.
        assert_eq!(bar_hit(&samples, &style, 19.0), None);
        assert_eq!(bar_hit(&samples, &style, -1.0), None);
    }

    #[test]
    fn scrolled_draw_repeats_with_cycle_period() {
        let samples = [0.3, 0.9, 0.6, 0.4];
        let style = flat_style();
        let cycle = style.cell() * samples.len() as f32;

        let mut a = Framebuffer::new(SurfaceSize::new(30, 8, 1.0));
        let mut b = Framebuffer::new(SurfaceSize::new(30, 8, 1.0));
        draw_bars_scrolled(&mut a, &samples, &style, None, 7.5);
        draw_bars_scrolled(&mut b, &samples, &style, None, 7.5 + cycle);

        for y in 0..a.physical_height() {
            for x in 0..a.physical_width() {
                assert_eq!(a.pixel(x, y), b.pixel(x, y), "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn scrolling_never_reveals_a_gap() {
        // Gapless full-height bars must cover every column at any offset.
        let samples = [1.0, 1.0, 1.0];
        let style = BarStyle::new(5.0, 0.0).with_fade(false, 0.0);
        let cycle = style.cell() * samples.len() as f32;

        let mut offset = 0.0;
        while offset < cycle {
            let mut fb = Framebuffer::new(SurfaceSize::new(12, 4, 1.0));
            draw_bars_scrolled(&mut fb, &samples, &style, None, offset);
            for x in 0..fb.physical_width() {
                assert_ne!(column_height(&fb, x), 0, "gap at column {x}, offset {offset}");
            }
            offset += 0.7;
        }
    }
}
