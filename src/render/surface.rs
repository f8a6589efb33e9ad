//! Pixel-addressable rendering surface.
//!
//! [`Framebuffer`] is the engine's drawing target: an RGBA buffer addressed in
//! logical pixels and backed by `logical × device-pixel-ratio` physical pixels.
//! Hosts own one framebuffer per visual and blit it however they present
//! pixels (the terminal presenter uses half-block cells).

use super::color::Rgba;

/// Logical surface dimensions plus device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
    /// Scale factor between logical and physical pixels.
    pub dpr: f32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32, dpr: f32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            dpr: if dpr > 0.0 { dpr } else { 1.0 },
        }
    }
}

/// Software RGBA surface with device-pixel-ratio-aware sizing.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    size: SurfaceSize,
    physical_width: u32,
    physical_height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(size: SurfaceSize) -> Self {
        let mut surface = Self {
            size: SurfaceSize::new(0, 0, 1.0),
            physical_width: 0,
            physical_height: 0,
            pixels: Vec::new(),
        };
        surface.resize_if_needed(size);
        surface
    }

    /// Resizes the backing store when the target size actually changed.
    ///
    /// Returns true when a resize happened. Reallocating resets the drawing
    /// surface, so callers skip it while dimensions are stable to avoid
    /// mid-animation churn.
    pub fn resize_if_needed(&mut self, size: SurfaceSize) -> bool {
        let size = SurfaceSize::new(size.width, size.height, size.dpr);
        if size == self.size && !self.pixels.is_empty() {
            return false;
        }
        self.size = size;
        self.physical_width = ((size.width as f32 * size.dpr).round() as u32).max(1);
        self.physical_height = ((size.height as f32 * size.dpr).round() as u32).max(1);
        self.pixels = vec![
            Rgba::TRANSPARENT;
            self.physical_width as usize * self.physical_height as usize
        ];
        true
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Logical width in pixels.
    pub fn width(&self) -> f32 {
        self.size.width as f32
    }

    /// Logical height in pixels.
    pub fn height(&self) -> f32 {
        self.size.height as f32
    }

    pub fn physical_width(&self) -> u32 {
        self.physical_width
    }

    pub fn physical_height(&self) -> u32 {
        self.physical_height
    }

    /// Clears every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    /// Fills an axis-aligned rectangle given in logical coordinates.
    ///
    /// Coordinates are scaled by the device pixel ratio and clipped to the
    /// surface; empty or fully clipped rectangles are a no-op.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let dpr = self.size.dpr;
        let x0 = ((x * dpr).round() as i64).max(0);
        let y0 = ((y * dpr).round() as i64).max(0);
        let x1 = (((x + w) * dpr).round() as i64).min(self.physical_width as i64);
        let y1 = (((y + h) * dpr).round() as i64).min(self.physical_height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.physical_width as usize;
        for py in y0 as usize..y1 as usize {
            let row = py * stride;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }

    /// Blends `color` over a rectangle at `opacity` in `[0, 1]`, source-over,
    /// leaving pixels outside untouched. Used for translucent overlays such as
    /// a played-region shade.
    pub fn blend_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba, opacity: f32) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let alpha = (color.a as f32 / 255.0 * opacity).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let dpr = self.size.dpr;
        let x0 = ((x * dpr).round() as i64).max(0);
        let y0 = ((y * dpr).round() as i64).max(0);
        let x1 = (((x + w) * dpr).round() as i64).min(self.physical_width as i64);
        let y1 = (((y + h) * dpr).round() as i64).min(self.physical_height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.physical_width as usize;
        let lerp = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * alpha) as u8;
        for py in y0 as usize..y1 as usize {
            let row = py * stride;
            for pixel in &mut self.pixels[row + x0 as usize..row + x1 as usize] {
                pixel.r = lerp(pixel.r, color.r);
                pixel.g = lerp(pixel.g, color.g);
                pixel.b = lerp(pixel.b, color.b);
                pixel.a = pixel.a.max((alpha * 255.0) as u8);
            }
        }
    }

    /// Applies a linear alpha fade across `fade_width` logical pixels at both
    /// horizontal edges: fully transparent at the outermost column, fully
    /// opaque at the inner edge of the band.
    pub fn fade_edges(&mut self, fade_width: f32) {
        let band = fade_width * self.size.dpr;
        if band <= 0.0 {
            return;
        }
        let width = self.physical_width as usize;
        let stride = width;
        for x in 0..width {
            let from_left = x as f32 / band;
            let from_right = (width - 1 - x) as f32 / band;
            let factor = from_left.min(from_right).min(1.0);
            if factor >= 1.0 {
                continue;
            }
            for y in 0..self.physical_height as usize {
                let pixel = &mut self.pixels[y * stride + x];
                pixel.a = (pixel.a as f32 * factor).round() as u8;
            }
        }
    }

    /// Reads one physical pixel. Out-of-bounds reads return transparent.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.physical_width || y >= self.physical_height {
            return Rgba::TRANSPARENT;
        }
        self.pixels[y as usize * self.physical_width as usize + x as usize]
    }
}
