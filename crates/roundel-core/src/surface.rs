//! Software raster surface for the preview and export pipelines.
//!
//! [`Canvas`] is a fixed-size RGBA8 pixel buffer with the small set of 2D
//! operations the cropper needs: fills, a canvas-style scaled image draw
//! with bilinear sampling, and the circular compositing steps
//! (destination-in mask, destination-out punch, border stroke).
//!
//! All operations are deterministic: identical inputs always produce a
//! pixel-identical buffer, which is what makes repeated preview redraws
//! idempotent.

use crate::decode::SourceImage;

/// Background fill behind the image (neutral light gray).
pub const BACKGROUND: [u8; 3] = [0xf3, 0xf4, 0xf6];

/// Semi-transparent black overlay that dims the area outside the circle.
pub const DIM_OVERLAY: [u8; 4] = [0, 0, 0, 128];

/// Color of the circle border stroke.
pub const BORDER: [u8; 3] = [0xff, 0xff, 0xff];

/// Width of the circle border stroke in pixels.
pub const BORDER_WIDTH: f64 = 2.0;

/// A fixed-size RGBA8 raster surface (straight alpha, row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Create a fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The RGBA pixel buffer, length `width * height * 4`.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Fill the whole canvas with an opaque color.
    pub fn fill_rgb(&mut self, color: [u8; 3]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = color[0];
            px[1] = color[1];
            px[2] = color[2];
            px[3] = 255;
        }
    }

    /// Set every pixel to a straight-alpha RGBA color, replacing existing
    /// content.
    pub fn fill_rgba(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Source-over composite another canvas of the same size onto this one.
    pub fn composite_over(&mut self, layer: &Canvas) {
        debug_assert_eq!((self.width, self.height), (layer.width, layer.height));
        for (dst, src) in self
            .pixels
            .chunks_exact_mut(4)
            .zip(layer.pixels.chunks_exact(4))
        {
            let alpha = src[3] as f32 / 255.0;
            if alpha > 0.0 {
                blend_over(dst, [src[0], src[1], src[2]], alpha);
            }
        }
    }

    /// Drop the alpha channel, returning an RGB buffer.
    ///
    /// Intended for export surfaces that were composited over an opaque
    /// fill; any remaining translucency is discarded, not flattened.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width as usize) * (self.height as usize) * 3);
        for px in self.pixels.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        out
    }

    /// Draw the full source image scaled into the destination rectangle.
    pub fn draw_image(&mut self, src: &SourceImage, dx: f64, dy: f64, dw: f64, dh: f64) {
        self.draw_image_region(
            src,
            0.0,
            0.0,
            src.width as f64,
            src.height as f64,
            dx,
            dy,
            dw,
            dh,
        );
    }

    /// Draw a region of the source image into a destination rectangle,
    /// scaling as needed (canvas-style nine-argument draw).
    ///
    /// Source coordinates are in source-image pixels, destination
    /// coordinates in canvas pixels; both may be fractional. Destination
    /// pixels whose back-projection falls outside the source region are
    /// left untouched, sampling is bilinear with edge clamping, and
    /// painted pixels are written fully opaque.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_region(
        &mut self,
        src: &SourceImage,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    ) {
        if sw <= 0.0 || sh <= 0.0 || dw <= 0.0 || dh <= 0.0 || src.is_empty() {
            return;
        }

        // Destination pixels covered by the rectangle, clipped to canvas
        let x0 = dx.floor().max(0.0) as u32;
        let y0 = dy.floor().max(0.0) as u32;
        let x1 = (dx + dw).ceil().min(self.width as f64) as u32;
        let y1 = (dy + dh).ceil().min(self.height as f64) as u32;

        let scale_x = sw / dw;
        let scale_y = sh / dh;

        for py in y0..y1 {
            for px in x0..x1 {
                // Back-project the destination pixel center into source space
                let u = sx + (px as f64 + 0.5 - dx) * scale_x;
                let v = sy + (py as f64 + 0.5 - dy) * scale_y;

                // Pixel centers outside the requested region are not painted
                if u < sx || u >= sx + sw || v < sy || v >= sy + sh {
                    continue;
                }

                let rgb = sample_bilinear(src, u, v);
                let idx = ((py as usize) * (self.width as usize) + px as usize) * 4;
                self.pixels[idx] = rgb[0];
                self.pixels[idx + 1] = rgb[1];
                self.pixels[idx + 2] = rgb[2];
                self.pixels[idx + 3] = 255;
            }
        }
    }

    /// Destination-in with a circle: keep content only inside the circle,
    /// with anti-aliased coverage at the rim. Everything outside becomes
    /// transparent.
    pub fn mask_circle_in(&mut self, cx: f64, cy: f64, radius: f64) {
        self.scale_alpha_by_circle(cx, cy, radius, false);
    }

    /// Destination-out with a circle: erase content inside the circle,
    /// leaving everything outside untouched.
    pub fn punch_circle_out(&mut self, cx: f64, cy: f64, radius: f64) {
        self.scale_alpha_by_circle(cx, cy, radius, true);
    }

    fn scale_alpha_by_circle(&mut self, cx: f64, cy: f64, radius: f64, invert: bool) {
        for py in 0..self.height {
            for px in 0..self.width {
                let coverage = circle_coverage(px as f64 + 0.5, py as f64 + 0.5, cx, cy, radius);
                let keep = if invert { 1.0 - coverage } else { coverage };
                let idx = ((py as usize) * (self.width as usize) + px as usize) * 4;
                let alpha = self.pixels[idx + 3] as f32 * keep;
                self.pixels[idx + 3] = alpha.round() as u8;
            }
        }
    }

    /// Stroke a circle outline of the given width, source-over blended
    /// with anti-aliased edges.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, width: f64, color: [u8; 3]) {
        let half = width / 2.0;
        for py in 0..self.height {
            for px in 0..self.width {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                // Coverage of the stroke band [radius - half, radius + half]
                let coverage = (half + 0.5 - (dist - radius).abs()).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let idx = ((py as usize) * (self.width as usize) + px as usize) * 4;
                blend_over(
                    &mut self.pixels[idx..idx + 4],
                    color,
                    coverage as f32,
                );
            }
        }
    }
}

/// Anti-aliased coverage of a pixel center by a filled circle: 1.0 well
/// inside, 0.0 well outside, a linear ramp across the rim.
#[inline]
fn circle_coverage(x: f64, y: f64, cx: f64, cy: f64, radius: f64) -> f32 {
    let dx = x - cx;
    let dy = y - cy;
    let dist = (dx * dx + dy * dy).sqrt();
    (radius - dist + 0.5).clamp(0.0, 1.0) as f32
}

/// Bilinear sample of the source image at a fractional pixel coordinate,
/// clamping to the image edges.
#[inline]
fn sample_bilinear(src: &SourceImage, u: f64, v: f64) -> [u8; 3] {
    let fu = u - 0.5;
    let fv = v - 0.5;
    let x0 = fu.floor() as i64;
    let y0 = fv.floor() as i64;
    let tx = (fu - x0 as f64) as f32;
    let ty = (fv - y0 as f64) as f32;

    let p00 = src.pixel_clamped(x0, y0);
    let p10 = src.pixel_clamped(x0 + 1, y0);
    let p01 = src.pixel_clamped(x0, y0 + 1);
    let p11 = src.pixel_clamped(x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
        let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Source-over blend a straight-alpha color into one RGBA destination pixel.
#[inline]
fn blend_over(dst: &mut [u8], src_rgb: [u8; 3], src_alpha: f32) {
    let da = dst[3] as f32 / 255.0;
    let out_a = src_alpha + da * (1.0 - src_alpha);
    if out_a <= 0.0 {
        dst[..4].fill(0);
        return;
    }
    for c in 0..3 {
        let s = src_rgb[c] as f32;
        let d = dst[c] as f32;
        let blended = (s * src_alpha + d * da * (1.0 - src_alpha)) / out_a;
        dst[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}


// ============================================================================
// Property-Based Tests
// ============================================================================
