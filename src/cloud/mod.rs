//! Word-cloud generation: frequency counting, mask-aware placement, and
//! rasterization into an RGBA canvas.
//!
//! Placement walks an archimedean spiral out from the canvas center and
//! tests each candidate position against a bit-packed collision map, one bit
//! per pixel. The map starts out seeded from the mask: exact opaque white is
//! canvas negative space and is blocked, every other value (including the
//! near-white the mask builder writes) is placeable.

use crate::colors::{Palette, Rgb};
use crate::error::RenderError;
use fontdue::Font;
use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

const MASK_BLOCKED: Rgba<u8> = Rgba([255, 255, 255, 255]);
const MIN_FONT_SIZE: f32 = 4.0;
const PLACEMENT_ATTEMPTS: usize = 10_000;

/// Count word frequencies in a text buffer.
///
/// Tokens come from unicode word segmentation, lowercased. One-character
/// tokens and pure numbers are dropped. The result is sorted by count
/// descending (ties alphabetical, so output is deterministic) and truncated
/// to `max_words` entries.
#[must_use]
pub fn frequencies(text: &str, max_words: usize) -> Vec<(String, f32)> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in text.unicode_words() {
        let token = token.to_lowercase();
        if token.chars().count() < 2 || token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut words: Vec<(String, f32)> = counts
        .into_iter()
        .map(|(w, c)| (w, c as f32))
        .collect();
    words.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    words.truncate(max_words);
    words
}

/// Configures and runs a single cloud rendering.
pub struct CloudBuilder {
    width: u32,
    height: u32,
    bg_color: Rgb,
    palette: Palette,
    max_font_size: f32,
    padding: u32,
    vertical_chance: f64,
    seed: Option<u64>,
    mask: Option<RgbaImage>,
}

impl CloudBuilder {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            bg_color: Rgb::WHITE,
            palette: Palette::Gradient,
            max_font_size: 40.0,
            padding: 1,
            vertical_chance: 0.1,
            seed: None,
            mask: None,
        }
    }

    #[must_use]
    pub fn mask(mut self, mask: RgbaImage) -> Self {
        self.mask = Some(mask);
        self
    }

    #[must_use]
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn bg_color(mut self, color: Rgb) -> Self {
        self.bg_color = color;
        self
    }

    #[must_use]
    pub fn max_font_size(mut self, size: f32) -> Self {
        self.max_font_size = size.max(MIN_FONT_SIZE);
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Render the cloud.
    ///
    /// # Errors
    /// Returns an error if the word list is empty, the mask dimensions do
    /// not match the canvas, or not a single word could be placed.
    pub fn render(&self, words: &[(String, f32)], font: &Font) -> Result<RgbaImage, RenderError> {
        let valid: Vec<_> = words
            .iter()
            .filter(|(w, weight)| !w.trim().is_empty() && *weight > 0.0)
            .collect();
        if valid.is_empty() {
            return Err(RenderError::Input("no words to render".into()));
        }

        let mut map = CollisionMap::new(self.width, self.height);
        if let Some(mask) = &self.mask {
            if mask.dimensions() != (self.width, self.height) {
                return Err(RenderError::Input(format!(
                    "mask is {}x{} but canvas is {}x{}",
                    mask.width(),
                    mask.height(),
                    self.width,
                    self.height
                )));
            }
            map.seed_from_mask(mask);
        }

        let mut rng = match self.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };

        let mut sorted: Vec<_> = valid.into_iter().cloned().collect();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let max_weight = sorted.first().map_or(1.0, |w| w.1);
        let min_weight = sorted.last().map_or(1.0, |w| w.1);
        let range = max_weight - min_weight;

        let mut canvas = RgbaImage::from_pixel(
            self.width,
            self.height,
            Rgba([self.bg_color.r, self.bg_color.g, self.bg_color.b, 255]),
        );

        let mut placed = 0usize;
        let total = sorted.len();
        for (word, weight) in &sorted {
            let normalized = if range > 0.0 {
                (weight - min_weight) / range
            } else {
                1.0
            };
            let size = MIN_FONT_SIZE + normalized * (self.max_font_size - MIN_FONT_SIZE);
            let angle = if rng.random_bool(self.vertical_chance) {
                90.0
            } else {
                0.0
            };

            let sprite = rasterize_word(word, size, angle, font, self.padding);
            if sprite.width == 0 || sprite.height == 0 {
                continue;
            }

            if let Some((x, y)) = self.try_place(&sprite, &mut map, &mut rng) {
                let color = self.palette.choose(&mut rng);
                sprite.draw(&mut canvas, x, y, color);
                placed += 1;
            } else {
                debug!("no room for '{word}' at {size:.0}px");
            }
        }

        if placed == 0 {
            return Err(RenderError::Render(
                "could not place any words on the mask".into(),
            ));
        }
        info!("placed {placed}/{total} words");
        Ok(canvas)
    }

    fn try_place(
        &self,
        sprite: &WordSprite,
        map: &mut CollisionMap,
        rng: &mut ChaCha8Rng,
    ) -> Option<(i32, i32)> {
        let start_x = self.width as i32 / 2;
        let start_y = self.height as i32 / 2;
        let direction = if rng.random_bool(0.5) { 1 } else { -1 };
        let spiral = ArchimedeanSpiral::new(self.width as i32, self.height as i32, direction);

        for (dx, dy) in spiral.take(PLACEMENT_ATTEMPTS) {
            let x = start_x + dx - sprite.width as i32 / 2;
            let y = start_y + dy - sprite.height as i32 / 2;
            if !map.collides(sprite, x, y) {
                map.occupy(sprite, x, y);
                return Some((x, y));
            }
        }
        None
    }
}

/// One bit per canvas pixel, packed into u32 rows.
struct CollisionMap {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u32>,
}

impl CollisionMap {
    fn new(width: u32, height: u32) -> Self {
        let stride = ((width + 31) >> 5) as usize;
        Self {
            width,
            height,
            stride,
            bits: vec![0; stride * height as usize],
        }
    }

    fn seed_from_mask(&mut self, mask: &RgbaImage) {
        for (x, y, pixel) in mask.enumerate_pixels() {
            if *pixel == MASK_BLOCKED {
                self.set(x as i32, y as i32);
            }
        }
    }

    fn set(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32 {
            let row = y as usize * self.stride;
            let col = (x as usize) >> 5;
            let bit = 31 - (x & 31);
            self.bits[row + col] |= 1 << bit;
        }
    }

    #[cfg(test)]
    fn is_set(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        let row = y as usize * self.stride;
        let col = (x as usize) >> 5;
        let bit = 31 - (x & 31);
        self.bits[row + col] & (1 << bit) != 0
    }

    /// Test a sprite against the map. Out-of-bounds pixels count as
    /// collisions so words never hang off the canvas.
    fn collides(&self, sprite: &WordSprite, start_x: i32, start_y: i32) -> bool {
        let shift = (start_x & 31).unsigned_abs();
        let r_shift = 32 - shift;

        for sy in 0..sprite.height {
            let gy = start_y + sy as i32;
            if gy < 0 || gy >= self.height as i32 {
                return true;
            }
            let row = gy as usize * self.stride;
            let col_start = (start_x >> 5) as isize;
            let mut carry = 0u32;

            for sx in 0..=sprite.words_per_row {
                let value = if sx < sprite.words_per_row {
                    sprite.bits[sy as usize * sprite.words_per_row + sx]
                } else {
                    0
                };
                // Shift the sprite row into grid alignment; u32 >> is a
                // logical shift, so the carry supplies the high bits.
                let aligned = if shift == 0 {
                    value
                } else {
                    (carry << r_shift) | (value >> shift)
                };
                let gx = col_start + sx as isize;
                if aligned != 0 {
                    if gx < 0 || gx >= self.stride as isize {
                        return true;
                    }
                    if self.bits[row + gx as usize] & aligned != 0 {
                        return true;
                    }
                }
                carry = value;
            }
        }
        false
    }

    fn occupy(&mut self, sprite: &WordSprite, start_x: i32, start_y: i32) {
        let shift = (start_x & 31).unsigned_abs();
        let r_shift = 32 - shift;

        for sy in 0..sprite.height {
            let gy = start_y + sy as i32;
            if gy < 0 || gy >= self.height as i32 {
                continue;
            }
            let row = gy as usize * self.stride;
            let col_start = (start_x >> 5) as isize;
            let mut carry = 0u32;

            for sx in 0..=sprite.words_per_row {
                let value = if sx < sprite.words_per_row {
                    sprite.bits[sy as usize * sprite.words_per_row + sx]
                } else {
                    0
                };
                let aligned = if shift == 0 {
                    value
                } else {
                    (carry << r_shift) | (value >> shift)
                };
                let gx = col_start + sx as isize;
                if aligned != 0 && gx >= 0 && gx < self.stride as isize {
                    self.bits[row + gx as usize] |= aligned;
                }
                carry = value;
            }
        }
    }
}

/// A rasterized word: collision bits plus per-pixel glyph coverage.
struct WordSprite {
    bits: Vec<u32>,
    words_per_row: usize,
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl WordSprite {
    /// Alpha-blend the sprite into the canvas with the given color.
    fn draw(&self, canvas: &mut RgbaImage, start_x: i32, start_y: i32, color: Rgb) {
        for sy in 0..self.height {
            let gy = start_y + sy as i32;
            if gy < 0 || gy >= canvas.height() as i32 {
                continue;
            }
            for sx in 0..self.width {
                let gx = start_x + sx as i32;
                if gx < 0 || gx >= canvas.width() as i32 {
                    continue;
                }
                let alpha = self.coverage[(sy * self.width + sx) as usize];
                if alpha == 0 {
                    continue;
                }
                let dst = canvas.get_pixel_mut(gx as u32, gy as u32);
                let a = u32::from(alpha);
                let blend = |src: u8, dst: u8| -> u8 {
                    ((u32::from(src) * a + u32::from(dst) * (255 - a)) / 255) as u8
                };
                *dst = Rgba([
                    blend(color.r, dst[0]),
                    blend(color.g, dst[1]),
                    blend(color.b, dst[2]),
                    255,
                ]);
            }
        }
    }
}

/// Rasterize a word at the given size and rotation.
///
/// Glyphs are rendered with fontdue, rotated around the text box center,
/// and splatted into both the coverage buffer (for drawing) and the bit
/// buffer (for collision, dilated by `padding` pixels).
fn rasterize_word(text: &str, size: f32, angle_deg: f32, font: &Font, padding: u32) -> WordSprite {
    let metrics = font
        .horizontal_line_metrics(size)
        .unwrap_or(fontdue::LineMetrics {
            ascent: size * 0.8,
            descent: size * -0.2,
            line_gap: 0.0,
            new_line_size: size,
        });

    let mut glyphs = Vec::new();
    let mut total_width = 0.0f32;
    for ch in text.chars() {
        let (glyph_metrics, bitmap) = font.rasterize(ch, size);
        glyphs.push((total_width, glyph_metrics, bitmap));
        total_width += glyph_metrics.advance_width;
    }

    let pad = padding as f32;
    let unrotated_w = total_width.ceil() + pad * 2.0;
    let unrotated_h = metrics.new_line_size.ceil() + pad * 2.0;
    let cx = unrotated_w / 2.0;
    let cy = unrotated_h / 2.0;

    let rad = angle_deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    let rotate = |x: f32, y: f32| -> (f32, f32) {
        let dx = x - cx;
        let dy = y - cy;
        (dx * cos - dy * sin + cx, dx * sin + dy * cos + cy)
    };

    let corners = [
        rotate(0.0, 0.0),
        rotate(unrotated_w, 0.0),
        rotate(0.0, unrotated_h),
        rotate(unrotated_w, unrotated_h),
    ];
    let min_x = corners.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
    let max_x = corners
        .iter()
        .map(|p| p.0)
        .fold(f32::NEG_INFINITY, f32::max);
    let min_y = corners.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
    let max_y = corners
        .iter()
        .map(|p| p.1)
        .fold(f32::NEG_INFINITY, f32::max);

    let width = (max_x - min_x).ceil().max(0.0) as u32;
    let height = (max_y - min_y).ceil().max(0.0) as u32;
    let words_per_row = ((width + 31) >> 5) as usize;

    let mut bits = vec![0u32; words_per_row * height as usize];
    let mut coverage = vec![0u8; (width * height) as usize];

    let base_x = pad;
    let base_y = pad + metrics.ascent;

    for (offset_x, glyph_metrics, bitmap) in &glyphs {
        let glyph_left = base_x + offset_x + glyph_metrics.xmin as f32;
        let glyph_top = base_y - glyph_metrics.height as f32 - glyph_metrics.ymin as f32;

        for y in 0..glyph_metrics.height {
            for x in 0..glyph_metrics.width {
                let value = bitmap[y * glyph_metrics.width + x];
                if value == 0 {
                    continue;
                }
                let (rx, ry) = rotate(glyph_left + x as f32, glyph_top + y as f32);
                let fx = (rx - min_x).round() as i32;
                let fy = (ry - min_y).round() as i32;
                if fx < 0 || fy < 0 || fx >= width as i32 || fy >= height as i32 {
                    continue;
                }

                let idx = (fy as u32 * width + fx as u32) as usize;
                coverage[idx] = coverage[idx].max(value);

                // Collision bits cover every inked pixel, dilated by the
                // padding so neighbors keep their distance
                {
                    let dilate = padding as i32;
                    for py in -dilate..=dilate {
                        for px in -dilate..=dilate {
                            let bx = fx + px;
                            let by = fy + py;
                            if bx >= 0 && by >= 0 && bx < width as i32 && by < height as i32 {
                                let row = by as usize * words_per_row;
                                let col = (bx as usize) >> 5;
                                let bit = 31 - (bx & 31);
                                bits[row + col] |= 1 << bit;
                            }
                        }
                    }
                }
            }
        }
    }

    WordSprite {
        bits,
        words_per_row,
        width,
        height,
        coverage,
    }
}

/// Outward spiral walked during placement, widened to the canvas aspect
/// ratio so placement fills wide canvases horizontally first.
struct ArchimedeanSpiral {
    t: i32,
    dt: i32,
    dx: f64,
    dy: f64,
    ratio: f64,
    step: f64,
}

impl ArchimedeanSpiral {
    fn new(width: i32, height: i32, direction: i32) -> Self {
        let step = 4.0;
        Self {
            t: 0,
            dt: direction,
            dx: 0.0,
            dy: 0.0,
            ratio: step * f64::from(width) / f64::from(height.max(1)),
            step,
        }
    }
}

impl Iterator for ArchimedeanSpiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        self.t += self.dt;
        let sign = if self.t < 0 { -1.0 } else { 1.0 };
        let leg = ((1.0 + 4.0 * sign * f64::from(self.t)).sqrt() - sign) as i32 & 3;
        match leg {
            0 => self.dx += self.ratio,
            1 => self.dy += self.step,
            2 => self.dx -= self.ratio,
            _ => self.dy -= self.step,
        }
        Some((self.dx as i32, self.dy as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequencies_counts_and_sorts() {
        let words = frequencies("git push git pull git status make", 10);
        assert_eq!(words[0], ("git".to_string(), 3.0));
        assert!(words.iter().any(|(w, c)| w == "make" && *c == 1.0));
    }

    #[test]
    fn test_frequencies_drops_short_and_numeric_tokens() {
        let words = frequencies("a 1 22 4096 ls", 10);
        assert_eq!(words, vec![("ls".to_string(), 1.0)]);
    }

    #[test]
    fn test_frequencies_truncates_to_max_words() {
        let words = frequencies("one two three four five", 2);
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_frequencies_is_deterministic() {
        let text = "tie tie other other unique";
        assert_eq!(frequencies(text, 10), frequencies(text, 10));
    }

    #[test]
    fn test_collision_map_set_and_query() {
        let mut map = CollisionMap::new(100, 50);
        map.set(33, 10);
        assert!(map.is_set(33, 10));
        assert!(!map.is_set(34, 10));
        // out of range writes are ignored
        map.set(-1, 0);
        map.set(0, 500);
    }

    #[test]
    fn test_sprite_collides_with_seeded_map() {
        let mut map = CollisionMap::new(64, 64);
        let sprite = WordSprite {
            bits: vec![u32::MAX; 8],
            words_per_row: 1,
            width: 32,
            height: 8,
            coverage: vec![255; 32 * 8],
        };
        assert!(!map.collides(&sprite, 10, 10));
        map.occupy(&sprite, 10, 10);
        assert!(map.collides(&sprite, 10, 10));
        // shifted fully clear of the occupied block
        assert!(!map.collides(&sprite, 10, 30));
        // hanging off the canvas counts as a collision
        assert!(map.collides(&sprite, 40, 10));
        assert!(map.collides(&sprite, 10, 60));
    }

    #[test]
    fn test_spiral_moves_outward() {
        let spiral = ArchimedeanSpiral::new(100, 100, 1);
        let points: Vec<_> = spiral.take(2000).collect();
        let max_radius = points
            .iter()
            .map(|(x, y)| ((x * x + y * y) as f64).sqrt())
            .fold(0.0, f64::max);
        assert!(max_radius > 20.0);
    }

    #[test]
    fn test_render_rejects_empty_input() {
        let builder = CloudBuilder::new(100, 100);
        // A font is required by the signature even for the empty-input path;
        // any valid font file works, so skip when none is discoverable.
        let Ok(font) = crate::fonts::load(None) else {
            return;
        };
        assert!(matches!(
            builder.render(&[], &font),
            Err(RenderError::Input(_))
        ));
    }

    #[test]
    fn test_render_rejects_mismatched_mask() {
        let Ok(font) = crate::fonts::load(None) else {
            return;
        };
        let mask = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let builder = CloudBuilder::new(100, 100).mask(mask);
        let words = vec![("hello".to_string(), 1.0)];
        assert!(matches!(
            builder.render(&words, &font),
            Err(RenderError::Input(_))
        ));
    }

    #[test]
    fn test_render_places_words_inside_free_region() {
        let Ok(font) = crate::fonts::load(None) else {
            return;
        };
        // Fully white mask except a free square in the middle
        let mut mask = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
        for y in 50..150 {
            for x in 50..150 {
                mask.put_pixel(x, y, Rgba([254, 254, 254, 255]));
            }
        }
        let builder = CloudBuilder::new(200, 200)
            .mask(mask)
            .max_font_size(20.0)
            .bg_color(Rgb::WHITE)
            .seed(42);
        let words = vec![
            ("cargo".to_string(), 5.0),
            ("build".to_string(), 3.0),
            ("test".to_string(), 2.0),
        ];
        let canvas = builder.render(&words, &font).unwrap();
        assert_eq!(canvas.dimensions(), (200, 200));

        // Everything outside the free square must stay background white
        for (x, y, pixel) in canvas.enumerate_pixels() {
            let inside = (50..150).contains(&x) && (50..150).contains(&y);
            if !inside {
                assert_eq!(*pixel, Rgba([255, 255, 255, 255]), "ink at ({x}, {y})");
            }
        }
        // And something must have been drawn inside it
        let drawn = canvas
            .enumerate_pixels()
            .any(|(_, _, p)| *p != Rgba([255, 255, 255, 255]));
        assert!(drawn);
    }
}
