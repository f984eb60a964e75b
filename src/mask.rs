//! Mask construction: a white canvas with a centered logo pasted into it.
//!
//! The engine treats exact opaque white as unavailable canvas, so any
//! pure-white pixel inside the logo is nudged to (254,254,254) by default.
//! That keeps white logo regions (Tux's belly, white glyphs) part of the
//! placeable shape instead of merging them into the surrounding negative
//! space. `show_white` disables the substitution.

use crate::error::RenderError;
use image::{imageops, Rgba, RgbaImage};
use tiny_skia::Pixmap;
use tracing::debug;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const NEAR_WHITE: Rgba<u8> = Rgba([254, 254, 254, 255]);

/// Composes the cloud-generation mask for a given output resolution.
#[derive(Debug, Clone, Copy)]
pub struct MaskBuilder {
    width: u32,
    height: u32,
    show_white: bool,
}

impl MaskBuilder {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            show_white: false,
        }
    }

    /// Keep pure-white logo pixels white instead of substituting near-white.
    #[must_use]
    pub fn show_white(mut self, show: bool) -> Self {
        self.show_white = show;
        self
    }

    /// Side of the square the logo is rendered into: half the canvas height.
    #[must_use]
    pub fn logo_side(&self) -> u32 {
        (self.height / 2).max(1)
    }

    /// Build a mask from raw logo bytes, trying SVG first and falling back
    /// to raster decoding.
    ///
    /// # Errors
    /// Returns an error if the bytes are neither a parseable SVG nor a
    /// decodable raster image.
    pub fn build_from_bytes(&self, bytes: &[u8]) -> Result<RgbaImage, RenderError> {
        let opt = usvg::Options::default();
        if let Ok(tree) = usvg::Tree::from_data(bytes, &opt) {
            let logo = self.rasterize_svg(&tree)?;
            return Ok(self.build_from_image(logo));
        }

        let img = image::load_from_memory(bytes)
            .map_err(|e| RenderError::Image(format!("failed to decode logo: {e}")))?;
        Ok(self.build_from_image(img.to_rgba8()))
    }

    /// Build a mask from an already-decoded logo image.
    ///
    /// The logo is resized to a `logo_side()` square, optionally recolored,
    /// and pasted horizontally centered with its top edge at a quarter of the
    /// canvas height. Output dimensions always equal the requested
    /// resolution; oversized paste regions clip at the canvas edges.
    #[must_use]
    pub fn build_from_image(&self, logo: RgbaImage) -> RgbaImage {
        let side = self.logo_side();
        let mut logo = if logo.dimensions() == (side, side) {
            logo
        } else {
            // Nearest keeps mask pixel values exact through the resize
            imageops::resize(&logo, side, side, imageops::FilterType::Nearest)
        };

        if !self.show_white {
            for pixel in logo.pixels_mut() {
                if *pixel == WHITE {
                    *pixel = NEAR_WHITE;
                }
            }
        }

        let mut canvas = RgbaImage::from_pixel(self.width, self.height, WHITE);
        let x = (i64::from(self.width) - i64::from(side)) / 2;
        let y = i64::from(self.height) / 4;
        debug!("pasting {side}x{side} logo at ({x}, {y})");
        imageops::overlay(&mut canvas, &logo, x, y);
        canvas
    }

    fn rasterize_svg(&self, tree: &usvg::Tree) -> Result<RgbaImage, RenderError> {
        let side = self.logo_side();
        let size = tree.size();
        let mut pixmap = Pixmap::new(side, side)
            .ok_or_else(|| RenderError::Render("failed to allocate logo pixmap".into()))?;

        let transform = tiny_skia::Transform::from_scale(
            side as f32 / size.width(),
            side as f32 / size.height(),
        );
        resvg::render(tree, transform, &mut pixmap.as_mut());

        let mut logo = RgbaImage::new(side, side);
        for y in 0..side {
            for x in 0..side {
                if let Some(p) = pixmap.pixel(x, y) {
                    let c = p.demultiply();
                    logo.put_pixel(x, y, Rgba([c.red(), c.green(), c.blue(), c.alpha()]));
                }
            }
        }
        Ok(logo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logos;

    fn logo_with_white_patch() -> RgbaImage {
        let mut logo = RgbaImage::from_pixel(64, 64, Rgba([200, 30, 30, 255]));
        for y in 20..40 {
            for x in 20..40 {
                logo.put_pixel(x, y, WHITE);
            }
        }
        logo
    }

    #[test]
    fn test_mask_dimensions_match_resolution() {
        for (w, h) in [(1920, 1080), (640, 480), (301, 17), (100, 3)] {
            let mask = MaskBuilder::new(w, h).build_from_image(logo_with_white_patch());
            assert_eq!(mask.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_white_pixels_become_near_white() {
        let builder = MaskBuilder::new(400, 400);
        let mask = builder.build_from_image(logo_with_white_patch());

        let side = builder.logo_side();
        let x0 = (400 - side) / 2;
        let y0 = 400 / 4;
        let mut near_white = 0;
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                let p = mask.get_pixel(x, y);
                assert_ne!(*p, WHITE, "pure white left inside logo at ({x}, {y})");
                if *p == NEAR_WHITE {
                    near_white += 1;
                }
            }
        }
        assert!(near_white > 0, "white patch was not recolored");
    }

    #[test]
    fn test_show_white_keeps_white() {
        let mask = MaskBuilder::new(400, 400)
            .show_white(true)
            .build_from_image(logo_with_white_patch());
        let has_white_in_region = (100..300)
            .flat_map(|y| (100..300).map(move |x| (x, y)))
            .any(|(x, y)| *mask.get_pixel(x, y) == WHITE);
        assert!(has_white_in_region);
    }

    #[test]
    fn test_logo_without_white_is_untouched() {
        let logo = RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 255]));
        let builder = MaskBuilder::new(200, 200);
        let mask = builder.build_from_image(logo);
        let side = builder.logo_side();
        let x0 = (200 - side) / 2;
        let y0 = 200 / 4;
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                assert_eq!(*mask.get_pixel(x, y), Rgba([10, 20, 30, 255]));
            }
        }
    }

    #[test]
    fn test_builtin_svg_logo_renders() {
        let mask = MaskBuilder::new(640, 480)
            .build_from_bytes(logos::builtin("arch").unwrap())
            .unwrap();
        assert_eq!(mask.dimensions(), (640, 480));
        let occupied = mask.pixels().filter(|p| **p != WHITE).count();
        assert!(occupied > 0, "svg logo left no mark on the mask");
    }

    #[test]
    fn test_paste_clips_when_logo_exceeds_canvas() {
        // height/2 square is wider than the canvas; overlay must clip
        let mask = MaskBuilder::new(50, 400).build_from_image(logo_with_white_patch());
        assert_eq!(mask.dimensions(), (50, 400));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = MaskBuilder::new(100, 100).build_from_bytes(b"not an image");
        assert!(err.is_err());
    }
}
