//! RGB canvas with clipped rectangle outlines

use crate::{Result, Viewport};
use image::{ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// Black canvas of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbImage::new(width, height) }
    }

    pub fn for_viewport(viewport: Viewport) -> Self {
        Self::new(viewport.width, viewport.height)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Outline the rectangle with inclusive corners `(x0, y0)`-`(x1, y1)`.
    ///
    /// The stroke is centered on each edge: a stroke of 3 covers the edge
    /// pixel plus one on either side. Corners may be given in any order and
    /// anything outside the canvas is clipped.
    pub fn stroke_rect(&mut self, corners: (i64, i64, i64, i64), color: Rgb<u8>, stroke: u32) {
        if stroke == 0 {
            return;
        }
        let (x0, x1) = ordered(corners.0, corners.2);
        let (y0, y1) = ordered(corners.1, corners.3);
        let before = i64::from(stroke / 2);
        let after = i64::from(stroke) - 1 - before;

        // Corners can sit at the ends of i64 when a box is far off canvas.
        let lo = |v: i64| v.saturating_sub(before);
        let hi = |v: i64| v.saturating_add(after);

        // top, bottom, left, right
        self.fill_rect(lo(x0), lo(y0), hi(x1), hi(y0), color);
        self.fill_rect(lo(x0), lo(y1), hi(x1), hi(y1), color);
        self.fill_rect(lo(x0), lo(y0), hi(x0), hi(y1), color);
        self.fill_rect(lo(x1), lo(y0), hi(x1), hi(y1), color);
    }

    /// Fill the inclusive rectangle, clipped to the canvas.
    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));
        if w == 0 || h == 0 {
            return;
        }
        let (x0, x1) = (x0.max(0), x1.min(w - 1));
        let (y0, y1) = (y0.max(0), y1.min(h - 1));
        if x0 > x1 || y0 > y1 {
            return;
        }
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.image.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    /// Hex SHA-256 over the raw pixel buffer
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.image.as_raw()))
    }

    /// Encode by file extension (`png`, `jpg`/`jpeg`); anything else is written as JPEG.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = match ImageFormat::from_path(path) {
            Ok(ImageFormat::Png) => ImageFormat::Png,
            _ => ImageFormat::Jpeg,
        };
        self.image.save_with_format(path, format)?;
        Ok(())
    }
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
