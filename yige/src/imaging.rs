//! White border detection
//!
//! Photos picked for photography keepsakes often carry a white frame from
//! screenshots or scans. The frame is trimmed before the photo is placed in
//! a polaroid or slide mount so the artifact's own border is the only one.

use crate::error::{AppError, Result};
use serde::Serialize;

/// Region of an image, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// RGBA8 pixel buffer
pub struct RgbaImage<'a> {
    pixels: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> RgbaImage<'a> {
    pub fn new(pixels: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(AppError::Image(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }

        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    fn is_white(&self, x: u32, y: u32, threshold: u8) -> bool {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 3].iter().all(|&c| c >= threshold)
    }

    fn row_is_white(&self, y: u32, threshold: u8) -> bool {
        (0..self.width).all(|x| self.is_white(x, y, threshold))
    }

    fn column_is_white(&self, x: u32, top: u32, bottom: u32, threshold: u8) -> bool {
        (top..bottom).all(|y| self.is_white(x, y, threshold))
    }

    /// Bounds of the content inside a white border.
    ///
    /// A pixel is border white when each of R, G and B is at least
    /// `threshold`; alpha is ignored. An all-white image keeps its full bounds.
    pub fn content_bounds(&self, threshold: u8) -> CropRect {
        let full = CropRect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        };

        let Some(top) = (0..self.height).find(|&y| !self.row_is_white(y, threshold)) else {
            return full;
        };
        // A non-white row exists, so this scan always finds one
        let bottom = (top..self.height)
            .rev()
            .find(|&y| !self.row_is_white(y, threshold))
            .unwrap_or(top)
            + 1;

        let left = (0..self.width)
            .find(|&x| !self.column_is_white(x, top, bottom, threshold))
            .unwrap_or(0);
        let right = (left..self.width)
            .rev()
            .find(|&x| !self.column_is_white(x, top, bottom, threshold))
            .unwrap_or(left)
            + 1;

        CropRect {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Bounds of the content inside a white border of an RGBA8 buffer
pub fn white_border_bounds(pixels: &[u8], width: u32, height: u32, threshold: u8) -> Result<CropRect> {
    Ok(RgbaImage::new(pixels, width, height)?.content_bounds(threshold))
}
