//! Conversion from raster images into a `Canvas`.

use image::{imageops, GrayImage};
use log::debug;

use crate::{
    canvas::{Canvas, HEIGHT, MAX_WIDTH},
    error::Error,
};

/// Source of monochrome pixels.
pub trait Bitmap {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Returns `true` if the pixel should be printed.
    fn is_black(&self, x: usize, y: usize) -> bool;
}

/// Owned monochrome bitmap, row-major.
#[derive(Debug, Clone)]
pub struct MonoImage {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl MonoImage {
    /// Builds a bitmap from 8 bit luma values, any value below `threshold` is
    /// black.
    pub fn from_luma(
        width: usize,
        height: usize,
        bytes: &[u8],
        threshold: u8,
    ) -> Result<Self, Error> {
        if width.checked_mul(height) != Some(bytes.len()) {
            return Err(Error::InvalidImage(format!(
                "{} bytes doesn't match {}x{} pixels",
                bytes.len(),
                width,
                height
            )));
        }

        Ok(MonoImage {
            width,
            height,
            pixels: bytes.iter().map(|luma| *luma < threshold).collect(),
        })
    }

    /// Builds a bitmap from a grayscale image, either with Floyd-Steinberg
    /// dithering or with a plain threshold at the middle gray.
    pub fn from_gray(image: &GrayImage, dither: bool) -> Self {
        let mut gray = image.clone();
        if dither {
            imageops::dither(&mut gray, &imageops::BiLevel);
        }
        let (width, height) = gray.dimensions();

        MonoImage {
            width: width as usize,
            height: height as usize,
            pixels: gray.pixels().map(|p| p[0] < 128).collect(),
        }
    }
}

impl Bitmap for MonoImage {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn is_black(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }
}

// Rectangle of a bitmap as (left, top, width, height).
type Region = (usize, usize, usize, usize);

// Tightest box around the black pixels, `None` if there are none.
fn bounding_box(bitmap: &impl Bitmap) -> Option<Region> {
    let mut found: Option<(usize, usize, usize, usize)> = None;

    for y in 0..bitmap.height() {
        for x in 0..bitmap.width() {
            if bitmap.is_black(x, y) {
                found = Some(match found {
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    None => (x, y, x, y),
                });
            }
        }
    }

    found.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

impl Canvas {
    /// Converts a bitmap into a canvas.
    ///
    /// With `trim` the image is first cropped to the bounding box of its black
    /// pixels. Images taller than the canvas are cropped around the vertical
    /// center; shorter or too wide images are rejected since resizing is not
    /// supported.
    pub fn from_bitmap(bitmap: &impl Bitmap, trim: bool) -> Result<Canvas, Error> {
        let mut region = (0, 0, bitmap.width(), bitmap.height());
        if trim {
            if let Some(found) = bounding_box(bitmap) {
                region = found;
            }
        }
        let (left, mut top, width, mut height) = region;

        if height > HEIGHT {
            top += height / 2 - HEIGHT / 2;
            height = HEIGHT;
        } else if height < HEIGHT {
            return Err(Error::ImageTooSmall { height });
        }
        if width > MAX_WIDTH {
            return Err(Error::ImageTooLarge { width });
        }
        debug!(
            "Converting {}x{} region at ({}, {}) into canvas",
            width, height, left, top
        );

        let mut canvas = Canvas::new();
        for x in 0..width {
            for y in 0..height {
                canvas.set_pixel(x, y, bitmap.is_black(left + x, top + y))?;
            }
        }
        Ok(canvas)
    }
}
