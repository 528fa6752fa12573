//! Bit-packed monochrome label image.
//!
//! The print head of the LetraTag is 32 dots high, so the image is stored
//! column by column, each column taking 4 bytes. Inside a column the bytes run
//! bottom band first, and the most significant bit of each byte is the top row
//! of its 8 row band.

use std::fmt;

use crate::error::Error;

/// Bytes used by a single column of pixels.
pub const BYTES_PER_LINE: usize = 4;

/// Maximum count of bytes that the image can extend into the growing direction.
pub const MAX_LENGTH: usize = 1024;

/// Fixed height of the canvas in pixels.
pub const HEIGHT: usize = BYTES_PER_LINE * 8;

/// Maximum width of the canvas in pixels.
pub const MAX_WIDTH: usize = MAX_LENGTH * 8;

/// Monochrome image in the printer's native column-major layout.
///
/// The canvas starts empty and grows while pixels are set at increasing
/// columns. Transforms (`stretch`, `fill`, `pad`, `revert`) always return a
/// new canvas and leave `self` untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Canvas {
    buffer: Vec<u8>,
}

impl Canvas {
    pub fn new() -> Self {
        Canvas { buffer: Vec::new() }
    }

    /// Gets the pixel in given coordinates.
    ///
    /// Returns `true` if the pixel is filled (black). Pixels past the current
    /// width read as blank and don't grow the canvas.
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<bool, Error> {
        check_bounds(x, y)?;
        Ok(self.pixel(x, y))
    }

    /// Sets the pixel in given coordinates, `true` paints it black.
    ///
    /// Writing past the current width appends blank columns up to and
    /// including column `x`, whatever the colour is.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: bool) -> Result<(), Error> {
        check_bounds(x, y)?;

        let (index, mask) = locate(x, y);
        if index >= self.buffer.len() {
            self.buffer.resize((x + 1) * BYTES_PER_LINE, 0x00);
        }
        if color {
            self.buffer[index] |= mask;
        } else {
            self.buffer[index] &= !mask;
        }
        Ok(())
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> usize {
        (self.buffer.len() + BYTES_PER_LINE - 1) / BYTES_PER_LINE
    }

    /// Height of the image in pixels, always `HEIGHT`.
    pub fn height(&self) -> usize {
        HEIGHT
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Length of the image in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Gets the packed image, padded with blank bytes to a whole column.
    pub fn get_image(&self) -> Vec<u8> {
        let mut image = self.buffer.clone();
        image.resize(self.width() * BYTES_PER_LINE, 0x00);
        image
    }

    /// Makes all pixels blank (white). The size of the canvas doesn't change.
    pub fn empty(&mut self) {
        self.buffer.iter_mut().for_each(|b| *b = 0x00);
    }

    /// Drops the whole image, the width becomes 0.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Stretches the image `factor` times along the growing direction.
    ///
    /// Every column is repeated `factor` times in place, so factor 1 gives an
    /// identical image. The result can't be wider than `MAX_WIDTH`.
    pub fn stretch(&self, factor: usize) -> Result<Canvas, Error> {
        if factor < 1 {
            return Err(Error::InvalidStretchFactor(factor));
        }
        let width = self.width().checked_mul(factor);
        check_width(width, self.width().saturating_mul(factor))?;

        let image = self.get_image();
        let mut buffer = Vec::with_capacity(image.len() * factor);
        for column in image.chunks(BYTES_PER_LINE) {
            for _ in 0..factor {
                buffer.extend_from_slice(column);
            }
        }
        Ok(Canvas { buffer })
    }

    /// Returns a new canvas with blank columns added to both sides.
    pub fn fill(&self, to_left: usize, to_right: usize) -> Result<Canvas, Error> {
        let width = self
            .width()
            .checked_add(to_left)
            .and_then(|w| w.checked_add(to_right));
        check_width(
            width,
            self.width().saturating_add(to_left).saturating_add(to_right),
        )?;

        let mut buffer = vec![0x00; to_left * BYTES_PER_LINE];
        buffer.append(&mut self.get_image());
        buffer.resize(buffer.len() + to_right * BYTES_PER_LINE, 0x00);
        Ok(Canvas { buffer })
    }

    /// Centers the image by adding blank columns on both sides until it is at
    /// least `until` pixels wide.
    ///
    /// Both sides get the same amount of columns, so an odd difference ends up
    /// one column wider than asked. If the image is already wide enough, a copy
    /// is returned.
    pub fn pad(&self, until: usize) -> Result<Canvas, Error> {
        let width = self.width();
        if width >= until {
            return Ok(self.clone());
        }
        let side = (until - width + 1) / 2;
        self.fill(side, side)
    }

    /// Returns a new canvas with every pixel flipped.
    pub fn revert(&self) -> Canvas {
        Canvas {
            buffer: self.buffer.iter().map(|b| b ^ 0xFF).collect(),
        }
    }

    /// Renders the image with unicode block elements for terminal previews.
    ///
    /// With `in_quad` each 2x2 block of pixels becomes a single quarter block
    /// character, otherwise each pixel is a full block. Blank cells are drawn
    /// with `blank_char`. `frame` draws a box around the image.
    pub fn text(&self, in_quad: bool, blank_char: char, frame: bool) -> String {
        let width = self.width();
        let step = if in_quad { 2 } else { 1 };
        let frame_length = (width + step - 1) / step;

        let mut lines: Vec<String> = Vec::new();
        if frame && frame_length > 0 {
            lines.push(border('\u{250C}', frame_length, '\u{2510}'));
        }

        for h in (0..HEIGHT).step_by(step) {
            let mut line = String::new();
            if frame {
                line.push('\u{2502}');
            }
            for w in (0..width).step_by(step) {
                let glyph = if in_quad {
                    let code = self.pixel(w, h) as u8
                        | (self.pixel(w + 1, h) as u8) << 1
                        | (self.pixel(w, h + 1) as u8) << 2
                        | (self.pixel(w + 1, h + 1) as u8) << 3;
                    QUARTETS[code as usize]
                } else if self.pixel(w, h) {
                    Some('\u{2588}')
                } else {
                    None
                };
                line.push(glyph.unwrap_or(blank_char));
            }
            if frame {
                line.push('\u{2502}');
            }
            lines.push(line);
        }

        if frame && frame_length > 0 {
            lines.push(border('\u{2514}', frame_length, '\u{2518}'));
        }
        lines.join("\n")
    }

    fn pixel(&self, x: usize, y: usize) -> bool {
        let (index, mask) = locate(x, y);
        self.buffer.get(index).map_or(false, |b| b & mask != 0)
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text(true, ' ', true))
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Canvas {{ size: {}x{}, length: {} }}",
            self.width(),
            self.height(),
            self.len()
        )
    }
}

// `width` is `None` when computing it overflowed, `reported` is the
// saturated value put in the error.
fn check_width(width: Option<usize>, reported: usize) -> Result<(), Error> {
    match width {
        Some(width) if width <= MAX_WIDTH => Ok(()),
        _ => Err(Error::CanvasTooWide { width: reported }),
    }
}

fn check_bounds(x: usize, y: usize) -> Result<(), Error> {
    if y >= HEIGHT || x >= MAX_WIDTH {
        return Err(Error::OutOfBounds { x, y });
    }
    Ok(())
}

// Byte index in the buffer and bit mask of a pixel.
fn locate(x: usize, y: usize) -> (usize, u8) {
    let index = x * BYTES_PER_LINE + (BYTES_PER_LINE - 1 - y / 8);
    (index, 1 << (7 - y % 8))
}

fn border(left: char, length: usize, right: char) -> String {
    let mut line = String::with_capacity((length + 2) * 3);
    line.push(left);
    line.extend(std::iter::repeat('\u{2500}').take(length));
    line.push(right);
    line
}

// https://en.wikipedia.org/wiki/Block_Elements
const QUARTETS: [Option<char>; 16] = [
    None,
    Some('\u{2598}'),
    Some('\u{259D}'),
    Some('\u{2580}'),
    Some('\u{2596}'),
    Some('\u{258C}'),
    Some('\u{259E}'),
    Some('\u{259B}'),
    Some('\u{2597}'),
    Some('\u{259A}'),
    Some('\u{2590}'),
    Some('\u{259C}'),
    Some('\u{2584}'),
    Some('\u{2599}'),
    Some('\u{259F}'),
    Some('\u{2588}'),
];

/// Gets the block element for a 4 bit corner code.
///
/// Bits are top left (`1 << 0`), top right (`1 << 1`), bottom left (`1 << 2`)
/// and bottom right (`1 << 3`). Code 0 has no glyph and gives `None`.
pub fn quartet_to_char(code: u8) -> Result<Option<char>, Error> {
    QUARTETS
        .get(code as usize)
        .copied()
        .ok_or_else(|| Error::InvalidImage(format!("Invalid quartet code {:#X}", code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Canvas {
        let mut canvas = Canvas::new();
        for (x, y) in [(0, 0), (1, 7), (1, 8), (2, 31), (4, 15), (4, 16)] {
            canvas.set_pixel(x, y, true).unwrap();
        }
        canvas
    }

    #[test]
    fn set_then_get_pixel() {
        let mut canvas = Canvas::new();
        assert!(!canvas.get_pixel(3, 5).unwrap());

        canvas.set_pixel(3, 5, true).unwrap();
        assert!(canvas.get_pixel(3, 5).unwrap());
        assert!(!canvas.get_pixel(3, 6).unwrap());

        canvas.set_pixel(3, 5, false).unwrap();
        assert!(!canvas.get_pixel(3, 5).unwrap());
        assert_eq!(canvas.width(), 4);
    }

    #[test]
    fn pixel_addressing() {
        let mut canvas = Canvas::new();
        canvas.set_pixel(0, 0, true).unwrap();
        assert_eq!(canvas.get_image(), vec![0x00, 0x00, 0x00, 0x80]);

        canvas.set_pixel(0, 31, true).unwrap();
        assert_eq!(canvas.get_image(), vec![0x01, 0x00, 0x00, 0x80]);

        canvas.set_pixel(1, 9, true).unwrap();
        assert_eq!(
            canvas.get_image(),
            vec![0x01, 0x00, 0x00, 0x80, 0x00, 0x00, 0x40, 0x00]
        );
    }

    #[test]
    fn reads_do_not_grow() {
        let canvas = Canvas::new();
        assert!(!canvas.get_pixel(100, 0).unwrap());
        assert_eq!(canvas.width(), 0);
        assert!(canvas.is_empty());
    }

    #[test]
    fn blank_write_grows() {
        let mut canvas = Canvas::new();
        canvas.set_pixel(9, 3, false).unwrap();
        assert_eq!(canvas.width(), 10);
        assert_eq!(canvas.len(), 40);
        assert!(canvas.get_image().iter().all(|b| *b == 0));
    }

    #[test]
    fn out_of_bounds() {
        let mut canvas = Canvas::new();
        assert!(matches!(
            canvas.get_pixel(0, HEIGHT),
            Err(Error::OutOfBounds { x: 0, y: 32 })
        ));
        assert!(matches!(
            canvas.set_pixel(MAX_WIDTH, 0, true),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(canvas.is_empty());

        canvas.set_pixel(MAX_WIDTH - 1, HEIGHT - 1, true).unwrap();
        assert_eq!(canvas.width(), MAX_WIDTH);
    }

    #[test]
    fn double_revert() {
        let canvas = sample();
        let reverted = canvas.revert();
        assert_ne!(reverted, canvas);
        assert!(!reverted.get_pixel(0, 0).unwrap());
        assert!(reverted.get_pixel(0, 1).unwrap());
        assert_eq!(reverted.revert(), canvas);
    }

    #[test]
    fn stretch() {
        let canvas = sample();
        assert_eq!(canvas.stretch(1).unwrap(), canvas);

        let stretched = canvas.stretch(3).unwrap();
        assert_eq!(stretched.width(), canvas.width() * 3);
        for x in 0..canvas.width() {
            for y in 0..HEIGHT {
                let pixel = canvas.get_pixel(x, y).unwrap();
                for i in 0..3 {
                    assert_eq!(stretched.get_pixel(x * 3 + i, y).unwrap(), pixel);
                }
            }
        }

        assert!(matches!(
            canvas.stretch(0),
            Err(Error::InvalidStretchFactor(0))
        ));
    }

    #[test]
    fn stretch_past_max_width() {
        let mut canvas = Canvas::new();
        canvas.set_pixel(MAX_WIDTH - 1, 0, true).unwrap();

        assert_eq!(canvas.stretch(1).unwrap().width(), MAX_WIDTH);
        assert!(matches!(
            canvas.stretch(4),
            Err(Error::CanvasTooWide { width }) if width == MAX_WIDTH * 4
        ));

        let mut narrow = Canvas::new();
        narrow.set_pixel(0, 0, true).unwrap();
        assert_eq!(narrow.stretch(MAX_WIDTH).unwrap().width(), MAX_WIDTH);
        assert!(matches!(
            narrow.stretch(usize::MAX / 2),
            Err(Error::CanvasTooWide { .. })
        ));
        assert!(matches!(
            sample().stretch(usize::MAX),
            Err(Error::CanvasTooWide { width: usize::MAX })
        ));
    }

    #[test]
    fn fill_and_pad() {
        let canvas = sample();
        assert_eq!(canvas.fill(0, 0).unwrap(), canvas);
        assert_eq!(canvas.pad(canvas.width()).unwrap(), canvas);
        assert_eq!(canvas.pad(1).unwrap(), canvas);

        let filled = canvas.fill(2, 3).unwrap();
        assert_eq!(filled.width(), canvas.width() + 5);
        assert!(filled.get_pixel(2, 0).unwrap());
        assert!(!filled.get_pixel(0, 0).unwrap());

        // 5 columns padded to 10 gives 3 columns each side.
        let padded = canvas.pad(10).unwrap();
        assert_eq!(padded.width(), 11);
        assert_eq!(padded, canvas.fill(3, 3).unwrap());
    }

    #[test]
    fn fill_and_pad_past_max_width() {
        let canvas = sample();
        let side = (MAX_WIDTH - canvas.width()) / 2;
        assert!(canvas.fill(side, side).unwrap().width() <= MAX_WIDTH);

        assert!(matches!(
            canvas.fill(MAX_WIDTH, 0),
            Err(Error::CanvasTooWide { .. })
        ));
        assert!(matches!(
            canvas.fill(usize::MAX, usize::MAX),
            Err(Error::CanvasTooWide { width: usize::MAX })
        ));
        // An odd difference rounds both sides up past the limit.
        assert!(matches!(
            canvas.pad(MAX_WIDTH),
            Err(Error::CanvasTooWide { width }) if width == MAX_WIDTH + 1
        ));
        assert_eq!(canvas.pad(MAX_WIDTH - 1).unwrap().width(), MAX_WIDTH - 1);
    }

    #[test]
    fn empty_and_clear() {
        let mut canvas = sample();
        let width = canvas.width();

        canvas.empty();
        assert_eq!(canvas.width(), width);
        assert!(!canvas.get_pixel(0, 0).unwrap());

        canvas.clear();
        assert_eq!(canvas.width(), 0);
        assert_eq!(canvas, Canvas::new());
    }

    #[test]
    fn text_full_blocks() {
        let mut canvas = Canvas::new();
        canvas.set_pixel(0, 0, true).unwrap();
        canvas.set_pixel(1, 1, true).unwrap();

        let text = canvas.text(false, '.', false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), HEIGHT);
        assert_eq!(lines[0], "\u{2588}.");
        assert_eq!(lines[1], ".\u{2588}");
        assert_eq!(lines[2], "..");
    }

    #[test]
    fn text_quad_with_frame() {
        let mut canvas = Canvas::new();
        canvas.set_pixel(0, 0, true).unwrap();
        canvas.set_pixel(1, 1, true).unwrap();
        canvas.set_pixel(2, 0, true).unwrap();

        let text = canvas.text(true, ' ', true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), HEIGHT / 2 + 2);
        assert_eq!(lines[0], "\u{250C}\u{2500}\u{2500}\u{2510}");
        assert_eq!(lines[1], "\u{2502}\u{259A}\u{2598}\u{2502}");
        assert_eq!(lines[2], "\u{2502}  \u{2502}");
        assert_eq!(lines[17], "\u{2514}\u{2500}\u{2500}\u{2518}");
        assert_eq!(canvas.to_string(), text);
    }

    #[test]
    fn quartets() {
        assert_eq!(quartet_to_char(0x0).unwrap(), None);
        assert_eq!(quartet_to_char(0x5).unwrap(), Some('\u{258C}'));
        assert_eq!(quartet_to_char(0xF).unwrap(), Some('\u{2588}'));
        assert!(quartet_to_char(0x10).is_err());
    }

    #[test]
    fn debug_format() {
        assert_eq!(
            format!("{:?}", sample()),
            "Canvas { size: 5x32, length: 20 }"
        );
    }
}
