//! Error types for LetraTag printer operations.
//!
//! This module defines all possible errors that can occur while building a
//! label image, encoding it for the printer and talking to the device.

use crate::printer::SessionState;
use thiserror::Error;

/// Main error type for LetraTag printer operations.
///
/// This enum encompasses all possible errors, from invalid canvas
/// coordinates up to transport failures reported by the wireless link.
#[derive(Error, Debug)]
pub enum Error {
    /// Pixel coordinate outside of the canvas limits.
    ///
    /// The canvas is fixed to 32 pixels in height and can't grow past
    /// `MAX_WIDTH` pixels in width.
    #[error("Pixel ({x}, {y}) is out of canvas bounds")]
    OutOfBounds { x: usize, y: usize },

    /// Transform would make the canvas wider than `MAX_WIDTH`.
    #[error("Canvas can't be {width} pixels wide")]
    CanvasTooWide { width: usize },

    #[error("Stretch factor must be at least 1, got {0}")]
    InvalidStretchFactor(usize),

    /// Source image is shorter than the print head.
    ///
    /// Images are never scaled up, so anything below the canvas height is
    /// rejected.
    #[error("Image is too small ({height} pixels high), resizing is not supported")]
    ImageTooSmall { height: usize },

    #[error("Image is too large ({width} pixels wide), resizing is not supported")]
    ImageTooLarge { width: usize },

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    /// Print data needs more chunks than the one byte chunk index can number.
    #[error("Print payload of {0} bytes is too large")]
    PayloadTooLarge(usize),

    /// Reply from the printer is too short or doesn't start with `ESC R`.
    #[error("Malformed reply from printer: {0:X?}")]
    MalformedReply(Vec<u8>),

    /// Reply carried a result code that isn't known.
    #[error("Unrecognized result code {0}")]
    UnrecognizedResult(u8),

    /// Failure reported by the underlying transport.
    ///
    /// Transport errors are propagated as-is, nothing is retried.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected session state: {0:?}")]
    UnexpectedState(SessionState),

    /// The subscription went away before the printer sent its final reply.
    #[error("Reply channel closed before the print result was received")]
    ReplyChannelClosed,
}
