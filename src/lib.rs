//! DYMO LetraTag Printer Protocol
//!
//! This crate implements the wire protocol of the DYMO LetraTag LT-200B
//! Bluetooth label printer: a 32 pixel high monochrome canvas, the printer
//! directives, the chunked payload framing and the decoding of the print
//! result. The Bluetooth link itself is provided through the `Transport`
//! trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use letratag::{Canvas, Config, Printer, Transport};
//!
//! async fn print_label<T: Transport>(transport: T) -> Result<(), letratag::Error> {
//!     let mut canvas = Canvas::new();
//!     for x in 0..64 {
//!         canvas.set_pixel(x, 16, true)?;
//!     }
//!
//!     let mut printer = Printer::new(transport);
//!     printer.connect().await?;
//!     let result = printer.print_with(&canvas, &Config::new()).await?;
//!     println!("Result: {}", result);
//!     printer.disconnect().await
//! }
//! ```

mod canvas;
mod directive;
mod error;
mod payload;
mod printer;
mod status;
mod utils;

pub use crate::{
    canvas::{quartet_to_char, Canvas, BYTES_PER_LINE, HEIGHT, MAX_LENGTH, MAX_WIDTH},
    directive::{command_casette, command_print, print_directives, Directive, JOB_ID},
    error::Error,
    payload::{
        chunk_index, create_payload, header, Payload, CHUNK_SIZE, HEADER_LENGTH, MAX_CHUNKS,
    },
    printer::{
        Config, Printer, ReplyHandler, SessionState, Transport, PRINT_REPLY_UUID,
        PRINT_REQUEST_UUID, SERVICE_UUID,
    },
    status::PrintResult,
    utils::{Bitmap, MonoImage},
};
