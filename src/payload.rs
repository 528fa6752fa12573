//! Transport envelope of directive streams.
//!
//! Every payload starts with a 9 byte header:
//!
//! ```text
//! FF F0 12 34 <length: u32 le> <checksum>
//! ```
//!
//! Print payloads are then sent in chunks of at most 500 bytes of data, each
//! prefixed with its index; the last one ends with the magic bytes again.

use log::debug;

use crate::error::Error;

const PREAMBLE: u8 = 0xFF;
const FLAGS: u8 = 0xF0;
const MAGIC: [u8; 2] = [0x12, 0x34];

/// Length of the payload header in bytes.
pub const HEADER_LENGTH: usize = 9;

/// Maximum data bytes carried by a single print chunk.
pub const CHUNK_SIZE: usize = 500;

/// Builds the payload header for `length` bytes of data.
pub fn header(length: usize) -> [u8; HEADER_LENGTH] {
    let mut header = [0x00; HEADER_LENGTH];
    header[0] = PREAMBLE;
    header[1] = FLAGS;
    header[2..4].copy_from_slice(&MAGIC);
    header[4..8].copy_from_slice(&(length as u32).to_le_bytes());
    header[8] = header[..8].iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
    header
}

/// Maximum count of data chunks in a print payload.
pub const MAX_CHUNKS: usize = 255;

/// Index byte of the `n`th data chunk, `None` past the last one a byte holds.
///
/// The vendor app never sends index 27 and jumps straight to 28, the printer
/// expects the same.
pub fn chunk_index(n: usize) -> Option<u8> {
    let index = if n >= 27 { n.checked_add(1)? } else { n };
    u8::try_from(index).ok()
}

/// Lazy sequence of chunks to write to the printer, in order.
///
/// Each item is the content of a single write transaction.
#[derive(Debug)]
pub struct Payload {
    data: Vec<u8>,
    is_print: bool,
    header_sent: bool,
    offset: usize,
    index: usize,
}

impl Payload {
    /// Wraps `data`, print payloads must fit in `MAX_CHUNKS` chunks.
    pub fn new(data: Vec<u8>, is_print: bool) -> Result<Self, Error> {
        if data.len() > u32::MAX as usize || (is_print && data.len() > MAX_CHUNKS * CHUNK_SIZE) {
            return Err(Error::PayloadTooLarge(data.len()));
        }

        Ok(Payload {
            data,
            is_print,
            header_sent: false,
            offset: 0,
            index: 0,
        })
    }
}

impl Iterator for Payload {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.header_sent {
            self.header_sent = true;
            let mut chunk = header(self.data.len()).to_vec();
            debug!("Payload header: {:X?}", chunk);
            if !self.is_print {
                chunk.append(&mut self.data);
            }
            return Some(chunk);
        }

        if !self.is_print || self.offset >= self.data.len() {
            return None;
        }

        let end = usize::min(self.offset + CHUNK_SIZE, self.data.len());
        let mut chunk = Vec::with_capacity(1 + end - self.offset + MAGIC.len());
        chunk.push(chunk_index(self.index)?);
        chunk.extend_from_slice(&self.data[self.offset..end]);
        if end == self.data.len() {
            chunk.extend_from_slice(&MAGIC);
        }
        debug!(
            "Payload chunk {} with {} bytes",
            chunk[0],
            end - self.offset
        );

        self.offset = end;
        self.index += 1;
        Some(chunk)
    }
}

/// Creates the payload for a directive stream.
pub fn create_payload(data: Vec<u8>, is_print: bool) -> Result<Payload, Error> {
    Payload::new(data, is_print)
}
