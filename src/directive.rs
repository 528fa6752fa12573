//! Printer directives.
//!
//! Every directive is `ESC` followed by a single ASCII opcode and its
//! arguments. A job is a stream of directives wrapped into a payload.

use crate::{canvas::Canvas, error::Error, payload::Payload};

const ESC: u8 = 0x1B;

/// Job id sent with `START`. The printer only prints with this exact value,
/// anything else gives a short blank label.
pub const JOB_ID: [u8; 4] = [154, 2, 0, 0];

/// Commands accepted by the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Start,
    MediaType(u8),
    /// Never sent by the vendor app.
    PrintDensity(u8),
    PrintData {
        data: Vec<u8>,
        width: u32,
        height: u32,
        bits_per_pixel: u8,
        alignment: u8,
    },
    FormFeed,
    Status,
    End,
}

impl Directive {
    pub fn opcode(&self) -> u8 {
        match self {
            Self::Start => b's',
            Self::MediaType(_) => b'M',
            Self::PrintDensity(_) => b'C',
            Self::PrintData { .. } => b'D',
            Self::FormFeed => b'E',
            Self::Status => b'A',
            Self::End => b'Q',
        }
    }

    /// Appends the encoded directive to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.append(&mut [ESC, self.opcode()].to_vec());

        match self {
            Self::Start => buf.extend_from_slice(&JOB_ID),
            Self::MediaType(value) | Self::PrintDensity(value) => buf.push(*value),
            Self::PrintData {
                data,
                width,
                height,
                bits_per_pixel,
                alignment,
            } => {
                buf.append(&mut [*bits_per_pixel, *alignment].to_vec());
                buf.extend_from_slice(&width.to_le_bytes());
                buf.extend_from_slice(&height.to_le_bytes());
                buf.extend_from_slice(data);
            }
            Self::FormFeed | Self::Status | Self::End => {}
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

fn encode_all(directives: &[Directive]) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    for directive in directives {
        directive.encode(&mut buf);
    }
    buf
}

/// Builds the directive stream printing `canvas`.
pub fn print_directives(canvas: &Canvas) -> Vec<u8> {
    encode_all(&[
        Directive::Start,
        Directive::PrintData {
            data: canvas.get_image(),
            width: canvas.width() as u32,
            height: canvas.height() as u32,
            bits_per_pixel: 1,
            alignment: 2,
        },
        Directive::FormFeed,
        Directive::Status,
        Directive::End,
    ])
}

/// Creates the chunked print payload for `canvas`.
pub fn command_print(canvas: &Canvas) -> Result<Payload, Error> {
    Payload::new(print_directives(canvas), true)
}

/// Creates the single chunk payload selecting the cassette media type.
pub fn command_casette(media_type: u8) -> Result<Payload, Error> {
    Payload::new(
        encode_all(&[Directive::Start, Directive::MediaType(media_type), Directive::End]),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::MAX_WIDTH;
    use crate::payload::{CHUNK_SIZE, HEADER_LENGTH};

    #[test]
    fn fixed_directives() {
        assert_eq!(Directive::Start.to_bytes(), vec![0x1B, b's', 154, 2, 0, 0]);
        assert_eq!(Directive::MediaType(7).to_bytes(), vec![0x1B, b'M', 7]);
        assert_eq!(Directive::PrintDensity(3).to_bytes(), vec![0x1B, b'C', 3]);
        assert_eq!(Directive::FormFeed.to_bytes(), vec![0x1B, b'E']);
        assert_eq!(Directive::Status.to_bytes(), vec![0x1B, b'A']);
        assert_eq!(Directive::End.to_bytes(), vec![0x1B, b'Q']);
    }

    #[test]
    fn print_data() {
        let directive = Directive::PrintData {
            data: vec![0xAA, 0x55],
            width: 0x0102,
            height: 32,
            bits_per_pixel: 1,
            alignment: 2,
        };
        assert_eq!(
            directive.to_bytes(),
            vec![0x1B, b'D', 1, 2, 0x02, 0x01, 0, 0, 32, 0, 0, 0, 0xAA, 0x55]
        );
    }

    #[test]
    fn print_stream_embeds_image() {
        let mut canvas = Canvas::new();
        for x in 0..300 {
            canvas.set_pixel(x, x % 32, true).unwrap();
        }
        let image = canvas.get_image();
        let stream = print_directives(&canvas);

        assert_eq!(&stream[..6], &[0x1B, b's', 154, 2, 0, 0]);
        assert_eq!(&stream[6..10], &[0x1B, b'D', 1, 2]);
        assert_eq!(&stream[10..14], &300u32.to_le_bytes());
        assert_eq!(&stream[14..18], &32u32.to_le_bytes());
        assert_eq!(&stream[18..18 + image.len()], &image[..]);
        assert_eq!(
            &stream[18 + image.len()..],
            &[0x1B, b'E', 0x1B, b'A', 0x1B, b'Q']
        );
    }

    #[test]
    fn command_print_round_trip() {
        let mut canvas = Canvas::new();
        for x in 0..200 {
            canvas.set_pixel(x, (x * 7) % 32, true).unwrap();
        }

        let chunks: Vec<Vec<u8>> = command_print(&canvas).unwrap().collect();
        let last = chunks.len() - 1;
        let mut stream = Vec::new();
        for (i, chunk) in chunks.iter().enumerate().skip(1) {
            let end = if i == last { chunk.len() - 2 } else { chunk.len() };
            stream.extend_from_slice(&chunk[1..end]);
        }

        let image = canvas.get_image();
        assert_eq!(&stream[18..18 + image.len()], &image[..]);
    }

    #[test]
    fn widest_canvas_fits_payload() {
        let mut canvas = Canvas::new();
        canvas.set_pixel(MAX_WIDTH - 1, 0, true).unwrap();

        let indices: Vec<u8> = command_print(&canvas)
            .unwrap()
            .skip(1)
            .map(|chunk| chunk[0])
            .collect();
        let length = print_directives(&canvas).len();
        assert_eq!(indices.len(), (length + CHUNK_SIZE - 1) / CHUNK_SIZE);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn casette_is_single_chunk() {
        let chunks: Vec<Vec<u8>> = command_casette(1).unwrap().collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            &chunks[0][HEADER_LENGTH..],
            &[0x1B, b's', 154, 2, 0, 0, 0x1B, b'M', 1, 0x1B, b'Q']
        );
        assert_eq!(&chunks[0][4..8], &11u32.to_le_bytes());
    }
}
