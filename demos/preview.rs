use image::{imageops, GrayImage, Luma};
use letratag::{command_print, Canvas, Config, HEIGHT};
use qrcode::QrCode;
use std::env;

//
// cargo run --example preview label.png
// cargo run --example preview qr:12345 large
//

#[derive(Debug, PartialEq)]
enum Source {
    File(String),
    QrCode(String),
}

impl Source {
    fn from_str(s: &str) -> Self {
        match s.strip_prefix("qr:") {
            Some(text) => Self::QrCode(text.to_string()),
            None => Self::File(s.to_string()),
        }
    }
}

fn print_usage() {
    println!("Usage: cargo run --example preview SOURCE [large]");
    println!("Sources:");
    println!("  IMAGE      Image file, at least 32 pixels high");
    println!("  qr:TEXT    QR code holding TEXT");
    println!("\nThe preview uses quarter blocks unless 'large' is given.");
}

fn render(source: &Source) -> Result<Canvas, Box<dyn std::error::Error>> {
    match source {
        Source::File(path) => {
            let image = image::open(path)?.to_luma8();
            Ok(Config::new().render(&image)?)
        }
        Source::QrCode(text) => {
            let code: GrayImage = QrCode::new(text.as_bytes())?
                .render::<Luma<u8>>()
                .quiet_zone(false)
                .max_dimensions(HEIGHT as u32, HEIGHT as u32)
                .build();

            let mut label = GrayImage::from_pixel(code.width(), HEIGHT as u32, Luma([255]));
            let top = (HEIGHT as u32).saturating_sub(code.height()) / 2;
            imageops::overlay(&mut label, &code, 0, top);

            let config = Config::new().dither(false).padding(4);
            Ok(config.render(&label)?)
        }
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }
    let source = Source::from_str(&args[1]);
    let large = args.get(2).map(|s| s == "large").unwrap_or(false);

    match render(&source) {
        Ok(canvas) => {
            println!("{}", canvas.text(!large, ' ', true));
            println!("Image size: {:?}", canvas.size());

            match command_print(&canvas) {
                Ok(payload) => {
                    let chunks: Vec<Vec<u8>> = payload.collect();
                    println!(
                        "Payload: {} chunks, {} bytes",
                        chunks.len(),
                        chunks.iter().map(|c| c.len()).sum::<usize>()
                    );
                }
                Err(err) => eprintln!("Error: {}", err),
            }
        }
        Err(err) => eprintln!("Error: {}", err),
    }
}
