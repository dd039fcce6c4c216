use argh::FromArgs;
use image::{ImageFormat, RgbImage, RgbaImage};
use qoi::{
    consts::{QOI_LINEAR, QOI_SRGB},
    utils::pixels_from_bytes,
    Channels, HeaderInfo, QoiDecodeContext, QoiEncodeContext, Rgba8,
};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    str::FromStr,
};
use tracing::{debug, info};

/// QOI cli encoder and decoder.
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Encode(Encode),
    Decode(Decode),
}

/// Decodes a QOI image.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode")]
struct Decode {
    /// output format (png, jpg, bmp)
    #[argh(option)]
    format: Format,

    /// the QOI input file
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Png,
    Jpg,
    Bmp,
}

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(format) = s.eq_ignore_ascii_case("png").then_some(Format::Png)
               .or_else(|| s.eq_ignore_ascii_case("jpg").then_some(Format::Jpg))
               .or_else(|| s.eq_ignore_ascii_case("bmp").then_some(Format::Bmp))
        else { return Err("invalid format, expected png, jpg or bmp"); };

        Ok(format)
    }
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Jpg => ImageFormat::Jpeg,
            Format::Bmp => ImageFormat::Bmp,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Colorspace(u8);

impl FromStr for Colorspace {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("srgb") {
            Ok(Colorspace(QOI_SRGB))
        } else if s.eq_ignore_ascii_case("linear") {
            Ok(Colorspace(QOI_LINEAR))
        } else {
            Err("invalid colorspace, expected srgb or linear")
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qoi_cli=info".parse()?),
        )
        .init();

    let Cli { command } = argh::from_env();

    match command {
        Command::Encode(options) => encode(options),
        Command::Decode(options) => decode(options),
    }
}

/// Encodes an image as QOI.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode")]
struct Encode {
    /// input format, optional (png, jpg, bmp)
    #[argh(option)]
    format: Option<Format>,

    /// colorspace stored in the header (srgb, linear), defaults to srgb
    #[argh(option, default = "Colorspace(QOI_SRGB)")]
    colorspace: Colorspace,

    /// the input file. Without --format, the format is guessed from its contents.
    #[argh(positional)]
    input: String,
    /// the QOI output file
    #[argh(positional)]
    output: String,
}

fn encode(options: Encode) -> Result<(), Box<dyn std::error::Error>> {
    let Encode {
        format,
        colorspace,
        input,
        output,
    } = options;

    let image = match format {
        Some(format) => {
            image::io::Reader::with_format(BufReader::new(File::open(&input)?), format.into())
                .decode()?
        }
        None => image::io::Reader::open(&input)?
            .with_guessed_format()?
            .decode()?,
    };

    let (width, height) = (image.width(), image.height());
    let (channels, raw) = if image.color().has_alpha() {
        (Channels::Rgba, image.into_rgba8().into_raw())
    } else {
        (Channels::Rgb, image.into_rgb8().into_raw())
    };
    let header = HeaderInfo {
        width,
        height,
        channels,
        colorspace: colorspace.0,
    };

    info!(width, height, ?channels, "Encoding `{input}`");

    let pixels = pixels_from_bytes(channels, &raw)?.collect::<Vec<_>>();

    let mut w = BufWriter::new(File::create(&output)?);
    QoiEncodeContext::encode(&header, &pixels, &mut w)?;
    w.flush()?;

    let written = std::fs::metadata(&output)?.len();
    info!(bytes = written, "Written `{output}`");
    debug!(
        ratio = written as f64 / (pixels.len() * channels.bytes_per_pixel()).max(1) as f64,
        "compression ratio"
    );

    Ok(())
}

fn decode(options: Decode) -> Result<(), Box<dyn std::error::Error>> {
    let Decode {
        format,
        input,
        output,
    } = options;

    let qoi_input = std::fs::read(&input)?;

    info!(bytes = qoi_input.len(), "Decoding `{input}`");

    let (header, pixels) = QoiDecodeContext::decode_to_vec::<Rgba8>(&qoi_input)?;
    let HeaderInfo {
        width,
        height,
        channels,
        colorspace,
    } = header;
    debug!(?channels, colorspace, "header");

    match channels {
        Channels::Rgba => RgbaImage::from_vec(width, height, pixels.concat())
            .ok_or("failed to create image")?
            .save_with_format(&output, format.into())?,
        Channels::Rgb => {
            let rgb = pixels
                .iter()
                .flat_map(|&[r, g, b, _]| [r, g, b])
                .collect::<Vec<_>>();
            RgbImage::from_vec(width, height, rgb)
                .ok_or("failed to create image")?
                .save_with_format(&output, format.into())?
        }
    }

    info!(width, height, "Written `{output}`");

    Ok(())
}
