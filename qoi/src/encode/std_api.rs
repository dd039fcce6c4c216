use crate::{
    consts::QOI_END_MARKER,
    encode::{dimensions_match, QoiEncodeContext},
    header::HeaderInfo,
    Pixel,
};
use snafu::{ensure, ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display(
        "Specified image dimensions don't match the number of pixels: {width}x{height} image, but {pixel_count} pixels were given"
    ))]
    InvalidDimensions {
        width: u32,
        height: u32,
        pixel_count: usize,
    },
    #[snafu(display("Failed to write encoded image"))]
    WriteIo { source: std::io::Error },
}

impl QoiEncodeContext {
    /// Encodes a complete image (header, chunks and end marker) into `w`.
    ///
    /// Chunks are written one at a time, so `w` should be buffered.
    pub fn encode<W: Write>(
        header: &HeaderInfo,
        pixels: &[Pixel],
        mut w: W,
    ) -> Result<(), EncodeError> {
        ensure!(
            dimensions_match(header, pixels.len()),
            InvalidDimensionsSnafu {
                width: header.width,
                height: header.height,
                pixel_count: pixels.len(),
            }
        );

        Self::encode_header(header, &mut w)?;
        Self::encode_pixels(pixels, &mut w)?;
        w.write_all(&QOI_END_MARKER).context(WriteIoSnafu)
    }

    pub fn encode_header<W: Write>(header: &HeaderInfo, mut w: W) -> Result<(), EncodeError> {
        w.write_all(&header.to_bytes()).context(WriteIoSnafu)
    }

    /// Encodes `pixels` as a bare chunk stream, without header or end marker.
    pub fn encode_pixels<W: Write>(pixels: &[Pixel], mut w: W) -> Result<(), EncodeError> {
        let mut ctx = QoiEncodeContext::new();
        let mut write =
            |bytes: &[u8]| -> Result<(), EncodeError> { w.write_all(bytes).context(WriteIoSnafu) };

        ctx.push_pixels_with(pixels, &mut write)?;
        ctx.finish_with(&mut write)
    }
}
