use crate::{
    cache::ColorCache,
    consts::*,
    header::{HeaderError, HeaderInfo},
    ColorFormat, Pixel,
};
use snafu::{ensure, OptionExt, ResultExt, Snafu};

mod ops;
pub mod streaming_no_header;

#[cfg(feature = "alloc")]
mod alloc_api;
#[cfg(feature = "alloc")]
pub use alloc_api::*;

use ops::ChunkReader;

/// State of a single decoding pass.
#[derive(Debug, Clone, Copy)]
pub struct QoiDecodeContext {
    pub prev: Pixel,
    pub cache: ColorCache,
}

impl QoiDecodeContext {
    pub const fn new() -> Self {
        Self {
            prev: Pixel::rgb(0, 0, 0),
            cache: ColorCache::new(),
        }
    }
}

impl Default for QoiDecodeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum DecodeError {
    #[snafu(display("Unexpected end of input in the middle of a chunk"))]
    UnexpectedEof,
    #[snafu(display("Index chunk references color array slot {index}, which is still empty"))]
    UnresolvedIndex { index: u8 },
    #[snafu(display("Expected {expected} pixels, but the chunk stream describes {produced}"))]
    PixelCountMismatch { expected: usize, produced: usize },
    #[snafu(display("Output buffer can't hold {pixel_count} pixels"))]
    OutputTooSmall { pixel_count: usize },
    #[snafu(display("Missing or invalid end marker after the last chunk"))]
    InvalidEndMarker,
    #[snafu(display("Invalid header: {source}"))]
    InvalidHeader { source: HeaderError },
}

impl QoiDecodeContext {
    /// Decodes a complete image (header, chunks and end marker) into `output`.
    pub fn decode(data: &[u8], mut output: impl DecodeOutput) -> Result<HeaderInfo, DecodeError> {
        let header = HeaderInfo::parse(data).context(decode_error::InvalidHeaderSnafu)?;
        let pixel_count = header
            .pixel_count()
            .context(decode_error::InvalidHeaderSnafu)?;

        let data = &data[QOI_HEADER_SIZE..];
        let consumed = QoiDecodeContext::new().decode_chunks(data, pixel_count, &mut output)?;

        ensure!(
            data[consumed..] == QOI_END_MARKER,
            decode_error::InvalidEndMarkerSnafu
        );

        Ok(header)
    }

    /// Decodes exactly `pixel_count` pixels from a bare chunk stream.
    ///
    /// Returns the number of input bytes consumed. Any bytes after the chunk completing the image
    /// are left alone.
    pub fn decode_chunks(
        &mut self,
        data: &[u8],
        pixel_count: usize,
        output: &mut impl DecodeOutput,
    ) -> Result<usize, DecodeError> {
        ensure!(
            output.max_len().map_or(true, |max_len| max_len >= pixel_count),
            decode_error::OutputTooSmallSnafu { pixel_count }
        );

        let mut data = ChunkReader::new(data);
        let mut produced = 0;

        while produced < pixel_count {
            let byte = data.next().context(decode_error::PixelCountMismatchSnafu {
                expected: pixel_count,
                produced,
            })?;
            let mut next = || data.next().context(decode_error::UnexpectedEofSnafu);

            // The 8-bit tags take precedence over the 2-bit tags they overlap with.
            let pixel = match byte {
                QOI_OP_RGB => Pixel::new(next()?, next()?, next()?, self.prev.a),
                QOI_OP_RGBA => Pixel::new(next()?, next()?, next()?, next()?),
                _ => match byte & QOI_MASK_2 {
                    QOI_OP_INDEX => self
                        .cache
                        .get(byte)
                        .context(decode_error::UnresolvedIndexSnafu { index: byte })?,
                    QOI_OP_DIFF => ops::small_diff(self.prev, byte),
                    QOI_OP_LUMA => ops::luma(self.prev, byte, next()?),
                    _ => {
                        let count = ops::run_length(byte);
                        ensure!(
                            produced + count <= pixel_count,
                            decode_error::PixelCountMismatchSnafu {
                                expected: pixel_count,
                                produced: produced + count,
                            }
                        );

                        // Only matters for a run right at the start, repeating the seed pixel.
                        self.cache.insert(self.prev);
                        output.write_many_pixels(self.prev, count);
                        produced += count;
                        continue;
                    }
                },
            };

            self.cache.insert(pixel);
            self.prev = pixel;
            output.write_pixel(pixel);
            produced += 1;
        }

        Ok(data.position())
    }
}

pub trait DecodeOutput {
    fn write_pixel(&mut self, pixel: Pixel);
    fn write_many_pixels(&mut self, pixel: Pixel, count: usize);

    /// Returns the maximum number of pixels that can be written to the output buffer.
    ///
    /// `None` if the output buffer is unbounded.
    fn max_len(&self) -> Option<usize>;
    fn current_output_position(&self) -> usize;
}

impl<T: DecodeOutput + ?Sized> DecodeOutput for &mut T {
    #[inline]
    fn write_pixel(&mut self, pixel: Pixel) {
        (**self).write_pixel(pixel)
    }

    #[inline]
    fn write_many_pixels(&mut self, pixel: Pixel, count: usize) {
        (**self).write_many_pixels(pixel, count)
    }

    #[inline]
    fn max_len(&self) -> Option<usize> {
        (**self).max_len()
    }

    #[inline]
    fn current_output_position(&self) -> usize {
        (**self).current_output_position()
    }
}

/// Writes decoded pixels into a fixed-size slice.
pub struct SliceDecodeOutput<'a, C: ColorFormat> {
    output: &'a mut [C::OutputElement],
    output_idx: usize,
}

impl<'a, C> SliceDecodeOutput<'a, C>
where
    C: ColorFormat,
{
    #[inline]
    pub fn new(slice: &'a mut [C::OutputElement]) -> Self {
        Self {
            output: slice,
            output_idx: 0,
        }
    }
}

impl<C> DecodeOutput for SliceDecodeOutput<'_, C>
where
    C: ColorFormat,
{
    #[inline]
    fn write_pixel(&mut self, pixel: Pixel) {
        self.output[self.output_idx] = C::to_output(pixel);
        self.output_idx += 1;
    }

    #[inline]
    fn write_many_pixels(&mut self, pixel: Pixel, count: usize) {
        let end = self.output_idx + count;
        self.output[self.output_idx..end].fill(C::to_output(pixel));
        self.output_idx = end;
    }

    #[inline]
    fn max_len(&self) -> Option<usize> {
        Some(self.output.len())
    }

    #[inline]
    fn current_output_position(&self) -> usize {
        self.output_idx
    }
}
