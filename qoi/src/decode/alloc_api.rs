use crate::{
    decode::{DecodeError, DecodeOutput, QoiDecodeContext},
    header::HeaderInfo,
    ColorFormat, Pixel,
};
use alloc::vec::Vec;
use snafu::{ensure, ResultExt, Snafu};

#[derive(Debug, Snafu)]
pub enum DecodeToVecError {
    #[snafu(display("Failed to allocate an output buffer for {pixel_count} pixels"))]
    AllocationFailed { pixel_count: usize },
    #[snafu(display("{source}"))]
    Decode { source: DecodeError },
}

/// Appends decoded pixels to a `Vec`.
pub struct VecDecodeOutput<'a, C: ColorFormat> {
    output: &'a mut Vec<C::OutputElement>,
    start: usize,
}

impl<'a, C> VecDecodeOutput<'a, C>
where
    C: ColorFormat,
{
    #[inline]
    pub fn new(output: &'a mut Vec<C::OutputElement>) -> Self {
        let start = output.len();
        Self {
            output,
            start,
        }
    }
}

impl<C> DecodeOutput for VecDecodeOutput<'_, C>
where
    C: ColorFormat,
{
    #[inline]
    fn write_pixel(&mut self, pixel: Pixel) {
        self.output.push(C::to_output(pixel));
    }

    #[inline]
    fn write_many_pixels(&mut self, pixel: Pixel, count: usize) {
        let new_len = self.output.len() + count;
        self.output.resize(new_len, C::to_output(pixel));
    }

    #[inline]
    fn max_len(&self) -> Option<usize> {
        None
    }

    #[inline]
    fn current_output_position(&self) -> usize {
        self.output.len() - self.start
    }
}

impl QoiDecodeContext {
    /// Decodes a complete image into a newly allocated `Vec`.
    ///
    /// The output buffer is allocated up front based on the header; allocation failure is reported
    /// instead of aborting.
    pub fn decode_to_vec<C: ColorFormat>(
        data: &[u8],
    ) -> Result<(HeaderInfo, Vec<C::OutputElement>), DecodeToVecError> {
        let header = HeaderInfo::parse(data)
            .context(super::decode_error::InvalidHeaderSnafu)
            .context(DecodeSnafu)?;
        let pixel_count = header
            .pixel_count()
            .context(super::decode_error::InvalidHeaderSnafu)
            .context(DecodeSnafu)?;

        let mut pixels = Vec::new();
        ensure!(
            pixels.try_reserve_exact(pixel_count).is_ok(),
            AllocationFailedSnafu { pixel_count }
        );

        Self::decode(data, VecDecodeOutput::<C>::new(&mut pixels)).context(DecodeSnafu)?;

        Ok((header, pixels))
    }
}
