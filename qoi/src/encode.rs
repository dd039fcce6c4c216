use crate::{cache::ColorCache, consts::*, header::HeaderInfo, Pixel};
use alloc::vec::Vec;
use core::convert::Infallible;
use itertools::Itertools;
use snafu::{ensure, Snafu};

mod ops;

#[cfg(feature = "std")]
mod std_api;
#[cfg(feature = "std")]
pub use std_api::*;

/// State of a single encoding pass.
///
/// A fresh context is needed for every image. The `encode*` functions create one internally; use
/// [`push_pixels_with`](Self::push_pixels_with) and [`finish_with`](Self::finish_with) to drive a
/// pass manually.
#[derive(Debug, Clone, Copy)]
pub struct QoiEncodeContext {
    pub prev: Pixel,
    /// Whether `prev` is a pixel that was actually emitted, rather than the initial seed.
    pub started: bool,
    /// Number of pixels repeating `prev` that have not been emitted yet.
    pub run: usize,
    pub cache: ColorCache,
}

impl QoiEncodeContext {
    pub const fn new() -> Self {
        Self {
            prev: Pixel::rgb(0, 0, 0),
            started: false,
            run: 0,
            cache: ColorCache::new(),
        }
    }
}

impl Default for QoiEncodeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Snafu)]
pub enum EncodeToVecError {
    #[snafu(display(
        "Specified image dimensions don't match the number of pixels: {width}x{height} image, but {pixel_count} pixels were given"
    ))]
    InvalidDimensions {
        width: u32,
        height: u32,
        pixel_count: usize,
    },
}

pub(crate) fn dimensions_match(header: &HeaderInfo, pixel_count: usize) -> bool {
    header
        .pixel_count()
        .map_or(false, |expected| expected == pixel_count)
}

impl QoiEncodeContext {
    /// Encodes a complete image (header, chunks and end marker), appending it to `w`.
    pub fn encode_to_vec(
        header: &HeaderInfo,
        pixels: &[Pixel],
        w: &mut Vec<u8>,
    ) -> Result<(), EncodeToVecError> {
        ensure!(
            dimensions_match(header, pixels.len()),
            InvalidDimensionsSnafu {
                width: header.width,
                height: header.height,
                pixel_count: pixels.len(),
            }
        );

        w.reserve(QOI_HEADER_SIZE + pixels.len() + QOI_END_MARKER.len());
        w.extend_from_slice(&header.to_bytes());
        Self::encode_chunks_to_vec(pixels, w);
        w.extend_from_slice(&QOI_END_MARKER);

        Ok(())
    }

    /// Encodes `pixels` as a bare chunk stream, without header or end marker.
    pub fn encode_chunks_to_vec(pixels: &[Pixel], w: &mut Vec<u8>) {
        let mut ctx = QoiEncodeContext::new();
        let mut push = |bytes: &[u8]| {
            w.extend_from_slice(bytes);
            Ok::<_, Infallible>(())
        };

        let result = ctx
            .push_pixels_with(pixels, &mut push)
            .and_then(|()| ctx.finish_with(&mut push));
        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Feeds pixels into the pass, handing every completed chunk to `emit`.
    ///
    /// Consecutive identical pixels are held back as a pending run; call
    /// [`finish_with`](Self::finish_with) after the last pixel.
    pub fn push_pixels_with<E>(
        &mut self,
        pixels: &[Pixel],
        mut emit: impl FnMut(&[u8]) -> Result<(), E>,
    ) -> Result<(), E> {
        for (count, pixel) in pixels.iter().copied().dedup_with_count() {
            // The run also covers the group's first pixel if it continues the previous one.
            let repeats = if self.started && pixel == self.prev {
                count
            } else {
                self.flush_run_with(&mut emit)?;
                emit(self.encode_pixel(pixel).as_slice())?;
                count - 1
            };

            // Repeats of `pixel` can't change the color array, it has already seen `pixel`.
            self.run += repeats;
        }

        Ok(())
    }

    /// Emits the pending run, if any. The pass is complete afterwards.
    pub fn finish_with<E>(&mut self, mut emit: impl FnMut(&[u8]) -> Result<(), E>) -> Result<(), E> {
        self.flush_run_with(&mut emit)
    }

    fn flush_run_with<E>(
        &mut self,
        emit: &mut impl FnMut(&[u8]) -> Result<(), E>,
    ) -> Result<(), E> {
        let full_runs = self.run / QOI_MAX_RUN;
        let rest = self.run % QOI_MAX_RUN;
        self.run = 0;

        for _ in 0..full_runs {
            emit(ops::run(QOI_MAX_RUN).as_slice())?;
        }
        if rest > 0 {
            emit(ops::run(rest).as_slice())?;
        }

        Ok(())
    }

    /// Picks the first applicable chunk kind out of index, diff, luma, rgb and rgba, then offers
    /// the pixel to the color array.
    fn encode_pixel(&mut self, pixel: Pixel) -> ops::Chunk {
        let prev = self.prev;

        // Differences are only taken against pixels that are part of the image. The seed only
        // decides between rgb and rgba.
        let chunk = ops::index(&self.cache, pixel)
            .or_else(|| self.started.then(|| ops::small_diff(prev, pixel)).flatten())
            .or_else(|| self.started.then(|| ops::luma(prev, pixel)).flatten())
            .or_else(|| ops::rgb(prev, pixel))
            .unwrap_or_else(|| ops::rgba(pixel));

        self.cache.insert(pixel);
        self.prev = pixel;
        self.started = true;

        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(pixels: &[Pixel]) -> Vec<u8> {
        let mut v = Vec::new();
        QoiEncodeContext::encode_chunks_to_vec(pixels, &mut v);
        v
    }

    #[test]
    fn first_pixel_is_a_literal() {
        assert_eq!(chunks(&[Pixel::default()]), [QOI_OP_RGB, 0, 0, 0]);
        assert_eq!(
            chunks(&[Pixel::new(0, 0, 0, 0)]),
            [QOI_OP_RGBA, 0, 0, 0, 0]
        );
    }

    #[test]
    fn pending_run_survives_push_boundaries() {
        let pixel = Pixel::rgb(10, 20, 30);
        let mut ctx = QoiEncodeContext::new();
        let mut v = Vec::new();
        let mut push = |bytes: &[u8]| {
            v.extend_from_slice(bytes);
            Ok::<_, Infallible>(())
        };

        ctx.push_pixels_with(&[pixel; 3], &mut push).unwrap();
        ctx.push_pixels_with(&[pixel; 4], &mut push).unwrap();
        ctx.finish_with(&mut push).unwrap();

        assert_eq!(v, [QOI_OP_RGB, 10, 20, 30, QOI_OP_RUN | 5]);
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let header = HeaderInfo {
            width: 2,
            height: 2,
            channels: crate::Channels::Rgba,
            colorspace: QOI_SRGB,
        };
        let mut v = Vec::new();
        assert!(matches!(
            QoiEncodeContext::encode_to_vec(&header, &[Pixel::default(); 3], &mut v),
            Err(EncodeToVecError::InvalidDimensions { pixel_count: 3, .. })
        ));
        assert!(v.is_empty());
    }
}
