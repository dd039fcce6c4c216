//! Encoder and decoder for the [QOI Image format](https://qoiformat.org/).
//!
//! QOI losslessly compresses a raster of RGBA pixels into a stream of variable-length chunks. Every
//! pixel is described relative to what came before it: either as a repetition of the previous
//! pixel, as a reference into a small table of recently seen colors, as a small or larger
//! difference to the previous pixel, or, failing all that, as a literal.
//!
//! # File layout
//!
//! - 14-byte header, see [`HeaderInfo`]
//!   - 4-byte magic: `qoif`
//!   - u32be width
//!   - u32be height
//!   - u8 channels (3 or 4, informational only)
//!   - u8 colorspace (passed through unchanged)
//! - chunk stream
//! - 8-byte end marker: `[0, 0, 0, 0, 0, 0, 0, 1]`
//!
//! The chunk stream has no explicit length. The decoder stops once `width * height` pixels have
//! been produced.
//!
//! ## Color array
//!
//! Encoder and decoder keep a 64-slot array of colors, addressed by
//! `(r * 3 + g * 5 + b * 7 + a * 11) % 64`. Every produced pixel is offered to the array, but a
//! slot is only filled once per pass: the first pixel hashing into an empty slot stays there. A
//! [`QOI_OP_INDEX`](consts::QOI_OP_INDEX) chunk referencing an empty slot is a decode error.
//!
//! Both sides start out from the pixel `{ r: 0, g: 0, b: 0, a: 255 }` as "previous" pixel.
//!
//! # Stream format
//!
//! See [consts] for the different operation types.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod cache;
pub mod decode;
#[cfg(feature = "alloc")]
pub mod encode;
pub mod header;
pub mod utils;

pub use cache::ColorCache;
pub use decode::QoiDecodeContext;
#[cfg(feature = "alloc")]
pub use encode::QoiEncodeContext;
pub use header::{Channels, HeaderInfo};

/// A single RGBA pixel, 8 bits per channel.
///
/// The default pixel is opaque black, which is also the "previous" pixel both encoder and decoder
/// start out with.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque pixel.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub const fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Pixel {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl From<[u8; 4]> for Pixel {
    #[inline]
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<[u8; 3]> for Pixel {
    #[inline]
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<Pixel> for [u8; 4] {
    #[inline]
    fn from(pixel: Pixel) -> Self {
        pixel.to_rgba()
    }
}

/// Pixel layout of decoded output.
pub trait ColorFormat {
    type OutputElement: Copy;

    fn to_output(pixel: Pixel) -> Self::OutputElement;
}

/// Decodes into `[r, g, b, a]` arrays.
pub struct Rgba8;
/// Decodes into `[r, g, b]` arrays, dropping alpha.
pub struct Rgb8;

impl ColorFormat for Rgba8 {
    type OutputElement = [u8; 4];

    #[inline]
    fn to_output(pixel: Pixel) -> Self::OutputElement {
        pixel.to_rgba()
    }
}

impl ColorFormat for Rgb8 {
    type OutputElement = [u8; 3];

    #[inline]
    fn to_output(pixel: Pixel) -> Self::OutputElement {
        pixel.to_rgb()
    }
}

impl ColorFormat for Pixel {
    type OutputElement = Pixel;

    #[inline]
    fn to_output(pixel: Pixel) -> Self::OutputElement {
        pixel
    }
}

pub mod consts {
    /// Re-emit a pixel from the color array.
    ///
    /// ```plain
    /// .- QOI_OP_INDEX ----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  0  0 |     index       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b00
    /// - 6-bit index into the color array: 0..63
    /// - The referenced slot must have been filled earlier in the stream.
    pub const QOI_OP_INDEX: u8 = 0b0000_0000;

    /// Calculate a pixel based on a 2-bit difference from the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_DIFF -----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----+-----+-----|
    /// |  0  1 |  dr |  dg |  db |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b01
    /// - 2-bit red channel difference from the previous pixel between -2..1, stored with a bias
    ///   of 2
    /// - 2-bit green channel difference from the previous pixel between -2..1, stored with a bias
    ///   of 2
    /// - 2-bit blue channel difference from the previous pixel between -2..1, stored with a bias
    ///   of 2
    ///
    /// Differences wrap around, so `255 -> 0` is a difference of 1. Alpha stays unchanged.
    pub const QOI_OP_DIFF: u8 = 0b0100_0000;

    /// Calculate a pixel based on a 6-bit green-channel difference from the previous pixel, and
    /// differences to the green-channel difference for red and blue.
    ///
    ///  ```plain
    /// .- QOI_OP_LUMA -------------------------------------.
    /// |         Byte[0]         |         Byte[1]         |
    /// |  7  6  5  4  3  2  1  0 |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------+-------------+-----------|
    /// |  1  0 |   green diff    |   dr - dg   |  db - dg  |
    /// `---------------------------------------------------`
    /// ```
    ///
    /// - 2-bit tag b10
    /// - 6-bit green channel difference from the previous pixel (`-32..31`), stored with a bias of
    ///   32
    /// - 4-bit red channel difference minus green channel difference (`-8..7`), stored with a bias
    ///   of 8
    /// - 4-bit blue channel difference minus green channel difference (`-8..7`), stored with a bias
    ///   of 8
    ///
    /// Alpha stays unchanged.
    pub const QOI_OP_LUMA: u8 = 0b1000_0000;

    /// Repeats the last pixel.
    ///
    /// ```plain
    /// .- QOI_OP_RUN ------------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  1  1 |       run       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b11
    /// - 6-bit run-length repeating the previous pixel: 1..62
    /// - The run-length is stored with a bias of -1. Note that the run-lengths 63 and 64 (`b111110`
    ///   and `b111111`) are illegal as they are occupied by the QOI_OP_RGB and QOI_OP_RGBA tag.
    pub const QOI_OP_RUN: u8 = 0b1100_0000;

    /// Emits a full raw pixel, keeping the alpha value of the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_RGB ------------------------------------------.
    /// |         Byte[0]         | Byte[1] | Byte[2] | Byte[3] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7 .. 0  | 7 .. 0  |
    /// |-------------------------+---------+---------+---------|
    /// |  1  1  1  1  1  1  1  0 |   red   |  green  |  blue   |
    /// `-------------------------------------------------------`
    /// ```
    ///
    /// - 8-bit tag b11111110
    pub const QOI_OP_RGB: u8 = 0b1111_1110;

    /// Emits a full raw pixel including alpha.
    ///
    /// ```plain
    /// .- QOI_OP_RGBA ---------------------------------------------------.
    /// |         Byte[0]         | Byte[1] | Byte[2] | Byte[3] | Byte[4] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7 .. 0  | 7 .. 0  | 7 .. 0  |
    /// |-------------------------+---------+---------+---------+---------|
    /// |  1  1  1  1  1  1  1  1 |   red   |  green  |  blue   |  alpha  |
    /// `-----------------------------------------------------------------`
    /// ```
    ///
    /// - 8-bit tag b11111111
    pub const QOI_OP_RGBA: u8 = 0b1111_1111;

    /// Selects the 2-bit tag of a chunk.
    pub const QOI_MASK_2: u8 = 0b1100_0000;

    /// Longest run a single QOI_OP_RUN chunk can describe.
    pub const QOI_MAX_RUN: usize = 62;

    pub const QOI_MAGIC: [u8; 4] = *b"qoif";
    pub const QOI_HEADER_SIZE: usize = 14;

    /// Padding following the last chunk.
    pub const QOI_END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

    /// sRGB with linear alpha.
    pub const QOI_SRGB: u8 = 0;
    /// All channels linear.
    pub const QOI_LINEAR: u8 = 1;
}
