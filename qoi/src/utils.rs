use crate::{header::Channels, Pixel};
use snafu::{ensure, Snafu};

/// Color array slot of a pixel: `(r * 3 + g * 5 + b * 7 + a * 11) % 64`.
#[inline]
pub const fn hash(pixel: Pixel) -> u8 {
    // 64 divides 256, so wrapping in u8 doesn't change the result.
    let Pixel { r, g, b, a } = pixel;
    r.wrapping_mul(3)
        .wrapping_add(g.wrapping_mul(5))
        .wrapping_add(b.wrapping_mul(7))
        .wrapping_add(a.wrapping_mul(11))
        & 0b11_1111 // % 64
}

/// Computes the signed (wrapping) difference between two channel values.
#[inline]
pub const fn diff(a: u8, b: u8) -> i8 {
    a.wrapping_sub(b) as i8
}

/// Applies a signed difference to a channel value, wrapping around.
#[inline]
pub const fn sum(a: u8, d: i8) -> u8 {
    a.wrapping_add(d as u8)
}

/// Applies per-channel differences to the RGB channels of a pixel, keeping alpha.
#[inline]
pub const fn apply_diff(prev: Pixel, r_diff: i8, g_diff: i8, b_diff: i8) -> Pixel {
    Pixel::new(
        sum(prev.r, r_diff),
        sum(prev.g, g_diff),
        sum(prev.b, b_diff),
        prev.a,
    )
}

#[derive(Debug, Snafu)]
pub enum PixelBufferError {
    #[snafu(display(
        "Pixel buffer of {len} bytes is not a multiple of the {channels} channels per pixel"
    ))]
    UnalignedBuffer { len: usize, channels: usize },
}

/// Interprets an interleaved RGB or RGBA byte buffer as pixels. RGB input is treated as fully
/// opaque.
pub fn pixels_from_bytes(
    channels: Channels,
    bytes: &[u8],
) -> Result<impl Iterator<Item = Pixel> + '_, PixelBufferError> {
    let stride = channels.bytes_per_pixel();
    ensure!(
        bytes.len() % stride == 0,
        UnalignedBufferSnafu {
            len: bytes.len(),
            channels: stride,
        }
    );

    Ok(bytes.chunks_exact(stride).map(move |p| match p {
        &[r, g, b, a] => Pixel::new(r, g, b, a),
        &[r, g, b] => Pixel::rgb(r, g, b),
        _ => unreachable!("stride is either 3 or 4"),
    }))
}
