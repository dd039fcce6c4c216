use crate::{cache::ColorCache, consts::*, utils::diff, Pixel};

/// One encoded chunk, 1 to 5 bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Chunk {
    buf: [u8; 5],
    len: u8,
}

impl Chunk {
    #[inline]
    const fn new<const N: usize>(bytes: [u8; N]) -> Self {
        let mut buf = [0; 5];
        let mut i = 0;
        while i < N {
            buf[i] = bytes[i];
            i += 1;
        }
        Self { buf, len: N as u8 }
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }
}

// OP: 0b11
#[inline]
pub(crate) const fn run(count: usize) -> Chunk {
    debug_assert!(count >= 1 && count <= QOI_MAX_RUN);
    Chunk::new([QOI_OP_RUN | (count - 1) as u8])
}

// OP: 0b00
#[inline]
pub(crate) fn index(cache: &ColorCache, pixel: Pixel) -> Option<Chunk> {
    cache.find(pixel).map(|index| Chunk::new([QOI_OP_INDEX | index]))
}

// OP: 0b01
#[inline]
pub(crate) const fn small_diff(prev: Pixel, pixel: Pixel) -> Option<Chunk> {
    if pixel.a != prev.a {
        return None;
    }

    let (r_diff, g_diff, b_diff) = (
        diff(pixel.r, prev.r),
        diff(pixel.g, prev.g),
        diff(pixel.b, prev.b),
    );

    if !matches!((r_diff, g_diff, b_diff), (-2..=1, -2..=1, -2..=1)) {
        return None;
    }

    let mut b = QOI_OP_DIFF;
    b |= ((r_diff + 2) as u8) << 4;
    b |= ((g_diff + 2) as u8) << 2;
    b |= (b_diff + 2) as u8;
    Some(Chunk::new([b]))
}

// OP: 0b10
#[inline]
pub(crate) const fn luma(prev: Pixel, pixel: Pixel) -> Option<Chunk> {
    if pixel.a != prev.a {
        return None;
    }

    let g_diff = diff(pixel.g, prev.g);
    let rg_diff = diff(pixel.r, prev.r).wrapping_sub(g_diff);
    let bg_diff = diff(pixel.b, prev.b).wrapping_sub(g_diff);

    if !matches!((rg_diff, g_diff, bg_diff), (-8..=7, -32..=31, -8..=7)) {
        return None;
    }

    Some(Chunk::new([
        QOI_OP_LUMA | (g_diff + 32) as u8,
        ((rg_diff + 8) as u8) << 4 | (bg_diff + 8) as u8,
    ]))
}

#[inline]
pub(crate) const fn rgb(prev: Pixel, pixel: Pixel) -> Option<Chunk> {
    if pixel.a != prev.a {
        return None;
    }

    Some(Chunk::new([QOI_OP_RGB, pixel.r, pixel.g, pixel.b]))
}

#[inline]
pub(crate) const fn rgba(pixel: Pixel) -> Chunk {
    Chunk::new([QOI_OP_RGBA, pixel.r, pixel.g, pixel.b, pixel.a])
}
