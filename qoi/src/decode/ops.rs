use crate::{utils::apply_diff, Pixel};

// OP: 0b01
#[inline(always)]
pub(crate) const fn small_diff(prev: Pixel, byte: u8) -> Pixel {
    let (r_diff, g_diff, b_diff) = (
        ((byte >> 4) & 0b11) as i8 - 2,
        ((byte >> 2) & 0b11) as i8 - 2,
        (byte & 0b11) as i8 - 2,
    );

    apply_diff(prev, r_diff, g_diff, b_diff)
}

// OP: 0b10
#[inline(always)]
pub(crate) const fn luma(prev: Pixel, byte: u8, rg_bg_diffs: u8) -> Pixel {
    let g_diff = (byte & 0b0011_1111) as i8 - 32;
    let (rg_diff, bg_diff) = (
        (rg_bg_diffs >> 4) as i8 - 8,
        (rg_bg_diffs & 0b1111) as i8 - 8,
    );
    let (r_diff, b_diff) = (rg_diff + g_diff, bg_diff + g_diff);

    apply_diff(prev, r_diff, g_diff, b_diff)
}

// OP: 0b11
#[inline(always)]
pub(crate) const fn run_length(byte: u8) -> usize {
    (byte & 0b0011_1111) as usize + 1
}

/// Byte cursor over a chunk stream.
pub(crate) struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    #[inline]
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reads the next byte, `None` at the end of the input.
    #[inline]
    pub(crate) fn next(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    #[inline]
    pub(crate) const fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn small_diff_unbiases_and_wraps() {
        let prev = Pixel::new(0, 255, 7, 42);
        assert_eq!(
            small_diff(prev, QOI_OP_DIFF | 1 << 4 | 3 << 2 | 2),
            Pixel::new(255, 0, 7, 42)
        );
    }

    #[test]
    fn luma_reconstructs_red_and_blue_from_green() {
        let prev = Pixel::rgb(100, 100, 100);
        // dg = -32, dr - dg = -8, db - dg = 7
        assert_eq!(luma(prev, QOI_OP_LUMA, 0x0F), Pixel::rgb(60, 68, 75));
        // dg = 31, dr - dg = 7, db - dg = -8
        assert_eq!(
            luma(Pixel::rgb(250, 250, 250), QOI_OP_LUMA | 63, 0xF0),
            Pixel::rgb(32, 25, 17)
        );
    }

    #[test]
    fn run_length_is_biased() {
        assert_eq!(run_length(QOI_OP_RUN), 1);
        assert_eq!(run_length(QOI_OP_RUN | 61), QOI_MAX_RUN);
    }
}
