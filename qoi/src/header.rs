use crate::consts::{QOI_HEADER_SIZE, QOI_MAGIC};
use byteorder::{BigEndian, ByteOrder};
use snafu::{ensure, OptionExt, Snafu};

/// Number of channels of the source image.
///
/// Purely informational: the codec always works on RGBA pixels.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Rgb = 3,
    Rgba = 4,
}

impl Channels {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Channels {
    type Error = HeaderError;

    fn try_from(channels: u8) -> Result<Self, Self::Error> {
        match channels {
            3 => Ok(Channels::Rgb),
            4 => Ok(Channels::Rgba),
            channels => header_error::InvalidChannelsSnafu { channels }.fail(),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum HeaderError {
    #[snafu(display("Header is shorter than {} bytes", QOI_HEADER_SIZE))]
    UnexpectedEof,
    #[snafu(display("Invalid magic bytes {magic:?}"))]
    InvalidMagic { magic: [u8; 4] },
    #[snafu(display("Invalid channel count {channels}, expected 3 or 4"))]
    InvalidChannels { channels: u8 },
    #[snafu(display("Image of {width}x{height} pixels does not fit into memory"))]
    ImageTooLarge { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    /// Passed through unchanged, see [`QOI_SRGB`](crate::consts::QOI_SRGB) and
    /// [`QOI_LINEAR`](crate::consts::QOI_LINEAR).
    pub colorspace: u8,
}

impl HeaderInfo {
    /// `width * height`, if it fits into a `usize`.
    pub fn pixel_count(&self) -> Result<usize, HeaderError> {
        usize::try_from(self.width)
            .ok()
            .zip(usize::try_from(self.height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .context(header_error::ImageTooLargeSnafu {
                width: self.width,
                height: self.height,
            })
    }

    pub fn to_bytes(&self) -> [u8; QOI_HEADER_SIZE] {
        let mut header = [0; QOI_HEADER_SIZE];
        header[0..4].copy_from_slice(&QOI_MAGIC);
        BigEndian::write_u32(&mut header[4..8], self.width);
        BigEndian::write_u32(&mut header[8..12], self.height);
        header[12] = self.channels as u8;
        header[13] = self.colorspace;
        header
    }

    /// Parses the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, HeaderError> {
        ensure!(
            data.len() >= QOI_HEADER_SIZE,
            header_error::UnexpectedEofSnafu
        );

        let magic = [data[0], data[1], data[2], data[3]];
        ensure!(
            magic == QOI_MAGIC,
            header_error::InvalidMagicSnafu { magic }
        );

        Ok(Self {
            width: BigEndian::read_u32(&data[4..8]),
            height: BigEndian::read_u32(&data[8..12]),
            channels: Channels::try_from(data[12])?,
            colorspace: data[13],
        })
    }
}
