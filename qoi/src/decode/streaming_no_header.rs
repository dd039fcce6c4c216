use crate::{
    cache::ColorCache,
    consts::*,
    decode::ops::{luma, run_length, small_diff},
    ColorFormat, Pixel,
};
use snafu::{ensure, OptionExt, Snafu};

/// Decoder for a bare chunk stream (no header, no end marker) arriving in arbitrarily sized
/// pieces.
///
/// A chunk may be split across calls; the partial chunk is kept in the context until the rest of
/// it arrives.
#[derive(Debug, Clone, Copy)]
pub struct QoiStreamingDecodeContext {
    state: QoiStreamingDecodeState,
    prev: Pixel,
    cache: ColorCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QoiStreamingDecodeState {
    Default,
    LumaByte2(u8),
    /// Collecting the channels of a QOI_OP_RGB (3 bytes) or QOI_OP_RGBA (4 bytes) chunk.
    Literal {
        channels: [u8; 4],
        len: u8,
        wanted: u8,
    },
}

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum StreamingDecodeError {
    #[snafu(display("Index chunk references color array slot {index}, which is still empty"))]
    UnresolvedIndex { index: u8 },
    #[snafu(display("Output buffer is full"))]
    OutputTooSmall,
    #[snafu(display("Chunk stream ended in the middle of a chunk"))]
    UnexpectedEof,
}

impl Default for QoiStreamingDecodeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QoiStreamingDecodeContext {
    pub const fn new() -> Self {
        Self {
            state: QoiStreamingDecodeState::Default,
            prev: Pixel::rgb(0, 0, 0),
            cache: ColorCache::new(),
        }
    }

    /// Decodes the next piece of the chunk stream into `output`.
    ///
    /// Returns the number of pixels written to the output buffer. Note that this doesn't
    /// accumulate over multiple calls. You'll need to keep track of the number of pixels written
    /// and pass the correct output slice to the next call.
    ///
    /// Running out of output space is an error, the context can't be resumed afterwards.
    pub fn streaming_decode_to_slice<C: ColorFormat>(
        &mut self,
        input: &[u8],
        output: &mut [C::OutputElement],
    ) -> Result<usize, StreamingDecodeError> {
        let mut output_idx = 0;

        for &byte in input {
            let pixel = match self.state {
                QoiStreamingDecodeState::Default => match byte {
                    QOI_OP_RGB | QOI_OP_RGBA => {
                        self.state = QoiStreamingDecodeState::Literal {
                            channels: [0, 0, 0, self.prev.a],
                            len: 0,
                            wanted: if byte == QOI_OP_RGB { 3 } else { 4 },
                        };
                        continue;
                    }
                    _ => match byte & QOI_MASK_2 {
                        QOI_OP_INDEX => self
                            .cache
                            .get(byte)
                            .context(streaming_decode_error::UnresolvedIndexSnafu { index: byte })?,
                        QOI_OP_DIFF => small_diff(self.prev, byte),
                        QOI_OP_LUMA => {
                            self.state = QoiStreamingDecodeState::LumaByte2(byte);
                            continue;
                        }
                        _ => {
                            let count = run_length(byte);
                            let run = output
                                .get_mut(output_idx..output_idx + count)
                                .context(streaming_decode_error::OutputTooSmallSnafu)?;
                            run.fill(C::to_output(self.prev));
                            output_idx += count;

                            self.cache.insert(self.prev);
                            continue;
                        }
                    },
                },
                QoiStreamingDecodeState::LumaByte2(byte1) => luma(self.prev, byte1, byte),
                QoiStreamingDecodeState::Literal {
                    mut channels,
                    len,
                    wanted,
                } => {
                    channels[usize::from(len)] = byte;
                    if len + 1 < wanted {
                        self.state = QoiStreamingDecodeState::Literal {
                            channels,
                            len: len + 1,
                            wanted,
                        };
                        continue;
                    }

                    Pixel::from(channels)
                }
            };

            let slot = output
                .get_mut(output_idx)
                .context(streaming_decode_error::OutputTooSmallSnafu)?;
            *slot = C::to_output(pixel);
            output_idx += 1;

            self.cache.insert(pixel);
            self.prev = pixel;
            self.state = QoiStreamingDecodeState::Default;
        }

        Ok(output_idx)
    }

    /// Checks that the stream didn't end in the middle of a chunk.
    pub fn finish(&self) -> Result<(), StreamingDecodeError> {
        ensure!(
            self.state == QoiStreamingDecodeState::Default,
            streaming_decode_error::UnexpectedEofSnafu
        );
        Ok(())
    }
}
