// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use super::JpegDecoderOptions;
use crate::decode::DecoderState;
use crate::error::{Error, Result};
use crate::exif::ExifMetadata;
use crate::headers::JfifHeader;
use crate::image::{JpegColorType, RasterFrame};
use crate::util::tracing_wrappers::*;

/// How far a decoder got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderStage {
    /// The frame header and everything before the first scan are known.
    HeaderParsed,
    /// All scans were entropy-decoded.
    FrameDecoded,
    /// The raster is available.
    BitmapDecoded,
    /// A previous call failed; the decoder cannot be used any more.
    Error,
}

/// Decodes a single JPEG image from `R`.
///
/// Creating the decoder only reads the stream up to the first scan. The pixels are decoded by
/// the first call to [`JpegDecoder::frame`] and cached afterwards.
pub struct JpegDecoder<R> {
    state: DecoderState<R>,
    stage: DecoderStage,
    size: (usize, usize),
    natural_format: JpegColorType,
    raster: Option<RasterFrame>,
}

impl<R: Read> JpegDecoder<R> {
    pub fn create(source: R, options: JpegDecoderOptions) -> Result<Self> {
        let mut state = DecoderState::new(source, options);
        state.read_header()?;
        let frame = state.frame().ok_or(Error::MissingFrame)?;
        let num_components = frame.components.len();
        let natural_format = JpegColorType::from_num_components(num_components)
            .ok_or(Error::InvalidComponentCount(num_components))?;
        let size = (frame.width, frame.height);
        debug!(?size, ?natural_format, "header parsed");
        Ok(Self {
            state,
            stage: DecoderStage::HeaderParsed,
            size,
            natural_format,
            raster: None,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    /// The color layout implied by the number of components. Grayscale images are still
    /// rendered as RGB.
    pub fn natural_format(&self) -> JpegColorType {
        self.natural_format
    }

    pub fn stage(&self) -> DecoderStage {
        self.stage
    }

    /// Returns the decoded image. Only index 0 exists.
    pub fn frame(&mut self, index: usize) -> Result<&RasterFrame> {
        if index != 0 {
            return Err(Error::InvalidFrameIndex(index));
        }
        match self.stage {
            DecoderStage::Error => return Err(Error::DecoderFailed),
            DecoderStage::BitmapDecoded => {}
            DecoderStage::HeaderParsed | DecoderStage::FrameDecoded => {
                if let Err(err) = self.decode() {
                    warn!(%err, "decoding failed");
                    self.stage = DecoderStage::Error;
                    return Err(err);
                }
            }
        }
        self.raster.as_ref().ok_or(Error::DecoderFailed)
    }

    /// The embedded ICC profile, if all its chunks were found. The profile may be completed by
    /// segments after the first scan, which are only read by [`JpegDecoder::frame`].
    pub fn icc_profile(&self) -> Option<Vec<u8>> {
        self.state.icc().assemble()
    }

    pub fn metadata(&self) -> Option<&ExifMetadata> {
        self.state.exif()
    }

    /// The APP0 JFIF header, if the stream has one.
    pub fn jfif(&self) -> Option<JfifHeader> {
        self.state.jfif().copied()
    }

    fn decode(&mut self) -> Result<()> {
        if self.stage == DecoderStage::HeaderParsed {
            self.state.decode_scans()?;
            self.stage = DecoderStage::FrameDecoded;
        }
        self.raster = Some(self.state.render()?);
        self.stage = DecoderStage::BitmapDecoded;
        Ok(())
    }
}
