// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use crate::BLOCK_SIZE;
use crate::api::JpegDecoderOptions;
use crate::bit_reader::BitReader;
use crate::byte_reader::ByteReader;
use crate::entropy_coding::scan::ScanDecoder;
use crate::error::{Error, Result, UnsupportedFeature};
use crate::exif::ExifMetadata;
use crate::headers::{
    AdobeTransform, AppSegment, FrameHeader, JfifHeader, MAX_COMPONENTS, QuantizationTable,
    ScanHeader, Segment, TableSet, read_restart_interval,
};
use crate::icc::IccChunks;
use crate::image::{MacroblockGrid, RasterFrame};
use crate::marker::{self, CodingProcess, Marker};
use crate::render::{self, ColorTransform};
use crate::util::tracing_wrappers::*;
use crate::var_dct::idct;

/// What a marker segment meant for the caller of `DecoderState::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Frame,
    /// An SOS marker whose segment has not been read yet.
    Scan,
    End,
}

/// Everything one decode owns: the source, the tables, the frame and its coefficients, and the
/// metadata found on the way.
pub struct DecoderState<R> {
    source: ByteReader<R>,
    options: JpegDecoderOptions,
    frame: Option<FrameHeader>,
    tables: TableSet,
    /// Tables latched by each component at the first scan that includes it.
    component_quant: [Option<QuantizationTable>; MAX_COMPONENTS],
    restart_interval: u16,
    grid: Option<MacroblockGrid>,
    /// Marker read past the end of a scan.
    pending_marker: Option<u8>,
    held_step: Option<Step>,
    num_scans: usize,
    icc: IccChunks,
    exif: Option<ExifMetadata>,
    adobe: Option<AdobeTransform>,
    jfif: Option<JfifHeader>,
}

impl<R: Read> DecoderState<R> {
    pub fn new(source: R, options: JpegDecoderOptions) -> DecoderState<R> {
        DecoderState {
            source: ByteReader::new(source),
            options,
            frame: None,
            tables: TableSet::default(),
            component_quant: Default::default(),
            restart_interval: 0,
            grid: None,
            pending_marker: None,
            held_step: None,
            num_scans: 0,
            icc: IccChunks::default(),
            exif: None,
            adobe: None,
            jfif: None,
        }
    }

    pub fn frame(&self) -> Option<&FrameHeader> {
        self.frame.as_ref()
    }

    pub fn icc(&self) -> &IccChunks {
        &self.icc
    }

    pub fn exif(&self) -> Option<&ExifMetadata> {
        self.exif.as_ref()
    }

    pub fn adobe(&self) -> Option<AdobeTransform> {
        self.adobe
    }

    pub fn jfif(&self) -> Option<&JfifHeader> {
        self.jfif.as_ref()
    }

    /// Checks the start-of-image marker and reads segments up to the first scan, so that the
    /// frame header and the metadata in front of the scans are known.
    pub fn read_header(&mut self) -> Result<()> {
        let first = self.source.read_u8()?;
        let second = self.source.read_u8()?;
        if first != 0xff {
            return Err(Error::InvalidSignature(first, second));
        }
        if second != Marker::Soi as u8 {
            return Err(Error::MissingStartOfImage);
        }
        loop {
            match self.step()? {
                Step::Continue | Step::Frame => {}
                Step::Scan => {
                    self.held_step = Some(Step::Scan);
                    return Ok(());
                }
                Step::End => {
                    if self.frame.is_none() {
                        return Err(Error::MissingFrame);
                    }
                    self.held_step = Some(Step::End);
                    return Ok(());
                }
            }
        }
    }

    /// Decodes every scan until the end-of-image marker.
    pub fn decode_scans(&mut self) -> Result<()> {
        loop {
            let step = match self.held_step.take() {
                Some(step) => step,
                None => self.step()?,
            };
            match step {
                Step::Continue | Step::Frame => {}
                Step::Scan => self.decode_scan()?,
                Step::End => break,
            }
        }
        if self.num_scans == 0 {
            return Err(Error::NoScans);
        }
        debug!(num_scans = self.num_scans, "end of image");
        Ok(())
    }

    /// Dequantizes, transforms, upsamples and color-converts the decoded coefficients.
    pub fn render(&mut self) -> Result<RasterFrame> {
        let frame = self.frame.as_ref().ok_or(Error::MissingFrame)?;
        let mut grid = self.grid.take().ok_or(Error::MissingFrame)?;
        let quant: Vec<QuantizationTable> = frame
            .components
            .iter()
            .map(|c| match &self.component_quant[c.index] {
                Some(table) => table.clone(),
                None => {
                    // Never scanned: all coefficients are zero and any table will do.
                    warn!(id = c.id, "component not present in any scan");
                    QuantizationTable([1; BLOCK_SIZE])
                }
            })
            .collect();
        let transform = ColorTransform::select(&frame.components, self.adobe)?;
        let invert = self.options.invert_adobe_cmyk && self.adobe.is_some();
        idct::reconstruct(frame, &quant, &mut grid);
        render::render(frame, &grid, transform, invert)
    }

    fn next_marker(&mut self) -> Result<u8> {
        match self.pending_marker.take() {
            Some(code) => Ok(code),
            None => marker::read_marker(&mut self.source),
        }
    }

    fn step(&mut self) -> Result<Step> {
        let code = self.next_marker()?;
        let Some(marker) = Marker::from_code(code) else {
            trace!("skipping reserved marker {code:02x}");
            Segment::open(&mut self.source, "reserved")?.skip_rest()?;
            return Ok(Step::Continue);
        };
        trace!(?marker, offset = self.source.offset(), "marker");

        if let Some(process) = marker.frame_type() {
            self.read_frame(process?)?;
            return Ok(Step::Frame);
        }
        if let Some(n) = marker.app_number() {
            let seg = Segment::open(&mut self.source, "APP")?;
            let app = AppSegment::read(seg, n)?;
            self.handle_app(app)?;
            return Ok(Step::Continue);
        }

        match marker {
            Marker::Soi => return Err(Error::UnexpectedMarker(code)),
            Marker::Eoi => return Ok(Step::End),
            Marker::Sos => {
                if self.frame.is_none() {
                    return Err(Error::ScanBeforeFrame);
                }
                return Ok(Step::Scan);
            }
            Marker::Dht => {
                let baseline = self
                    .frame
                    .as_ref()
                    .is_some_and(|f| f.process == CodingProcess::Baseline);
                let mut seg = Segment::open(&mut self.source, "DHT")?;
                self.tables.read_huffman(&mut seg, baseline)?;
                seg.finish()?;
            }
            Marker::Dqt => {
                let mut seg = Segment::open(&mut self.source, "DQT")?;
                self.tables.read_quantization(&mut seg)?;
                seg.finish()?;
            }
            Marker::Dri => {
                let mut seg = Segment::open(&mut self.source, "DRI")?;
                self.restart_interval = read_restart_interval(&mut seg)?;
                seg.finish()?;
                debug!(restart_interval = self.restart_interval, "restart interval");
            }
            Marker::Dac => return Err(UnsupportedFeature::ArithmeticCoding.into()),
            Marker::Dhp | Marker::Exp => return Err(UnsupportedFeature::Hierarchical.into()),
            Marker::Dnl => return Err(UnsupportedFeature::DefineNumberOfLines.into()),
            _ if marker.is_standalone() => {
                trace!(?marker, "skipping standalone marker");
            }
            _ => {
                Segment::open(&mut self.source, "COM")?.skip_rest()?;
            }
        }
        Ok(Step::Continue)
    }

    fn read_frame(&mut self, process: CodingProcess) -> Result<()> {
        if self.frame.is_some() {
            return Err(Error::DuplicateFrame);
        }
        let mut seg = Segment::open(&mut self.source, "SOF")?;
        let frame = FrameHeader::read(&mut seg, process)?;
        seg.finish()?;
        if let Some(limit) = self.options.pixel_limit
            && frame.num_samples() > limit
        {
            return Err(Error::ImageSizeTooLarge(frame.width, frame.height));
        }
        self.grid = Some(MacroblockGrid::new(&frame)?);
        self.frame = Some(frame);
        Ok(())
    }

    fn handle_app(&mut self, app: AppSegment) -> Result<()> {
        match app {
            AppSegment::Jfif(header) => self.jfif = Some(header),
            AppSegment::Exif(raw) => {
                if self.exif.is_some() {
                    warn!("ignoring additional EXIF segment");
                } else {
                    self.exif = Some(ExifMetadata::parse(raw)?);
                }
            }
            AppSegment::IccChunk {
                sequence,
                count,
                data,
            } => self.icc.add(sequence, count, data),
            AppSegment::Adobe(transform) => self.adobe = Some(transform),
            AppSegment::Unknown => {}
        }
        Ok(())
    }

    fn decode_scan(&mut self) -> Result<()> {
        let frame = self.frame.as_ref().ok_or(Error::ScanBeforeFrame)?;
        let grid = self.grid.as_mut().ok_or(Error::ScanBeforeFrame)?;
        let mut seg = Segment::open(&mut self.source, "SOS")?;
        let scan = ScanHeader::read(&mut seg, frame)?;
        seg.finish()?;
        debug!(
            components = scan.components.len(),
            ss = scan.ss,
            se = scan.se,
            ah = scan.ah,
            al = scan.al,
            "scan"
        );

        for sc in scan.components.iter() {
            let table = self
                .tables
                .quantization(frame.components[sc.index].quant_table)?;
            if self.component_quant[sc.index].is_none() {
                self.component_quant[sc.index] = Some(table.clone());
            }
        }

        let mut br = BitReader::new(&mut self.source, self.restart_interval == 0);
        ScanDecoder::new(
            frame,
            &scan,
            &self.tables,
            self.restart_interval,
            self.options.strict_restart_markers,
        )?
        .decode(&mut br, grid)?;
        let next = br.take_marker();
        let next = match next {
            Some(code) => code,
            None => marker::resync(&mut self.source)?,
        };
        self.pending_marker = Some(next);
        self.num_scans += 1;
        Ok(())
    }
}
