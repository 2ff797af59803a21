// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use super::Segment;
use crate::BLOCK_DIM;
use crate::error::{Error, Result, UnsupportedFeature};
use crate::marker::CodingProcess;
use crate::util::RoundUpTo;
use crate::util::tracing_wrappers::*;

pub const MAX_COMPONENTS: usize = 4;
pub const MAX_SAMPLING_FACTOR: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub id: u8,
    /// Position in the frame header. Nothing about the color channel follows from it.
    pub index: usize,
    pub h_samp: u8,
    pub v_samp: u8,
    pub quant_table: u8,
}

#[derive(Debug, Clone)]
pub struct FrameHeader {
    pub process: CodingProcess,
    pub precision: u8,
    pub width: usize,
    pub height: usize,
    pub components: Vec<Component>,
    /// Sampling factors of the first component, which every other component divides.
    pub max_h_samp: u8,
    pub max_v_samp: u8,
    /// Size of the macroblock grid in 8x8 cells, padded to whole MCUs.
    pub hpadded_count: usize,
    pub vpadded_count: usize,
}

impl FrameHeader {
    pub fn read<R: Read>(seg: &mut Segment<R>, process: CodingProcess) -> Result<FrameHeader> {
        let precision = seg.read_u8()?;
        let valid_precision = match process {
            CodingProcess::Baseline => precision == 8,
            _ => precision == 8 || precision == 12,
        };
        if !valid_precision {
            return Err(UnsupportedFeature::SamplePrecision(precision).into());
        }
        let height = seg.read_u16()? as usize;
        let width = seg.read_u16()? as usize;
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize(width, height));
        }

        let num_components = seg.read_u8()? as usize;
        if !matches!(num_components, 1 | 3 | 4) {
            return Err(Error::InvalidComponentCount(num_components));
        }
        let mut components: Vec<Component> = Vec::with_capacity(num_components);
        for index in 0..num_components {
            let id = seg.read_u8()?;
            let sampling = seg.read_u8()?;
            let quant_table = seg.read_u8()?;
            let (h_samp, v_samp) = (sampling >> 4, sampling & 0xf);
            if !(1..=MAX_SAMPLING_FACTOR).contains(&h_samp)
                || !(1..=MAX_SAMPLING_FACTOR).contains(&v_samp)
            {
                return Err(Error::InvalidSamplingFactors(h_samp, v_samp, id));
            }
            if quant_table > 3 {
                return Err(Error::InvalidTableId("quantization", quant_table));
            }
            if components.iter().any(|c| c.id == id) {
                return Err(Error::DuplicateComponentId(id));
            }
            components.push(Component {
                id,
                index,
                h_samp,
                v_samp,
                quant_table,
            });
        }

        let (max_h_samp, max_v_samp) = (components[0].h_samp, components[0].v_samp);
        for c in components.iter().skip(1) {
            if max_h_samp % c.h_samp != 0 || max_v_samp % c.v_samp != 0 {
                return Err(UnsupportedFeature::SubsamplingRatio(
                    c.h_samp, c.v_samp, max_h_samp, max_v_samp,
                )
                .into());
            }
        }

        let hpadded_count = width.div_ceil(BLOCK_DIM).round_up_to(max_h_samp as usize);
        let vpadded_count = height.div_ceil(BLOCK_DIM).round_up_to(max_v_samp as usize);
        debug!(
            ?process,
            precision,
            width,
            height,
            num_components,
            max_h_samp,
            max_v_samp,
            "frame header"
        );
        Ok(FrameHeader {
            process,
            precision,
            width,
            height,
            components,
            max_h_samp,
            max_v_samp,
            hpadded_count,
            vpadded_count,
        })
    }

    /// MCU grid size of interleaved scans.
    pub fn mcu_count(&self) -> (usize, usize) {
        (
            self.hpadded_count / self.max_h_samp as usize,
            self.vpadded_count / self.max_v_samp as usize,
        )
    }

    /// Blocks that cover the component's samples, which is the MCU grid of a scan that holds
    /// only this component.
    pub fn component_blocks(&self, c: &Component) -> (usize, usize) {
        let samples_x = (self.width * c.h_samp as usize).div_ceil(self.max_h_samp as usize);
        let samples_y = (self.height * c.v_samp as usize).div_ceil(self.max_v_samp as usize);
        (samples_x.div_ceil(BLOCK_DIM), samples_y.div_ceil(BLOCK_DIM))
    }

    /// Whether cell `(mb_x, mb_y)` of the macroblock grid carries a block of the component.
    pub fn cell_used_by(&self, c: &Component, mb_x: usize, mb_y: usize) -> bool {
        (mb_x % self.max_h_samp as usize) < (c.h_samp as usize)
            && (mb_y % self.max_v_samp as usize) < (c.v_samp as usize)
    }

    /// Largest magnitude category of a DC difference and of an AC coefficient.
    pub fn max_categories(&self) -> (u8, u8) {
        if self.precision == 12 { (15, 14) } else { (11, 10) }
    }

    pub fn num_samples(&self) -> usize {
        self.width * self.height * self.components.len()
    }
}
