// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::headers::{Component, FrameHeader};

pub type Block = [i32; BLOCK_SIZE];

/// Blocks of all components on a grid of 8x8 cells at the resolution of the first component.
///
/// Each cell holds one block per component. A subsampled component only uses the cells whose
/// position within the MCU is below its sampling factors. Blocks hold coefficients in natural
/// order while scans are decoded, and samples after reconstruction.
pub struct MacroblockGrid {
    hpadded_count: usize,
    vpadded_count: usize,
    max_h_samp: usize,
    max_v_samp: usize,
    num_components: usize,
    blocks: Vec<Block>,
}

impl Debug for MacroblockGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacroblockGrid {{ {}x{} cells, {} components }}",
            self.hpadded_count, self.vpadded_count, self.num_components
        )
    }
}

impl MacroblockGrid {
    pub fn new(frame: &FrameHeader) -> Result<MacroblockGrid> {
        let num_components = frame.components.len();
        let total = frame
            .hpadded_count
            .checked_mul(frame.vpadded_count)
            .and_then(|x| x.checked_mul(num_components))
            .ok_or(Error::ArithmeticOverflow)?;
        let mut blocks = Vec::new();
        blocks.try_reserve_exact(total)?;
        blocks.resize(total, [0; BLOCK_SIZE]);
        Ok(MacroblockGrid {
            hpadded_count: frame.hpadded_count,
            vpadded_count: frame.vpadded_count,
            max_h_samp: frame.max_h_samp as usize,
            max_v_samp: frame.max_v_samp as usize,
            num_components,
            blocks,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.hpadded_count, self.vpadded_count)
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Cell that holds block `(bx, by)` of a component, counted in the component's own blocks.
    pub fn cell_for_block(&self, component: &Component, bx: usize, by: usize) -> (usize, usize) {
        let (h, v) = (component.h_samp as usize, component.v_samp as usize);
        (
            bx / h * self.max_h_samp + bx % h,
            by / v * self.max_v_samp + by % v,
        )
    }

    pub fn block(&self, mb_x: usize, mb_y: usize, c: usize) -> &Block {
        &self.blocks[(mb_y * self.hpadded_count + mb_x) * self.num_components + c]
    }

    pub fn block_mut(&mut self, mb_x: usize, mb_y: usize, c: usize) -> &mut Block {
        &mut self.blocks[(mb_y * self.hpadded_count + mb_x) * self.num_components + c]
    }

    /// Mutable access to whole rows of cells, `num_components` blocks per cell.
    pub fn cells_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }
}

/// Color layouts of decoded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorType {
    Grayscale,
    Rgb,
    Cmyk,
}

impl JpegColorType {
    pub fn from_num_components(num: usize) -> Option<JpegColorType> {
        match num {
            1 => Some(JpegColorType::Grayscale),
            3 => Some(JpegColorType::Rgb),
            4 => Some(JpegColorType::Cmyk),
            _ => None,
        }
    }

    pub fn samples_per_pixel(self) -> usize {
        match self {
            JpegColorType::Grayscale => 1,
            JpegColorType::Rgb => 3,
            JpegColorType::Cmyk => 4,
        }
    }
}

/// A decoded image, 8 bits per sample, interleaved and row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    width: usize,
    height: usize,
    color_type: JpegColorType,
    data: Vec<u8>,
}

impl RasterFrame {
    pub fn new(width: usize, height: usize, color_type: JpegColorType) -> Result<RasterFrame> {
        let len = width
            .checked_mul(height)
            .and_then(|x| x.checked_mul(color_type.samples_per_pixel()))
            .ok_or(Error::ImageSizeTooLarge(width, height))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(RasterFrame {
            width,
            height,
            color_type,
            data,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn color_type(&self) -> JpegColorType {
        self.color_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn row_stride(&self) -> usize {
        self.width * self.color_type.samples_per_pixel()
    }

    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let spp = self.color_type.samples_per_pixel();
        let start = y * self.row_stride() + x * spp;
        &self.data[start..start + spp]
    }
}
