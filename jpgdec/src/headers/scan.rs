// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use super::{FrameHeader, MAX_COMPONENTS, Segment};
use crate::error::{Error, Result};
use crate::marker::CodingProcess;
use crate::util::tracing_wrappers::*;

const MAX_BLOCKS_PER_MCU: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    /// Index into the frame's component list.
    pub index: usize,
    pub dc_table: u8,
    pub ac_table: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    /// In frame order.
    pub components: Vec<ScanComponent>,
    /// Spectral selection, as zig-zag indices.
    pub ss: u8,
    pub se: u8,
    /// Successive approximation bit positions.
    pub ah: u8,
    pub al: u8,
}

impl ScanHeader {
    pub fn read<R: Read>(seg: &mut Segment<R>, frame: &FrameHeader) -> Result<ScanHeader> {
        let count = seg.read_u8()? as usize;
        if count == 0 || count > MAX_COMPONENTS {
            return Err(Error::InvalidScan("component count"));
        }
        let max_table = if frame.process == CodingProcess::Baseline {
            1
        } else {
            3
        };
        let mut components: Vec<ScanComponent> = Vec::with_capacity(count);
        for _ in 0..count {
            let id = seg.read_u8()?;
            let tables = seg.read_u8()?;
            let index = frame
                .components
                .iter()
                .position(|c| c.id == id)
                .ok_or(Error::UnknownScanComponent(id))?;
            if components.last().is_some_and(|prev| prev.index >= index) {
                return Err(Error::InvalidScan("components not in frame order"));
            }
            let (dc_table, ac_table) = (tables >> 4, tables & 0xf);
            if dc_table > max_table {
                return Err(Error::InvalidTableId("DC Huffman", dc_table));
            }
            if ac_table > max_table {
                return Err(Error::InvalidTableId("AC Huffman", ac_table));
            }
            components.push(ScanComponent {
                index,
                dc_table,
                ac_table,
            });
        }
        let ss = seg.read_u8()?;
        let se = seg.read_u8()?;
        let approx = seg.read_u8()?;
        let (ah, al) = (approx >> 4, approx & 0xf);

        if frame.process.is_progressive() {
            if ss > se || se > 63 {
                return Err(Error::InvalidScan("spectral selection"));
            }
            if ss == 0 && se != 0 {
                return Err(Error::InvalidScan("DC and AC in one progressive scan"));
            }
            if ss > 0 && count != 1 {
                return Err(Error::InvalidScan("interleaved AC scan"));
            }
            if al > 13 || (ah != 0 && ah != al + 1) {
                return Err(Error::InvalidScan("successive approximation"));
            }
        } else if ss != 0 || se != 63 || ah != 0 || al != 0 {
            return Err(Error::InvalidScan("sequential scan parameters"));
        }

        if count > 1 {
            let blocks: usize = components
                .iter()
                .map(|c| {
                    let fc = &frame.components[c.index];
                    fc.h_samp as usize * fc.v_samp as usize
                })
                .sum();
            if blocks > MAX_BLOCKS_PER_MCU {
                return Err(Error::InvalidScan("too many blocks per MCU"));
            }
        }
        debug!(count, ss, se, ah, al, "scan header");
        Ok(ScanHeader {
            components,
            ss,
            se,
            ah,
            al,
        })
    }

    pub fn is_interleaved(&self) -> bool {
        self.components.len() > 1
    }

    /// Whether a DC Huffman table is read in this scan.
    pub fn uses_dc_tables(&self) -> bool {
        self.ss == 0 && self.ah == 0
    }

    /// Whether an AC Huffman table is read in this scan.
    pub fn uses_ac_tables(&self) -> bool {
        self.se > 0
    }
}
