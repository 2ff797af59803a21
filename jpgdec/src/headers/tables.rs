// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use super::Segment;
use crate::entropy_coding::huffman::{HUFFMAN_MAX_BITS, HuffmanTable, TableClass};
use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;
use crate::{BLOCK_SIZE, NATURAL_ORDER};

pub const MAX_TABLE_ID: u8 = 3;

/// 64 quantization steps in natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTable(pub [u16; BLOCK_SIZE]);

/// Tables defined so far, by destination id. A later definition replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub quant: [Option<QuantizationTable>; 4],
    pub dc: [Option<HuffmanTable>; 4],
    pub ac: [Option<HuffmanTable>; 4],
}

impl TableSet {
    pub fn huffman(&self, class: TableClass, id: u8) -> Result<&HuffmanTable> {
        let tables = match class {
            TableClass::Dc => &self.dc,
            TableClass::Ac => &self.ac,
        };
        tables
            .get(id as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::MissingHuffmanTable(class.name(), id))
    }

    pub fn quantization(&self, id: u8) -> Result<&QuantizationTable> {
        self.quant
            .get(id as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::MissingQuantizationTable(id))
    }

    /// Reads the tables of a DQT segment.
    pub fn read_quantization<R: Read>(&mut self, seg: &mut Segment<R>) -> Result<()> {
        while seg.remaining() > 0 {
            let header = seg.read_u8()?;
            let (precision, id) = (header >> 4, header & 0xf);
            if precision > 1 {
                return Err(Error::InvalidQuantizationPrecision(precision));
            }
            if id > MAX_TABLE_ID {
                return Err(Error::InvalidTableId("quantization", id));
            }
            let mut table = [0u16; BLOCK_SIZE];
            for &pos in NATURAL_ORDER.iter() {
                table[pos] = if precision == 0 {
                    seg.read_u8()? as u16
                } else {
                    seg.read_u16()?
                };
            }
            trace!(id, precision, "quantization table");
            self.quant[id as usize] = Some(QuantizationTable(table));
        }
        Ok(())
    }

    /// Reads the tables of a DHT segment. Baseline frames only address tables 0 and 1.
    pub fn read_huffman<R: Read>(&mut self, seg: &mut Segment<R>, baseline: bool) -> Result<()> {
        let max_id = if baseline { 1 } else { MAX_TABLE_ID };
        while seg.remaining() > 0 {
            let header = seg.read_u8()?;
            let class = match header >> 4 {
                0 => TableClass::Dc,
                1 => TableClass::Ac,
                other => return Err(Error::InvalidTableId("Huffman class", other)),
            };
            let id = header & 0xf;
            if id > max_id {
                return Err(Error::InvalidTableId(class.name(), id));
            }
            let mut counts = [0u8; HUFFMAN_MAX_BITS];
            seg.read_exact(&mut counts)?;
            let total: usize = counts.iter().map(|&c| c as usize).sum();
            let symbols = seg.read_vec(total)?;
            let table = HuffmanTable::build(&counts, &symbols)?;
            trace!(?class, id, total, "Huffman table");
            match class {
                TableClass::Dc => self.dc[id as usize] = Some(table),
                TableClass::Ac => self.ac[id as usize] = Some(table),
            }
        }
        Ok(())
    }
}

/// Reads a DRI segment: the number of MCUs per restart interval, 0 for none.
pub fn read_restart_interval<R: Read>(seg: &mut Segment<R>) -> Result<u16> {
    seg.read_u16()
}
