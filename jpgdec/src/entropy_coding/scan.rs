// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use super::huffman::{HuffmanTable, TableClass};
use crate::NATURAL_ORDER;
use crate::bit_reader::{BitReader, MAX_BITS_PER_CALL};
use crate::error::{Error, Result};
use crate::headers::{Component, FrameHeader, MAX_COMPONENTS, ScanHeader, TableSet};
use crate::image::{Block, MacroblockGrid};
use crate::marker::{self, RST0};
use crate::util::tracing_wrappers::*;

/// How a scan codes its coefficients. Sequential scans carry every bit of every coefficient,
/// progressive scans either the first bits of a band or one refinement bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Sequential,
    First,
    Refine,
}

#[derive(Debug)]
struct ActiveComponent<'a> {
    component: Component,
    dc: Option<&'a HuffmanTable>,
    ac: Option<&'a HuffmanTable>,
}

/// Sign-extends a `len`-bit magnitude: values with a leading one are positive, the others are
/// `bits - (2^len - 1)`.
pub fn extend(bits: u16, len: u8) -> i32 {
    if len == 0 {
        return 0;
    }
    let value = bits as i32;
    if value < 1 << (len - 1) {
        value - (1 << len) + 1
    } else {
        value
    }
}

/// Decodes the entropy-coded data of one scan into the macroblock grid.
#[derive(Debug)]
pub struct ScanDecoder<'a> {
    frame: &'a FrameHeader,
    scan: &'a ScanHeader,
    components: Vec<ActiveComponent<'a>>,
    pass: Pass,
    max_dc_category: u8,
    max_ac_category: u8,
    restart_interval: usize,
    strict_restart_markers: bool,
    next_restart: u8,
    dc_pred: [i32; MAX_COMPONENTS],
    eob_run: u32,
}

impl<'a> ScanDecoder<'a> {
    /// Fails if the scan reads a Huffman table that was never defined.
    pub fn new(
        frame: &'a FrameHeader,
        scan: &'a ScanHeader,
        tables: &'a TableSet,
        restart_interval: u16,
        strict_restart_markers: bool,
    ) -> Result<ScanDecoder<'a>> {
        let pass = match (frame.process.is_progressive(), scan.ah) {
            (false, _) => Pass::Sequential,
            (true, 0) => Pass::First,
            (true, _) => Pass::Refine,
        };
        let components = scan
            .components
            .iter()
            .map(|sc| {
                Ok(ActiveComponent {
                    component: frame.components[sc.index],
                    dc: match scan.uses_dc_tables() {
                        true => Some(tables.huffman(TableClass::Dc, sc.dc_table)?),
                        false => None,
                    },
                    ac: match scan.uses_ac_tables() {
                        true => Some(tables.huffman(TableClass::Ac, sc.ac_table)?),
                        false => None,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let (max_dc_category, max_ac_category) = frame.max_categories();
        Ok(ScanDecoder {
            frame,
            scan,
            components,
            pass,
            max_dc_category,
            max_ac_category,
            restart_interval: restart_interval as usize,
            strict_restart_markers,
            next_restart: 0,
            dc_pred: [0; MAX_COMPONENTS],
            eob_run: 0,
        })
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn decode<R: Read>(
        &mut self,
        br: &mut BitReader<R>,
        grid: &mut MacroblockGrid,
    ) -> Result<()> {
        if self.scan.is_interleaved() {
            let (mcus_x, mcus_y) = self.frame.mcu_count();
            let total = mcus_x * mcus_y;
            for mcu in 0..total {
                self.check_data_left(br)?;
                let (mcu_x, mcu_y) = (mcu % mcus_x, mcu / mcus_x);
                for i in 0..self.components.len() {
                    let component = self.components[i].component;
                    let (h, v) = (component.h_samp as usize, component.v_samp as usize);
                    for v_i in 0..v {
                        for h_i in 0..h {
                            let (mb_x, mb_y) = grid.cell_for_block(
                                &component,
                                mcu_x * h + h_i,
                                mcu_y * v + v_i,
                            );
                            let block = grid.block_mut(mb_x, mb_y, component.index);
                            self.decode_block(br, i, block)?;
                        }
                    }
                }
                self.end_of_mcu(br, mcu, total)?;
            }
        } else {
            // Without interleaving every block is an MCU, and blocks that only exist to pad
            // the component to whole MCUs of the frame are not coded.
            let component = self.components[0].component;
            let (blocks_x, blocks_y) = self.frame.component_blocks(&component);
            let total = blocks_x * blocks_y;
            for mcu in 0..total {
                self.check_data_left(br)?;
                let (mb_x, mb_y) = grid.cell_for_block(&component, mcu % blocks_x, mcu / blocks_x);
                let block = grid.block_mut(mb_x, mb_y, component.index);
                self.decode_block(br, 0, block)?;
                self.end_of_mcu(br, mcu, total)?;
            }
        }
        Ok(())
    }

    /// Fails if a marker cut the data short of the next MCU. Only a pending end-of-band run
    /// may decode without reading any bits.
    fn check_data_left<R: Read>(&self, br: &mut BitReader<R>) -> Result<()> {
        if self.eob_run > 0 {
            return Ok(());
        }
        br.peek_bits(MAX_BITS_PER_CALL)?;
        match br.pending_marker() {
            Some(code) if br.is_exhausted() => {
                warn!("entropy-coded data ends with marker {code:02x} before the end of the scan");
                Err(Error::UnexpectedMarker(code))
            }
            _ => Ok(()),
        }
    }

    fn end_of_mcu<R: Read>(
        &mut self,
        br: &mut BitReader<R>,
        mcu: usize,
        total: usize,
    ) -> Result<()> {
        let done = mcu + 1;
        if self.restart_interval == 0 || done % self.restart_interval != 0 || done == total {
            return Ok(());
        }
        let code = br.read_restart_marker()?;
        if !marker::is_restart(code) {
            return Err(Error::UnexpectedMarker(code));
        }
        let found = code - RST0;
        if found != self.next_restart {
            if self.strict_restart_markers {
                return Err(Error::RestartMarkerMismatch(self.next_restart, found));
            }
            warn!(expected = self.next_restart, found, "out of sequence restart marker");
        }
        trace!(mcu, found, "restart");
        self.next_restart = (found + 1) % 8;
        self.dc_pred = [0; MAX_COMPONENTS];
        self.eob_run = 0;
        Ok(())
    }

    fn decode_block<R: Read>(
        &mut self,
        br: &mut BitReader<R>,
        i: usize,
        block: &mut Block,
    ) -> Result<()> {
        let al = self.scan.al;
        if self.scan.ss == 0 {
            if self.pass == Pass::Refine {
                if br.read_bit()? {
                    block[0] |= 1 << al;
                }
            } else if let Some(dc) = self.components[i].dc {
                let category = dc.decode(br)?;
                if category > self.max_dc_category {
                    return Err(Error::CoefficientTooLarge(category, self.max_dc_category));
                }
                let diff = extend(br.read_bits(category as usize)?, category);
                self.dc_pred[i] = self.dc_pred[i].wrapping_add(diff);
                block[0] = self.dc_pred[i].wrapping_shl(al as u32);
            }
        }
        if let Some(ac) = self.components[i].ac {
            match self.pass {
                Pass::Sequential | Pass::First => self.decode_ac(br, ac, block)?,
                Pass::Refine => self.refine_ac(br, ac, block)?,
            }
        }
        Ok(())
    }

    /// All bits above `al` of the coefficients in the band.
    fn decode_ac<R: Read>(
        &mut self,
        br: &mut BitReader<R>,
        ac: &HuffmanTable,
        block: &mut Block,
    ) -> Result<()> {
        if self.eob_run > 0 {
            self.eob_run -= 1;
            return Ok(());
        }
        let se = self.scan.se as usize;
        let mut k = self.scan.ss.max(1) as usize;
        while k <= se {
            let symbol = ac.decode(br)?;
            let (run, category) = ((symbol >> 4) as usize, symbol & 0xf);
            if category == 0 {
                if run == 15 {
                    k += 16;
                    continue;
                }
                if self.pass == Pass::First {
                    self.eob_run = (1 << run) - 1 + br.read_bits(run)? as u32;
                }
                break;
            }
            if category > self.max_ac_category {
                return Err(Error::CoefficientTooLarge(category, self.max_ac_category));
            }
            k += run;
            if k > se {
                return Err(Error::RunLengthOverflow(self.scan.se));
            }
            let value = extend(br.read_bits(category as usize)?, category);
            block[NATURAL_ORDER[k]] = value << self.scan.al;
            k += 1;
        }
        Ok(())
    }

    /// One more bit of precision for the band: a correction bit for every coefficient that is
    /// already nonzero, and a new coefficient of magnitude `1 << al` wherever one appears.
    fn refine_ac<R: Read>(
        &mut self,
        br: &mut BitReader<R>,
        ac: &HuffmanTable,
        block: &mut Block,
    ) -> Result<()> {
        let p1 = 1i32 << self.scan.al;
        let m1 = -1i32 << self.scan.al;
        let se = self.scan.se as usize;
        let mut k = self.scan.ss as usize;

        if self.eob_run == 0 {
            while k <= se {
                let symbol = ac.decode(br)?;
                let (mut run, category) = ((symbol >> 4) as usize, symbol & 0xf);
                let mut value = 0;
                if category != 0 {
                    if category != 1 {
                        return Err(Error::InvalidRefinementSymbol(symbol));
                    }
                    value = if br.read_bit()? { p1 } else { m1 };
                } else if run != 15 {
                    self.eob_run = (1 << run) + br.read_bits(run)? as u32;
                    break;
                }
                // Skip `run` zero coefficients, refining the nonzero ones passed on the way.
                while k <= se {
                    let coef = &mut block[NATURAL_ORDER[k]];
                    if *coef != 0 {
                        refine_coefficient(br, coef, p1, m1)?;
                    } else {
                        if run == 0 {
                            break;
                        }
                        run -= 1;
                    }
                    k += 1;
                }
                if value != 0 {
                    if k > se {
                        return Err(Error::RunLengthOverflow(self.scan.se));
                    }
                    block[NATURAL_ORDER[k]] = value;
                }
                k += 1;
            }
        }

        if self.eob_run > 0 {
            while k <= se {
                let coef = &mut block[NATURAL_ORDER[k]];
                if *coef != 0 {
                    refine_coefficient(br, coef, p1, m1)?;
                }
                k += 1;
            }
            self.eob_run -= 1;
        }
        Ok(())
    }
}

fn refine_coefficient<R: Read>(
    br: &mut BitReader<R>,
    coef: &mut i32,
    p1: i32,
    m1: i32,
) -> Result<()> {
    if br.read_bit()? && *coef & p1 == 0 {
        *coef += if *coef >= 0 { p1 } else { m1 };
    }
    Ok(())
}
