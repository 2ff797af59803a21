// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use crate::bit_reader::BitReader;
use crate::error::{Error, Result};

pub const HUFFMAN_MAX_BITS: usize = 16;
pub const HUFFMAN_MAX_SYMBOLS: usize = 256;
const FAST_BITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClass {
    Dc,
    Ac,
}

impl TableClass {
    pub fn name(self) -> &'static str {
        match self {
            TableClass::Dc => "DC",
            TableClass::Ac => "AC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlowEntry {
    code: u16,
    len: u8,
    symbol: u8,
}

/// A canonical Huffman code as transmitted in a DHT segment.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    counts: [u8; HUFFMAN_MAX_BITS],
    symbols: Vec<u8>,
    codes: Vec<u16>,
    // Indexed by the next 8 bits: (code length, symbol). Length 0 marks a longer code.
    fast: [(u8, u8); 1 << FAST_BITS],
    // Codes longer than FAST_BITS, by increasing length.
    slow: Vec<SlowEntry>,
}

impl HuffmanTable {
    /// Assigns canonical codes to `symbols` given the number of codes of each length 1..=16.
    pub fn build(counts: &[u8; HUFFMAN_MAX_BITS], symbols: &[u8]) -> Result<HuffmanTable> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total > HUFFMAN_MAX_SYMBOLS {
            return Err(Error::HuffmanTableTooLarge(total));
        }
        if symbols.len() != total {
            return Err(Error::HuffmanSymbolCountMismatch(symbols.len(), total));
        }

        let mut codes = Vec::with_capacity(total);
        let mut fast = [(0u8, 0u8); 1 << FAST_BITS];
        let mut slow = Vec::new();
        let mut code = 0u32;
        let mut k = 0;
        for len in 1..=HUFFMAN_MAX_BITS {
            for _ in 0..counts[len - 1] {
                if code >= 1 << len {
                    return Err(Error::HuffmanTableOversubscribed(len));
                }
                let symbol = symbols[k];
                if len <= FAST_BITS {
                    let shift = FAST_BITS - len;
                    let first = (code as usize) << shift;
                    for entry in fast[first..first + (1 << shift)].iter_mut() {
                        *entry = (len as u8, symbol);
                    }
                } else {
                    slow.push(SlowEntry {
                        code: code as u16,
                        len: len as u8,
                        symbol,
                    });
                }
                codes.push(code as u16);
                code += 1;
                k += 1;
            }
            code <<= 1;
        }

        Ok(HuffmanTable {
            counts: *counts,
            symbols: symbols.to_vec(),
            codes,
            fast,
            slow,
        })
    }

    pub fn counts(&self) -> &[u8; HUFFMAN_MAX_BITS] {
        &self.counts
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Returns the `(code, length)` assigned to `symbol`.
    pub fn code_for(&self, symbol: u8) -> Option<(u16, usize)> {
        let k = self.symbols.iter().position(|&s| s == symbol)?;
        let mut first = 0;
        for (i, &count) in self.counts.iter().enumerate() {
            if k < first + count as usize {
                return Some((self.codes[k], i + 1));
            }
            first += count as usize;
        }
        None
    }

    pub fn decode<R: Read>(&self, br: &mut BitReader<R>) -> Result<u8> {
        let bits = br.peek_bits(HUFFMAN_MAX_BITS)?;
        let (len, symbol) = self.fast[(bits >> (HUFFMAN_MAX_BITS - FAST_BITS)) as usize];
        if len != 0 {
            br.consume_bits(len as usize)?;
            return Ok(symbol);
        }
        for entry in self.slow.iter() {
            if bits >> (HUFFMAN_MAX_BITS - entry.len as usize) == entry.code {
                br.consume_bits(entry.len as usize)?;
                return Ok(entry.symbol);
            }
        }
        Err(Error::InvalidHuffmanCode)
    }
}
