// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::tables::ZIGZAG;

/// Packs bits MSB first into entropy-coded bytes, stuffing a zero after every `0xFF`.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    bits: usize,
}

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    /// Appends the low `num` bits of `value`, `num <= 16`.
    pub fn write(&mut self, value: u32, num: usize) {
        assert!(num <= 16);
        if num == 0 {
            return;
        }
        self.acc = (self.acc << num) | (value & ((1 << num) - 1));
        self.bits += num;
        while self.bits >= 8 {
            self.bits -= 8;
            let byte = (self.acc >> self.bits) as u8;
            self.out.push(byte);
            if byte == 0xff {
                self.out.push(0);
            }
        }
        self.acc &= (1 << self.bits) - 1;
    }

    /// Pads the current byte with one bits.
    pub fn pad(&mut self) {
        if self.bits > 0 {
            let num = 8 - self.bits;
            self.write((1 << num) - 1, num);
        }
    }

    /// Pads and returns the stuffed bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.pad();
        self.out
    }
}

/// Magnitude category and the raw bits that encode `value` after it.
pub fn magnitude(value: i32) -> (u8, u32) {
    let category = 32 - value.unsigned_abs().leading_zeros();
    let bits = if value < 0 {
        (value - 1) as u32 & ((1u32 << category) - 1)
    } else {
        value as u32
    };
    (category as u8, bits)
}

/// Encoder side of a canonical Huffman table.
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    codes: Vec<Option<(u16, usize)>>,
}

impl HuffmanEncoder {
    pub fn new(counts: &[u8; 16], symbols: &[u8]) -> HuffmanEncoder {
        let mut codes = vec![None; 256];
        let mut code = 0u32;
        let mut k = 0;
        for len in 1..=16 {
            for _ in 0..counts[len - 1] {
                assert!(code < 1 << len, "oversubscribed table");
                codes[symbols[k] as usize] = Some((code as u16, len));
                code += 1;
                k += 1;
            }
            code <<= 1;
        }
        HuffmanEncoder { codes }
    }

    pub fn encode(&self, writer: &mut BitWriter, symbol: u8) {
        let (code, len) = self.codes[symbol as usize]
            .unwrap_or_else(|| panic!("symbol {symbol:#04x} has no code"));
        writer.write(code as u32, len);
    }

    /// Writes the magnitude category of `value` as a symbol (plus `run << 4`), then its bits.
    pub fn encode_value(&self, writer: &mut BitWriter, run: u8, value: i32) {
        let (category, bits) = magnitude(value);
        self.encode(writer, (run << 4) | category);
        writer.write(bits, category as usize);
    }
}

/// Sequential encoding of one block given in natural order. Returns the block's DC value, which
/// is the next predictor.
pub fn encode_block(
    writer: &mut BitWriter,
    dc: &HuffmanEncoder,
    ac: &HuffmanEncoder,
    pred: i32,
    coefficients: &[i32; 64],
) -> i32 {
    dc.encode_value(writer, 0, coefficients[0] - pred);
    let mut run = 0u8;
    for k in 1..64 {
        let value = coefficients[ZIGZAG[k]];
        if value == 0 {
            run += 1;
            continue;
        }
        while run >= 16 {
            ac.encode(writer, 0xf0);
            run -= 16;
        }
        ac.encode_value(writer, run, value);
        run = 0;
    }
    if run > 0 {
        ac.encode(writer, 0x00);
    }
    coefficients[0]
}

/// Builds a stream segment by segment.
#[derive(Debug, Default, Clone)]
pub struct JpegWriter {
    data: Vec<u8>,
}

impl JpegWriter {
    pub fn new() -> JpegWriter {
        JpegWriter::default()
    }

    pub fn marker(&mut self, code: u8) -> &mut Self {
        self.data.extend_from_slice(&[0xff, code]);
        self
    }

    /// A marker with a length-prefixed payload.
    pub fn segment(&mut self, code: u8, payload: &[u8]) -> &mut Self {
        let len = payload.len() + 2;
        assert!(len <= 0xffff);
        self.marker(code);
        self.data.extend_from_slice(&(len as u16).to_be_bytes());
        self.data.extend_from_slice(payload);
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn soi(&mut self) -> &mut Self {
        self.marker(0xd8)
    }

    pub fn eoi(&mut self) -> &mut Self {
        self.marker(0xd9)
    }

    pub fn rst(&mut self, n: u8) -> &mut Self {
        self.marker(0xd0 + (n & 7))
    }

    /// Quantization table given in natural order. Uses 16-bit entries only if needed.
    pub fn dqt(&mut self, id: u8, table: &[u16; 64]) -> &mut Self {
        let wide = table.iter().any(|&q| q > 255);
        let mut payload = vec![((wide as u8) << 4) | id];
        for &pos in ZIGZAG.iter() {
            if wide {
                payload.extend_from_slice(&table[pos].to_be_bytes());
            } else {
                payload.push(table[pos] as u8);
            }
        }
        self.segment(0xdb, &payload)
    }

    /// `class` is 0 for DC and 1 for AC.
    pub fn dht(&mut self, class: u8, id: u8, counts: &[u8; 16], symbols: &[u8]) -> &mut Self {
        let mut payload = vec![(class << 4) | id];
        payload.extend_from_slice(counts);
        payload.extend_from_slice(symbols);
        self.segment(0xc4, &payload)
    }

    /// Frame header; `components` holds `(id, h, v, quant_table)`.
    pub fn sof(
        &mut self,
        code: u8,
        precision: u8,
        width: u16,
        height: u16,
        components: &[(u8, u8, u8, u8)],
    ) -> &mut Self {
        let mut payload = vec![precision];
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&width.to_be_bytes());
        payload.push(components.len() as u8);
        for &(id, h, v, tq) in components {
            payload.extend_from_slice(&[id, (h << 4) | v, tq]);
        }
        self.segment(code, &payload)
    }

    pub fn dri(&mut self, interval: u16) -> &mut Self {
        self.segment(0xdd, &interval.to_be_bytes())
    }

    /// Scan header; `components` holds `(id, dc_table, ac_table)`.
    pub fn sos(
        &mut self,
        components: &[(u8, u8, u8)],
        ss: u8,
        se: u8,
        ah: u8,
        al: u8,
    ) -> &mut Self {
        let mut payload = vec![components.len() as u8];
        for &(id, td, ta) in components {
            payload.extend_from_slice(&[id, (td << 4) | ta]);
        }
        payload.extend_from_slice(&[ss, se, (ah << 4) | al]);
        self.segment(0xda, &payload)
    }

    pub fn app(&mut self, n: u8, payload: &[u8]) -> &mut Self {
        self.segment(0xe0 + n, payload)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{STD_DC_LUMA_COUNTS, STD_DC_LUMA_SYMBOLS};

    #[test]
    fn stuffing_and_padding() {
        let mut writer = BitWriter::new();
        writer.write(0xff, 8);
        writer.write(0b10, 2);
        assert_eq!(writer.finish(), vec![0xff, 0x00, 0b1011_1111]);
    }

    #[test]
    fn magnitudes() {
        assert_eq!(magnitude(0), (0, 0));
        assert_eq!(magnitude(10), (4, 0b1010));
        assert_eq!(magnitude(-10), (4, 0b0101));
        assert_eq!(magnitude(-1), (1, 0));
        assert_eq!(magnitude(1024), (11, 1024));
    }

    #[test]
    fn dc_codes() {
        let enc = HuffmanEncoder::new(&STD_DC_LUMA_COUNTS, &STD_DC_LUMA_SYMBOLS);
        let mut writer = BitWriter::new();
        // Category 0 is "00", category 11 is "111111110".
        enc.encode(&mut writer, 0);
        enc.encode(&mut writer, 11);
        assert_eq!(writer.finish(), vec![0b0011_1111, 0b1101_1111]);
    }

    #[test]
    fn segments() {
        let mut writer = JpegWriter::new();
        writer.soi().dri(3).eoi();
        assert_eq!(
            writer.into_bytes(),
            vec![0xff, 0xd8, 0xff, 0xdd, 0x00, 0x04, 0x00, 0x03, 0xff, 0xd9]
        );
    }
}
