// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;
use std::io::Read;

use crate::byte_reader::ByteReader;
use crate::error::{Error, Result};
use crate::marker;
use crate::util::tracing_wrappers::*;

pub const MAX_BITS_PER_CALL: usize = 16;

/// Reads bits from entropy-coded data, MSB first.
///
/// Stuffed `FF 00` pairs are returned as a single `FF` data byte. Any other marker stops the
/// stream: it is remembered, and from then on the reader produces zero bits until the marker is
/// taken with [`BitReader::take_marker`] or [`BitReader::read_restart_marker`].
pub struct BitReader<'a, R> {
    source: &'a mut ByteReader<R>,
    // Left-aligned: the next bit to be read is bit 63.
    bit_buf: u64,
    bits_in_buf: usize,
    // Zero bits pushed after the marker, at the bottom of `bit_buf`.
    fill_bits: usize,
    marker: Option<u8>,
    skip_restart_markers: bool,
}

impl<R> Debug for BitReader<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ bit_buf: {:0width$b}, marker: {:?} }}",
            self.bit_buf >> (64 - self.bits_in_buf.max(1)),
            self.marker,
            width = self.bits_in_buf
        )
    }
}

impl<'a, R: Read> BitReader<'a, R> {
    /// Starts reading entropy-coded data at the current position of `source`.
    ///
    /// With `skip_restart_markers`, `RSTn` markers met in the data are dropped silently instead
    /// of ending the stream, for scans that do not use restart intervals.
    pub fn new(source: &'a mut ByteReader<R>, skip_restart_markers: bool) -> BitReader<'a, R> {
        BitReader {
            source,
            bit_buf: 0,
            bits_in_buf: 0,
            fill_bits: 0,
            marker: None,
            skip_restart_markers,
        }
    }

    fn push_byte(&mut self, byte: u8) {
        self.bit_buf |= (byte as u64) << (56 - self.bits_in_buf);
        self.bits_in_buf += 8;
    }

    /// Fills the buffer to more than 56 bits, or as far as the source allows if at least `num`
    /// bits end up available.
    fn refill(&mut self, num: usize) -> Result<()> {
        while self.bits_in_buf <= 56 {
            if self.marker.is_some() {
                self.push_byte(0);
                self.fill_bits += 8;
                continue;
            }
            let Some(byte) = self.source.try_read_u8()? else {
                if self.bits_in_buf >= num {
                    return Ok(());
                }
                return Err(Error::UnexpectedEof);
            };
            if byte != 0xff {
                self.push_byte(byte);
                continue;
            }
            let mut next = self.source.read_u8()?;
            while next == 0xff {
                next = self.source.read_u8()?;
            }
            if next == 0 {
                self.push_byte(0xff);
            } else if self.skip_restart_markers && marker::is_restart(next) {
                trace!("skipping RST{} outside of a restart interval", next - marker::RST0);
            } else {
                trace!("marker {next:02x} ends entropy-coded data");
                self.marker = Some(next);
            }
        }
        Ok(())
    }

    /// Returns the next `num` bits without consuming them, `num <= 16`.
    /// ```
    /// # use jpgdec::byte_reader::ByteReader;
    /// # use jpgdec::bit_reader::BitReader;
    /// let mut source = ByteReader::new(&[0xab, 0xff, 0x00, 0xff, 0xd9][..]);
    /// let mut br = BitReader::new(&mut source, false);
    /// assert_eq!(br.peek_bits(12)?, 0xabf);
    /// br.consume_bits(8)?;
    /// assert_eq!(br.read_bits(8)?, 0xff);
    /// assert_eq!(br.pending_marker(), Some(0xd9));
    /// assert_eq!(br.read_bits(16)?, 0);
    /// # Ok::<(), jpgdec::error::Error>(())
    /// ```
    pub fn peek_bits(&mut self, num: usize) -> Result<u16> {
        if num > MAX_BITS_PER_CALL {
            return Err(Error::PeekTooLarge(num));
        }
        if num == 0 {
            return Ok(0);
        }
        if self.bits_in_buf < num {
            self.refill(num)?;
        }
        Ok((self.bit_buf >> (64 - num)) as u16)
    }

    /// Drops `num` bits, `num <= 16`.
    pub fn consume_bits(&mut self, num: usize) -> Result<()> {
        if num > MAX_BITS_PER_CALL {
            return Err(Error::PeekTooLarge(num));
        }
        if self.bits_in_buf < num {
            self.refill(num)?;
        }
        self.bit_buf <<= num;
        self.bits_in_buf -= num;
        self.fill_bits = self.fill_bits.min(self.bits_in_buf);
        Ok(())
    }

    pub fn read_bits(&mut self, num: usize) -> Result<u16> {
        let ret = self.peek_bits(num)?;
        self.consume_bits(num)?;
        Ok(ret)
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Drops the bits that remain in the current byte.
    pub fn advance_to_byte_boundary(&mut self) {
        let partial = self.bits_in_buf % 8;
        self.bit_buf <<= partial;
        self.bits_in_buf -= partial;
        self.fill_bits = self.fill_bits.min(self.bits_in_buf);
    }

    /// The marker that ended the data, if it was reached.
    pub fn pending_marker(&self) -> Option<u8> {
        self.marker
    }

    /// Whether every bit left before the marker has been read, so that further reads only
    /// return zero fill.
    pub fn is_exhausted(&self) -> bool {
        self.marker.is_some() && self.bits_in_buf <= self.fill_bits
    }

    /// Takes the marker that ended the data. Buffered bits are kept.
    pub fn take_marker(&mut self) -> Option<u8> {
        self.marker.take()
    }

    /// Finishes a restart interval: drops every buffered bit and returns the code of the marker
    /// that follows, reading ahead in the source if it was not reached yet.
    pub fn read_restart_marker(&mut self) -> Result<u8> {
        self.advance_to_byte_boundary();
        self.bit_buf = 0;
        self.bits_in_buf = 0;
        self.fill_bits = 0;
        match self.marker.take() {
            Some(code) => Ok(code),
            None => marker::resync(self.source),
        }
    }
}
