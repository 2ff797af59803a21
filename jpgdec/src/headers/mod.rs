// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod app;
pub mod frame;
pub mod scan;
pub mod tables;

use std::io::Read;

use crate::byte_reader::ByteReader;
use crate::error::{Error, Result};

pub use app::*;
pub use frame::*;
pub use scan::*;
pub use tables::*;

/// The body of a length-prefixed marker segment. Reads are checked against the declared length.
#[derive(Debug)]
pub struct Segment<'a, R> {
    br: &'a mut ByteReader<R>,
    remaining: usize,
    name: &'static str,
}

impl<'a, R: Read> Segment<'a, R> {
    /// Reads the length field that follows a marker.
    pub fn open(br: &'a mut ByteReader<R>, name: &'static str) -> Result<Segment<'a, R>> {
        let len = br.read_u16()?;
        if len < 2 {
            return Err(Error::InvalidSegmentLength(len));
        }
        Ok(Segment {
            br,
            remaining: len as usize - 2,
            name,
        })
    }

    /// Bytes of payload not read yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn take(&mut self, num: usize) -> Result<()> {
        if num > self.remaining {
            return Err(Error::SegmentLengthMismatch(
                self.name,
                self.remaining as isize - num as isize,
            ));
        }
        self.remaining -= num;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.take(1)?;
        self.br.read_u8()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.take(2)?;
        self.br.read_u16()
    }

    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        self.take(out.len())?;
        self.br.read_exact(out)
    }

    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        self.take(len)?;
        self.br.read_vec(len)
    }

    /// Reads whatever is left of the payload.
    pub fn read_rest(&mut self) -> Result<Vec<u8>> {
        self.read_vec(self.remaining)
    }

    pub fn skip_rest(self) -> Result<()> {
        self.br.discard(self.remaining)
    }

    /// Requires the payload to have been consumed exactly.
    pub fn finish(self) -> Result<()> {
        if self.remaining != 0 {
            return Err(Error::SegmentLengthMismatch(
                self.name,
                self.remaining as isize,
            ));
        }
        Ok(())
    }
}
