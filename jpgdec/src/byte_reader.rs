// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;
use std::io::{ErrorKind, Read};

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

const CHUNK_SIZE: usize = 4096;

/// Buffered forward-only reader over the compressed stream.
///
/// Bytes are pulled from the source in fixed-size chunks; the chunking is not observable
/// through this interface.
pub struct ByteReader<R> {
    source: R,
    buf: Box<[u8; CHUNK_SIZE]>,
    pos: usize,
    len: usize,
    offset: usize,
}

impl<R> Debug for ByteReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ByteReader{{ offset: {}, buffered: {} }}",
            self.offset,
            self.len - self.pos
        )
    }
}

impl<R: Read> ByteReader<R> {
    pub fn new(source: R) -> ByteReader<R> {
        ByteReader {
            source,
            buf: Box::new([0; CHUNK_SIZE]),
            pos: 0,
            len: 0,
            offset: 0,
        }
    }

    /// Returns the absolute number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Makes sure at least one byte is buffered. Returns `false` at the end of the source.
    fn fill(&mut self) -> Result<bool> {
        if self.pos < self.len {
            return Ok(true);
        }
        loop {
            match self.source.read(&mut self.buf[..]) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reads one byte, or returns `None` at the end of the source.
    pub fn try_read_u8(&mut self) -> Result<Option<u8>> {
        if !self.fill()? {
            return Ok(None);
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        self.offset += 1;
        Ok(Some(byte))
    }

    /// Reads one byte.
    /// ```
    /// # use jpgdec::byte_reader::ByteReader;
    /// let mut br = ByteReader::new(&[0xff, 0xd8][..]);
    /// assert_eq!(br.read_u8()?, 0xff);
    /// assert_eq!(br.read_u8()?, 0xd8);
    /// assert!(br.read_u8().is_err());
    /// # Ok::<(), jpgdec::error::Error>(())
    /// ```
    pub fn read_u8(&mut self) -> Result<u8> {
        self.try_read_u8()?.ok_or(Error::UnexpectedEof)
    }

    /// Reads a big-endian 16-bit integer.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut bytes = [0u8; 2];
        self.read_exact(&mut bytes)?;
        Ok(BigEndian::read_u16(&bytes))
    }

    /// Fills `out` completely.
    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        let mut written = 0;
        while written < out.len() {
            if !self.fill()? {
                return Err(Error::UnexpectedEof);
            }
            let n = (self.len - self.pos).min(out.len() - written);
            out[written..written + n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
            self.pos += n;
            self.offset += n;
            written += n;
        }
        Ok(())
    }

    /// Reads `len` bytes into a freshly allocated vector.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut ret = Vec::new();
        ret.try_reserve_exact(len)?;
        ret.resize(len, 0);
        self.read_exact(&mut ret)?;
        Ok(ret)
    }

    /// Skips `num` bytes.
    /// ```
    /// # use jpgdec::byte_reader::ByteReader;
    /// let mut br = ByteReader::new(&[1, 2, 3, 4][..]);
    /// br.discard(3)?;
    /// assert_eq!(br.offset(), 3);
    /// assert_eq!(br.read_u8()?, 4);
    /// # Ok::<(), jpgdec::error::Error>(())
    /// ```
    pub fn discard(&mut self, mut num: usize) -> Result<()> {
        while num > 0 {
            if !self.fill()? {
                return Err(Error::UnexpectedEof);
            }
            let n = (self.len - self.pos).min(num);
            self.pos += n;
            self.offset += n;
            num -= n;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use test_log::test;

    use super::*;

    /// Hands out at most `step` bytes per `read` call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn reads_big_endian() -> Result<()> {
        let mut br = ByteReader::new(&[0x12, 0x34, 0xab][..]);
        assert_eq!(br.read_u16()?, 0x1234);
        assert_eq!(br.offset(), 2);
        assert!(matches!(br.read_u16(), Err(Error::UnexpectedEof)));
        Ok(())
    }

    #[test]
    fn spans_chunks() -> Result<()> {
        let data: Vec<u8> = (0..3 * CHUNK_SIZE + 17).map(|x| x as u8).collect();
        let mut br = ByteReader::new(Trickle {
            data: &data,
            step: 1000,
        });
        br.discard(CHUNK_SIZE - 1)?;
        let mut out = vec![0u8; CHUNK_SIZE + 2];
        br.read_exact(&mut out)?;
        assert_eq!(&out[..], &data[CHUNK_SIZE - 1..2 * CHUNK_SIZE + 1]);
        assert_eq!(br.offset(), 2 * CHUNK_SIZE + 1);
        let rest = br.read_vec(CHUNK_SIZE + 16)?;
        assert_eq!(rest.last(), data.last());
        assert_eq!(br.try_read_u8()?, None);
        Ok(())
    }

    #[test]
    fn discard_past_end() {
        let mut br = ByteReader::new(&[1, 2][..]);
        assert!(matches!(br.discard(3), Err(Error::UnexpectedEof)));
    }
}
