// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::util::tracing_wrappers::*;

const TIFF_MAGIC: u16 = 42;
const TAG_ORIENTATION: u16 = 0x0112;
const TYPE_SHORT: u16 = 3;
const IFD_ENTRY_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffByteOrder {
    LittleEndian,
    BigEndian,
}

/// The TIFF block of an APP1 `Exif` segment.
///
/// Only the header and the first IFD are interpreted; the raw block is kept for callers that
/// need more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExifMetadata {
    raw: Vec<u8>,
    byte_order: TiffByteOrder,
    orientation: Option<u16>,
}

impl ExifMetadata {
    pub fn parse(raw: Vec<u8>) -> Result<ExifMetadata> {
        if raw.len() < 8 {
            return Err(Error::InvalidExif("truncated TIFF header"));
        }
        let (byte_order, orientation) = match &raw[..2] {
            b"II" => (TiffByteOrder::LittleEndian, walk_ifd0::<LittleEndian>(&raw)?),
            b"MM" => (TiffByteOrder::BigEndian, walk_ifd0::<BigEndian>(&raw)?),
            _ => return Err(Error::InvalidExif("byte order mark")),
        };
        debug!(?byte_order, ?orientation, len = raw.len(), "EXIF");
        Ok(ExifMetadata {
            raw,
            byte_order,
            orientation,
        })
    }

    pub fn byte_order(&self) -> TiffByteOrder {
        self.byte_order
    }

    /// The orientation tag of IFD0, 1 through 8 when valid.
    pub fn orientation(&self) -> Option<u16> {
        self.orientation
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

fn walk_ifd0<B: ByteOrder>(tiff: &[u8]) -> Result<Option<u16>> {
    if B::read_u16(&tiff[2..4]) != TIFF_MAGIC {
        return Err(Error::InvalidExif("TIFF magic"));
    }
    let offset = usize::try_from(B::read_u32(&tiff[4..8]))
        .map_err(|_| Error::InvalidExif("IFD0 offset"))?;
    let table_start = offset
        .checked_add(2)
        .ok_or(Error::InvalidExif("IFD0 offset"))?;
    let entries = tiff
        .get(offset..table_start)
        .ok_or(Error::InvalidExif("IFD0 offset"))?;
    let count = B::read_u16(entries) as usize;
    let table_end = (count * IFD_ENTRY_SIZE)
        .checked_add(table_start)
        .ok_or(Error::InvalidExif("IFD0 entries"))?;
    let table = tiff
        .get(table_start..table_end)
        .ok_or(Error::InvalidExif("IFD0 entries"))?;
    for entry in table.chunks_exact(IFD_ENTRY_SIZE) {
        let tag = B::read_u16(&entry[0..2]);
        if tag != TAG_ORIENTATION {
            continue;
        }
        let kind = B::read_u16(&entry[2..4]);
        let values = B::read_u32(&entry[4..8]);
        if kind != TYPE_SHORT || values != 1 {
            warn!(kind, values, "malformed orientation tag");
            return Ok(None);
        }
        return Ok(Some(B::read_u16(&entry[8..10])));
    }
    Ok(None)
}
