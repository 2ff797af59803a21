// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::Segment;
use crate::error::Result;
use crate::util::tracing_wrappers::*;

const JFIF_ID: &[u8] = b"JFIF\0";
const EXIF_ID: &[u8] = b"Exif\0\0";
const ICC_ID: &[u8] = b"ICC_PROFILE\0";
const ADOBE_ID: &[u8] = b"Adobe";
const ADOBE_PAYLOAD_LEN: usize = 12;

/// Color transform announced by an Adobe APP14 segment.
#[derive(Debug, FromPrimitive, Clone, Copy, PartialEq, Eq)]
pub enum AdobeTransform {
    /// RGB or CMYK, stored as-is.
    Unknown = 0,
    YCbCr = 1,
    Ycck = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JfifHeader {
    pub version: (u8, u8),
    pub density_units: u8,
    pub x_density: u16,
    pub y_density: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppSegment {
    Jfif(JfifHeader),
    Exif(Vec<u8>),
    IccChunk {
        sequence: u8,
        count: u8,
        data: Vec<u8>,
    },
    Adobe(AdobeTransform),
    /// Anything not recognized, including recognized identifiers with unusable payloads.
    Unknown,
}

impl AppSegment {
    /// Reads the payload of an APPn segment. Never fails on the content, only on I/O.
    pub fn read<R: Read>(mut seg: Segment<R>, n: u8) -> Result<AppSegment> {
        if !matches!(n, 0 | 1 | 2 | 14) {
            trace!(n, len = seg.remaining(), "skipping APP segment");
            seg.skip_rest()?;
            return Ok(AppSegment::Unknown);
        }
        let payload = seg.read_rest()?;
        seg.finish()?;
        Ok(AppSegment::parse(n, payload))
    }

    fn parse(n: u8, mut payload: Vec<u8>) -> AppSegment {
        match n {
            0 if payload.starts_with(JFIF_ID) && payload.len() >= JFIF_ID.len() + 7 => {
                let p = &payload[JFIF_ID.len()..];
                let header = JfifHeader {
                    version: (p[0], p[1]),
                    density_units: p[2],
                    x_density: BigEndian::read_u16(&p[3..5]),
                    y_density: BigEndian::read_u16(&p[5..7]),
                };
                debug!(?header, "JFIF");
                AppSegment::Jfif(header)
            }
            1 if payload.starts_with(EXIF_ID) => {
                payload.drain(..EXIF_ID.len());
                AppSegment::Exif(payload)
            }
            2 if payload.starts_with(ICC_ID) => {
                if payload.len() < ICC_ID.len() + 2 {
                    warn!("ICC chunk without sequence numbers");
                    return AppSegment::Unknown;
                }
                let sequence = payload[ICC_ID.len()];
                let count = payload[ICC_ID.len() + 1];
                payload.drain(..ICC_ID.len() + 2);
                AppSegment::IccChunk {
                    sequence,
                    count,
                    data: payload,
                }
            }
            14 if payload.starts_with(ADOBE_ID) => {
                if payload.len() < ADOBE_PAYLOAD_LEN {
                    warn!(len = payload.len(), "short Adobe segment");
                    return AppSegment::Unknown;
                }
                // "Adobe", version, flags0, flags1, transform.
                let value = payload[11];
                match AdobeTransform::from_u8(value) {
                    Some(transform) => {
                        debug!(?transform, "Adobe color transform");
                        AppSegment::Adobe(transform)
                    }
                    None => {
                        warn!(value, "unknown Adobe color transform");
                        AppSegment::Unknown
                    }
                }
            }
            _ => AppSegment::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::byte_reader::ByteReader;

    fn read(n: u8, payload: &[u8]) -> Result<AppSegment> {
        let mut data = ((payload.len() + 2) as u16).to_be_bytes().to_vec();
        data.extend_from_slice(payload);
        data.push(0x42);
        let mut br = ByteReader::new(&data[..]);
        let ret = AppSegment::read(Segment::open(&mut br, "APP")?, n)?;
        assert_eq!(br.read_u8()?, 0x42);
        Ok(ret)
    }

    #[test]
    fn jfif() -> Result<()> {
        let segment = read(0, b"JFIF\0\x01\x02\x01\x00\x48\x00\x48\x00\x00")?;
        assert_eq!(
            segment,
            AppSegment::Jfif(JfifHeader {
                version: (1, 2),
                density_units: 1,
                x_density: 72,
                y_density: 72,
            })
        );
        Ok(())
    }

    #[test]
    fn adobe() -> Result<()> {
        assert_eq!(
            read(14, b"Adobe\x00\x64\x00\x00\x00\x00\x02")?,
            AppSegment::Adobe(AdobeTransform::Ycck)
        );
        assert_eq!(
            read(14, b"Adobe\x00\x64\x00\x00\x00\x00\x00")?,
            AppSegment::Adobe(AdobeTransform::Unknown)
        );
        assert_eq!(read(14, b"Adobe\x00\x64")?, AppSegment::Unknown);
        assert_eq!(
            read(14, b"Adobe\x00\x64\x00\x00\x00\x00\x07")?,
            AppSegment::Unknown
        );
        Ok(())
    }

    #[test]
    fn icc_and_exif() -> Result<()> {
        assert_eq!(
            read(2, b"ICC_PROFILE\0\x02\x03abc")?,
            AppSegment::IccChunk {
                sequence: 2,
                count: 3,
                data: b"abc".to_vec()
            }
        );
        assert_eq!(read(2, b"ICC_PROFILE\0\x01")?, AppSegment::Unknown);
        assert_eq!(
            read(1, b"Exif\0\0MM\0\x2a")?,
            AppSegment::Exif(b"MM\0\x2a".to_vec())
        );
        assert_eq!(
            read(1, b"http://ns.adobe.com/xap/1.0/\0<x/>")?,
            AppSegment::Unknown
        );
        Ok(())
    }

    #[test]
    fn other_segments_are_skipped() -> Result<()> {
        assert_eq!(read(13, &[0x11; 300])?, AppSegment::Unknown);
        assert_eq!(read(0, b"JFXX\0\x10")?, AppSegment::Unknown);
        Ok(())
    }
}
