// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Read;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::byte_reader::ByteReader;
use crate::error::{Error, Result, UnsupportedFeature};
use crate::util::tracing_wrappers::*;

pub const RST0: u8 = 0xd0;

/// Marker codes, the byte that follows `0xFF`. Codes missing here (`JPGn`, `0x02..=0xbf`) are
/// reserved and carry a length.
#[derive(Debug, FromPrimitive, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Marker {
    Tem = 0x01,
    Sof0 = 0xc0,
    Sof1 = 0xc1,
    Sof2 = 0xc2,
    Sof3 = 0xc3,
    Dht = 0xc4,
    Sof5 = 0xc5,
    Sof6 = 0xc6,
    Sof7 = 0xc7,
    Jpg = 0xc8,
    Sof9 = 0xc9,
    Sof10 = 0xca,
    Sof11 = 0xcb,
    Dac = 0xcc,
    Sof13 = 0xcd,
    Sof14 = 0xce,
    Sof15 = 0xcf,
    Rst0 = 0xd0,
    Rst1 = 0xd1,
    Rst2 = 0xd2,
    Rst3 = 0xd3,
    Rst4 = 0xd4,
    Rst5 = 0xd5,
    Rst6 = 0xd6,
    Rst7 = 0xd7,
    Soi = 0xd8,
    Eoi = 0xd9,
    Sos = 0xda,
    Dqt = 0xdb,
    Dnl = 0xdc,
    Dri = 0xdd,
    Dhp = 0xde,
    Exp = 0xdf,
    App0 = 0xe0,
    App1 = 0xe1,
    App2 = 0xe2,
    App3 = 0xe3,
    App4 = 0xe4,
    App5 = 0xe5,
    App6 = 0xe6,
    App7 = 0xe7,
    App8 = 0xe8,
    App9 = 0xe9,
    App10 = 0xea,
    App11 = 0xeb,
    App12 = 0xec,
    App13 = 0xed,
    App14 = 0xee,
    App15 = 0xef,
    Com = 0xfe,
}

/// DCT coding processes that can be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingProcess {
    Baseline,
    ExtendedSequential,
    Progressive,
}

impl CodingProcess {
    pub fn is_progressive(self) -> bool {
        self == CodingProcess::Progressive
    }
}

pub fn is_restart(code: u8) -> bool {
    (RST0..=RST0 + 7).contains(&code)
}

impl Marker {
    pub fn from_code(code: u8) -> Option<Marker> {
        Marker::from_u8(code)
    }

    /// For start-of-frame markers, the coding process they announce.
    pub fn frame_type(self) -> Option<std::result::Result<CodingProcess, UnsupportedFeature>> {
        use Marker::*;
        Some(match self {
            Sof0 => Ok(CodingProcess::Baseline),
            Sof1 => Ok(CodingProcess::ExtendedSequential),
            Sof2 => Ok(CodingProcess::Progressive),
            Sof3 | Sof11 => Err(UnsupportedFeature::Lossless),
            Sof5 | Sof6 | Sof7 | Sof13 | Sof14 | Sof15 => Err(UnsupportedFeature::Hierarchical),
            Sof9 | Sof10 => Err(UnsupportedFeature::ArithmeticCoding),
            _ => return None,
        })
    }

    /// Markers that stand alone, without a length-prefixed segment.
    pub fn is_standalone(self) -> bool {
        use Marker::*;
        matches!(
            self,
            Tem | Soi | Eoi | Rst0 | Rst1 | Rst2 | Rst3 | Rst4 | Rst5 | Rst6 | Rst7
        )
    }

    /// APPn number for application segments.
    pub fn app_number(self) -> Option<u8> {
        let code = self as u8;
        (0xe0..=0xef).contains(&code).then(|| code - 0xe0)
    }
}

/// Reads the marker that must start at the current position, skipping fill bytes.
pub fn read_marker<R: Read>(br: &mut ByteReader<R>) -> Result<u8> {
    let first = br.read_u8()?;
    if first != 0xff {
        return Err(Error::ExpectedMarker(first));
    }
    let mut code = br.read_u8()?;
    while code == 0xff {
        code = br.read_u8()?;
    }
    if code == 0 {
        return Err(Error::ExpectedMarker(code));
    }
    Ok(code)
}

/// Scans forward to the next marker after entropy-coded data, skipping stuffed bytes and
/// anything else that is not a marker.
pub fn resync<R: Read>(br: &mut ByteReader<R>) -> Result<u8> {
    let mut skipped = 0usize;
    loop {
        let byte = br.read_u8()?;
        if byte != 0xff {
            skipped += 1;
            continue;
        }
        let mut code = br.read_u8()?;
        while code == 0xff {
            code = br.read_u8()?;
        }
        if code == 0 {
            skipped += 2;
            continue;
        }
        if skipped > 0 {
            warn!("skipped {skipped} bytes before marker {code:02x}");
        }
        return Ok(code);
    }
}
