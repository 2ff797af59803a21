// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};
use crate::headers::{AdobeTransform, Component};
use crate::image::JpegColorType;
use crate::util::tracing_wrappers::*;

/// Mapping from decoded component samples to output samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTransform {
    /// Luma only, written as gray RGB.
    Grayscale,
    YCbCr,
    Rgb,
    Cmyk,
    /// YCbCr plus K, written as CMYK.
    Ycck,
}

impl ColorTransform {
    pub fn select(components: &[Component], adobe: Option<AdobeTransform>) -> Result<Self> {
        let rgb_ids = components.iter().map(|c| c.id).eq(*b"RGB");
        let transform = match (components.len(), adobe) {
            (1, _) => Self::Grayscale,
            (3, Some(AdobeTransform::Unknown)) => Self::Rgb,
            (3, Some(_)) => Self::YCbCr,
            (3, None) if rgb_ids => Self::Rgb,
            (3, None) => Self::YCbCr,
            (4, Some(AdobeTransform::Ycck)) => Self::Ycck,
            (4, _) => Self::Cmyk,
            (n, _) => return Err(Error::InvalidComponentCount(n)),
        };
        debug!(?transform, ?adobe, "color transform");
        Ok(transform)
    }

    pub fn output_type(self) -> JpegColorType {
        match self {
            Self::Grayscale | Self::YCbCr | Self::Rgb => JpegColorType::Rgb,
            Self::Cmyk | Self::Ycck => JpegColorType::Cmyk,
        }
    }

    /// Writes one row of 8-bit output samples. `planes` holds one full-resolution row per
    /// component with samples of `precision` bits; `invert` flips CMYK ink values.
    pub fn convert_row(self, planes: &[Vec<i32>], precision: u8, invert: bool, out: &mut [u8]) {
        let max = (1i32 << precision) - 1;
        let center = (1i32 << (precision - 1)) as f32;
        let to_u8 = |v: i32| scale_to_u8(v.clamp(0, max), precision);
        match self {
            Self::Grayscale => {
                for (px, &y) in out.chunks_exact_mut(3).zip(planes[0].iter()) {
                    px.fill(to_u8(y));
                }
            }
            Self::Rgb => {
                for (x, px) in out.chunks_exact_mut(3).enumerate() {
                    for (c, v) in px.iter_mut().enumerate() {
                        *v = to_u8(planes[c][x]);
                    }
                }
            }
            Self::YCbCr => {
                for (x, px) in out.chunks_exact_mut(3).enumerate() {
                    let rgb = ycbcr_to_rgb(planes[0][x], planes[1][x], planes[2][x], center);
                    for (v, s) in px.iter_mut().zip(rgb) {
                        *v = to_u8(s);
                    }
                }
            }
            Self::Cmyk => {
                for (x, px) in out.chunks_exact_mut(4).enumerate() {
                    for (c, v) in px.iter_mut().enumerate() {
                        *v = to_u8(planes[c][x]);
                    }
                }
            }
            Self::Ycck => {
                for (x, px) in out.chunks_exact_mut(4).enumerate() {
                    let rgb = ycbcr_to_rgb(planes[0][x], planes[1][x], planes[2][x], center);
                    for (v, s) in px.iter_mut().zip(rgb) {
                        *v = to_u8(max - s.clamp(0, max));
                    }
                    px[3] = to_u8(planes[3][x]);
                }
            }
        }
        if invert && self.output_type() == JpegColorType::Cmyk {
            out.iter_mut().for_each(|v| *v = 255 - *v);
        }
    }
}

/// Full-range BT.601 as defined by JFIF (ITU-T T.871), rounded to the nearest integer.
fn ycbcr_to_rgb(y: i32, cb: i32, cr: i32, center: f32) -> [i32; 3] {
    let y = y as f32;
    let cb = cb as f32 - center;
    let cr = cr as f32 - center;
    [
        cr.mul_add(1.402, y),
        cr.mul_add(-0.714_136, cb.mul_add(-0.344_136, y)),
        cb.mul_add(1.772, y),
    ]
    .map(|v| v.round() as i32)
}

fn scale_to_u8(v: i32, precision: u8) -> u8 {
    if precision == 8 {
        return v as u8;
    }
    let max = (1i32 << precision) - 1;
    ((v * 255 + max / 2) / max) as u8
}
