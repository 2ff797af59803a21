// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use jpgdec::{JpegColorType, RasterFrame};

pub mod png;
pub mod pnm;

/// Interleaved 8-bit samples ready to be written, with 1 or 3 channels.
pub struct OutputImage {
    pub size: (usize, usize),
    pub num_channels: usize,
    pub data: Vec<u8>,
}

impl OutputImage {
    /// Grayscale images become single-channel again; CMYK is turned into a rough RGB preview.
    pub fn from_frame(frame: &RasterFrame, natural_format: JpegColorType) -> OutputImage {
        let data = frame.data();
        let (num_channels, data) = match (frame.color_type(), natural_format) {
            (JpegColorType::Rgb, JpegColorType::Grayscale) => {
                (1, data.chunks_exact(3).map(|px| px[0]).collect())
            }
            (JpegColorType::Cmyk, _) => (3, data.chunks_exact(4).flat_map(cmyk_to_rgb).collect()),
            (color_type, _) => (color_type.samples_per_pixel(), data.to_vec()),
        };
        OutputImage {
            size: frame.size(),
            num_channels,
            data,
        }
    }
}

fn cmyk_to_rgb(px: &[u8]) -> [u8; 3] {
    let k = 255 - px[3] as u32;
    [0, 1, 2].map(|c| ((255 - px[c] as u32) * k / 255) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmyk_preview() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 0, 0]), [0, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[55, 0, 255, 51]), [160, 204, 0]);
    }
}
