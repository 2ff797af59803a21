// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! From reconstructed samples in the macroblock grid to the output raster.

pub mod color;
pub mod upsample;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use color::ColorTransform;

use crate::error::Result;
use crate::headers::FrameHeader;
use crate::image::{MacroblockGrid, RasterFrame};
use upsample::upsample_row;

/// Composes the raster: every component is brought to full resolution, then converted to 8-bit
/// output samples row by row.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
pub fn render(
    frame: &FrameHeader,
    grid: &MacroblockGrid,
    transform: ColorTransform,
    invert_cmyk: bool,
) -> Result<RasterFrame> {
    let mut raster = RasterFrame::new(frame.width, frame.height, transform.output_type())?;
    let stride = raster.row_stride();
    // Full-resolution rows of every component, reused across the rows a worker renders.
    let new_planes = || vec![vec![0i32; frame.width]; frame.components.len()];
    let render_row = |planes: &mut Vec<Vec<i32>>, (y, out): (usize, &mut [u8])| {
        for (component, row) in frame.components.iter().zip(planes.iter_mut()) {
            upsample_row(frame, grid, component, y, row);
        }
        transform.convert_row(planes, frame.precision, invert_cmyk, out);
    };
    #[cfg(feature = "parallel")]
    raster
        .data_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each_init(new_planes, render_row);
    #[cfg(not(feature = "parallel"))]
    {
        let mut planes = new_planes();
        for row in raster.data_mut().chunks_mut(stride).enumerate() {
            render_row(&mut planes, row);
        }
    }
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::headers::Component;
    use crate::image::JpegColorType;
    use crate::marker::CodingProcess;

    fn frame_420(width: usize, height: usize) -> FrameHeader {
        let component = |id, index, samp| Component {
            id,
            index,
            h_samp: samp,
            v_samp: samp,
            quant_table: 0,
        };
        FrameHeader {
            process: CodingProcess::Progressive,
            precision: 8,
            width,
            height,
            components: vec![component(1, 0, 2), component(2, 1, 1), component(3, 2, 1)],
            max_h_samp: 2,
            max_v_samp: 2,
            hpadded_count: width.div_ceil(16) * 2,
            vpadded_count: height.div_ceil(16) * 2,
        }
    }

    #[test]
    fn subsampled_chroma_covers_two_by_two_pixels() -> Result<()> {
        let frame = frame_420(12, 10);
        let mut grid = MacroblockGrid::new(&frame)?;
        for mb_y in 0..2 {
            for mb_x in 0..2 {
                grid.block_mut(mb_x, mb_y, 0).fill(100);
            }
        }
        grid.block_mut(0, 0, 1).fill(128);
        grid.block_mut(0, 0, 2).fill(128);
        grid.block_mut(0, 0, 2)[0] = 200;
        let raster = render(&frame, &grid, ColorTransform::YCbCr, false)?;
        assert_eq!(raster.size(), (12, 10));
        assert_eq!(raster.color_type(), JpegColorType::Rgb);
        let tinted = raster.pixel(0, 0).to_vec();
        assert!(tinted[0] > 150);
        for (x, y) in [(1, 0), (0, 1), (1, 1)] {
            assert_eq!(raster.pixel(x, y), &tinted[..]);
        }
        for (x, y) in [(2, 0), (0, 2), (11, 9)] {
            assert_eq!(raster.pixel(x, y), &[100, 100, 100]);
        }
        Ok(())
    }

    #[test]
    fn cmyk_inversion() -> Result<()> {
        let component = |id, index| Component {
            id,
            index,
            h_samp: 1,
            v_samp: 1,
            quant_table: 0,
        };
        let frame = FrameHeader {
            process: CodingProcess::Baseline,
            precision: 8,
            width: 3,
            height: 2,
            components: (0..4).map(|i| component(i as u8 + 1, i)).collect(),
            max_h_samp: 1,
            max_v_samp: 1,
            hpadded_count: 1,
            vpadded_count: 1,
        };
        let mut grid = MacroblockGrid::new(&frame)?;
        for c in 0..4 {
            grid.block_mut(0, 0, c).fill(10 * c as i32);
        }
        let plain = render(&frame, &grid, ColorTransform::Cmyk, false)?;
        assert_eq!(plain.color_type(), JpegColorType::Cmyk);
        assert_eq!(plain.pixel(2, 1), &[0, 10, 20, 30]);
        let inverted = render(&frame, &grid, ColorTransform::Cmyk, true)?;
        assert_eq!(inverted.pixel(2, 1), &[255, 245, 235, 225]);
        assert_eq!(inverted.data().len(), 3 * 2 * 4);
        Ok(())
    }
}
