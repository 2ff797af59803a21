// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::f32::consts::SQRT_2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::headers::{FrameHeader, QuantizationTable};
use crate::image::{Block, MacroblockGrid};
use crate::{BLOCK_DIM, BLOCK_SIZE};

/// `cos(k * pi / 16) * sqrt(2)` for `k > 0`, and 1 for `k = 0`.
const AAN_SCALES: [f32; BLOCK_DIM] = [
    1.0,
    1.387_039_8,
    1.306_563,
    1.175_875_6,
    1.0,
    0.785_694_96,
    0.541_196_1,
    0.275_899_38,
];

const fn prescale_table() -> [f32; BLOCK_SIZE] {
    let mut table = [0.0; BLOCK_SIZE];
    let mut i = 0;
    while i < BLOCK_SIZE {
        table[i] = AAN_SCALES[i / BLOCK_DIM] * AAN_SCALES[i % BLOCK_DIM];
        i += 1;
    }
    table
}

const PRESCALE: [f32; BLOCK_SIZE] = prescale_table();

/// Scaled 8-point inverse DCT with 5 multiplications (Arai, Agui, Nakajima). Inputs must be
/// prescaled by `AAN_SCALES`; outputs are 8 times the orthonormal transform's.
#[inline(always)]
fn idct1d(v: [f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    // Even part.
    let tmp10 = v[0] + v[4];
    let tmp11 = v[0] - v[4];
    let tmp13 = v[2] + v[6];
    let tmp12 = (v[2] - v[6]) * SQRT_2 - tmp13;
    let e0 = tmp10 + tmp13;
    let e3 = tmp10 - tmp13;
    let e1 = tmp11 + tmp12;
    let e2 = tmp11 - tmp12;

    // Odd part.
    let z13 = v[5] + v[3];
    let z10 = v[5] - v[3];
    let z11 = v[1] + v[7];
    let z12 = v[1] - v[7];
    let o7 = z11 + z13;
    let tmp11 = (z11 - z13) * SQRT_2;
    let z5 = (z10 + z12) * 1.847_759;
    let tmp10 = z5 - z12 * 1.082_392_2;
    let tmp12 = z5 - z10 * 2.613_126;
    let o6 = tmp12 - o7;
    let o5 = tmp11 - o6;
    let o4 = tmp10 - o5;

    [
        e0 + o7,
        e1 + o6,
        e2 + o5,
        e3 + o4,
        e3 - o4,
        e2 - o5,
        e1 - o6,
        e0 - o7,
    ]
}

/// Replaces the quantized coefficients of `block`, in natural order, by samples of `precision`
/// bits: dequantization, inverse DCT, level shift and clamping.
pub fn dequantize_and_idct(block: &mut Block, quant: &QuantizationTable, precision: u8) {
    let center = (1 << (precision - 1)) as f32;
    let max = (1 << precision) - 1;

    if block[1..].iter().all(|&c| c == 0) {
        let dc = block[0] as f32 * quant.0[0] as f32 / 8.0;
        let sample = ((dc + center).round() as i32).clamp(0, max);
        block.fill(sample);
        return;
    }

    let mut tmp = [0.0f32; BLOCK_SIZE];
    for (i, t) in tmp.iter_mut().enumerate() {
        *t = block[i] as f32 * quant.0[i] as f32 * PRESCALE[i];
    }
    for row in tmp.chunks_exact_mut(BLOCK_DIM) {
        let out = idct1d(std::array::from_fn(|u| row[u]));
        row.copy_from_slice(&out);
    }
    for x in 0..BLOCK_DIM {
        let out = idct1d(std::array::from_fn(|y| tmp[y * BLOCK_DIM + x]));
        for (y, value) in out.into_iter().enumerate() {
            tmp[y * BLOCK_DIM + x] = value;
        }
    }
    for (sample, value) in block.iter_mut().zip(tmp) {
        *sample = ((value / 8.0 + center).round() as i32).clamp(0, max);
    }
}

/// Turns every coefficient block of the grid into samples. `quant` holds the table of each
/// component, by component index. Cells that carry no block of a component are left alone.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
pub fn reconstruct(frame: &FrameHeader, quant: &[QuantizationTable], grid: &mut MacroblockGrid) {
    let num_components = grid.num_components();
    let row_len = grid.size().0 * num_components;
    let precision = frame.precision;
    let reconstruct_row = |(mb_y, row): (usize, &mut [Block])| {
        for (mb_x, cell) in row.chunks_exact_mut(num_components).enumerate() {
            for (component, block) in frame.components.iter().zip(cell.iter_mut()) {
                if frame.cell_used_by(component, mb_x, mb_y) {
                    dequantize_and_idct(block, &quant[component.index], precision);
                }
            }
        }
    };
    #[cfg(feature = "parallel")]
    grid.cells_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(reconstruct_row);
    #[cfg(not(feature = "parallel"))]
    grid.cells_mut()
        .chunks_mut(row_len)
        .enumerate()
        .for_each(reconstruct_row);
}

#[cfg(test)]
mod tests {
    use jpgdec_test_utils::assert_almost_eq;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;
    use test_log::test;

    use super::*;
    use crate::util::test::assert_all_almost_eq;
    use crate::var_dct::dct_slow;

    fn flat_quant() -> QuantizationTable {
        QuantizationTable([1; BLOCK_SIZE])
    }

    #[test]
    fn dc_only() {
        let mut block = [0; BLOCK_SIZE];
        block[0] = 128;
        dequantize_and_idct(&mut block, &flat_quant(), 8);
        assert!(block.iter().all(|&s| s == 144));

        let mut block = [0; BLOCK_SIZE];
        block[0] = -1024;
        dequantize_and_idct(&mut block, &flat_quant(), 8);
        assert!(block.iter().all(|&s| s == 0));

        let mut block = [0; BLOCK_SIZE];
        block[0] = 100;
        dequantize_and_idct(&mut block, &QuantizationTable([16; BLOCK_SIZE]), 12);
        assert!(block.iter().all(|&s| s == 2048 + 200));
    }

    #[test]
    fn dc_shortcut_matches_transform() {
        let mut shortcut = [0; BLOCK_SIZE];
        shortcut[0] = 37;
        let mut full = shortcut;
        full[63] = 1;
        let mut quant = flat_quant();
        quant.0[63] = 0;
        dequantize_and_idct(&mut shortcut, &quant, 8);
        dequantize_and_idct(&mut full, &quant, 8);
        assert_eq!(shortcut, full);
    }

    #[test]
    fn reconstruct_skips_unused_cells() -> crate::error::Result<()> {
        use crate::headers::Component;
        use crate::marker::CodingProcess;

        let component = |id, index, samp| Component {
            id,
            index,
            h_samp: samp,
            v_samp: samp,
            quant_table: 0,
        };
        let frame = FrameHeader {
            process: CodingProcess::Baseline,
            precision: 8,
            width: 16,
            height: 16,
            components: vec![component(1, 0, 2), component(2, 1, 1)],
            max_h_samp: 2,
            max_v_samp: 2,
            hpadded_count: 2,
            vpadded_count: 2,
        };
        let mut grid = MacroblockGrid::new(&frame)?;
        for mb_y in 0..2 {
            for mb_x in 0..2 {
                grid.block_mut(mb_x, mb_y, 0)[0] = 8;
                grid.block_mut(mb_x, mb_y, 1)[0] = -8;
            }
        }
        reconstruct(&frame, &[flat_quant(), QuantizationTable([2; BLOCK_SIZE])], &mut grid);
        for mb_y in 0..2 {
            for mb_x in 0..2 {
                assert!(grid.block(mb_x, mb_y, 0).iter().all(|&s| s == 129));
            }
        }
        assert!(grid.block(0, 0, 1).iter().all(|&s| s == 126));
        assert_eq!(grid.block(1, 0, 1)[0], -8);
        assert_eq!(grid.block(1, 1, 1)[0], -8);
        Ok(())
    }

    #[test]
    fn matches_reference_transform() {
        let mut rng = XorShiftRng::seed_from_u64(0);
        for _ in 0..200 {
            let mut block = [0; BLOCK_SIZE];
            for (i, c) in block.iter_mut().enumerate() {
                let range = if i < 10 { 300 } else { 40 };
                *c = rng.random_range(-range..=range);
            }
            let quant = QuantizationTable(std::array::from_fn(|_| rng.random_range(1..=4)));
            let coefs: [f64; BLOCK_SIZE] =
                std::array::from_fn(|i| (block[i] * quant.0[i] as i32) as f64);
            let expected = dct_slow::idct8x8(&coefs);
            dequantize_and_idct(&mut block, &quant, 8);
            for (sample, reference) in block.iter().zip(expected) {
                let reference = (reference + 128.0).round().clamp(0.0, 255.0) as i32;
                assert_almost_eq!(*sample, reference, 1);
            }
        }
    }

    #[test]
    fn inverts_forward_transform() {
        let mut rng = XorShiftRng::seed_from_u64(1);
        for _ in 0..50 {
            let samples: [f64; BLOCK_SIZE] =
                std::array::from_fn(|_| rng.random_range(0..256) as f64);
            let centered = samples.map(|s| s - 128.0);
            let coefs = dct_slow::fdct8x8(&centered);
            let mut block = coefs.map(|c| c.round() as i32);
            dequantize_and_idct(&mut block, &flat_quant(), 8);
            assert_all_almost_eq!(block.map(|s| s as f64), samples, 2.0);
        }
    }
}
