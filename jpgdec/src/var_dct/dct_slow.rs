// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Direct evaluation of the 8x8 DCT pair, used as a reference for the fast transform.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::{BLOCK_DIM, BLOCK_SIZE};

#[inline(always)]
fn alpha(u: usize) -> f64 {
    if u == 0 { FRAC_1_SQRT_2 } else { 1.0 }
}

fn basis(freq: usize, pos: usize) -> f64 {
    alpha(freq) * ((2 * pos + 1) as f64 * freq as f64 * PI / 16.0).cos()
}

/// Coefficients, row-major with vertical frequency first, of centered samples.
pub fn fdct8x8(samples: &[f64; BLOCK_SIZE]) -> [f64; BLOCK_SIZE] {
    std::array::from_fn(|i| {
        let (v, u) = (i / BLOCK_DIM, i % BLOCK_DIM);
        let mut sum = 0.0;
        for y in 0..BLOCK_DIM {
            for x in 0..BLOCK_DIM {
                sum += samples[y * BLOCK_DIM + x] * basis(u, x) * basis(v, y);
            }
        }
        sum / 4.0
    })
}

/// Centered samples of dequantized coefficients.
pub fn idct8x8(coefs: &[f64; BLOCK_SIZE]) -> [f64; BLOCK_SIZE] {
    std::array::from_fn(|i| {
        let (y, x) = (i / BLOCK_DIM, i % BLOCK_DIM);
        let mut sum = 0.0;
        for v in 0..BLOCK_DIM {
            for u in 0..BLOCK_DIM {
                sum += coefs[v * BLOCK_DIM + u] * basis(u, x) * basis(v, y);
            }
        }
        sum / 4.0
    })
}

#[cfg(test)]
mod tests {
    use jpgdec_test_utils::assert_almost_eq;
    use test_log::test;

    use super::*;
    use crate::util::test::assert_all_almost_eq;

    #[test]
    fn dc_is_eight_times_mean() {
        let coefs = fdct8x8(&[3.0; BLOCK_SIZE]);
        assert_almost_eq!(coefs[0], 24.0, 1e-9);
        assert_all_almost_eq!(&coefs[1..], &[0.0; BLOCK_SIZE - 1][..], 1e-9);
    }

    #[test]
    fn round_trip() {
        let samples: [f64; BLOCK_SIZE] = std::array::from_fn(|i| ((i * 37) % 64) as f64 - 32.0);
        let restored = idct8x8(&fdct8x8(&samples));
        assert_all_almost_eq!(&restored[..], &samples[..], 1e-9);
    }
}
