// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![deny(unsafe_code)]
pub mod api;
pub mod bit_reader;
pub mod byte_reader;
pub mod decode;
pub mod entropy_coding;
pub mod error;
pub mod exif;
pub mod headers;
pub mod icc;
pub mod image;
pub mod marker;
pub mod render;
pub mod util;
pub mod var_dct;

pub use api::{JpegDecoder, JpegDecoderOptions, sniff};
pub use image::{JpegColorType, RasterFrame};

const BLOCK_DIM: usize = 8;
const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;

/// `NATURAL_ORDER[k]` is the row-major position of the `k`-th coefficient in zig-zag order.
const NATURAL_ORDER: [usize; BLOCK_SIZE] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];
