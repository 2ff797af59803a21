// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpgdec::{JpegDecoder, JpegDecoderOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = jpgdec::sniff(data);
    let _ = JpegDecoder::create(data, JpegDecoderOptions::default());
});
