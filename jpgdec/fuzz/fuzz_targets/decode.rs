// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpgdec::{JpegDecoder, JpegDecoderOptions};
use libfuzzer_sys::fuzz_target;

fn fuzz_decode(data: &[u8]) -> jpgdec::error::Result<()> {
    let options = JpegDecoderOptions::default().with_pixel_limit(Some(1 << 27));
    let mut decoder = JpegDecoder::create(data, options)?;
    let (width, height) = decoder.size();
    let frame = decoder.frame(0)?;
    assert_eq!(frame.size(), (width, height));
    assert_eq!(
        frame.data().len(),
        width * height * frame.color_type().samples_per_pixel()
    );
    // Cached.
    decoder.frame(0)?;
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = fuzz_decode(data);
});
