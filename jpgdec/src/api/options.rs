// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct JpegDecoderOptions {
    /// Invert CMYK and YCCK samples of images carrying an Adobe APP14 segment. Adobe encoders
    /// store inverted ink values, so this is usually wanted.
    pub invert_adobe_cmyk: bool,
    /// Fail decoding images with more than this number of samples. The limit counts the
    /// product of pixels and components, so a 1024x1024 CMYK image has 4 million samples.
    pub pixel_limit: Option<usize>,
    /// Fail on restart markers whose sequence number is not the expected one. When false,
    /// mismatches are logged and decoding continues from the marker that was found.
    pub strict_restart_markers: bool,
}

impl Default for JpegDecoderOptions {
    fn default() -> Self {
        Self {
            invert_adobe_cmyk: true,
            pixel_limit: None,
            strict_restart_markers: true,
        }
    }
}

impl JpegDecoderOptions {
    pub fn with_invert_adobe_cmyk(mut self, invert: bool) -> Self {
        self.invert_adobe_cmyk = invert;
        self
    }

    pub fn with_pixel_limit(mut self, limit: Option<usize>) -> Self {
        self.pixel_limit = limit;
        self
    }

    pub fn with_strict_restart_markers(mut self, strict: bool) -> Self {
        self.strict_restart_markers = strict;
        self
    }
}
