// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Write;

use color_eyre::eyre::{Result, bail};

use super::OutputImage;

/// Binary PGM (1 channel) or PPM (3 channels), 8 bits per sample.
pub fn to_pnm(image: &OutputImage) -> Result<Vec<u8>> {
    let magic = match image.num_channels {
        1 => "P5",
        3 => "P6",
        n => bail!("Cannot write {n} channels as PNM"),
    };
    let mut ret = vec![];
    write!(&mut ret, "{magic}\n{} {}\n255\n", image.size.0, image.size.1)?;
    ret.extend_from_slice(&image.data);
    Ok(ret)
}
