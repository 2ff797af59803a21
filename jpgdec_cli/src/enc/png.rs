// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::borrow::Cow;
use std::io::Write;

use color_eyre::eyre::{Result, eyre};

use super::OutputImage;

fn png_color(num_channels: usize) -> Result<png::ColorType> {
    match num_channels {
        1 => Ok(png::ColorType::Grayscale),
        3 => Ok(png::ColorType::Rgb),
        _ => Err(eyre!(
            "Invalid number of channels for PNG output {:?}",
            num_channels
        )),
    }
}

pub fn to_png<Writer: Write>(
    image: &OutputImage,
    icc_profile: Option<&[u8]>,
    buf: &mut Writer,
) -> Result<()> {
    let (width, height) = image.size;
    let mut info = png::Info::with_size(width as u32, height as u32);
    info.icc_profile = icc_profile.map(Cow::Borrowed);
    let mut encoder = png::Encoder::with_info(buf, info)?;
    encoder.set_color(png_color(image.num_channels)?);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.data)?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_decodable_png() -> Result<()> {
        let image = OutputImage {
            size: (2, 1),
            num_channels: 3,
            data: vec![1, 2, 3, 4, 5, 6],
        };
        let mut bytes: Vec<u8> = vec![];
        to_png(&image, None, &mut bytes)?;

        let mut reader = png::Decoder::new(std::io::Cursor::new(bytes)).read_info()?;
        let mut pixels = vec![0; image.data.len()];
        let info = reader.next_frame(&mut pixels)?;
        assert_eq!((info.width, info.height), (2, 1));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        assert_eq!(&pixels[..info.buffer_size()], &image.data[..]);
        Ok(())
    }

    #[test]
    fn rejects_cmyk_layout() {
        let image = OutputImage {
            size: (1, 1),
            num_channels: 4,
            data: vec![0; 4],
        };
        assert!(to_png(&image, None, &mut Vec::<u8>::new()).is_err());
    }
}
