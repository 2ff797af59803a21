// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail};
use jpgdec::{JpegDecoder, JpegDecoderOptions};

mod enc;

use enc::OutputImage;

#[derive(Parser)]
struct Opt {
    /// Input JPEG file
    input: PathBuf,

    /// Output image file, should end in .png, .ppm or .pgm
    output: PathBuf,

    /// If specified, writes the ICC profile of the decoded image
    #[clap(long)]
    icc_out: Option<PathBuf>,

    /// Keep the CMYK samples of Adobe images as stored instead of inverting them
    #[clap(long)]
    no_invert_adobe: bool,
}

enum OutputFormat {
    Png,
    Pnm,
}

fn output_format(path: &Path) -> Result<OutputFormat> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => Ok(OutputFormat::Png),
        Some("ppm") | Some("pgm") => Ok(OutputFormat::Pnm),
        _ => bail!("Unsupported output format: {}", path.display()),
    }
}

/// Decodes `data` and returns the encoded output file and the ICC profile, if any.
fn convert(
    data: &[u8],
    options: JpegDecoderOptions,
    format: OutputFormat,
) -> Result<(Vec<u8>, Option<Vec<u8>>)> {
    if !jpgdec::sniff(data) {
        bail!("Input does not look like a JPEG file");
    }
    let mut decoder = JpegDecoder::create(data, options)?;
    let (width, height) = decoder.size();
    let natural_format = decoder.natural_format();
    println!("Image size: {width} x {height}, {natural_format:?}");
    if let Some(jfif) = decoder.jfif() {
        let (major, minor) = jfif.version;
        println!(
            "JFIF {major}.{minor:02}, density {}x{} (units {})",
            jfif.x_density, jfif.y_density, jfif.density_units
        );
    }

    let image = OutputImage::from_frame(decoder.frame(0)?, natural_format);
    let icc_profile = decoder.icc_profile();
    if let Some(icc) = &icc_profile {
        println!("found {}-byte ICC", icc.len());
    }
    if let Some(orientation) = decoder.metadata().and_then(|exif| exif.orientation()) {
        println!("EXIF orientation: {orientation}");
    }

    let encoded = match format {
        OutputFormat::Png => {
            let mut buf: Vec<u8> = vec![];
            enc::png::to_png(&image, icc_profile.as_deref(), &mut buf)?;
            buf
        }
        OutputFormat::Pnm => enc::pnm::to_pnm(&image)?,
    };
    Ok((encoded, icc_profile))
}

fn main() -> Result<()> {
    color_eyre::install()?;

    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let opt = Opt::parse();
    let format = output_format(&opt.output)?;
    let data = fs::read(&opt.input)
        .wrap_err_with(|| format!("Cannot read {}", opt.input.display()))?;
    let options = JpegDecoderOptions::default().with_invert_adobe_cmyk(!opt.no_invert_adobe);

    let (encoded, icc_profile) = convert(&data, options, format)
        .wrap_err_with(|| format!("Failed to decode {}", opt.input.display()))?;
    fs::write(&opt.output, encoded)
        .wrap_err_with(|| format!("Cannot write {}", opt.output.display()))?;

    if let Some(icc_out) = opt.icc_out {
        match icc_profile {
            Some(icc) => fs::write(&icc_out, icc)
                .wrap_err_with(|| format!("Cannot write {}", icc_out.display()))?,
            None => println!("No ICC profile found"),
        }
    }
    Ok(())
}
