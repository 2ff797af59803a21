// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use jpgdec::api::DecoderStage;
use jpgdec::error::{Error, Result};
use jpgdec::exif::TiffByteOrder;
use jpgdec::{JpegColorType, JpegDecoder, JpegDecoderOptions, RasterFrame, sniff};
use jpgdec_test_utils::{
    BitWriter, HuffmanEncoder, JpegWriter, STD_AC_LUMA_COUNTS, STD_AC_LUMA_SYMBOLS,
    STD_DC_LUMA_COUNTS, STD_DC_LUMA_SYMBOLS, encode_block,
};

const FLAT: [u16; 64] = [1; 64];

fn encoders() -> (HuffmanEncoder, HuffmanEncoder) {
    (
        HuffmanEncoder::new(&STD_DC_LUMA_COUNTS, &STD_DC_LUMA_SYMBOLS),
        HuffmanEncoder::new(&STD_AC_LUMA_COUNTS, &STD_AC_LUMA_SYMBOLS),
    )
}

fn dc_block(dc: i32) -> [i32; 64] {
    let mut block = [0; 64];
    block[0] = dc;
    block
}

/// Tables and frame header of a baseline stream using table 0 everywhere.
fn baseline_header(w: &mut JpegWriter, width: u16, height: u16, components: &[(u8, u8, u8, u8)]) {
    w.dqt(0, &FLAT)
        .sof(0xc0, 8, width, height, components)
        .dht(0, 0, &STD_DC_LUMA_COUNTS, &STD_DC_LUMA_SYMBOLS)
        .dht(1, 0, &STD_AC_LUMA_COUNTS, &STD_AC_LUMA_SYMBOLS);
}

/// A single 8x8 grayscale block with the given coefficients.
fn gray_image(coefficients: &[i32; 64]) -> Vec<u8> {
    let (dc, ac) = encoders();
    let mut bits = BitWriter::new();
    encode_block(&mut bits, &dc, &ac, 0, coefficients);
    let mut w = JpegWriter::new();
    w.soi();
    baseline_header(&mut w, 8, 8, &[(1, 1, 1, 0)]);
    w.sos(&[(1, 0, 0)], 0, 63, 0, 0)
        .raw(&bits.finish())
        .eoi();
    w.into_bytes()
}

fn decode_with(data: &[u8], options: JpegDecoderOptions) -> Result<RasterFrame> {
    let mut decoder = JpegDecoder::create(data, options)?;
    Ok(decoder.frame(0)?.clone())
}

fn decode(data: &[u8]) -> Result<RasterFrame> {
    decode_with(data, JpegDecoderOptions::default())
}

#[test]
fn uniform_gray_block() -> Result<()> {
    let data = gray_image(&dc_block(128));
    assert!(sniff(&data));
    let mut decoder = JpegDecoder::create(&data[..], JpegDecoderOptions::default())?;
    assert_eq!(decoder.size(), (8, 8));
    assert_eq!(decoder.natural_format(), JpegColorType::Grayscale);
    assert_eq!(decoder.stage(), DecoderStage::HeaderParsed);

    let first = decoder.frame(0)?.clone();
    assert_eq!(first.size(), (8, 8));
    assert_eq!(first.color_type(), JpegColorType::Rgb);
    assert_eq!(first.data().len(), 8 * 8 * 3);
    assert!(first.data().iter().all(|&s| s == 144));

    let second = decoder.frame(0)?;
    assert_eq!(second, &first);
    assert!(decoder.icc_profile().is_none());
    assert!(decoder.metadata().is_none());
    assert!(decoder.jfif().is_none());
    Ok(())
}

#[test]
fn jfif_header() -> Result<()> {
    let (dc, ac) = encoders();
    let mut bits = BitWriter::new();
    encode_block(&mut bits, &dc, &ac, 0, &dc_block(0));
    let mut w = JpegWriter::new();
    w.soi().app(0, b"JFIF\0\x01\x02\x01\0\x48\0\x48\0\0");
    baseline_header(&mut w, 8, 8, &[(1, 1, 1, 0)]);
    w.sos(&[(1, 0, 0)], 0, 63, 0, 0)
        .raw(&bits.finish())
        .eoi();
    let data = w.into_bytes();
    let decoder = JpegDecoder::create(&data[..], JpegDecoderOptions::default())?;
    let jfif = decoder.jfif().map(|j| (j.version, j.density_units, j.x_density, j.y_density));
    assert_eq!(jfif, Some(((1, 2), 1, 72, 72)));
    Ok(())
}

#[test]
fn clamps_out_of_range_samples() -> Result<()> {
    let bright = decode(&gray_image(&dc_block(1023)))?;
    assert!(bright.data().iter().all(|&s| s == 255));
    let dark = decode(&gray_image(&dc_block(-1024)))?;
    assert!(dark.data().iter().all(|&s| s == 0));
    Ok(())
}

#[test]
fn horizontal_gradient() -> Result<()> {
    let mut coefficients = [0; 64];
    coefficients[1] = -40;
    let frame = decode(&gray_image(&coefficients))?;
    for y in 0..8 {
        for x in 1..8 {
            assert!(frame.pixel(x, y)[0] > frame.pixel(x - 1, y)[0]);
        }
        assert_eq!(frame.pixel(0, y), frame.pixel(0, 0));
    }
    Ok(())
}

#[test]
fn rejects_invalid_streams() -> Result<()> {
    assert!(!sniff(b"\x89PNG"));
    assert!(matches!(
        decode(b"\x89PNG\r\n"),
        Err(Error::InvalidSignature(0x89, b'P'))
    ));
    assert!(matches!(
        decode(&[0xff, 0xd9]),
        Err(Error::MissingStartOfImage)
    ));
    assert!(matches!(decode(&[0xff, 0xd8]), Err(Error::UnexpectedEof)));

    let mut w = JpegWriter::new();
    w.soi().eoi();
    assert!(matches!(decode(&w.into_bytes()), Err(Error::MissingFrame)));

    let mut w = JpegWriter::new();
    w.soi();
    baseline_header(&mut w, 8, 8, &[(1, 1, 1, 0)]);
    w.eoi();
    let data = w.into_bytes();
    let mut decoder = JpegDecoder::create(&data[..], JpegDecoderOptions::default())?;
    assert!(matches!(decoder.frame(0), Err(Error::NoScans)));
    assert_eq!(decoder.stage(), DecoderStage::Error);
    assert!(matches!(decoder.frame(0), Err(Error::DecoderFailed)));

    let data = gray_image(&dc_block(0));
    let mut decoder = JpegDecoder::create(&data[..], JpegDecoderOptions::default())?;
    assert!(matches!(decoder.frame(3), Err(Error::InvalidFrameIndex(3))));
    Ok(())
}

#[test]
fn pixel_limit() -> Result<()> {
    let data = gray_image(&dc_block(0));
    let options = JpegDecoderOptions::default().with_pixel_limit(Some(63));
    assert!(matches!(
        JpegDecoder::create(&data[..], options),
        Err(Error::ImageSizeTooLarge(8, 8))
    ));
    let options = JpegDecoderOptions::default().with_pixel_limit(Some(64));
    decode_with(&data, options)?;
    Ok(())
}

#[test]
fn truncated_entropy_data() {
    let mut data = gray_image(&dc_block(128));
    // Drop EOI and the last data byte.
    data.truncate(data.len() - 3);
    assert!(matches!(decode(&data), Err(Error::UnexpectedEof)));
}

#[test]
fn scan_cut_short_by_marker() {
    // A 64x64 frame whose scan carries a single block before EOI.
    let (dc, ac) = encoders();
    let mut bits = BitWriter::new();
    encode_block(&mut bits, &dc, &ac, 0, &dc_block(40));
    let mut w = JpegWriter::new();
    w.soi();
    baseline_header(&mut w, 64, 64, &[(1, 1, 1, 0)]);
    w.sos(&[(1, 0, 0)], 0, 63, 0, 0)
        .raw(&bits.finish())
        .eoi();
    assert!(matches!(
        decode(&w.into_bytes()),
        Err(Error::UnexpectedMarker(0xd9))
    ));
}

#[test]
fn progressive_matches_sequential() -> Result<()> {
    let mut coefficients = [0; 64];
    coefficients[0] = 101;
    coefficients[1] = 17;
    let sequential = decode(&gray_image(&coefficients))?;

    let (dc, ac) = encoders();
    let mut w = JpegWriter::new();
    w.soi()
        .dqt(0, &FLAT)
        .sof(0xc2, 8, 8, 8, &[(1, 1, 1, 0)])
        .dht(0, 0, &STD_DC_LUMA_COUNTS, &STD_DC_LUMA_SYMBOLS)
        .dht(1, 0, &STD_AC_LUMA_COUNTS, &STD_AC_LUMA_SYMBOLS);

    // DC first, point transform 1.
    let mut bits = BitWriter::new();
    dc.encode_value(&mut bits, 0, 101 >> 1);
    w.sos(&[(1, 0, 0)], 0, 0, 0, 1).raw(&bits.finish());

    // AC first over 1..=5, point transform 1.
    let mut bits = BitWriter::new();
    ac.encode_value(&mut bits, 0, 17 >> 1);
    ac.encode(&mut bits, 0x00);
    w.sos(&[(1, 0, 0)], 1, 5, 0, 1).raw(&bits.finish());

    // DC refinement: the low bit of 101.
    let mut bits = BitWriter::new();
    bits.write(1, 1);
    w.sos(&[(1, 0, 0)], 0, 0, 1, 0).raw(&bits.finish());

    // AC refinement: end of band, then the correction bit of the nonzero coefficient.
    let mut bits = BitWriter::new();
    ac.encode(&mut bits, 0x00);
    bits.write(1, 1);
    w.sos(&[(1, 0, 0)], 1, 5, 1, 0).raw(&bits.finish());
    w.eoi();

    let progressive = decode(&w.into_bytes())?;
    assert_eq!(progressive, sequential);
    Ok(())
}

#[test]
fn chroma_420() -> Result<()> {
    let (dc, ac) = encoders();
    let mut bits = BitWriter::new();
    let mut pred = 0;
    for y_dc in [0, 64, -64, 128] {
        pred = encode_block(&mut bits, &dc, &ac, pred, &dc_block(y_dc));
    }
    encode_block(&mut bits, &dc, &ac, 0, &dc_block(0));
    encode_block(&mut bits, &dc, &ac, 0, &dc_block(80));

    let mut w = JpegWriter::new();
    w.soi();
    baseline_header(&mut w, 16, 16, &[(1, 2, 2, 0), (2, 1, 1, 0), (3, 1, 1, 0)]);
    w.sos(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)], 0, 63, 0, 0)
        .raw(&bits.finish())
        .eoi();
    let data = w.into_bytes();

    let mut decoder = JpegDecoder::create(&data[..], JpegDecoderOptions::default())?;
    assert_eq!(decoder.natural_format(), JpegColorType::Rgb);
    let frame = decoder.frame(0)?;
    assert_eq!(frame.size(), (16, 16));
    // Cr is 138 everywhere: R = Y + 14.02, G = Y - 7.14, B = Y.
    assert_eq!(frame.pixel(0, 0), [142, 121, 128]);
    assert_eq!(frame.pixel(7, 7), [142, 121, 128]);
    assert_eq!(frame.pixel(8, 0), [150, 129, 136]);
    assert_eq!(frame.pixel(0, 8), [134, 113, 120]);
    assert_eq!(frame.pixel(15, 15), [158, 137, 144]);
    Ok(())
}

fn varied_block(seed: usize) -> [i32; 64] {
    let mut block = [0; 64];
    block[0] = (seed * 37 % 200) as i32 - 100;
    block[1] = (seed % 7) as i32 - 3;
    block[9] = (seed % 3) as i32;
    block
}

const YCBCR_420: [(u8, u8, u8, u8); 3] = [(1, 2, 2, 0), (2, 1, 1, 0), (3, 1, 1, 0)];

fn luma_block(bx: usize, by: usize) -> [i32; 64] {
    varied_block(by * 6 + bx)
}

fn chroma_block(c: usize, bx: usize, by: usize) -> [i32; 64] {
    varied_block(40 + c * 10 + by * 3 + bx)
}

/// One interleaved 4:2:0 scan over `mcus` MCUs, with a restart marker after
/// every `restart_interval` MCUs when it is nonzero.
fn interleaved_420(
    width: u16,
    height: u16,
    mcus: (usize, usize),
    restart_interval: u16,
) -> Vec<u8> {
    let (dc, ac) = encoders();
    let (mcus_x, mcus_y) = mcus;
    let mut w = JpegWriter::new();
    w.soi();
    baseline_header(&mut w, width, height, &YCBCR_420);
    if restart_interval > 0 {
        w.dri(restart_interval);
    }
    w.sos(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)], 0, 63, 0, 0);
    let mut bits = BitWriter::new();
    let mut pred = [0; 3];
    for mcu in 0..mcus_x * mcus_y {
        let (mcu_x, mcu_y) = (mcu % mcus_x, mcu / mcus_x);
        if restart_interval > 0 && mcu > 0 && mcu % restart_interval as usize == 0 {
            w.raw(&std::mem::take(&mut bits).finish())
                .rst(((mcu / restart_interval as usize - 1) % 8) as u8);
            pred = [0; 3];
        }
        for v in 0..2 {
            for h in 0..2 {
                let block = luma_block(mcu_x * 2 + h, mcu_y * 2 + v);
                pred[0] = encode_block(&mut bits, &dc, &ac, pred[0], &block);
            }
        }
        for c in 1..3 {
            let block = chroma_block(c, mcu_x, mcu_y);
            pred[c] = encode_block(&mut bits, &dc, &ac, pred[c], &block);
        }
    }
    w.raw(&bits.finish()).eoi();
    w.into_bytes()
}

#[test]
fn non_interleaved_scans_match_interleaved() -> Result<()> {
    // 33x17 needs 3x2 MCUs of 16x16; luma only codes 5x3 blocks and chroma 3x2 when the
    // components are sent in separate scans.
    let interleaved = decode(&interleaved_420(33, 17, (3, 2), 0))?;
    assert_eq!(interleaved.size(), (33, 17));

    let (dc, ac) = encoders();
    let mut w = JpegWriter::new();
    w.soi();
    baseline_header(&mut w, 33, 17, &YCBCR_420);
    let mut bits = BitWriter::new();
    let mut pred = 0;
    for by in 0..3 {
        for bx in 0..5 {
            pred = encode_block(&mut bits, &dc, &ac, pred, &luma_block(bx, by));
        }
    }
    w.sos(&[(1, 0, 0)], 0, 63, 0, 0).raw(&bits.finish());
    for c in 1..3 {
        let mut bits = BitWriter::new();
        let mut pred = 0;
        for by in 0..2 {
            for bx in 0..3 {
                pred = encode_block(&mut bits, &dc, &ac, pred, &chroma_block(c, bx, by));
            }
        }
        w.sos(&[(c as u8 + 1, 0, 0)], 0, 63, 0, 0)
            .raw(&bits.finish());
    }
    w.eoi();
    let separate = decode(&w.into_bytes())?;
    assert_eq!(separate, interleaved);
    Ok(())
}

#[test]
fn interleaved_restart_intervals() -> Result<()> {
    let plain = decode(&interleaved_420(48, 32, (3, 2), 0))?;
    for interval in [1, 2, 4] {
        let restarted = decode(&interleaved_420(48, 32, (3, 2), interval))?;
        assert_eq!(restarted, plain, "restart interval {interval}");
    }
    Ok(())
}

fn restart_stream(second_marker: u8) -> Vec<u8> {
    let (dc, ac) = encoders();
    let mut first = BitWriter::new();
    encode_block(&mut first, &dc, &ac, 0, &dc_block(16));
    let mut second = BitWriter::new();
    encode_block(&mut second, &dc, &ac, 0, &dc_block(16));
    let mut third = BitWriter::new();
    encode_block(&mut third, &dc, &ac, 0, &dc_block(16));

    let mut w = JpegWriter::new();
    w.soi();
    baseline_header(&mut w, 24, 8, &[(1, 1, 1, 0)]);
    w.dri(1)
        .sos(&[(1, 0, 0)], 0, 63, 0, 0)
        .raw(&first.finish())
        .rst(0)
        .raw(&second.finish())
        .rst(second_marker)
        .raw(&third.finish())
        .eoi();
    w.into_bytes()
}

#[test]
fn restart_intervals() -> Result<()> {
    // Every interval restarts DC prediction from zero.
    let frame = decode(&restart_stream(1))?;
    assert_eq!(frame.size(), (24, 8));
    assert!(frame.data().iter().all(|&s| s == 130));

    assert!(matches!(
        decode(&restart_stream(5)),
        Err(Error::RestartMarkerMismatch(1, 5))
    ));
    let lenient = JpegDecoderOptions::default().with_strict_restart_markers(false);
    let frame = decode_with(&restart_stream(5), lenient)?;
    assert!(frame.data().iter().all(|&s| s == 130));
    Ok(())
}

fn adobe_cmyk_stream() -> Vec<u8> {
    let (dc, ac) = encoders();
    let mut bits = BitWriter::new();
    for value in [0, 64, -64, 1016] {
        encode_block(&mut bits, &dc, &ac, 0, &dc_block(value));
    }
    let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\x01".to_vec();
    exif.extend_from_slice(&[0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, 6, 0, 0]);
    exif.extend_from_slice(&[0; 4]);

    let mut w = JpegWriter::new();
    w.soi()
        .app(1, &exif)
        .app(2, b"ICC_PROFILE\0\x01\x01profile")
        .app(14, b"Adobe\0\x64\0\0\0\0\0");
    baseline_header(
        &mut w,
        8,
        8,
        &[(1, 1, 1, 0), (2, 1, 1, 0), (3, 1, 1, 0), (4, 1, 1, 0)],
    );
    w.sos(&[(1, 0, 0), (2, 0, 0), (3, 0, 0), (4, 0, 0)], 0, 63, 0, 0)
        .raw(&bits.finish())
        .eoi();
    w.into_bytes()
}

#[test]
fn adobe_cmyk() -> Result<()> {
    let data = adobe_cmyk_stream();
    let mut decoder = JpegDecoder::create(&data[..], JpegDecoderOptions::default())?;
    assert_eq!(decoder.natural_format(), JpegColorType::Cmyk);
    assert_eq!(decoder.icc_profile().as_deref(), Some(&b"profile"[..]));
    let exif = decoder.metadata().cloned();
    assert_eq!(exif.as_ref().map(|e| e.byte_order()), Some(TiffByteOrder::BigEndian));
    assert_eq!(exif.and_then(|e| e.orientation()), Some(6));

    let frame = decoder.frame(0)?;
    assert_eq!(frame.color_type(), JpegColorType::Cmyk);
    assert_eq!(frame.pixel(3, 5), [127, 119, 135, 0]);

    let options = JpegDecoderOptions::default().with_invert_adobe_cmyk(false);
    let frame = decode_with(&data, options)?;
    assert_eq!(frame.pixel(0, 0), [128, 136, 120, 255]);
    Ok(())
}
