// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::entropy_coding::huffman::{HUFFMAN_MAX_BITS, HUFFMAN_MAX_SYMBOLS};

/// Features of the format that are recognized but not decoded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedFeature {
    #[error("arithmetic entropy coding")]
    ArithmeticCoding,
    #[error("lossless coding process")]
    Lossless,
    #[error("hierarchical (differential) coding")]
    Hierarchical,
    #[error("DNL segments")]
    DefineNumberOfLines,
    #[error("sample precision {0}")]
    SamplePrecision(u8),
    #[error("sampling factors {0}x{1} against reference {2}x{3}")]
    SubsamplingRatio(u8, u8, u8, u8),
}

#[derive(Error, Debug)]
pub enum Error {
    // Truncated input.
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Malformed segments.
    #[error("Invalid signature {0:02x}{1:02x}, expected ffd8")]
    InvalidSignature(u8, u8),
    #[error("Expected a marker, found byte {0:02x}")]
    ExpectedMarker(u8),
    #[error("Segment length {0} is invalid")]
    InvalidSegmentLength(u16),
    #[error("Segment {0} has {1} unaccounted bytes")]
    SegmentLengthMismatch(&'static str, isize),
    #[error("Invalid {0} table id {1}")]
    InvalidTableId(&'static str, u8),
    #[error("Invalid quantization table precision {0}")]
    InvalidQuantizationPrecision(u8),
    #[error("Invalid image size: {0}x{1}")]
    InvalidImageSize(usize, usize),
    #[error("Image size too large: {0}x{1}")]
    ImageSizeTooLarge(usize, usize),
    #[error("Invalid component count {0}, expected 1, 3 or 4")]
    InvalidComponentCount(usize),
    #[error("Invalid sampling factors {0}x{1} for component {2}")]
    InvalidSamplingFactors(u8, u8, u8),
    #[error("Duplicate component id {0}")]
    DuplicateComponentId(u8),
    #[error("Invalid scan: {0}")]
    InvalidScan(&'static str),
    #[error("Scan references unknown component id {0}")]
    UnknownScanComponent(u8),
    #[error("Huffman table has {0} symbols, max is {max}", max = HUFFMAN_MAX_SYMBOLS)]
    HuffmanTableTooLarge(usize),
    #[error("Huffman table counts do not satisfy the Kraft inequality at length {0}")]
    HuffmanTableOversubscribed(usize),
    #[error("Huffman table lists {0} symbols but counts sum to {1}")]
    HuffmanSymbolCountMismatch(usize, usize),
    #[error("Invalid EXIF block: {0}")]
    InvalidExif(&'static str),

    // Unsupported features.
    #[error("Unsupported feature: {0}")]
    Unsupported(#[from] UnsupportedFeature),

    // Malformed entropy-coded data.
    #[error("Invalid Huffman code, no match for any length up to {max} bits", max = HUFFMAN_MAX_BITS)]
    InvalidHuffmanCode,
    #[error("Coefficient magnitude category {0} exceeds maximum {1}")]
    CoefficientTooLarge(u8, u8),
    #[error("Zero run overflows spectral band ending at {0}")]
    RunLengthOverflow(u8),
    #[error("Invalid refinement symbol {0:02x}")]
    InvalidRefinementSymbol(u8),
    #[error("Unexpected marker {0:02x}")]
    UnexpectedMarker(u8),
    #[error("Restart marker RST{1} found, expected RST{0}")]
    RestartMarkerMismatch(u8, u8),
    #[error("Cannot read {0} bits at once, max is 16")]
    PeekTooLarge(usize),

    // Protocol-order errors.
    #[error("Stream does not start with a start-of-image marker")]
    MissingStartOfImage,
    #[error("Scan encountered before the frame header")]
    ScanBeforeFrame,
    #[error("Multiple frame headers")]
    DuplicateFrame,
    #[error("End of image reached before the frame header")]
    MissingFrame,
    #[error("End of image reached without any scan")]
    NoScans,
    #[error("Scan uses undefined quantization table {0}")]
    MissingQuantizationTable(u8),
    #[error("Scan uses undefined {0} Huffman table {1}")]
    MissingHuffmanTable(&'static str, u8),

    // API misuse and decoder state.
    #[error("Invalid frame index {0}, images have a single frame")]
    InvalidFrameIndex(usize),
    #[error("Decoder is in the error state after a previous failure")]
    DecoderFailed,
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    // Generic arithmetic overflow. Prefer using other errors if possible.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn messages_and_conversions() {
        assert_eq!(
            Error::HuffmanTableTooLarge(300).to_string(),
            "Huffman table has 300 symbols, max is 256"
        );
        assert_eq!(
            Error::InvalidHuffmanCode.to_string(),
            "Invalid Huffman code, no match for any length up to 16 bits"
        );
        let io: Error = std::io::Error::other("closed").into();
        assert!(matches!(io, Error::Io(_)));
        let unsupported: Error = UnsupportedFeature::ArithmeticCoding.into();
        assert!(matches!(
            unsupported,
            Error::Unsupported(UnsupportedFeature::ArithmeticCoding)
        ));
    }
}
