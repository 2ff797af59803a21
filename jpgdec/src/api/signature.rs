// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Start-of-image marker followed by the first byte of the next marker.
pub const SOI_SIGNATURE: [u8; 3] = [0xff, 0xd8, 0xff];

/// Checks if the given buffer starts with a JPEG signature. Buffers shorter than the signature
/// never match.
pub fn sniff(file_prefix: &[u8]) -> bool {
    file_prefix.starts_with(&SOI_SIGNATURE)
}
