// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::util::tracing_wrappers::*;

/// Collects the chunks of an ICC profile split over several APP2 segments.
///
/// Chunks with inconsistent numbering are dropped with a warning; the profile is then simply
/// missing instead of failing the decode.
#[derive(Debug, Default, Clone)]
pub struct IccChunks {
    count: u8,
    chunks: Vec<Option<Vec<u8>>>,
}

impl IccChunks {
    /// `sequence` is 1-based and `count` is the total announced by the chunk.
    pub fn add(&mut self, sequence: u8, count: u8, data: Vec<u8>) {
        if count == 0 || sequence == 0 || sequence > count {
            warn!(sequence, count, "ignoring ICC chunk with invalid numbering");
            return;
        }
        if self.is_empty() {
            self.count = count;
            self.chunks = vec![None; count as usize];
        } else if count != self.count {
            warn!(
                count,
                expected = self.count,
                "ignoring ICC chunk with inconsistent count"
            );
            return;
        }
        let slot = &mut self.chunks[sequence as usize - 1];
        if slot.is_some() {
            warn!(sequence, "ignoring duplicate ICC chunk");
            return;
        }
        *slot = Some(data);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenates the chunks in sequence order once all of them have been seen.
    pub fn assemble(&self) -> Option<Vec<u8>> {
        if self.is_empty() {
            return None;
        }
        let mut profile = Vec::new();
        for (i, chunk) in self.chunks.iter().enumerate() {
            match chunk {
                Some(data) => profile.extend_from_slice(data),
                None => {
                    warn!(missing = i + 1, count = self.count, "incomplete ICC profile");
                    return None;
                }
            }
        }
        Some(profile)
    }
}
