// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::BLOCK_DIM;
use crate::headers::{Component, FrameHeader};
use crate::image::MacroblockGrid;

/// Fills `out` with row `y` of the component at full resolution. Samples of subsampled
/// components are repeated (nearest neighbor).
pub fn upsample_row(
    frame: &FrameHeader,
    grid: &MacroblockGrid,
    component: &Component,
    y: usize,
    out: &mut [i32],
) {
    let (h, v) = (component.h_samp as usize, component.v_samp as usize);
    let (max_h, max_v) = (frame.max_h_samp as usize, frame.max_v_samp as usize);
    let cy = y * v / max_v;
    let (by, row_offset) = (cy / BLOCK_DIM, cy % BLOCK_DIM * BLOCK_DIM);
    for (x, sample) in out.iter_mut().enumerate() {
        let cx = x * h / max_h;
        let (mb_x, mb_y) = grid.cell_for_block(component, cx / BLOCK_DIM, by);
        *sample = grid.block(mb_x, mb_y, component.index)[row_offset + cx % BLOCK_DIM];
    }
}
