// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub(crate) mod tracing_wrappers;

/// Rounds `self` up to the next multiple of `rhs`.
pub trait RoundUpTo {
    fn round_up_to(self, rhs: Self) -> Self;
}

impl RoundUpTo for usize {
    #[inline]
    fn round_up_to(self, rhs: usize) -> usize {
        self.div_ceil(rhs) * rhs
    }
}
