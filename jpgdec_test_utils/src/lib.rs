// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

mod tables;
mod writer;

pub use tables::*;
pub use writer::*;

/// Asserts `|left - right| <= max_error` for integers or floats.
#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {{
        let (left, right, max_error) = ($left, $right, $max_error);
        let diff = if left > right { left - right } else { right - left };
        assert!(
            diff <= max_error,
            "{left:?} and {right:?} differ by {diff:?}, more than {max_error:?}"
        );
    }};
}
