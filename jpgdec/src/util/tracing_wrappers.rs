// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Logging macros that forward to `tracing` when the `tracing` feature is enabled, and compile
//! to nothing otherwise.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! noop_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! noop_trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! noop_warn {
    ($($arg:tt)*) => {};
}

// `warn` also names a builtin attribute, so the no-op macros are renamed on import.
#[cfg(not(feature = "tracing"))]
pub(crate) use {noop_debug as debug, noop_trace as trace, noop_warn as warn};
