//! Intra-frame prediction DSP kernels for AV1 decoding.
//!
//! This crate holds the sample-generation half of an AV1 decoder's intra
//! path: the 14 block predictors (DC family, vertical/horizontal, Paeth,
//! the smooth family, the directional Z1/Z2/Z3 predictors and the
//! recursive filter predictor), the chroma-from-luma AC extraction and
//! combine steps, and palette block expansion. All routines are bit-exact
//! with the AV1 specification and operate on caller-supplied buffers; the
//! crate performs no allocation.
//!
//! Entry point: [`Rav1dIntraPredDSPContext`], a per-bit-depth table of
//! function pointers populated once at startup.

#![forbid(unsafe_code)]

#[cfg(not(any(feature = "bitdepth_8", feature = "bitdepth_16")))]
compile_error!("No bitdepths enabled. Enable one or more of the following features: `bitdepth_8`, `bitdepth_16`");

pub mod include {
    pub mod common {
        pub mod bitdepth;
        pub mod intops;
    } // mod common
} // mod include
pub mod src {
    pub mod const_fn;
    pub mod cpu;
    pub mod ipred;
    pub mod levels;
    pub mod tables;
} // mod src

pub use crate::include::common::bitdepth::BitDepth;
#[cfg(feature = "bitdepth_16")]
pub use crate::include::common::bitdepth::BitDepth16;
#[cfg(feature = "bitdepth_8")]
pub use crate::include::common::bitdepth::BitDepth8;
pub use crate::include::common::bitdepth::BPC;
pub use crate::src::ipred::Rav1dIntraPredDSPContext;
