#![forbid(unsafe_code)]

use strum::EnumCount;
use strum::FromRepr;

/// Intra prediction mode, in the numbering the prediction dispatch table
/// uses. The directional bitstream modes have already been resolved by the
/// caller into one of the three zone predictors plus an angle parameter.
pub type IntraPredMode = u8;

pub const DC_PRED: IntraPredMode = 0;
pub const VERT_PRED: IntraPredMode = 1;
pub const HOR_PRED: IntraPredMode = 2;
pub const LEFT_DC_PRED: IntraPredMode = 3;
pub const TOP_DC_PRED: IntraPredMode = 4;
pub const DC_128_PRED: IntraPredMode = 5;
pub const Z1_PRED: IntraPredMode = 6;
pub const Z2_PRED: IntraPredMode = 7;
pub const Z3_PRED: IntraPredMode = 8;
pub const SMOOTH_PRED: IntraPredMode = 9;
pub const SMOOTH_V_PRED: IntraPredMode = 10;
pub const SMOOTH_H_PRED: IntraPredMode = 11;
pub const PAETH_PRED: IntraPredMode = 12;
pub const FILTER_PRED: IntraPredMode = 13;

pub const N_IMPL_INTRA_PRED_MODES: usize = 14;

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumCount, FromRepr)]
pub enum TxfmSize {
    S4x4 = 0,
    S8x8,
    S16x16,
    S32x32,
    S64x64,
    R4x8,
    R8x4,
    R8x16,
    R16x8,
    R16x32,
    R32x16,
    R32x64,
    R64x32,
    R4x16,
    R16x4,
    R8x32,
    R32x8,
    R16x64,
    R64x16,
}

impl TxfmSize {
    pub const fn from_wh(w: usize, h: usize) -> Self {
        use TxfmSize::*;
        match (w, h) {
            (4, 4) => S4x4,
            (8, 8) => S8x8,
            (16, 16) => S16x16,
            (32, 32) => S32x32,
            (64, 64) => S64x64,
            (4, 8) => R4x8,
            (8, 4) => R8x4,
            (8, 16) => R8x16,
            (16, 8) => R16x8,
            (16, 32) => R16x32,
            (32, 16) => R32x16,
            (32, 64) => R32x64,
            (64, 32) => R64x32,
            (4, 16) => R4x16,
            (16, 4) => R16x4,
            (8, 32) => R8x32,
            (32, 8) => R32x8,
            (16, 64) => R16x64,
            (64, 16) => R64x16,
            _ => panic!("invalid transform size"),
        }
    }
}

/// The chroma subsampling layouts that carry chroma planes.
/// Monochrome (4:0:0) has no chroma to predict into.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumCount)]
pub enum Rav1dPixelLayoutSubSampled {
    I420,
    I422,
    I444,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txfm_size_from_wh() {
        assert_eq!(TxfmSize::from_wh(4, 4), TxfmSize::S4x4);
        assert_eq!(TxfmSize::from_wh(16, 32), TxfmSize::R16x32);
        assert_eq!(TxfmSize::from_wh(32, 8), TxfmSize::R32x8);
    }
}
