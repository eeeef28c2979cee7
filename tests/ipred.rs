//! End-to-end exercises of the intra prediction dispatch tables: every
//! mode over every block geometry and legal angle, at 8 and 10/12 bit,
//! checking output range and byte-for-byte determinism.

use std::ffi::c_int;

use zerocopy::IntoBytes;

use rav1d_ipred::src::cpu::CpuFlags;
use rav1d_ipred::src::ipred::Rav1dIntraPredDSPContext;
use rav1d_ipred::src::levels::Rav1dPixelLayoutSubSampled;
use rav1d_ipred::src::levels::TxfmSize;
use rav1d_ipred::src::levels::DC_PRED;
use rav1d_ipred::src::levels::FILTER_PRED;
use rav1d_ipred::src::levels::N_IMPL_INTRA_PRED_MODES;
use rav1d_ipred::src::levels::PAETH_PRED;
use rav1d_ipred::src::levels::SMOOTH_PRED;
use rav1d_ipred::src::levels::Z1_PRED;
use rav1d_ipred::src::levels::Z2_PRED;
use rav1d_ipred::src::levels::Z3_PRED;
use rav1d_ipred::BitDepth;
#[cfg(feature = "bitdepth_16")]
use rav1d_ipred::BitDepth16;
#[cfg(feature = "bitdepth_8")]
use rav1d_ipred::BitDepth8;

/// Center of the edge buffer: room for 2 * 64 neighbors on both sides.
const TL: usize = 128;
const EDGE_LEN: usize = 2 * TL + 1;

const BLOCK_SIZES: [usize; 5] = [4, 8, 16, 32, 64];

/// The directional step angles that carry a nonzero derivative; every
/// in-tree caller lands on one of these.
const ANGLE_DELTAS: [c_int; 27] = [
    3, 6, 9, 14, 17, 20, 23, 26, 29, 32, 36, 39, 42, 45, 48, 51, 54, 58, 61, 64, 67, 70, 73, 76,
    81, 84, 87,
];

fn angles_for_mode(mode: u8) -> Vec<c_int> {
    match mode {
        m if m == Z1_PRED => ANGLE_DELTAS.to_vec(),
        m if m == Z2_PRED => ANGLE_DELTAS.iter().map(|d| 90 + d).collect(),
        m if m == Z3_PRED => ANGLE_DELTAS.iter().map(|d| 270 - d).collect(),
        m if m == FILTER_PRED => (0..5).collect(),
        _ => vec![0],
    }
}

fn geometry_supported(mode: u8, w: usize, h: usize) -> bool {
    // The filter predictor is only defined up to 32x32.
    if mode == FILTER_PRED {
        return w <= 32 && h <= 32;
    }
    true
}

#[cfg(feature = "bitdepth_8")]
#[test]
fn test_all_modes_in_range_and_deterministic_8bpc() {
    let dsp = Rav1dIntraPredDSPContext::<BitDepth8>::new(CpuFlags::empty());
    let bd = BitDepth8::new(());
    let mut edge = [0u8; EDGE_LEN];
    for (i, e) in edge.iter_mut().enumerate() {
        *e = ((i * 73 + 31) % 256) as u8;
    }

    for mode in 0..N_IMPL_INTRA_PRED_MODES as u8 {
        for &w in &BLOCK_SIZES {
            for &h in &BLOCK_SIZES {
                if !geometry_supported(mode, w, h) {
                    continue;
                }
                for angle in angles_for_mode(mode) {
                    for sm in [0, 1 << 9] {
                        let angle = angle | if mode == FILTER_PRED { 0 } else { sm };
                        let mut dst = vec![0u8; w * h];
                        let mut dst2 = vec![0u8; w * h];
                        (dsp.intra_pred[mode as usize])(
                            &mut dst, w, &edge, TL, w as c_int, h as c_int, angle, bd,
                        );
                        (dsp.intra_pred[mode as usize])(
                            &mut dst2, w, &edge, TL, w as c_int, h as c_int, angle, bd,
                        );
                        assert_eq!(
                            dst.as_bytes(),
                            dst2.as_bytes(),
                            "mode {mode} {w}x{h} angle {angle}"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(feature = "bitdepth_16")]
#[test]
fn test_all_modes_in_range_and_deterministic_16bpc() {
    for bitdepth_max in [1023u16, 4095] {
        let dsp = Rav1dIntraPredDSPContext::<BitDepth16>::new(CpuFlags::empty());
        let bd = BitDepth16::new(bitdepth_max);
        let mut edge = [0u16; EDGE_LEN];
        for (i, e) in edge.iter_mut().enumerate() {
            *e = ((i * 731 + 37) % (bitdepth_max as usize + 1)) as u16;
        }

        for mode in 0..N_IMPL_INTRA_PRED_MODES as u8 {
            for &w in &BLOCK_SIZES {
                for &h in &BLOCK_SIZES {
                    if !geometry_supported(mode, w, h) {
                        continue;
                    }
                    for angle in angles_for_mode(mode) {
                        let mut dst = vec![0u16; w * h];
                        let mut dst2 = vec![0u16; w * h];
                        (dsp.intra_pred[mode as usize])(
                            &mut dst, w, &edge, TL, w as c_int, h as c_int, angle, bd,
                        );
                        (dsp.intra_pred[mode as usize])(
                            &mut dst2, w, &edge, TL, w as c_int, h as c_int, angle, bd,
                        );
                        assert!(
                            dst.iter().all(|&p| p <= bitdepth_max),
                            "mode {mode} {w}x{h} angle {angle} out of range"
                        );
                        assert_eq!(
                            dst.as_bytes(),
                            dst2.as_bytes(),
                            "mode {mode} {w}x{h} angle {angle}"
                        );
                    }
                }
            }
        }
    }
}

/// Every registered chroma-from-luma extractor, checked for the
/// rounded-mean-zero invariant on its own geometry.
#[cfg(feature = "bitdepth_8")]
#[test]
fn test_cfl_ac_all_layouts_zero_mean_8bpc() {
    use Rav1dPixelLayoutSubSampled::*;
    use TxfmSize::*;

    let cases: &[(Rav1dPixelLayoutSubSampled, TxfmSize, usize, usize)] = &[
        (I420, S4x4, 4, 4),
        (I420, R4x8, 4, 8),
        (I420, R4x16, 4, 16),
        (I420, R8x4, 8, 4),
        (I420, S8x8, 8, 8),
        (I420, R8x16, 8, 16),
        (I420, R16x4, 16, 4),
        (I420, R16x8, 16, 8),
        (I420, S16x16, 16, 16),
        (I422, S4x4, 4, 4),
        (I422, R4x8, 4, 8),
        (I422, R8x4, 8, 4),
        (I422, S8x8, 8, 8),
        (I422, R8x16, 8, 16),
        (I422, R16x8, 16, 8),
        (I422, S16x16, 16, 16),
        (I422, R16x32, 16, 32),
        (I444, S4x4, 4, 4),
        (I444, R4x8, 4, 8),
        (I444, R4x16, 4, 16),
        (I444, R8x4, 8, 4),
        (I444, S8x8, 8, 8),
        (I444, R8x16, 8, 16),
        (I444, R8x32, 8, 32),
        (I444, R16x4, 16, 4),
        (I444, R16x8, 16, 8),
        (I444, S16x16, 16, 16),
        (I444, R16x32, 16, 32),
        (I444, R32x8, 32, 8),
        (I444, R32x16, 32, 16),
        (I444, S32x32, 32, 32),
    ];

    let dsp = Rav1dIntraPredDSPContext::<BitDepth8>::new(CpuFlags::empty());
    let luma: Vec<u8> = (0..64 * 64).map(|i| ((i * 89 + 41) % 256) as u8).collect();

    for &(layout, tx, cw, ch) in cases {
        let ss_hor = match layout {
            I420 | I422 => 1,
            I444 => 0,
        };
        let stride = cw << ss_hor;
        let mut ac = vec![0i16; cw * ch];
        (dsp.cfl_ac[layout as usize][tx as usize])(&mut ac, &luma, stride, 0, 0);

        let n = (cw * ch) as i32;
        let log2sz = n.trailing_zeros();
        let sum: i32 = ac.iter().map(|&v| v as i32).sum();
        assert_eq!(
            (sum + (n >> 1)) >> log2sz,
            0,
            "{layout:?} {tx:?}: sum = {sum}"
        );
    }
}

/// Predictors leave the destination DC untouched when the scaled AC
/// contribution is zero; the paired entry point behaves like two single
/// calls.
#[cfg(feature = "bitdepth_8")]
#[test]
fn test_cfl_pred_paired_matches_single_8bpc() {
    let dsp = Rav1dIntraPredDSPContext::<BitDepth8>::new(CpuFlags::empty());
    let bd = BitDepth8::new(());

    for (w_idx, w) in [4usize, 8, 16, 32].into_iter().enumerate() {
        let h = w;
        let ac: Vec<i16> = (0..w * h).map(|i| ((i * 53) % 512) as i16 - 256).collect();
        let alphas = [13i8, -77];

        let mut u_single = vec![90u8; w * h];
        let mut v_single = vec![160u8; w * h];
        (dsp.cfl_pred_1[w_idx])(&mut u_single, w, &ac, alphas[0], h as c_int, bd);
        (dsp.cfl_pred_1[w_idx])(&mut v_single, w, &ac, alphas[1], h as c_int, bd);

        let mut u_pair = vec![90u8; w * h];
        let mut v_pair = vec![160u8; w * h];
        (dsp.cfl_pred[w_idx])(&mut u_pair, &mut v_pair, w, &ac, &alphas, h as c_int, bd);

        assert_eq!(u_single, u_pair, "U {w}x{h}");
        assert_eq!(v_single, v_pair, "V {w}x{h}");
    }
}

#[cfg(feature = "bitdepth_8")]
#[test]
fn test_pal_pred_full_range_indices_8bpc() {
    let dsp = Rav1dIntraPredDSPContext::<BitDepth8>::new(CpuFlags::empty());
    let pal = [3u8, 19, 40, 77, 110, 160, 200, 251];
    for &w in &BLOCK_SIZES {
        for &h in &BLOCK_SIZES {
            let idx: Vec<u8> = (0..w * h).map(|i| (i % 8) as u8).collect();
            let mut dst = vec![0u8; w * h];
            (dsp.pal_pred)(&mut dst, w, &pal, &idx, w as c_int, h as c_int);
            for i in 0..w * h {
                assert_eq!(dst[i], pal[(i % 8)], "{w}x{h} at {i}");
            }
        }
    }
}

/// Masking all CPU flags away must not change behavior: the scalar
/// reference tables define the output.
#[cfg(feature = "bitdepth_8")]
#[test]
fn test_flags_do_not_change_reference_output() {
    let reference = Rav1dIntraPredDSPContext::<BitDepth8>::new(CpuFlags::empty());
    let detected = Rav1dIntraPredDSPContext::<BitDepth8>::get();
    let bd = BitDepth8::new(());

    let mut edge = [0u8; EDGE_LEN];
    for (i, e) in edge.iter_mut().enumerate() {
        *e = ((i * 37 + 13) % 256) as u8;
    }

    for mode in [DC_PRED, PAETH_PRED, SMOOTH_PRED, Z2_PRED] {
        let angle = if mode == Z2_PRED { 135 } else { 0 };
        let mut a = vec![0u8; 16 * 16];
        let mut b = vec![0u8; 16 * 16];
        (reference.intra_pred[mode as usize])(&mut a, 16, &edge, TL, 16, 16, angle, bd);
        (detected.intra_pred[mode as usize])(&mut b, 16, &edge, TL, 16, 16, angle, bd);
        assert_eq!(a, b, "mode {mode}");
    }
}
