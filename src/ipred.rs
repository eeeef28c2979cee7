//! Intra prediction sample generation: the 14 block predictors, the
//! chroma-from-luma AC/combine pair and palette expansion, plus the edge
//! filtering and upsampling passes the directional predictors run first.
//!
//! Every function writes a `width`x`height` block into `dst` (pixel
//! stride `stride`) from the neighbor samples in `topleft`, a slice whose
//! index `topleft_off` holds the top-left corner sample: `topleft_off + 1 + x`
//! is the row above the block, `topleft_off - 1 - y` the column to its left.

#![forbid(unsafe_code)]

use std::cmp;
use std::ffi::c_int;
use std::ffi::c_uint;
#[cfg(any(feature = "bitdepth_8", feature = "bitdepth_16"))]
use std::sync::OnceLock;

use strum::EnumCount;

use crate::include::common::bitdepth::AsPrimitive;
use crate::include::common::bitdepth::BitDepth;
#[cfg(feature = "bitdepth_16")]
use crate::include::common::bitdepth::BitDepth16;
#[cfg(feature = "bitdepth_8")]
use crate::include::common::bitdepth::BitDepth8;
use crate::include::common::bitdepth::BPC;
use crate::include::common::intops::apply_sign;
use crate::include::common::intops::iclip;
use crate::include::common::intops::ulog2;
use crate::src::cpu::rav1d_get_cpu_flags;
use crate::src::cpu::CpuFlags;
use crate::src::levels::Rav1dPixelLayoutSubSampled;
use crate::src::levels::TxfmSize;
use crate::src::levels::DC_128_PRED;
use crate::src::levels::DC_PRED;
use crate::src::levels::FILTER_PRED;
use crate::src::levels::HOR_PRED;
use crate::src::levels::LEFT_DC_PRED;
use crate::src::levels::N_IMPL_INTRA_PRED_MODES;
use crate::src::levels::PAETH_PRED;
use crate::src::levels::SMOOTH_H_PRED;
use crate::src::levels::SMOOTH_PRED;
use crate::src::levels::SMOOTH_V_PRED;
use crate::src::levels::TOP_DC_PRED;
use crate::src::levels::VERT_PRED;
use crate::src::levels::Z1_PRED;
use crate::src::levels::Z2_PRED;
use crate::src::levels::Z3_PRED;
use crate::src::tables::dav1d_dr_intra_derivative;
use crate::src::tables::dav1d_filter_intra_taps;
use crate::src::tables::dav1d_sm_weights;

/// One of the 14 block predictors. `angle` carries the packed angle word
/// for the three zone predictors, the filter index for the filter
/// predictor, and is ignored by everything else.
pub type AngularIpredFn<BD: BitDepth> = fn(
    dst: &mut [<BD as BitDepth>::Pixel],
    stride: usize,
    topleft: &[<BD as BitDepth>::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    angle: c_int,
    bd: BD,
);

/// Chroma-from-luma AC extraction with the chroma geometry and
/// subsampling baked in. `ac` is the chroma-sized output plane (stride =
/// width); `ypx` is the co-located luma with pixel stride `stride`.
pub type CflAcFn<BD: BitDepth> = fn(
    ac: &mut [i16],
    ypx: &[<BD as BitDepth>::Pixel],
    stride: usize,
    w_pad: c_int,
    h_pad: c_int,
);

pub type CflPred1Fn<BD: BitDepth> = fn(
    dst: &mut [<BD as BitDepth>::Pixel],
    stride: usize,
    ac: &[i16],
    alpha: i8,
    height: c_int,
    bd: BD,
);

pub type CflPredFn<BD: BitDepth> = fn(
    dst_u: &mut [<BD as BitDepth>::Pixel],
    dst_v: &mut [<BD as BitDepth>::Pixel],
    stride: usize,
    ac: &[i16],
    alphas: &[i8; 2],
    height: c_int,
    bd: BD,
);

pub type PalPredFn<BD: BitDepth> = fn(
    dst: &mut [<BD as BitDepth>::Pixel],
    stride: usize,
    pal: &[<BD as BitDepth>::Pixel; 8],
    idx: &[u8],
    width: c_int,
    height: c_int,
);

#[inline(never)]
fn splat_dc<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    width: usize,
    height: usize,
    dc: c_int,
    bd: BD,
) {
    debug_assert!(dc >= 0 && dc <= bd.bitdepth_max().as_::<c_int>());
    let dc = dc.as_::<BD::Pixel>();
    for y in 0..height {
        dst[y * stride..][..width].fill(dc);
    }
}

fn ipred_dc_top_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    let mut dc = width as c_uint >> 1;
    for i in 0..width {
        dc += topleft[topleft_off + 1 + i].as_::<c_uint>();
    }

    splat_dc(
        dst,
        stride,
        width,
        height,
        (dc >> width.trailing_zeros()) as c_int,
        bd,
    );
}

fn ipred_dc_left_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    let mut dc = height as c_uint >> 1;
    for i in 0..height {
        dc += topleft[topleft_off - (1 + i)].as_::<c_uint>();
    }

    splat_dc(
        dst,
        stride,
        width,
        height,
        (dc >> height.trailing_zeros()) as c_int,
        bd,
    );
}

fn ipred_dc_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    let mut dc = (width + height) as c_uint >> 1;
    for i in 0..width {
        dc += topleft[topleft_off + 1 + i].as_::<c_uint>();
    }
    for i in 0..height {
        dc += topleft[topleft_off - (1 + i)].as_::<c_uint>();
    }
    dc >>= (width + height).trailing_zeros();

    if width != height {
        let (multiplier_1x2, multiplier_1x4, base_shift) = match BD::BPC {
            BPC::BPC8 => (0x5556, 0x3334, 16),
            BPC::BPC16 => (0xAAAB, 0x6667, 17),
        };
        dc *= if width > height * 2 || height > width * 2 {
            multiplier_1x4
        } else {
            multiplier_1x2
        };
        dc >>= base_shift;
    }

    splat_dc(dst, stride, width, height, dc as c_int, bd);
}

fn ipred_dc_128_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    _topleft: &[BD::Pixel],
    _topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    bd: BD,
) {
    let dc = (bd.bitdepth_max().as_::<c_int>() + 1) >> 1;
    splat_dc(dst, stride, width as usize, height as usize, dc, bd);
}

fn ipred_v_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    _bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    for y in 0..height {
        BD::pixel_copy(
            &mut dst[y * stride..],
            &topleft[topleft_off + 1..],
            width,
        );
    }
}

fn ipred_h_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    _bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    for y in 0..height {
        BD::pixel_set(&mut dst[y * stride..], topleft[topleft_off - (1 + y)], width);
    }
}

fn ipred_paeth_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    tl_ptr: &[BD::Pixel],
    tl_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    _bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    let topleft = tl_ptr[tl_off].as_::<c_int>();
    for y in 0..height {
        let left = tl_ptr[tl_off - (y + 1)].as_::<c_int>();
        let dst_row = &mut dst[y * stride..][..width];
        for x in 0..width {
            let top = tl_ptr[tl_off + 1 + x].as_::<c_int>();
            let base = left + top - topleft;
            let ldiff = (left - base).abs();
            let tdiff = (top - base).abs();
            let tldiff = (topleft - base).abs();

            dst_row[x] = (if ldiff <= tdiff && ldiff <= tldiff {
                left
            } else if tdiff <= tldiff {
                top
            } else {
                topleft
            })
            .as_::<BD::Pixel>();
        }
    }
}

fn ipred_smooth_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    _bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    let weights_hor = &dav1d_sm_weights[width..][..width];
    let weights_ver = &dav1d_sm_weights[height..][..height];
    let right = topleft[topleft_off + width].as_::<c_int>();
    let bottom = topleft[topleft_off - height].as_::<c_int>();

    for y in 0..height {
        let dst_row = &mut dst[y * stride..][..width];
        for x in 0..width {
            let pred = weights_ver[y] as c_int * topleft[topleft_off + 1 + x].as_::<c_int>()
                + (256 - weights_ver[y] as c_int) * bottom
                + weights_hor[x] as c_int * topleft[topleft_off - (1 + y)].as_::<c_int>()
                + (256 - weights_hor[x] as c_int) * right;
            dst_row[x] = ((pred + 256) >> 9).as_::<BD::Pixel>();
        }
    }
}

fn ipred_smooth_v_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    _bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    let weights_ver = &dav1d_sm_weights[height..][..height];
    let bottom = topleft[topleft_off - height].as_::<c_int>();

    for y in 0..height {
        let dst_row = &mut dst[y * stride..][..width];
        for x in 0..width {
            let pred = weights_ver[y] as c_int * topleft[topleft_off + 1 + x].as_::<c_int>()
                + (256 - weights_ver[y] as c_int) * bottom;
            dst_row[x] = ((pred + 128) >> 8).as_::<BD::Pixel>();
        }
    }
}

fn ipred_smooth_h_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    _angle: c_int,
    _bd: BD,
) {
    let width = width as usize;
    let height = height as usize;
    let weights_hor = &dav1d_sm_weights[width..][..width];
    let right = topleft[topleft_off + width].as_::<c_int>();

    for y in 0..height {
        let dst_row = &mut dst[y * stride..][..width];
        for x in 0..width {
            let pred = weights_hor[x] as c_int * topleft[topleft_off - (y + 1)].as_::<c_int>()
                + (256 - weights_hor[x] as c_int) * right;
            dst_row[x] = ((pred + 128) >> 8).as_::<BD::Pixel>();
        }
    }
}

fn get_filter_strength(blk_wh: c_int, d: c_int, is_sm: bool) -> c_int {
    let mut strength = 0;

    if !is_sm {
        if blk_wh <= 8 {
            if d >= 56 {
                strength = 1;
            }
        } else if blk_wh <= 12 {
            if d >= 40 {
                strength = 1;
            }
        } else if blk_wh <= 16 {
            if d >= 40 {
                strength = 1;
            }
        } else if blk_wh <= 24 {
            if d >= 8 {
                strength = 1;
            }
            if d >= 16 {
                strength = 2;
            }
            if d >= 32 {
                strength = 3;
            }
        } else if blk_wh <= 32 {
            if d >= 1 {
                strength = 1;
            }
            if d >= 4 {
                strength = 2;
            }
            if d >= 32 {
                strength = 3;
            }
        } else {
            if d >= 1 {
                strength = 3;
            }
        }
    } else {
        if blk_wh <= 8 {
            if d >= 40 {
                strength = 1;
            }
            if d >= 64 {
                strength = 2;
            }
        } else if blk_wh <= 16 {
            if d >= 20 {
                strength = 1;
            }
            if d >= 48 {
                strength = 2;
            }
        } else if blk_wh <= 24 {
            if d >= 4 {
                strength = 3;
            }
        } else {
            if d >= 1 {
                strength = 3;
            }
        }
    }

    strength
}

/// Smooth `sz` samples of an edge run with a 5-tap kernel; reads outside
/// `in[from..to)` (relative to `in_off`) clamp to the run's end samples.
fn filter_edge<BD: BitDepth>(
    out: &mut [BD::Pixel],
    sz: c_int,
    r#in: &[BD::Pixel],
    in_off: usize,
    from: c_int,
    to: c_int,
    strength: c_int,
) {
    static KERNEL: [[u8; 5]; 3] = [[0, 4, 8, 4, 0], [0, 5, 6, 5, 0], [2, 4, 4, 4, 2]];

    debug_assert!(strength > 0);
    for i in 0..sz {
        let mut s = 0;
        for j in 0..5 {
            s += r#in[(in_off as c_int + iclip(i - 2 + j, from, to - 1)) as usize].as_::<c_int>()
                * KERNEL[(strength - 1) as usize][j as usize] as c_int;
        }
        out[i as usize] = ((s + 8) >> 4).as_::<BD::Pixel>();
    }
}

fn get_upsample(blk_wh: c_int, d: c_int, is_sm: bool) -> bool {
    if d >= 40 {
        return false;
    }
    if is_sm {
        blk_wh <= 8
    } else {
        blk_wh <= 16
    }
}

/// Double an edge run to 2 * `hsz` - 1 samples: even outputs copy the
/// input, odd outputs interpolate with a 4-tap kernel.
fn upsample_edge<BD: BitDepth>(
    out: &mut [BD::Pixel],
    hsz: c_int,
    r#in: &[BD::Pixel],
    in_off: usize,
    from: c_int,
    to: c_int,
    bd: BD,
) {
    static KERNEL: [i8; 4] = [-1, 9, 9, -1];

    let mut i = 0;
    while i < hsz - 1 {
        out[(i * 2) as usize] = r#in[(in_off as c_int + iclip(i, from, to - 1)) as usize];

        let mut s = 0;
        for j in 0..4 {
            s += r#in[(in_off as c_int + iclip(i + j - 1, from, to - 1)) as usize].as_::<c_int>()
                * KERNEL[j as usize] as c_int;
        }
        out[(i * 2 + 1) as usize] = bd.iclip_pixel((s + 8) >> 4);
        i += 1;
    }
    out[(i * 2) as usize] = r#in[(in_off as c_int + iclip(i, from, to - 1)) as usize];
}

fn ipred_z1_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft_in: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    mut angle: c_int,
    bd: BD,
) {
    let is_sm = (angle >> 9) & 0x1 != 0;
    angle &= 511;
    debug_assert!(angle > 0 && angle < 90);
    let dx = dav1d_dr_intra_derivative[angle as usize] as c_int;
    let mut top_out: [BD::Pixel; (64 + 64) * 2] = [0.into(); (64 + 64) * 2];
    let top: &[BD::Pixel];
    let top_off: usize;
    let max_base_x;
    let upsample_above = get_upsample(width + height, 90 - angle, is_sm);
    if upsample_above {
        upsample_edge::<BD>(
            &mut top_out,
            width + height,
            topleft_in,
            topleft_off + 1,
            -1,
            width + cmp::min(width, height),
            bd,
        );
        top = &top_out;
        top_off = 0;
        max_base_x = 2 * (width + height) - 2;
    } else {
        let filter_strength = get_filter_strength(width + height, 90 - angle, is_sm);

        if filter_strength != 0 {
            filter_edge::<BD>(
                &mut top_out,
                width + height,
                topleft_in,
                topleft_off + 1,
                -1,
                width + cmp::min(width, height),
                filter_strength,
            );
            top = &top_out;
            top_off = 0;
            max_base_x = width + height - 1;
        } else {
            top = topleft_in;
            top_off = topleft_off + 1;
            max_base_x = width + cmp::min(width, height) - 1;
        }
    }
    let width = width as usize;
    let height = height as usize;
    let frac_bits = 6 - upsample_above as c_int;
    let base_inc = 1 << upsample_above as c_int;
    let mut xpos = dx;
    for y in 0..height {
        let dst_row = &mut dst[y * stride..][..width];
        let mut base = xpos >> frac_bits;
        let frac = ((xpos << upsample_above as c_int) & 0x3F) >> 1;

        for x in 0..width {
            if base < max_base_x {
                let v = top[top_off + base as usize].as_::<c_int>() * (32 - frac)
                    + top[top_off + base as usize + 1].as_::<c_int>() * frac;
                dst_row[x] = bd.iclip_pixel((v + 16) >> 5);
                base += base_inc;
            } else {
                BD::pixel_set(
                    &mut dst_row[x..],
                    top[top_off + max_base_x as usize],
                    width - x,
                );
                break;
            }
        }
        xpos += dx;
    }
}

fn ipred_z2_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft_in: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    mut angle: c_int,
    bd: BD,
) {
    let is_sm = (angle >> 9) & 0x1 != 0;
    angle &= 511;
    debug_assert!(angle > 90 && angle < 180);
    let dy = dav1d_dr_intra_derivative[(angle - 90) as usize] as c_int;
    let dx = dav1d_dr_intra_derivative[(180 - angle) as usize] as c_int;
    let upsample_left = get_upsample(width + height, 180 - angle, is_sm);
    let upsample_above = get_upsample(width + height, angle - 90, is_sm);
    // The conditioned edge, with the top-left corner at index `topleft`:
    // left samples below it, top samples above it, either side doubled
    // in place when upsampled.
    let mut edge: [BD::Pixel; 64 * 2 + 64 * 2 + 1] = [0.into(); 64 * 2 + 64 * 2 + 1];
    let topleft = (height * 2) as usize;

    if upsample_above {
        upsample_edge::<BD>(
            &mut edge[topleft..],
            width + 1,
            topleft_in,
            topleft_off,
            0,
            width + 1,
            bd,
        );
    } else {
        let filter_strength = get_filter_strength(width + height, angle - 90, is_sm);

        if filter_strength != 0 {
            filter_edge::<BD>(
                &mut edge[topleft + 1..],
                width,
                topleft_in,
                topleft_off + 1,
                -1,
                width,
                filter_strength,
            );
        } else {
            BD::pixel_copy(
                &mut edge[topleft + 1..],
                &topleft_in[topleft_off + 1..],
                width as usize,
            );
        }
    }
    if upsample_left {
        upsample_edge::<BD>(
            &mut edge,
            height + 1,
            topleft_in,
            topleft_off - height as usize,
            0,
            height + 1,
            bd,
        );
    } else {
        let filter_strength = get_filter_strength(width + height, 180 - angle, is_sm);

        if filter_strength != 0 {
            filter_edge::<BD>(
                &mut edge[topleft - height as usize..],
                height,
                topleft_in,
                topleft_off - height as usize,
                0,
                height + 1,
                filter_strength,
            );
        } else {
            BD::pixel_copy(
                &mut edge[topleft - height as usize..],
                &topleft_in[topleft_off - height as usize..],
                height as usize,
            );
        }
    }
    edge[topleft] = topleft_in[topleft_off];

    let min_base_x = -(1 << upsample_above as c_int);
    let frac_bits_y = 6 - upsample_left as c_int;
    let frac_bits_x = 6 - upsample_above as c_int;
    let base_inc_x = 1 << upsample_above as c_int;
    let left_off = topleft as c_int - (1 << upsample_left as c_int);
    let top_off = topleft as c_int + (1 << upsample_above as c_int);
    let width = width as usize;
    let height = height as usize;
    let mut xpos = -dx;
    for y in 0..height {
        let dst_row = &mut dst[y * stride..][..width];
        let mut base_x = xpos >> frac_bits_x;
        let frac_x = ((xpos * (1 << upsample_above as c_int)) & 0x3F) >> 1;
        let mut ypos = ((y as c_int) << 6) - dy;

        for x in 0..width {
            let v;

            if base_x >= min_base_x {
                v = edge[(top_off + base_x) as usize].as_::<c_int>() * (32 - frac_x)
                    + edge[(top_off + base_x + 1) as usize].as_::<c_int>() * frac_x;
            } else {
                let base_y = ypos >> frac_bits_y;
                debug_assert!(base_y >= -(1 << upsample_left as c_int));
                let frac_y = ((ypos * (1 << upsample_left as c_int)) & 0x3F) >> 1;
                v = edge[(left_off - base_y) as usize].as_::<c_int>() * (32 - frac_y)
                    + edge[(left_off - (base_y + 1)) as usize].as_::<c_int>() * frac_y;
            }
            dst_row[x] = bd.iclip_pixel((v + 16) >> 5);
            base_x += base_inc_x;
            ypos -= dy;
        }
        xpos -= dx;
    }
}

fn ipred_z3_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft_in: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    mut angle: c_int,
    bd: BD,
) {
    let is_sm = (angle >> 9) & 0x1 != 0;
    angle &= 511;
    debug_assert!(angle > 180);
    let dy = dav1d_dr_intra_derivative[(270 - angle) as usize] as c_int;
    let mut left_out: [BD::Pixel; (64 + 64) * 2] = [0.into(); (64 + 64) * 2];
    let left: &[BD::Pixel];
    let left_off: usize;
    let max_base_y;
    let upsample_left = get_upsample(width + height, angle - 180, is_sm);
    if upsample_left {
        upsample_edge::<BD>(
            &mut left_out,
            width + height,
            topleft_in,
            topleft_off - (width + height) as usize,
            cmp::max(width - height, 0),
            width + height + 1,
            bd,
        );
        left = &left_out;
        left_off = (2 * (width + height) - 2) as usize;
        max_base_y = 2 * (width + height) - 2;
    } else {
        let filter_strength = get_filter_strength(width + height, angle - 180, is_sm);

        if filter_strength != 0 {
            filter_edge::<BD>(
                &mut left_out,
                width + height,
                topleft_in,
                topleft_off - (width + height) as usize,
                cmp::max(width - height, 0),
                width + height + 1,
                filter_strength,
            );
            left = &left_out;
            left_off = (width + height - 1) as usize;
            max_base_y = width + height - 1;
        } else {
            left = topleft_in;
            left_off = topleft_off - 1;
            max_base_y = height + cmp::min(width, height) - 1;
        }
    }
    let width = width as usize;
    let height = height as usize;
    let frac_bits = 6 - upsample_left as c_int;
    let base_inc = 1 << upsample_left as c_int;
    let mut ypos = dy;
    for x in 0..width {
        let mut base = ypos >> frac_bits;
        let frac = ((ypos << upsample_left as c_int) & 0x3F) >> 1;

        let mut y = 0;
        while y < height {
            if base < max_base_y {
                let v = left[left_off - base as usize].as_::<c_int>() * (32 - frac)
                    + left[left_off - (base + 1) as usize].as_::<c_int>() * frac;
                dst[y * stride + x] = bd.iclip_pixel((v + 16) >> 5);
                y += 1;
                base += base_inc;
            } else {
                while y < height {
                    dst[y * stride + x] = left[left_off - max_base_y as usize];
                    y += 1;
                }
            }
        }
        ypos += dy;
    }
}

/// Up to 32x32 only.
fn ipred_filter_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    topleft_in: &[BD::Pixel],
    topleft_off: usize,
    width: c_int,
    height: c_int,
    filt_idx: c_int,
    bd: BD,
) {
    let filt_idx = (filt_idx & 511) as usize;
    debug_assert!(filt_idx < 5);
    let width = width as usize;
    let height = height as usize;

    let filter = &dav1d_filter_intra_taps[filt_idx];
    for y in (0..height).step_by(2) {
        for x in (0..width).step_by(4) {
            // The 7 context samples: the tile's top-left corner, the 4
            // samples above it and the 2 to its left. The first row-pair
            // and the first column read the conditioned edge; every other
            // tile reads back previously predicted pixels.
            let p0;
            let p1;
            let p2;
            let p3;
            let p4;
            if y == 0 {
                p0 = topleft_in[topleft_off + x].as_::<c_int>();
                p1 = topleft_in[topleft_off + 1 + x].as_::<c_int>();
                p2 = topleft_in[topleft_off + 1 + x + 1].as_::<c_int>();
                p3 = topleft_in[topleft_off + 1 + x + 2].as_::<c_int>();
                p4 = topleft_in[topleft_off + 1 + x + 3].as_::<c_int>();
            } else {
                p0 = if x == 0 {
                    topleft_in[topleft_off - y].as_::<c_int>()
                } else {
                    dst[(y - 1) * stride + x - 1].as_::<c_int>()
                };
                p1 = dst[(y - 1) * stride + x].as_::<c_int>();
                p2 = dst[(y - 1) * stride + x + 1].as_::<c_int>();
                p3 = dst[(y - 1) * stride + x + 2].as_::<c_int>();
                p4 = dst[(y - 1) * stride + x + 3].as_::<c_int>();
            }
            let (p5, p6) = if x == 0 {
                (
                    topleft_in[topleft_off - (y + 1)].as_::<c_int>(),
                    topleft_in[topleft_off - (y + 2)].as_::<c_int>(),
                )
            } else {
                (
                    dst[y * stride + x - 1].as_::<c_int>(),
                    dst[(y + 1) * stride + x - 1].as_::<c_int>(),
                )
            };

            for yy in 0..2 {
                for xx in 0..4 {
                    let flt = &filter[yy * 4 + xx];
                    let acc = flt[0] as c_int * p0
                        + flt[1] as c_int * p1
                        + flt[2] as c_int * p2
                        + flt[3] as c_int * p3
                        + flt[4] as c_int * p4
                        + flt[5] as c_int * p5
                        + flt[6] as c_int * p6;
                    dst[(y + yy) * stride + x + xx] = bd.iclip_pixel((acc + 8) >> 4);
                }
            }
        }
    }
}

#[inline(never)]
fn cfl_ac_rust<BD: BitDepth>(
    ac: &mut [i16],
    ypx: &[BD::Pixel],
    stride: usize,
    w_pad: c_int,
    h_pad: c_int,
    width: usize,
    height: usize,
    ss_hor: bool,
    ss_ver: bool,
) {
    debug_assert!(w_pad >= 0 && 4 * w_pad < width as c_int);
    debug_assert!(h_pad >= 0 && 4 * h_pad < height as c_int);
    let w_pad = w_pad as usize;
    let h_pad = h_pad as usize;
    let ac = &mut ac[..width * height];

    let mut ypx_off = 0;
    for y in 0..height - 4 * h_pad {
        let ac_row = &mut ac[y * width..][..width];
        for x in 0..width - 4 * w_pad {
            let sx = x << ss_hor as usize;
            let mut ac_sum = ypx[ypx_off + sx].as_::<c_int>();
            if ss_hor {
                ac_sum += ypx[ypx_off + sx + 1].as_::<c_int>();
            }
            if ss_ver {
                ac_sum += ypx[ypx_off + sx + stride].as_::<c_int>();
                if ss_hor {
                    ac_sum += ypx[ypx_off + sx + 1 + stride].as_::<c_int>();
                }
            }
            ac_row[x] = (ac_sum << (1 + !ss_ver as c_int + !ss_hor as c_int)) as i16;
        }
        for x in width - 4 * w_pad..width {
            ac_row[x] = ac_row[x - 1];
        }
        ypx_off += stride << ss_ver as usize;
    }
    for y in height - 4 * h_pad..height {
        let (up, row) = ac.split_at_mut(y * width);
        row[..width].copy_from_slice(&up[(y - 1) * width..][..width]);
    }

    let log2sz = ulog2((width * height) as c_uint);
    let mut sum = (1 << log2sz) >> 1;
    for &v in ac.iter() {
        sum += v as c_int;
    }
    sum >>= log2sz;

    // subtract DC
    for v in ac.iter_mut() {
        *v -= sum as i16;
    }
}

fn cfl_ac<BD: BitDepth, const W: usize, const H: usize, const SS_HOR: bool, const SS_VER: bool>(
    ac: &mut [i16],
    ypx: &[BD::Pixel],
    stride: usize,
    w_pad: c_int,
    h_pad: c_int,
) {
    cfl_ac_rust::<BD>(ac, ypx, stride, w_pad, h_pad, W, H, SS_HOR, SS_VER)
}

fn cfl_ac_unsupported<BD: BitDepth>(
    _ac: &mut [i16],
    _ypx: &[BD::Pixel],
    _stride: usize,
    _w_pad: c_int,
    _h_pad: c_int,
) {
    unreachable!("no chroma-from-luma AC extractor registered for this layout/size");
}

#[inline(never)]
fn cfl_pred_1_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    ac: &[i16],
    alpha: i8,
    width: usize,
    height: usize,
    bd: BD,
) {
    let dc = dst[0].as_::<c_int>();
    for y in 0..height {
        let dst_row = &mut dst[y * stride..][..width];
        let ac_row = &ac[y * width..][..width];
        for x in 0..width {
            let diff = alpha as c_int * ac_row[x] as c_int;
            dst_row[x] = bd.iclip_pixel(dc + apply_sign((diff.abs() + 32) >> 6, diff));
        }
    }
}

fn cfl_pred_1<BD: BitDepth, const W: usize>(
    dst: &mut [BD::Pixel],
    stride: usize,
    ac: &[i16],
    alpha: i8,
    height: c_int,
    bd: BD,
) {
    cfl_pred_1_rust::<BD>(dst, stride, ac, alpha, W, height as usize, bd)
}

#[inline(never)]
fn cfl_pred_rust<BD: BitDepth>(
    dst_u: &mut [BD::Pixel],
    dst_v: &mut [BD::Pixel],
    stride: usize,
    ac: &[i16],
    alphas: &[i8; 2],
    width: usize,
    height: usize,
    bd: BD,
) {
    let dc_u = dst_u[0].as_::<c_int>();
    let dc_v = dst_v[0].as_::<c_int>();
    for y in 0..height {
        let u_row = &mut dst_u[y * stride..][..width];
        let v_row = &mut dst_v[y * stride..][..width];
        let ac_row = &ac[y * width..][..width];
        for x in 0..width {
            let diff1 = alphas[0] as c_int * ac_row[x] as c_int;
            u_row[x] = bd.iclip_pixel(dc_u + apply_sign((diff1.abs() + 32) >> 6, diff1));
            let diff2 = alphas[1] as c_int * ac_row[x] as c_int;
            v_row[x] = bd.iclip_pixel(dc_v + apply_sign((diff2.abs() + 32) >> 6, diff2));
        }
    }
}

fn cfl_pred<BD: BitDepth, const W: usize>(
    dst_u: &mut [BD::Pixel],
    dst_v: &mut [BD::Pixel],
    stride: usize,
    ac: &[i16],
    alphas: &[i8; 2],
    height: c_int,
    bd: BD,
) {
    cfl_pred_rust::<BD>(dst_u, dst_v, stride, ac, alphas, W, height as usize, bd)
}

fn pal_pred_rust<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    stride: usize,
    pal: &[BD::Pixel; 8],
    idx: &[u8],
    width: c_int,
    height: c_int,
) {
    let width = width as usize;
    let height = height as usize;
    for y in 0..height {
        let dst_row = &mut dst[y * stride..][..width];
        let idx_row = &idx[y * width..][..width];
        for x in 0..width {
            dst_row[x] = pal[idx_row[x] as usize];
        }
    }
}

/// The intra prediction dispatch tables for one bit-depth build.
///
/// Populated once at startup; vectorized implementations may overwrite
/// individual entries with bit-identical variants, so the reference
/// functions registered by [`Self::default`] define correctness.
pub struct Rav1dIntraPredDSPContext<BD: BitDepth> {
    pub intra_pred: [AngularIpredFn<BD>; N_IMPL_INTRA_PRED_MODES],

    // chroma-from-luma functions are split per chroma subsampling type
    pub cfl_ac: [[CflAcFn<BD>; TxfmSize::COUNT]; Rav1dPixelLayoutSubSampled::COUNT],
    pub cfl_pred_1: [CflPred1Fn<BD>; 4],
    pub cfl_pred: [CflPredFn<BD>; 4],

    pub pal_pred: PalPredFn<BD>,
}

impl<BD: BitDepth> Rav1dIntraPredDSPContext<BD> {
    pub const fn default() -> Self {
        use Rav1dPixelLayoutSubSampled::*;
        use TxfmSize::*;

        let mut c = Self {
            intra_pred: [ipred_dc_rust::<BD> as AngularIpredFn<BD>; N_IMPL_INTRA_PRED_MODES],
            cfl_ac: [[cfl_ac_unsupported::<BD> as CflAcFn<BD>; TxfmSize::COUNT];
                Rav1dPixelLayoutSubSampled::COUNT],
            cfl_pred_1: [
                cfl_pred_1::<BD, 4>,
                cfl_pred_1::<BD, 8>,
                cfl_pred_1::<BD, 16>,
                cfl_pred_1::<BD, 32>,
            ],
            cfl_pred: [
                cfl_pred::<BD, 4>,
                cfl_pred::<BD, 8>,
                cfl_pred::<BD, 16>,
                cfl_pred::<BD, 32>,
            ],
            pal_pred: pal_pred_rust::<BD>,
        };

        c.intra_pred[DC_PRED as usize] = ipred_dc_rust::<BD>;
        c.intra_pred[DC_128_PRED as usize] = ipred_dc_128_rust::<BD>;
        c.intra_pred[TOP_DC_PRED as usize] = ipred_dc_top_rust::<BD>;
        c.intra_pred[LEFT_DC_PRED as usize] = ipred_dc_left_rust::<BD>;
        c.intra_pred[HOR_PRED as usize] = ipred_h_rust::<BD>;
        c.intra_pred[VERT_PRED as usize] = ipred_v_rust::<BD>;
        c.intra_pred[PAETH_PRED as usize] = ipred_paeth_rust::<BD>;
        c.intra_pred[SMOOTH_PRED as usize] = ipred_smooth_rust::<BD>;
        c.intra_pred[SMOOTH_V_PRED as usize] = ipred_smooth_v_rust::<BD>;
        c.intra_pred[SMOOTH_H_PRED as usize] = ipred_smooth_h_rust::<BD>;
        c.intra_pred[Z1_PRED as usize] = ipred_z1_rust::<BD>;
        c.intra_pred[Z2_PRED as usize] = ipred_z2_rust::<BD>;
        c.intra_pred[Z3_PRED as usize] = ipred_z3_rust::<BD>;
        c.intra_pred[FILTER_PRED as usize] = ipred_filter_rust::<BD>;

        c.cfl_ac[I420 as usize][S4x4 as usize] = cfl_ac::<BD, 4, 4, true, true>;
        c.cfl_ac[I420 as usize][R4x8 as usize] = cfl_ac::<BD, 4, 8, true, true>;
        c.cfl_ac[I420 as usize][R4x16 as usize] = cfl_ac::<BD, 4, 16, true, true>;
        c.cfl_ac[I420 as usize][R8x4 as usize] = cfl_ac::<BD, 8, 4, true, true>;
        c.cfl_ac[I420 as usize][S8x8 as usize] = cfl_ac::<BD, 8, 8, true, true>;
        c.cfl_ac[I420 as usize][R8x16 as usize] = cfl_ac::<BD, 8, 16, true, true>;
        c.cfl_ac[I420 as usize][R16x4 as usize] = cfl_ac::<BD, 16, 4, true, true>;
        c.cfl_ac[I420 as usize][R16x8 as usize] = cfl_ac::<BD, 16, 8, true, true>;
        c.cfl_ac[I420 as usize][S16x16 as usize] = cfl_ac::<BD, 16, 16, true, true>;

        c.cfl_ac[I422 as usize][S4x4 as usize] = cfl_ac::<BD, 4, 4, true, false>;
        c.cfl_ac[I422 as usize][R4x8 as usize] = cfl_ac::<BD, 4, 8, true, false>;
        c.cfl_ac[I422 as usize][R8x4 as usize] = cfl_ac::<BD, 8, 4, true, false>;
        c.cfl_ac[I422 as usize][S8x8 as usize] = cfl_ac::<BD, 8, 8, true, false>;
        c.cfl_ac[I422 as usize][R8x16 as usize] = cfl_ac::<BD, 8, 16, true, false>;
        c.cfl_ac[I422 as usize][R16x8 as usize] = cfl_ac::<BD, 16, 8, true, false>;
        c.cfl_ac[I422 as usize][S16x16 as usize] = cfl_ac::<BD, 16, 16, true, false>;
        c.cfl_ac[I422 as usize][R16x32 as usize] = cfl_ac::<BD, 16, 32, true, false>;

        c.cfl_ac[I444 as usize][S4x4 as usize] = cfl_ac::<BD, 4, 4, false, false>;
        c.cfl_ac[I444 as usize][R4x8 as usize] = cfl_ac::<BD, 4, 8, false, false>;
        c.cfl_ac[I444 as usize][R4x16 as usize] = cfl_ac::<BD, 4, 16, false, false>;
        c.cfl_ac[I444 as usize][R8x4 as usize] = cfl_ac::<BD, 8, 4, false, false>;
        c.cfl_ac[I444 as usize][S8x8 as usize] = cfl_ac::<BD, 8, 8, false, false>;
        c.cfl_ac[I444 as usize][R8x16 as usize] = cfl_ac::<BD, 8, 16, false, false>;
        c.cfl_ac[I444 as usize][R8x32 as usize] = cfl_ac::<BD, 8, 32, false, false>;
        c.cfl_ac[I444 as usize][R16x4 as usize] = cfl_ac::<BD, 16, 4, false, false>;
        c.cfl_ac[I444 as usize][R16x8 as usize] = cfl_ac::<BD, 16, 8, false, false>;
        c.cfl_ac[I444 as usize][S16x16 as usize] = cfl_ac::<BD, 16, 16, false, false>;
        c.cfl_ac[I444 as usize][R16x32 as usize] = cfl_ac::<BD, 16, 32, false, false>;
        c.cfl_ac[I444 as usize][R32x8 as usize] = cfl_ac::<BD, 32, 8, false, false>;
        c.cfl_ac[I444 as usize][R32x16 as usize] = cfl_ac::<BD, 32, 16, false, false>;
        c.cfl_ac[I444 as usize][S32x32 as usize] = cfl_ac::<BD, 32, 32, false, false>;

        c
    }

    #[inline(always)]
    const fn init(self, _flags: CpuFlags) -> Self {
        self
    }

    pub const fn new(flags: CpuFlags) -> Self {
        Self::default().init(flags)
    }
}

impl<BD: BitDepth> Default for Rav1dIntraPredDSPContext<BD> {
    fn default() -> Self {
        Self::default()
    }
}

#[cfg(feature = "bitdepth_8")]
impl Rav1dIntraPredDSPContext<BitDepth8> {
    /// The 8 bpc tables, initialized on first use for the running CPU.
    pub fn get() -> &'static Self {
        static DSP: OnceLock<Rav1dIntraPredDSPContext<BitDepth8>> = OnceLock::new();
        DSP.get_or_init(|| Self::new(rav1d_get_cpu_flags()))
    }
}

#[cfg(feature = "bitdepth_16")]
impl Rav1dIntraPredDSPContext<BitDepth16> {
    /// The 16 bpc (10- and 12-bit) tables, initialized on first use for
    /// the running CPU.
    pub fn get() -> &'static Self {
        static DSP: OnceLock<Rav1dIntraPredDSPContext<BitDepth16>> = OnceLock::new();
        DSP.get_or_init(|| Self::new(rav1d_get_cpu_flags()))
    }
}
