#![forbid(unsafe_code)]
#![allow(non_upper_case_globals)]

/// Smooth-predictor blending weights, indexed by block dimension:
/// the weights for a dimension of `n` samples start at index `n`.
#[rustfmt::skip]
pub static dav1d_sm_weights: [u8; 128] = [
    // Unused, because we always offset by bs, which is at least 2.
      0,   0,
    // bs = 2
    255, 128,
    // bs = 4
    255, 149,  85,  64,
    // bs = 8
    255, 197, 146, 105,  73,  50,  37,  32,
    // bs = 16
    255, 225, 196, 170, 145, 123, 102,  84,
     68,  54,  43,  33,  26,  20,  17,  16,
    // bs = 32
    255, 240, 225, 210, 196, 182, 169, 157,
    145, 133, 122, 111, 101,  92,  83,  74,
     66,  59,  52,  45,  39,  34,  29,  25,
     21,  17,  14,  12,  10,   9,   8,   8,
    // bs = 64
    255, 248, 240, 233, 225, 218, 210, 203,
    196, 189, 182, 176, 169, 163, 156, 150,
    144, 138, 133, 127, 121, 116, 111, 106,
    101,  96,  91,  86,  82,  77,  73,  69,
     65,  61,  57,  54,  50,  47,  44,  41,
     38,  35,  32,  29,  27,  25,  22,  20,
     18,  16,  15,  13,  12,  10,   9,   8,
      7,   6,   6,   5,   5,   4,   4,   4,
];

/// Directional-predictor step sizes in Q6 fixed point, indexed by angle.
/// Only the angles reachable as `base ± 3 * delta` are populated.
#[rustfmt::skip]
pub static dav1d_dr_intra_derivative: [u16; 90] = [
    // Values that are 0 will never be used
       0, 0, 0,       // Approx angle
    1023, 0, 0,       // 3, ...
     547, 0, 0,       // 6, ...
     372, 0, 0, 0, 0, // 9, ...
     273, 0, 0,       // 14, ...
     215, 0, 0,       // 17, ...
     178, 0, 0,       // 20, ...
     151, 0, 0,       // 23, ... (113 & 203 are base angles)
     132, 0, 0,       // 26, ...
     116, 0, 0,       // 29, ...
     102, 0, 0, 0,    // 32, ...
      90, 0, 0,       // 36, ...
      80, 0, 0,       // 39, ...
      71, 0, 0,       // 42, ...
      64, 0, 0,       // 45, ... (45 & 135 are base angles)
      57, 0, 0,       // 48, ...
      51, 0, 0,       // 51, ...
      45, 0, 0, 0,    // 54, ...
      40, 0, 0,       // 58, ...
      35, 0, 0,       // 61, ...
      31, 0, 0,       // 64, ...
      27, 0, 0,       // 67, ... (67 & 157 are base angles)
      23, 0, 0,       // 70, ...
      19, 0, 0,       // 73, ...
      15, 0, 0, 0, 0, // 76, ...
      11, 0, 0,       // 81, ...
       7, 0, 0,       // 84, ...
       3, 0, 0,       // 87, ...
];

/// 7-tap filter sets for the recursive filter predictor.
/// `[filter][output pixel in 4x2 raster order][tap]`,
/// taps weighting (topleft, top0..top3, left0, left1).
/// Each row of taps sums to 16.
#[rustfmt::skip]
pub static dav1d_filter_intra_taps: [[[i8; 7]; 8]; 5] = [
    [
        [ -6, 10,  0,  0,  0, 12,  0 ],
        [ -5,  2, 10,  0,  0,  9,  0 ],
        [ -3,  1,  1, 10,  0,  7,  0 ],
        [ -3,  1,  1,  2, 10,  5,  0 ],
        [ -4,  6,  0,  0,  0,  2, 12 ],
        [ -3,  2,  6,  0,  0,  2,  9 ],
        [ -3,  2,  2,  6,  0,  2,  7 ],
        [ -3,  1,  2,  2,  6,  3,  5 ],
    ], [
        [-10, 16,  0,  0,  0, 10,  0 ],
        [ -6,  0, 16,  0,  0,  6,  0 ],
        [ -4,  0,  0, 16,  0,  4,  0 ],
        [ -2,  0,  0,  0, 16,  2,  0 ],
        [-10, 16,  0,  0,  0,  0, 10 ],
        [ -6,  0, 16,  0,  0,  0,  6 ],
        [ -4,  0,  0, 16,  0,  0,  4 ],
        [ -2,  0,  0,  0, 16,  0,  2 ],
    ], [
        [ -8,  8,  0,  0,  0, 16,  0 ],
        [ -8,  0,  8,  0,  0, 16,  0 ],
        [ -8,  0,  0,  8,  0, 16,  0 ],
        [ -8,  0,  0,  0,  8, 16,  0 ],
        [ -4,  4,  0,  0,  0,  0, 16 ],
        [ -4,  0,  4,  0,  0,  0, 16 ],
        [ -4,  0,  0,  4,  0,  0, 16 ],
        [ -4,  0,  0,  0,  4,  0, 16 ],
    ], [
        [ -2,  8,  0,  0,  0, 10,  0 ],
        [ -1,  3,  8,  0,  0,  6,  0 ],
        [ -1,  2,  3,  8,  0,  4,  0 ],
        [  0,  1,  2,  3,  8,  2,  0 ],
        [ -1,  4,  0,  0,  0,  3, 10 ],
        [ -1,  3,  4,  0,  0,  4,  6 ],
        [ -1,  2,  3,  4,  0,  4,  4 ],
        [ -1,  2,  2,  3,  4,  3,  3 ],
    ], [
        [-12, 14,  0,  0,  0, 14,  0 ],
        [-10,  0, 14,  0,  0, 12,  0 ],
        [ -9,  0,  0, 14,  0, 11,  0 ],
        [ -8,  0,  0,  0, 14, 10,  0 ],
        [-10, 12,  0,  0,  0,  0, 14 ],
        [ -9,  1, 12,  0,  0,  0, 12 ],
        [ -8,  0,  0, 12,  0,  1, 11 ],
        [ -7,  0,  0,  1, 12,  1,  9 ],
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sm_weights_anchors() {
        // First weight of every run is 255; last decays toward the
        // reciprocal tail the AV1 spec prescribes.
        for bs in [2usize, 4, 8, 16, 32, 64] {
            assert_eq!(dav1d_sm_weights[bs], 255, "bs = {bs}");
        }
        assert_eq!(dav1d_sm_weights[2 + 1], 128);
        assert_eq!(dav1d_sm_weights[64 + 63], 4);
    }

    /// The angles reachable as `base ± 3 * delta` after the AV1 spec's
    /// re-spreading; every slot outside this set is never read.
    pub(super) const POPULATED_ANGLES: [usize; 27] = [
        3, 6, 9, 14, 17, 20, 23, 26, 29, 32, 36, 39, 42, 45, 48, 51, 54, 58, 61, 64, 67, 70, 73,
        76, 81, 84, 87,
    ];

    #[test]
    fn test_derivative_populated_angles() {
        for (i, &v) in dav1d_dr_intra_derivative.iter().enumerate() {
            assert_eq!(v != 0, POPULATED_ANGLES.contains(&i), "angle = {i}");
        }
        assert_eq!(dav1d_dr_intra_derivative[45], 64);
        assert_eq!(dav1d_dr_intra_derivative[3], 1023);
        assert_eq!(dav1d_dr_intra_derivative[87], 3);
        // The set is closed under d -> 90 - d, which the zone-2 predictor
        // relies on when it splits one angle into a dx and a dy step.
        for &a in &POPULATED_ANGLES {
            assert!(POPULATED_ANGLES.contains(&(90 - a)), "angle = {a}");
        }
    }

    #[test]
    fn test_filter_taps_normalized() {
        for (f, filter) in dav1d_filter_intra_taps.iter().enumerate() {
            for (p, taps) in filter.iter().enumerate() {
                let sum: i32 = taps.iter().map(|&t| t as i32).sum();
                assert_eq!(sum, 16, "filter {f} pixel {p}");
            }
        }
    }
}
