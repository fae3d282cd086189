//! Fixed-point trigonometry. Values are scaled by 32768.

/// Fixed-point unit: sin(90°) == ONE
pub const ONE: i32 = 32768;

/// (sin, cos) for 0..=45 degrees
const TABLE: [(i32, i32); 46] = [
    (0, 32768),
    (572, 32763),
    (1144, 32748),
    (1715, 32723),
    (2286, 32688),
    (2856, 32643),
    (3425, 32588),
    (3993, 32524),
    (4560, 32449),
    (5126, 32365),
    (5690, 32270),
    (6252, 32166),
    (6813, 32052),
    (7371, 31928),
    (7927, 31795),
    (8481, 31651),
    (9032, 31499),
    (9580, 31336),
    (10126, 31164),
    (10668, 30983),
    (11207, 30792),
    (11743, 30592),
    (12275, 30382),
    (12803, 30163),
    (13328, 29935),
    (13848, 29698),
    (14365, 29452),
    (14876, 29197),
    (15384, 28932),
    (15886, 28660),
    (16384, 28378),
    (16877, 28088),
    (17364, 27789),
    (17847, 27482),
    (18324, 27166),
    (18795, 26842),
    (19261, 26510),
    (19720, 26170),
    (20174, 25822),
    (20622, 25466),
    (21063, 25102),
    (21498, 24730),
    (21926, 24351),
    (22348, 23965),
    (22763, 23571),
    (23170, 23170),
];

/// Sine and cosine of an integer angle in degrees, any sign or magnitude
pub fn sincos(angle: i32) -> (i32, i32) {
    let i = angle.rem_euclid(90) as usize;
    let (sin, cos) = if i <= 45 {
        TABLE[i]
    } else {
        let (s, c) = TABLE[90 - i];
        (c, s)
    };

    match angle.div_euclid(90).rem_euclid(4) {
        0 => (sin, cos),
        1 => (cos, -sin),
        2 => (-sin, -cos),
        _ => (-cos, sin),
    }
}

/// Nearest table index to `value` in a monotonic column
#[inline]
fn nearest(idx: usize, value: i32, column: impl Fn(usize) -> i32) -> usize {
    if idx == 0 {
        return 0;
    }
    if idx > 45 {
        return 45;
    }
    if (column(idx - 1) - value).abs() <= (column(idx) - value).abs() {
        idx - 1
    } else {
        idx
    }
}

/// Invert a fixed-point cosine into degrees.
///
/// The 0..=180 result is multiplied by `sign` (+1 or -1) and folded into
/// (-180, 180], which makes this usable as an azimuth from a (dx, dy) pair.
/// A magnitude beyond `ONE` is not a cosine: it is reported and yields 0.
pub fn arccos(cosine: i32, sign: i32) -> i32 {
    let negative = cosine < 0;
    let c = cosine.saturating_abs();
    if c > ONE {
        log::warn!("invalid cosine value {}", cosine);
        return 0;
    }

    let degrees = if c >= TABLE[45].1 {
        // cos column decreases from 0 to 45 degrees
        let idx = TABLE.partition_point(|e| e.1 > c);
        nearest(idx, c, |i| TABLE[i].1) as i32
    } else {
        // sin column increases; cos(90 - i) == sin(i)
        let idx = TABLE.partition_point(|e| e.0 < c);
        90 - nearest(idx, c, |i| TABLE[i].0) as i32
    };

    let mut result = sign * degrees;
    if negative {
        result = 180 - result;
        if result > 180 {
            result -= 360;
        }
    }
    result
}
