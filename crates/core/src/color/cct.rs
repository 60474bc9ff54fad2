//! Correlated colour temperature helpers.

use super::rgb::{clamp01, Rgbf};

/// Warm white emitter temperature used for the WW/CW split.
pub const WARM_WHITE_KELVIN: f64 = 2700.0;
/// Cool white emitter temperature used for the WW/CW split.
pub const COOL_WHITE_KELVIN: f64 = 6500.0;

pub const MIN_INPUT_KELVIN: f64 = 1800.0;
pub const MAX_INPUT_KELVIN: f64 = 10000.0;

/// Chromaticity on the Planckian locus (Kim et al. cubic spline).
/// Valid between 1667 K and 25000 K; temperatures outside are clamped.
pub fn cct_to_xy(kelvin: f64) -> (f64, f64) {
    let t = kelvin.clamp(1667.0, 25000.0);

    let x = if t <= 4000.0 {
        -0.2661239e9 / t.powi(3) - 0.234358e6 / t.powi(2) + 0.8776956e3 / t + 0.17991
    } else {
        -3.0258469e9 / t.powi(3) + 2.1070379e6 / t.powi(2) + 0.2226347e3 / t + 0.24039
    };

    let y = if t <= 2222.0 {
        -1.1063814 * x.powi(3) - 1.3481102 * x.powi(2) + 2.1855583 * x - 0.20219683
    } else if t <= 4000.0 {
        -0.9549476 * x.powi(3) - 1.37418593 * x.powi(2) + 2.09137015 * x - 0.16748867
    } else {
        3.081758 * x.powi(3) - 5.8733867 * x.powi(2) + 3.75112997 * x - 0.37001483
    };

    (x, y)
}

/// xy at luminance 1 to linear sRGB. Out of gamut components are clipped at 0
/// and the result is scaled down so no component exceeds 1.
pub fn xy_to_linear_rgb(x: f64, y: f64) -> Rgbf {
    let big_y = 1.0;
    let big_x = x * big_y / y;
    let big_z = (1.0 - x - y) * big_y / y;

    let rgb = Rgbf::new(
        big_x * 3.2406 - big_y * 1.5372 - big_z * 0.4986,
        -big_x * 0.9689 + big_y * 1.8758 + big_z * 0.0415,
        big_x * 0.0557 - big_y * 0.204 + big_z * 1.057,
    )
    .map(|c| c.max(0.0));

    let max = rgb.max();
    if max > 1.0 {
        rgb.scale(1.0 / max)
    } else {
        rgb
    }
}

pub fn cct_to_linear_rgb(kelvin: f64) -> Rgbf {
    let (x, y) = cct_to_xy(kelvin);
    xy_to_linear_rgb(x, y)
}

/// Warm and cool weights (summing to 1) that mix `kelvin` from the two
/// white emitters, interpolated in mired space.
pub fn mix_ww_cw(kelvin: f64) -> (f64, f64) {
    let mired = 1e6 / kelvin.clamp(MIN_INPUT_KELVIN, MAX_INPUT_KELVIN);
    let mired_warm = 1e6 / WARM_WHITE_KELVIN;
    let mired_cool = 1e6 / COOL_WHITE_KELVIN;
    let warm = clamp01((mired - mired_cool) / (mired_warm - mired_cool));
    (warm, 1.0 - warm)
}

/// McCamy's approximation on linear sRGB, clamped to 2000–9000 K.
/// Black returns 6500 K.
pub fn estimate_cct(linear: Rgbf) -> f64 {
    let Rgbf { r, g, b } = linear;
    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;
    let sum = x + y + z;
    if sum == 0.0 {
        return 6500.0;
    }

    let cx = x / sum;
    let cy = y / sum;
    let n = (cx - 0.332) / (0.1858 - cy);
    let cct = 449.0 * n.powi(3) + 3525.0 * n.powi(2) + 6823.3 * n + 5520.33;
    cct.clamp(2000.0, 9000.0)
}
