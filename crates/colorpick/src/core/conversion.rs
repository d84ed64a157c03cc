use crate::Float;

/// Multiply the 3 by 3 matrix and 3-element vector with each other, producing a
/// new 3-element vector.
#[inline]
fn multiply(matrix: &[[Float; 3]; 3], vector: &[Float; 3]) -> [Float; 3] {
    let [row1, row2, row3] = matrix;

    [
        row1[0].mul_add(vector[0], row1[1].mul_add(vector[1], row1[2] * vector[2])),
        row2[0].mul_add(vector[0], row2[1].mul_add(vector[1], row2[2] * vector[2])),
        row3[0].mul_add(vector[0], row3[1].mul_add(vector[1], row3[2] * vector[2])),
    ]
}

// --------------------------------------------------------------------------------------------------------------------
// http://www.easyrgb.com/en/math.php

/// Convert gamma-corrected sRGB coordinates with unit range to linear sRGB.
fn rgb_to_linear_rgb(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        if value > 0.04045 {
            ((value + 0.055) / 1.055).powf(2.4)
        } else {
            value / 12.92
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

/// Convert linear sRGB coordinates with unit range to gamma-corrected sRGB.
fn linear_rgb_to_rgb(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        if value > 0.0031308 {
            value.powf(1.0 / 2.4).mul_add(1.055, -0.055)
        } else {
            value * 12.92
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

// The four-digit matrices below are not exact inverses of each other. Lab
// values, and hence cluster assignments, depend on these exact digits.

#[rustfmt::skip]
const LINEAR_SRGB_TO_XYZ: [[Float; 3]; 3] = [
    [ 0.4124, 0.3576, 0.1805 ],
    [ 0.2126, 0.7152, 0.0722 ],
    [ 0.0193, 0.1192, 0.9505 ],
];

#[rustfmt::skip]
const XYZ_TO_LINEAR_SRGB: [[Float; 3]; 3] = [
    [  3.2406, -1.5372, -0.4986 ],
    [ -0.9689,  1.8758,  0.0415 ],
    [  0.0557, -0.2040,  1.0570 ],
];

/// The D65 reference white for the 2º observer, scaled so that Y is 100.
pub const D65_WHITE: [Float; 3] = [95.0489, 100.0, 108.8840];

const EPSILON: Float = 0.008856;
const KAPPA: Float = 7.787;
const OFFSET: Float = 16.0 / 116.0;

// --------------------------------------------------------------------------------------------------------------------

/// Convert 24-bit sRGB coordinates to CIE XYZ.
///
/// The coordinates may be integers or reals with range `0..=255`. The result is
/// scaled so that white has Y ≈ 100.
///
/// ```
/// # use colorpick::rgb_to_xyz;
/// let [_, y, _] = rgb_to_xyz(255.0, 255.0, 255.0);
/// assert!((y - 100.0).abs() < 1e-9, "white should have Y of 100");
/// ```
pub fn rgb_to_xyz<C: Into<Float>>(r: C, g: C, b: C) -> [Float; 3] {
    let rgb = [r.into() / 255.0, g.into() / 255.0, b.into() / 255.0];
    let [lr, lg, lb] = rgb_to_linear_rgb(&rgb);
    multiply(&LINEAR_SRGB_TO_XYZ, &[lr * 100.0, lg * 100.0, lb * 100.0])
}

/// Convert CIE XYZ to 24-bit sRGB coordinates.
///
/// Each channel is scaled to `0..=255` and then *truncated* toward zero, not
/// rounded. Consequently, a round trip through XYZ may lose one unit per
/// channel. The result is not clamped either; out-of-gamut XYZ coordinates
/// produce channel values outside `0..=255`, which
/// [`Rgb::try_from`](crate::Rgb) rejects.
pub fn xyz_to_rgb(x: Float, y: Float, z: Float) -> [i32; 3] {
    let linear = multiply(&XYZ_TO_LINEAR_SRGB, &[x / 100.0, y / 100.0, z / 100.0]);
    let [r, g, b] = linear_rgb_to_rgb(&linear);
    [
        (r * 255.0).trunc() as i32,
        (g * 255.0).trunc() as i32,
        (b * 255.0).trunc() as i32,
    ]
}

/// Convert CIE XYZ to CIE L\*a\*b\* relative to [`D65_WHITE`].
#[allow(non_snake_case)]
pub fn xyz_to_lab(x: Float, y: Float, z: Float) -> [Float; 3] {
    #[inline]
    fn f(value: Float) -> Float {
        if value > EPSILON {
            value.cbrt()
        } else {
            KAPPA.mul_add(value, OFFSET)
        }
    }

    let [Xr, Yr, Zr] = D65_WHITE;
    let fx = f(x / Xr);
    let fy = f(y / Yr);
    let fz = f(z / Zr);

    [
        (116.0 as Float).mul_add(fy, -16.0),
        500.0 * (fx - fy),
        200.0 * (fy - fz),
    ]
}

/// Convert CIE L\*a\*b\* relative to [`D65_WHITE`] back to CIE XYZ.
#[allow(non_snake_case)]
pub fn lab_to_xyz(l: Float, a: Float, b: Float) -> [Float; 3] {
    #[inline]
    fn f_inverse(value: Float) -> Float {
        let cube = value * value * value;
        if cube > EPSILON {
            cube
        } else {
            (value - OFFSET) / KAPPA
        }
    }

    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;

    let [Xr, Yr, Zr] = D65_WHITE;
    [f_inverse(fx) * Xr, f_inverse(fy) * Yr, f_inverse(fz) * Zr]
}

/// Convert 24-bit sRGB coordinates to CIE L\*a\*b\*. This is a two-hop
/// conversion through XYZ.
#[inline]
pub fn rgb_to_lab<C: Into<Float>>(r: C, g: C, b: C) -> [Float; 3] {
    let [x, y, z] = rgb_to_xyz(r, g, b);
    xyz_to_lab(x, y, z)
}

/// Convert CIE L\*a\*b\* to truncated 24-bit sRGB coordinates. This is a
/// two-hop conversion through XYZ.
#[inline]
pub fn lab_to_rgb(l: Float, a: Float, b: Float) -> [i32; 3] {
    let [x, y, z] = lab_to_xyz(l, a, b);
    xyz_to_rgb(x, y, z)
}

/// Convert 24-bit sRGB coordinates to HSL.
///
/// All three components have unit range. Grays, i.e., colors whose largest and
/// smallest channel are equal, have hue and saturation zero. Otherwise, the
/// hue is derived from the largest channel, with red taking precedence over
/// green and green over blue.
#[allow(non_snake_case)]
pub fn rgb_to_hsl<C: Into<Float>>(r: C, g: C, b: C) -> [Float; 3] {
    let (r, g, b) = (r.into() / 255.0, g.into() / 255.0, b.into() / 255.0);

    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;

    let L = (max + min) / 2.0;
    if delta == 0.0 {
        return [0.0, 0.0, L];
    }

    let S = if L < 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let dr = ((max - r) / 6.0 + delta / 2.0) / delta;
    let dg = ((max - g) / 6.0 + delta / 2.0) / delta;
    let db = ((max - b) / 6.0 + delta / 2.0) / delta;

    let mut H = if r == max {
        db - dg
    } else if g == max {
        1.0 / 3.0 + dr - db
    } else {
        2.0 / 3.0 + dg - dr
    };

    if H < 0.0 {
        H += 1.0;
    }
    if H > 1.0 {
        H -= 1.0;
    }

    [H, S, L]
}

// ====================================================================================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_close_enough;
    use crate::core::assert_coordinates_within;

    #[test]
    fn test_known_lab() {
        let lab = rgb_to_lab(255, 125, 5);
        assert_coordinates_within!(&lab, &[66.47, 44.34, 72.95], 0.1);

        // Stricter check against the reference calculator.
        assert_coordinates_within!(
            &lab,
            &[66.47266912541974, 44.33885551261418, 72.95017150952644],
            1e-6
        );
    }

    #[test]
    fn test_white_and_black() {
        let white = rgb_to_xyz(255, 255, 255);
        assert_coordinates_within!(&white, &[95.05, 100.0, 108.9], 0.01);
        let [l, _, _] = xyz_to_lab(white[0], white[1], white[2]);
        assert_coordinates_within!(&[l], &[100.0], 1e-9);

        assert_eq!(rgb_to_xyz(0, 0, 0), [0.0, 0.0, 0.0]);
        let black = rgb_to_lab(0, 0, 0);
        assert_coordinates_within!(&black, &[0.0, 0.0, 0.0], 1e-9);
    }

    #[test]
    fn test_rgb_round_trip() {
        for r in (0..=255_u8).step_by(5) {
            for g in (0..=255_u8).step_by(5) {
                for b in (0..=255_u8).step_by(5) {
                    let [x, y, z] = rgb_to_xyz(r, g, b);
                    let [r2, g2, b2] = xyz_to_rgb(x, y, z);
                    assert!(
                        (r as i32 - r2).abs() <= 1
                            && (g as i32 - g2).abs() <= 1
                            && (b as i32 - b2).abs() <= 1,
                        "round trip of ({}, {}, {}) produced ({}, {}, {})",
                        r,
                        g,
                        b,
                        r2,
                        g2,
                        b2
                    );
                }
            }
        }
    }

    #[test]
    fn test_truncation() {
        // Truncation rather than rounding is what makes this come out short.
        let [x, y, z] = rgb_to_xyz(255, 255, 255);
        let [r, g, b] = xyz_to_rgb(x, y, z);
        assert!((254..=255).contains(&r), "red is {}", r);
        assert!((254..=255).contains(&g), "green is {}", g);
        assert!((254..=255).contains(&b), "blue is {}", b);

        let [r, _, _] = lab_to_rgb(50.0, 0.0, 0.0);
        let [x, y, z] = lab_to_xyz(50.0, 0.0, 0.0);
        let linear = multiply(&XYZ_TO_LINEAR_SRGB, &[x / 100.0, y / 100.0, z / 100.0]);
        let exact = linear_rgb_to_rgb(&linear)[0] * 255.0;
        assert_eq!(r as Float, exact.trunc(), "red should be truncated");
    }

    #[test]
    fn test_lab_round_trip() {
        for x in [0.5, 5.0, 20.0, 50.0, 95.0] {
            for y in [0.3, 5.0, 30.0, 70.0, 100.0] {
                for z in [0.2, 10.0, 50.0, 108.0] {
                    let [l, a, b] = xyz_to_lab(x, y, z);
                    let [x2, y2, z2] = lab_to_xyz(l, a, b);
                    for (original, recovered) in [(x, x2), (y, y2), (z, z2)] {
                        assert!(
                            ((original - recovered) / original).abs() <= 1e-6,
                            "XYZ({}, {}, {}) came back as ({}, {}, {})",
                            x,
                            y,
                            z,
                            x2,
                            y2,
                            z2
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_hsl() {
        let [h, s, l] = rgb_to_hsl(128, 128, 128);
        assert_close_enough!(h, 0.0);
        assert_close_enough!(s, 0.0);
        assert!((l - 0.5).abs() < 0.01, "lightness is {}", l);

        assert_coordinates_within!(&rgb_to_hsl(255, 0, 0), &[0.0, 1.0, 0.5], 1e-12);
        assert_coordinates_within!(&rgb_to_hsl(0, 255, 0), &[1.0 / 3.0, 1.0, 0.5], 1e-12);
        assert_coordinates_within!(&rgb_to_hsl(0, 0, 255), &[2.0 / 3.0, 1.0, 0.5], 1e-12);

        // Magenta's hue wraps around from just below zero.
        let [h, _, _] = rgb_to_hsl(255, 0, 128);
        assert!((0.0..=1.0).contains(&h), "hue {} should be in unit range", h);
        assert!(h > 0.9, "hue {} should be close to one", h);

        // Light colors use the other saturation formula.
        let [_, s, l] = rgb_to_hsl(255, 200, 200);
        assert!(l > 0.5, "lightness is {}", l);
        assert_close_enough!(s, 1.0);
    }
}
