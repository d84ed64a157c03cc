mod conversion;
mod difference;
mod equality;
mod math;
mod string;

// conversion
pub use conversion::{
    lab_to_rgb, lab_to_xyz, rgb_to_hsl, rgb_to_lab, rgb_to_xyz, xyz_to_lab, xyz_to_rgb, D65_WHITE,
};

// difference
pub(crate) use difference::find_closest;
pub use difference::{lab_centroid, lab_distance};

// equality
#[cfg(test)]
pub(crate) use equality::assert_coordinates_within;
pub use equality::to_eq_bits;

// math
pub(crate) use math::{Accumulator, FloatExt};

// string
pub(crate) use string::{format_line, parse_hex, parse_line};
