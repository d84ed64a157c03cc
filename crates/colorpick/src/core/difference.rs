use super::Accumulator;
use crate::Float;

/// Compute ΔE between two colors in CIE L\*a\*b\*.
///
/// This is the 1976 formula, i.e., the Euclidian distance between the two
/// coordinate triples. It is symmetric and zero for identical colors.
#[allow(non_snake_case)]
pub fn lab_distance(lab1: &[Float; 3], lab2: &[Float; 3]) -> Float {
    let [L1, a1, b1] = lab1;
    let [L2, a2, b2] = lab2;

    let ΔL = L1 - L2;
    let Δa = a1 - a2;
    let Δb = b1 - b2;

    ΔL.mul_add(ΔL, Δa.mul_add(Δa, Δb * Δb)).sqrt()
}

/// Compute the arithmetic mean of the given L\*a\*b\* coordinates.
///
/// This function returns `None` if there are no coordinates.
pub fn lab_centroid<'c, C>(coordinates: C) -> Option<[Float; 3]>
where
    C: IntoIterator<Item = &'c [Float; 3]>,
{
    let mut count = 0_usize;
    let mut sums = [
        Accumulator::default(),
        Accumulator::default(),
        Accumulator::default(),
    ];

    for [l, a, b] in coordinates {
        sums[0] += *l;
        sums[1] += *a;
        sums[2] += *b;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let n = count as Float;
    let [l, a, b] = sums;
    Some([l.total() / n, a.total() / n, b.total() / n])
}

/// Find the candidate closest to the origin.
///
/// This function compares the origin to every candidate, computing the
/// distance metric with the given function, and returns the index of the
/// closest candidate, or `None` if there are no candidates. Ties go to the
/// earliest candidate.
pub(crate) fn find_closest<O, C, T, F>(origin: &O, candidates: C, mut compute_distance: F) -> Option<usize>
where
    O: ?Sized,
    C: IntoIterator<Item = T>,
    F: FnMut(&O, T) -> Float,
{
    let mut min_distance = Float::INFINITY;
    let mut min_index = None;

    for (index, candidate) in candidates.into_iter().enumerate() {
        let distance = compute_distance(origin, candidate);
        if distance < min_distance {
            min_distance = distance;
            min_index = Some(index);
        }
    }

    min_index
}
