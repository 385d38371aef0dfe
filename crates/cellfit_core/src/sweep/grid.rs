//! Grid construction for one sweep level

/// `count` evenly spaced values from `lo` to `hi`, both included.
///
/// A single point sits at the midpoint. Values never leave `[lo, hi]`.
pub fn linspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![(lo + hi) / 2.0],
        _ => {
            let last = count - 1;
            (0..count)
                .map(|i| {
                    if i == last {
                        hi
                    } else {
                        (lo + (hi - lo) * i as f64 / last as f64).max(lo).min(hi)
                    }
                })
                .collect()
        }
    }
}

/// Points along one axis: `[center - half_width, center + half_width]`
/// intersected with `[lower, upper]`
pub fn axis_points(center: f64, half_width: f64, lower: f64, upper: f64, count: usize) -> Vec<f64> {
    let lo = (center - half_width).max(lower);
    let hi = (center + half_width).min(upper);
    linspace(lo, hi, count)
}

/// Cartesian product of the axes in row-major order (last axis fastest)
pub fn grid_points(axes: &[Vec<f64>]) -> Vec<Vec<f64>> {
    if axes.iter().any(Vec::is_empty) {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(axes.iter().map(Vec::len).product());
    let mut indices = vec![0usize; axes.len()];
    loop {
        points.push(
            indices
                .iter()
                .zip(axes)
                .map(|(&i, axis)| axis[i])
                .collect(),
        );

        // Count in mixed radix, least significant digit last
        let mut carry = true;
        for (index, axis) in indices.iter_mut().zip(axes).rev() {
            *index += 1;
            if *index < axis.len() {
                carry = false;
                break;
            }
            *index = 0;
        }
        if carry {
            break;
        }
    }
    points
}

/// Axis indices of the `flat`-th point produced by [`grid_points`]
pub fn unflatten(mut flat: usize, lengths: &[usize]) -> Vec<usize> {
    let mut indices = vec![0; lengths.len()];
    for (slot, &len) in indices.iter_mut().zip(lengths).rev() {
        *slot = flat % len;
        flat /= len;
    }
    indices
}
