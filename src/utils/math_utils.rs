//! Numeric helpers for sampling outlines and ray bundles.
/// Lossless for all counts used in this crate; the precision loss lint is silenced in one place.
#[must_use]
pub const fn usize_to_f64(value: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let newval = value as f64;
    newval
}

/// `n` evenly spaced values from `start` to `end` (both included).
///
/// A single value is placed at the center of the interval, no value is returned for `n = 0`.
pub fn linspace(start: f64, end: f64, n: usize) -> impl DoubleEndedIterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / usize_to_f64(n - 1)
    } else {
        0.0
    };
    let first = if n == 1 { 0.5 * (start + end) } else { start };
    (0..n).map(move |i| {
        if i + 1 == n && n > 1 {
            end
        } else {
            step.mul_add(usize_to_f64(i), first)
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    #[test]
    fn casts() {
        assert_eq!(usize_to_f64(3), 3.0);
    }
    #[test]
    fn linspace_values() {
        assert_eq!(linspace(0.0, 1.0, 0).count(), 0);
        assert_eq!(linspace(-2.0, 4.0, 1).collect::<Vec<_>>(), vec![1.0]);
        let v = linspace(-1.0, 1.0, 5).collect::<Vec<_>>();
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], -1.0);
        assert_relative_eq!(v[1], -0.5);
        assert_relative_eq!(v[2], 0.0);
        assert_eq!(v[4], 1.0);
        let r = linspace(-1.0, 1.0, 5).rev().collect::<Vec<_>>();
        assert_eq!(r[0], 1.0);
    }
}
