/// Trapezoidal integral of `ys` over `xs`.
///
/// Both slices must have the same length and `xs` must be non-decreasing.
/// Fewer than two points integrate to zero.
pub fn trapezoid_area(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}
