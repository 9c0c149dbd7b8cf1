//! Small numeric helpers shared by the geometry and profile code

/// Integer division rounding towards positive infinity, for non-negative operands.
#[inline]
pub fn ceil_div(x: i32, y: i32) -> i32 {
    debug_assert!(x >= 0 && y > 0, "ceil_div({x}, {y})");
    (x + y - 1) / y
}

/// Value at `x` of the line through `(0, y0)` and `(1, y1)`.
#[inline]
pub fn interpolate(y0: f64, y1: f64, x: f64) -> f64 {
    (y1 - y0).mul_add(x, y0)
}

/// Length of the projection of `p - a` onto `b - a`, signed.
///
/// Returns 0 when `a == b`.
pub fn projection_length(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (ux, uy) = (p.0 - a.0, p.1 - a.1);
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let norm = vx.hypot(vy);
    if norm == 0.0 {
        return 0.0;
    }
    (ux * vx + uy * vy) / norm
}

/// Evaluate the piecewise-linear function through `samples`, evenly spread
/// over `[0, x_max]`. Arguments outside the domain are clamped.
///
/// A single sample is a constant function.
pub fn sampled_at(samples: &[f32], x_max: f64, x: f64) -> f64 {
    debug_assert!(!samples.is_empty());
    let last = samples.len() - 1;
    if last == 0 || x_max <= 0.0 || x <= 0.0 {
        return f64::from(samples[0]);
    }
    if x >= x_max {
        return f64::from(samples[last]);
    }

    let spacing = x_max / last as f64;
    let scaled = x / spacing;
    let index = (scaled.floor() as usize).min(last - 1);
    interpolate(
        f64::from(samples[index]),
        f64::from(samples[index + 1]),
        scaled - index as f64,
    )
}
