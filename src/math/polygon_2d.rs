use super::{Vector2, TOLERANCE};

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: &Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Normalizes `v`, returning the zero vector for degenerate input.
#[must_use]
pub fn normalize_or_zero(v: &Vector2) -> Vector2 {
    let len = v.norm();
    if len < TOLERANCE {
        Vector2::zeros()
    } else {
        v / len
    }
}

/// Signed angle from `a` to `b` in `(-π, π]`; positive is counter-clockwise.
#[must_use]
pub fn signed_angle(a: &Vector2, b: &Vector2) -> f64 {
    a.perp(b).atan2(a.dot(b))
}
