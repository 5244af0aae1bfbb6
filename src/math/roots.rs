//! Real roots of low-degree polynomials.

use std::f64::consts::PI;

const EPS: f64 = 1e-12;

/// Solves `a·x² + b·x + c = 0`, degrading to the linear case when `a ≈ 0`.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < EPS {
        if b.abs() < EPS {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < -EPS {
        return Vec::new();
    }
    if disc.abs() <= EPS {
        return vec![-b / (2.0 * a)];
    }
    let sq = disc.sqrt();
    // Numerically stable form avoids cancellation when b ≈ ±sq.
    let q = -0.5 * (b + b.signum() * sq);
    let mut roots = vec![q / a, c / q];
    roots.sort_by(f64::total_cmp);
    roots
}

/// Solves `a·x³ + b·x² + c·x + d = 0` with Cardano's method.
#[must_use]
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < EPS {
        return solve_quadratic(b, c, d);
    }
    let b = b / a;
    let c = c / a;
    let d = d / a;

    // Depressed cubic t³ + p·t + q with x = t - b/3.
    let shift = b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let disc = q * q / 4.0 + p * p * p / 27.0;

    let mut roots = if disc > EPS {
        let sq = disc.sqrt();
        let u = (-q / 2.0 + sq).cbrt();
        let v = (-q / 2.0 - sq).cbrt();
        vec![u + v - shift]
    } else if disc.abs() <= EPS {
        let u = (-q / 2.0).cbrt();
        vec![2.0 * u - shift, -u - shift]
    } else {
        let r = (-p / 3.0).sqrt();
        let phi = (-q / (2.0 * r * r * r)).clamp(-1.0, 1.0).acos();
        (0..3)
            .map(|k| 2.0 * r * ((phi + 2.0 * PI * f64::from(k)) / 3.0).cos() - shift)
            .collect()
    };
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|x, y| (*x - *y).abs() < 1e-9);
    roots
}
