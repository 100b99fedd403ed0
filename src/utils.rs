use nalgebra as na;

/// Map `val` into the half-open interval `[-offset * period, (1 - offset) * period)`.
pub fn limit_period(val: f64, offset: f64, period: f64) -> f64 {
    val - (val / period + offset).floor() * period
}

/// Rotation about a single axis, laid out for right-multiplication of row vectors.
///
/// `axis == 2` gives `[[c, -s, 0], [s, c, 0], [0, 0, 1]]` and `axis == 1` gives
/// `[[c, 0, -s], [0, 1, 0], [s, 0, c]]`.
pub fn yaw_rotation(axis: usize, angle: f64) -> na::Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    match axis {
        0 => na::Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, c, -s, //
            0.0, s, c,
        ),
        1 => na::Matrix3::new(
            c, 0.0, -s, //
            0.0, 1.0, 0.0, //
            s, 0.0, c,
        ),
        _ => na::Matrix3::new(
            c, -s, 0.0, //
            s, c, 0.0, //
            0.0, 0.0, 1.0,
        ),
    }
}

/// Compute `row * mat` for a row vector, i.e. `matᵀ · v`.
pub(crate) fn right_mul(v: &na::Vector3<f64>, mat: &na::Matrix3<f64>) -> na::Vector3<f64> {
    mat.tr_mul(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn limit_period_maps_into_half_open_range() {
        assert_relative_eq!(limit_period(PI, 0.5, PI), 0.0, epsilon = 1e-12);
        assert_relative_eq!(limit_period(2.0, 0.5, PI), 2.0 - PI);
        assert_relative_eq!(limit_period(-FRAC_PI_2, 0.5, PI), -FRAC_PI_2);
        assert_relative_eq!(limit_period(7.0, 0.0, 2.0 * PI), 7.0 - 2.0 * PI);
        assert_eq!(limit_period(FRAC_PI_4, 0.5, PI), FRAC_PI_4);
    }

    #[test]
    fn right_mul_matches_row_vector_product() {
        let rot = yaw_rotation(2, FRAC_PI_2);
        let v = na::Vector3::new(1.0, 0.0, 0.0);
        let out = right_mul(&v, &rot);
        // [1, 0, 0] · [[0, -1, 0], [1, 0, 0], [0, 0, 1]] = [0, -1, 0]
        assert_relative_eq!(out, na::Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }
}
