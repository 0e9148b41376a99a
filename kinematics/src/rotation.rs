//! Conversions between quaternions, rotation matrices and axis-angle vectors.
//!
//! Quaternions are stored as `nalgebra::Quaternion<f64>` with components
//! `(w, x, y, z)` = `(q.w, q.i, q.j, q.k)`. Every function here is pure.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Quaternion, Vector3};
use rand::Rng;

pub type Quat = Quaternion<f64>;
pub type RotationMatrix = Matrix3<f64>;
pub type AxisAngle = Vector3<f64>;

/// Norms below this are treated as the zero quaternion / zero rotation.
const EPSILON: f64 = 1e-10;

/// Above this dot product SLERP falls back to normalized lerp.
const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

pub fn identity() -> Quat {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}

/// Scale `q` to unit length. A (near) zero quaternion maps to the identity.
pub fn quat_normalize(q: &Quat) -> Quat {
    let norm = q.norm();
    if norm < EPSILON {
        return identity();
    }
    *q / norm
}

pub fn quat_conjugate(q: &Quat) -> Quat {
    Quaternion::new(q.w, -q.i, -q.j, -q.k)
}

/// Hamilton product `q1 * q2`: the rotation `q2` followed by `q1`.
pub fn quat_multiply(q1: &Quat, q2: &Quat) -> Quat {
    let (w1, x1, y1, z1) = (q1.w, q1.i, q1.j, q1.k);
    let (w2, x2, y2, z2) = (q2.w, q2.i, q2.j, q2.k);

    Quaternion::new(
        w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
        w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
        w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
        w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
    )
}

/// Rotate `v` by `q` (normalized first) as `q * (0, v) * conj(q)`.
pub fn quat_rotate(q: &Quat, v: &Vector3<f64>) -> Vector3<f64> {
    let q = quat_normalize(q);
    let pure = Quaternion::new(0.0, v.x, v.y, v.z);
    let rotated = quat_multiply(&quat_multiply(&q, &pure), &quat_conjugate(&q));
    Vector3::new(rotated.i, rotated.j, rotated.k)
}

/// Angle in `[0, pi]` of the rotation taking `q1` to `q2`.
pub fn quat_relative_angle(q1: &Quat, q2: &Quat) -> f64 {
    let q1 = quat_normalize(q1);
    let q2 = quat_normalize(q2);
    let relative = quat_multiply(&q2, &quat_conjugate(&q1));

    let angle = 2.0 * relative.w.clamp(-1.0, 1.0).acos();
    // q and -q are the same rotation; fold the long way round back into [0, pi]
    if angle > PI { 2.0 * PI - angle } else { angle }
}

/// Spherical linear interpolation along the minor arc.
///
/// `ratio = 0` gives `q1`, `ratio = 1` gives `q2` (possibly negated, which
/// is the same rotation). Nearly parallel inputs use normalized linear
/// interpolation instead of the spherical formula.
pub fn interpolate_quat(q1: &Quat, q2: &Quat, ratio: f64) -> Quat {
    let q1 = quat_normalize(q1);
    let mut q2 = quat_normalize(q2);

    let mut dot = q1.dot(&q2);
    if dot < 0.0 {
        q2 = -q2;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        return quat_normalize(&(q1 + (q2 - q1) * ratio));
    }

    let theta_0 = dot.acos();
    let sin_theta_0 = theta_0.sin();
    let s0 = ((1.0 - ratio) * theta_0).sin() / sin_theta_0;
    let s1 = (ratio * theta_0).sin() / sin_theta_0;

    q1 * s0 + q2 * s1
}

pub fn quat_to_mat(q: &Quat) -> RotationMatrix {
    let q = quat_normalize(q);
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);

    Matrix3::new(
        1.0 - 2.0 * (y * y + z * z),
        2.0 * (x * y - w * z),
        2.0 * (x * z + w * y),
        2.0 * (x * y + w * z),
        1.0 - 2.0 * (x * x + z * z),
        2.0 * (y * z - w * x),
        2.0 * (x * z - w * y),
        2.0 * (y * z + w * x),
        1.0 - 2.0 * (x * x + y * y),
    )
}

/// Shepperd's method: take the square root of whichever of the trace and
/// the diagonal entries is largest, so the divisor never approaches zero.
pub fn mat_to_quat(m: &RotationMatrix) -> Quat {
    let trace = m.trace();

    let q = if trace > 0.0 {
        let s = 0.5 / (trace + 1.0).sqrt();
        Quaternion::new(
            0.25 / s,
            (m[(2, 1)] - m[(1, 2)]) * s,
            (m[(0, 2)] - m[(2, 0)]) * s,
            (m[(1, 0)] - m[(0, 1)]) * s,
        )
    } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
        let s = 2.0 * (1.0 + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt();
        Quaternion::new(
            (m[(2, 1)] - m[(1, 2)]) / s,
            0.25 * s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
        )
    } else if m[(1, 1)] > m[(2, 2)] {
        let s = 2.0 * (1.0 + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt();
        Quaternion::new(
            (m[(0, 2)] - m[(2, 0)]) / s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            0.25 * s,
            (m[(1, 2)] + m[(2, 1)]) / s,
        )
    } else {
        let s = 2.0 * (1.0 + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt();
        Quaternion::new(
            (m[(1, 0)] - m[(0, 1)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
            (m[(1, 2)] + m[(2, 1)]) / s,
            0.25 * s,
        )
    };

    quat_normalize(&q)
}

/// Axis-angle vector whose norm is the rotation angle, at most `pi`.
pub fn quat_to_axis_angle(q: &Quat) -> AxisAngle {
    let mut q = quat_normalize(q);
    // pick the representative with w >= 0 so the angle stays in [0, pi]
    if q.w < 0.0 {
        q = -q;
    }

    let angle = 2.0 * q.w.clamp(-1.0, 1.0).acos();
    let sin_half = (1.0 - q.w * q.w).max(0.0).sqrt();
    if angle < EPSILON || sin_half < EPSILON {
        return Vector3::zeros();
    }

    Vector3::new(q.i, q.j, q.k) / sin_half * angle
}

pub fn axis_angle_to_quat(aa: &AxisAngle) -> Quat {
    let angle = aa.norm();
    if angle < EPSILON {
        return identity();
    }

    let axis = aa / angle;
    let (sin_half, cos_half) = (angle / 2.0).sin_cos();
    Quaternion::new(
        cos_half,
        axis.x * sin_half,
        axis.y * sin_half,
        axis.z * sin_half,
    )
}

pub fn axis_angle_to_mat(aa: &AxisAngle) -> RotationMatrix {
    quat_to_mat(&axis_angle_to_quat(aa))
}

pub fn mat_to_axis_angle(m: &RotationMatrix) -> AxisAngle {
    quat_to_axis_angle(&mat_to_quat(m))
}

/// Draw a rotation uniformly from SO(3) using three uniform samples.
///
/// The generator is supplied by the caller so sampling stays reproducible
/// with a seeded rng.
pub fn uniform_random_quat<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    let u1: f64 = rng.r#gen();
    let u2: f64 = rng.r#gen();
    let u3: f64 = rng.r#gen();

    let (r1, r2) = ((1.0 - u1).sqrt(), u1.sqrt());
    let (s1, c1) = (2.0 * PI * u2).sin_cos();
    let (s2, c2) = (2.0 * PI * u3).sin_cos();

    Quaternion::new(r1 * s1, r1 * c1, r2 * s2, r2 * c2)
}

/// Fixed-axis roll/pitch/yaw as used in URDF origins: `Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn rpy_to_mat(rpy: &Vector3<f64>) -> RotationMatrix {
    let (sr, cr) = rpy.x.sin_cos();
    let (sp, cp) = rpy.y.sin_cos();
    let (sy, cy) = rpy.z.sin_cos();

    let rot_x = Matrix3::new(1.0, 0.0, 0.0, 0.0, cr, -sr, 0.0, sr, cr);
    let rot_y = Matrix3::new(cp, 0.0, sp, 0.0, 1.0, 0.0, -sp, 0.0, cp);
    let rot_z = Matrix3::new(cy, -sy, 0.0, sy, cy, 0.0, 0.0, 0.0, 1.0);

    rot_z * rot_y * rot_x
}

/// Cross-product matrix: `skew(a) * b == a.cross(&b)`.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Rodrigues' formula `I + sin(t) K + (1 - cos(t)) K^2` for a unit `axis`.
pub fn rodrigues(axis: &Vector3<f64>, angle: f64) -> RotationMatrix {
    let k = skew(axis);
    let (sin_t, cos_t) = angle.sin_cos();
    Matrix3::identity() + k * sin_t + k * k * (1.0 - cos_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::FRAC_PI_2;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn random_vector(rng: &mut ChaCha8Rng) -> Vector3<f64> {
        Vector3::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        )
    }

    fn same_rotation(a: &Quat, b: &Quat, tol: f64) -> bool {
        (*a - *b).norm() < tol || (*a + *b).norm() < tol
    }

    fn near_half_turn(rng: &mut ChaCha8Rng) -> Quat {
        let axis = random_vector(rng).normalize();
        let angle = PI - rng.gen_range(0.0..1e-6);
        axis_angle_to_quat(&(axis * angle))
    }

    #[test]
    fn test_normalize() {
        let q = quat_normalize(&Quaternion::new(2.0, 0.0, 0.0, 0.0));
        assert_relative_eq!(q, identity());

        let q = quat_normalize(&Quaternion::new(1.0, 1.0, 1.0, 1.0));
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.i, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_zero_is_identity() {
        let q = quat_normalize(&Quaternion::new(0.0, 1e-12, 0.0, 0.0));
        assert_eq!(q, identity());
    }

    #[test]
    fn test_conjugate() {
        let q = quat_conjugate(&Quaternion::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(q, Quaternion::new(1.0, -2.0, -3.0, -4.0));
    }

    #[test]
    fn test_multiply_matches_nalgebra() {
        let a = Quaternion::new(0.3, -1.0, 2.0, 0.5);
        let b = Quaternion::new(-0.7, 0.2, 0.1, 1.5);
        assert_relative_eq!(quat_multiply(&a, &b), a * b, epsilon = 1e-12);
    }

    #[test]
    fn test_multiply_composes_rotations() {
        let mut rng = rng();
        for _ in 0..100 {
            let q1 = uniform_random_quat(&mut rng);
            let q2 = uniform_random_quat(&mut rng);
            let v = random_vector(&mut rng);

            let composed = quat_rotate(&quat_multiply(&q1, &q2), &v);
            let chained = quat_rotate(&q1, &quat_rotate(&q2, &v));
            assert_relative_eq!(composed, chained, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rotate_quarter_turn_about_z() {
        let q = axis_angle_to_quat(&Vector3::new(0.0, 0.0, FRAC_PI_2));
        let v = quat_rotate(&q, &Vector3::x());
        assert_relative_eq!(v, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_matches_matrix() {
        let mut rng = rng();
        for _ in 0..200 {
            let q = uniform_random_quat(&mut rng);
            let v = random_vector(&mut rng);
            assert_relative_eq!(quat_rotate(&q, &v), quat_to_mat(&q) * v, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rotate_normalizes_input() {
        let q = axis_angle_to_quat(&Vector3::new(0.4, -0.1, 0.9));
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(quat_rotate(&(q * 3.0), &v), quat_rotate(&q, &v), epsilon = 1e-12);
    }

    #[test]
    fn test_relative_angle() {
        let mut rng = rng();
        for _ in 0..100 {
            let q1 = uniform_random_quat(&mut rng);
            let q2 = uniform_random_quat(&mut rng);

            assert!(quat_relative_angle(&q1, &q1).abs() < 1e-6);
            let angle = quat_relative_angle(&q1, &q2);
            assert!((0.0..=PI).contains(&angle));
            assert_relative_eq!(angle, quat_relative_angle(&q1, &(-q2)), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_relative_angle_known_value() {
        let q1 = axis_angle_to_quat(&Vector3::new(0.0, 0.0, 0.3));
        let q2 = axis_angle_to_quat(&Vector3::new(0.0, 0.0, 1.2));
        assert_relative_eq!(quat_relative_angle(&q1, &q2), 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolate_endpoints() {
        let mut rng = rng();
        for _ in 0..100 {
            let q1 = uniform_random_quat(&mut rng);
            let q2 = uniform_random_quat(&mut rng);

            assert!(same_rotation(&interpolate_quat(&q1, &q2, 0.0), &q1, 1e-9));
            assert!(same_rotation(&interpolate_quat(&q1, &q2, 1.0), &q2, 1e-9));
        }
    }

    #[test]
    fn test_interpolate_takes_minor_arc() {
        let q1 = identity();
        let q2 = -axis_angle_to_quat(&Vector3::new(0.0, 0.0, FRAC_PI_2));
        let mid = interpolate_quat(&q1, &q2, 0.5);

        let expected = axis_angle_to_quat(&Vector3::new(0.0, 0.0, FRAC_PI_2 / 2.0));
        assert!(same_rotation(&mid, &expected, 1e-9));
        assert_relative_eq!(quat_relative_angle(&q1, &mid), FRAC_PI_2 / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolate_near_parallel_uses_lerp() {
        let q1 = axis_angle_to_quat(&Vector3::new(1e-4, 0.0, 0.0));
        let q2 = axis_angle_to_quat(&Vector3::new(2e-4, 0.0, 0.0));
        let mid = interpolate_quat(&q1, &q2, 0.5);

        assert_relative_eq!(mid.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(quat_to_axis_angle(&mid).x, 1.5e-4, epsilon = 1e-9);

        let same = interpolate_quat(&q1, &q1, 0.3);
        assert!(same_rotation(&same, &q1, 1e-12));
    }

    #[test]
    fn test_quat_to_mat_is_proper_rotation() {
        let mut rng = rng();
        for _ in 0..100 {
            let m = quat_to_mat(&uniform_random_quat(&mut rng));
            assert_relative_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-12);
            assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mat_round_trip() {
        let mut rng = rng();
        for i in 0..1000 {
            let q = if i % 4 == 0 {
                near_half_turn(&mut rng)
            } else {
                uniform_random_quat(&mut rng)
            };
            let back = mat_to_quat(&quat_to_mat(&q));
            assert!(same_rotation(&back, &q, 1e-9), "{q:?} -> {back:?}");
        }
    }

    #[test]
    fn test_mat_to_quat_exact_half_turns() {
        for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
            let q = axis_angle_to_quat(&(axis * PI));
            let back = mat_to_quat(&quat_to_mat(&q));
            assert!(same_rotation(&back, &q, 1e-12));
        }
    }

    #[test]
    fn test_axis_angle_round_trip() {
        let mut rng = rng();
        for i in 0..500 {
            let q = if i % 5 == 0 {
                near_half_turn(&mut rng)
            } else {
                uniform_random_quat(&mut rng)
            };
            let aa = quat_to_axis_angle(&q);
            assert!(aa.norm() <= PI + 1e-12);
            assert_relative_eq!(
                axis_angle_to_mat(&aa),
                quat_to_mat(&q),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_axis_angle_zero() {
        assert_eq!(quat_to_axis_angle(&identity()), Vector3::zeros());
        assert_eq!(quat_to_axis_angle(&(-identity())), Vector3::zeros());
        assert_eq!(axis_angle_to_quat(&Vector3::zeros()), identity());
    }

    #[test]
    fn test_axis_angle_folds_long_rotation() {
        // 3pi/2 about z is -pi/2 about z
        let q = axis_angle_to_quat(&Vector3::new(0.0, 0.0, 1.5 * PI));
        let aa = quat_to_axis_angle(&q);
        assert_relative_eq!(aa, Vector3::new(0.0, 0.0, -FRAC_PI_2), epsilon = 1e-9);
        assert_relative_eq!(mat_to_axis_angle(&quat_to_mat(&q)), aa, epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_random_quat_is_unit() {
        let mut rng = rng();
        for _ in 0..100 {
            assert_relative_eq!(uniform_random_quat(&mut rng).norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_uniform_random_quat_is_reproducible() {
        let a = uniform_random_quat(&mut ChaCha8Rng::seed_from_u64(3));
        let b = uniform_random_quat(&mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_uniform_random_quat_distribution() {
        let mut rng = rng();
        let samples: Vec<Quat> = (0..10_000).map(|_| uniform_random_quat(&mut rng)).collect();

        for _ in 0..10 {
            let reference = uniform_random_quat(&mut rng);
            let threshold: f64 = rng.gen_range(0.0..PI);
            let angles = samples.iter().map(|q| quat_relative_angle(&reference, q));
            let below = angles.filter(|&a| a < threshold).count();

            let ratio = below as f64 / samples.len() as f64;
            let expected = (threshold - threshold.sin()) / PI;
            assert!(
                (ratio - expected).abs() < 0.025,
                "threshold {threshold}: {ratio} vs {expected}"
            );
        }
    }

    #[test]
    fn test_rpy_to_mat() {
        assert_relative_eq!(rpy_to_mat(&Vector3::zeros()), Matrix3::identity());

        let yaw = rpy_to_mat(&Vector3::new(0.0, 0.0, FRAC_PI_2));
        assert_relative_eq!(yaw * Vector3::x(), Vector3::y(), epsilon = 1e-12);

        let rpy = Vector3::new(0.3, -0.5, 1.1);
        let expected = axis_angle_to_mat(&(Vector3::z() * rpy.z))
            * axis_angle_to_mat(&(Vector3::y() * rpy.y))
            * axis_angle_to_mat(&(Vector3::x() * rpy.x));
        assert_relative_eq!(rpy_to_mat(&rpy), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_skew_is_cross_product() {
        let a = Vector3::new(1.0, -2.0, 0.5);
        let b = Vector3::new(0.3, 4.0, -1.0);
        assert_relative_eq!(skew(&a) * b, a.cross(&b), epsilon = 1e-12);
    }

    #[test]
    fn test_rodrigues_matches_axis_angle() {
        let mut rng = rng();
        for _ in 0..100 {
            let axis = random_vector(&mut rng).normalize();
            let angle = rng.gen_range(-PI..PI);
            assert_relative_eq!(
                rodrigues(&axis, angle),
                axis_angle_to_mat(&(axis * angle)),
                epsilon = 1e-9
            );
        }
    }
}
