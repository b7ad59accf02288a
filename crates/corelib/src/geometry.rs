use crate::Vec3;

/// Normal of triangle `(v0, v1, v2)`: `(v1 - v0) x (v2 - v0)`, normalized.
///
/// Degenerate (collinear or coincident) triangles yield a zero-length cross
/// product, which is returned as-is instead of dividing by zero.
#[inline]
pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    let n = (v1 - v0).cross(v2 - v0);
    let len2 = n.length_squared();
    if len2 > 0.0 { n / len2.sqrt() } else { n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn normal_is_unit_length() {
        let n = face_normal(
            vec3(0.0, 0.0, 0.0),
            vec3(3.0, 0.0, 0.0),
            vec3(0.0, 0.0, -5.0),
        );
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn collinear_triangle_keeps_zero_normal() {
        let n = face_normal(
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 1.0, 1.0),
            vec3(2.0, 2.0, 2.0),
        );
        assert_eq!(n, Vec3::ZERO);
    }
}
