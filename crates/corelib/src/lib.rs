//! Core math shared by the loader and renderer: glam re-exports,
//! axis-aligned bounds and triangle normals.

pub use glam::{Vec3, vec3};

pub mod bounds;
pub mod geometry;

pub use bounds::Aabb;
pub use geometry::face_normal;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_unit_triangle() {
        let aabb = Aabb::from_points([
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 2.0, 0.0),
        ]);
        assert_eq!(aabb.extent(), vec3(1.0, 2.0, 0.0));
        assert!((aabb.max_extent() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ccw_triangle_faces_plus_z() {
        let n = face_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(n, Vec3::Z);
    }
}
