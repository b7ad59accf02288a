use crate::Vec3;

/// Axis-aligned bounding box. `EMPTY` has inverted infinite corners so that
/// extending it by any point yields that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut aabb, p| {
            aabb.extend(p);
            aabb
        })
    }

    #[inline]
    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Per-axis size. Negative infinity for an empty box.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three extents.
    #[inline]
    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }

    /// Uniform factor that maps the dominant axis onto `target`.
    ///
    /// Returns `None` when the box is empty or flat in every axis, i.e. when
    /// the division would not produce a finite, positive factor.
    pub fn uniform_scale_to(&self, target: f32) -> Option<f32> {
        let len = self.max_extent();
        if !(len.is_finite() && len > 0.0) {
            return None;
        }
        let factor = target / len;
        factor.is_finite().then_some(factor)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
