//! Axis-aligned bounding box over line positions.
//!
//! [`Aabb3::empty`] starts from `min = +f32::MAX`, `max = -f32::MAX` so that any real
//! point shrinks it; [`Aabb3::is_empty`] reports a box that never saw a finite point.
use crate::constants::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb3 {
    pub fn empty() -> Self {
        Aabb3 {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(-f32::MAX),
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb3 { min, max }
    }

    /// Box holding the finite points of `points`; points with a NaN or infinite
    /// component are ignored.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut aabb, pt| {
            aabb.add_point(pt);
            aabb
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn add_point(&mut self, pt: &Vec3) {
        if !pt.iter().all(|c| c.is_finite()) {
            return;
        }
        self.min = self.min.inf(pt);
        self.max = self.max.sup(pt);
    }

    /// Union of two boxes. min/max are exact, so the result does not depend on the
    /// order in which partial boxes are combined.
    pub fn combine(self, other: Aabb3) -> Aabb3 {
        Aabb3 {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Center of the box; the origin for an empty box.
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis; zero for an empty box.
    pub fn dimensions(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        self.max - self.min
    }
}
