//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// Besides the usual extent queries, this type carries the shape heuristics
/// the tube analyzers key off: sorted extents and slenderness.
///
/// # Example
///
/// ```
/// use cad_mesh::{Aabb, Point3};
///
/// let aabb = Aabb::new(Point3::origin(), Point3::new(100.0, 10.0, 8.0));
/// assert!((aabb.max_extent() - 100.0).abs() < 1e-12);
/// assert!((aabb.slenderness() - 10.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a bounding box from two corners, correcting a swapped axis.
    #[must_use]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: Point3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Point3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    /// An inverted box that expands to include the first point it sees.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Bounding box of an iterator of points. Empty iterator yields [`Aabb::empty`].
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_to_include(p);
        }
        aabb
    }

    /// True if no point has been included (min > max on some axis).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extent along each axis. Zero vector for an empty box.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Geometric center.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            f64::midpoint(self.min.x, self.max.x),
            f64::midpoint(self.min.y, self.max.y),
            f64::midpoint(self.min.z, self.max.z),
        )
    }

    /// Diagonal length.
    #[inline]
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Longest axis extent.
    #[inline]
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// Extents sorted descending: `[longest, middle, shortest]`.
    #[must_use]
    pub fn sorted_extents(&self) -> [f64; 3] {
        let s = self.size();
        let mut e = [s.x, s.y, s.z];
        e.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        e
    }

    /// Slenderness: longest extent over second-longest, second floored at 1e-3.
    ///
    /// A straight rod has high slenderness; a tube bent back on itself has
    /// a slenderness near 1.
    #[must_use]
    pub fn slenderness(&self) -> f64 {
        let [longest, second, _] = self.sorted_extents();
        longest / second.max(1e-3)
    }

    /// True if the longest extent is zero (point-like or empty geometry).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.is_empty() || self.max_extent() <= 0.0
    }

    /// Grow to include a point.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Enclosing box of two boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_covers_all() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 5.0, 3.0),
            Point3::new(-2.0, 8.0, 1.0),
        ];
        let aabb = Aabb::from_points(points.iter());
        assert!((aabb.min.x - (-2.0)).abs() < f64::EPSILON);
        assert!((aabb.max.x - 10.0).abs() < f64::EPSILON);
        assert!((aabb.max.y - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_box_is_degenerate() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert!(aabb.is_degenerate());
        assert!((aabb.size().norm()).abs() < f64::EPSILON);
    }

    #[test]
    fn point_box_is_degenerate() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let aabb = Aabb::new(p, p);
        assert!(!aabb.is_empty());
        assert!(aabb.is_degenerate());
    }

    #[test]
    fn sorted_extents_descend() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(2.0, 9.0, 4.0));
        assert_eq!(aabb.sorted_extents(), [9.0, 4.0, 2.0]);
    }

    #[test]
    fn slenderness_of_rod() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(100.0, 3.0, 3.0));
        assert!((aabb.slenderness() - 100.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn slenderness_floors_flat_geometry() {
        // Second-longest extent of zero would divide by zero without the floor.
        let aabb = Aabb::new(Point3::origin(), Point3::new(50.0, 0.0, 0.0));
        assert!((aabb.slenderness() - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn union_encloses_both() {
        let a = Aabb::new(Point3::origin(), Point3::new(5.0, 5.0, 5.0));
        let b = Aabb::new(Point3::new(3.0, -1.0, 3.0), Point3::new(10.0, 4.0, 4.0));
        let u = a.union(&b);
        assert!((u.min.y - (-1.0)).abs() < f64::EPSILON);
        assert!((u.max.x - 10.0).abs() < f64::EPSILON);
    }
}
