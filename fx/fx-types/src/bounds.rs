//! Axis-aligned collision bounds.
//!
//! Parts and wheels expose their collision volume as a world-space AABB.
//! The attribution resolver only ever needs "how far is this point from the
//! volume", so that is what this type is built around.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A world-space axis-aligned bounding box.
///
/// # Example
///
/// ```
/// use fx_types::Bounds;
/// use nalgebra::Point3;
///
/// let bounds = Bounds::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
///
/// // Inside points are at distance zero
/// assert_eq!(bounds.distance_to(&Point3::new(1.0, 1.0, 1.0)), 0.0);
///
/// // Outside points measure to the nearest face
/// assert_eq!(bounds.distance_to(&Point3::new(5.0, 1.0, 1.0)), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Bounds {
    /// Create bounds from two corners.
    ///
    /// The corners are reordered per axis if `min > max`.
    #[must_use]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: Point3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Point3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    /// Create bounds centered on a point with the given half extents.
    #[must_use]
    pub fn from_center(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Minimum corner.
    #[inline]
    #[must_use]
    pub fn min(&self) -> Point3<f64> {
        self.min
    }

    /// Maximum corner.
    #[inline]
    #[must_use]
    pub fn max(&self) -> Point3<f64> {
        self.max
    }

    /// Center of the box.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Check whether a point lies inside or on the boundary.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Closest point on (or inside) the box to `point`.
    ///
    /// A NaN extent leaves that coordinate of `point` unconstrained.
    #[inline]
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            point.x.max(self.min.x).min(self.max.x),
            point.y.max(self.min.y).min(self.max.y),
            point.z.max(self.min.z).min(self.max.z),
        )
    }

    /// Euclidean distance from `point` to the box. Zero when inside.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        nalgebra::distance(&self.closest_point(point), point)
    }

    /// Translate the box by an offset.
    #[must_use]
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
