//! Contact events delivered by the host physics callbacks.
//!
//! A [`ContactEvent`] is created by the host each frame a collision begins or
//! persists and is consumed synchronously. Contact points arrive one frame
//! late, so every consumer works with [`ContactPoint::corrected`] positions.

use nalgebra::{Point3, Vector3};

use crate::PartId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single contact point as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactPoint {
    /// World-space position, from the previous physics frame.
    pub point: Point3<f64>,
    /// Relative velocity of the two bodies at this point.
    pub relative_velocity: Vector3<f64>,
}

impl ContactPoint {
    /// Create a new contact point.
    #[must_use]
    pub fn new(point: Point3<f64>, relative_velocity: Vector3<f64>) -> Self {
        Self {
            point,
            relative_velocity,
        }
    }

    /// Position advanced by one frame of relative motion.
    #[must_use]
    pub fn corrected(&self, delta_time: f64) -> Point3<f64> {
        self.point + self.relative_velocity * delta_time
    }
}

/// The collider surface that was hit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Collider {
    /// Host name of the collider.
    pub name: String,
}

impl Collider {
    /// Create a collider handle from its name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The object owning the collider that was hit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollidingObject {
    /// Host name of the object.
    pub name: String,
    /// The vessel part this object belongs to, if it is one.
    pub part: Option<PartId>,
}

impl CollidingObject {
    /// An object that is not a vessel part (terrain, buildings, kerbals).
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            part: None,
        }
    }

    /// An object that is a vessel part.
    #[must_use]
    pub fn part(name: impl Into<String>, part: PartId) -> Self {
        Self {
            name: name.into(),
            part: Some(part),
        }
    }
}

/// One physics contact between a part and something else.
///
/// # Example
///
/// ```
/// use fx_types::{Collider, CollidingObject, ContactEvent, ContactPoint};
/// use nalgebra::{Point3, Vector3};
///
/// let event = ContactEvent::new(
///     vec![ContactPoint::new(Point3::origin(), Vector3::new(10.0, 0.0, 0.0))],
///     Vector3::new(3.0, 4.0, 0.0),
///     Collider::named("runway_collider"),
///     CollidingObject::named("runway_collider"),
/// );
///
/// assert_eq!(event.speed(), 5.0);
/// assert_eq!(event.corrected_point(0.1), Some(Point3::new(1.0, 0.0, 0.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactEvent {
    /// Contact points; may be empty on exit callbacks.
    pub contacts: Vec<ContactPoint>,
    /// Relative velocity of the colliding bodies.
    pub relative_velocity: Vector3<f64>,
    /// Collider surface that was hit.
    pub collider: Collider,
    /// Object that was hit.
    pub object: CollidingObject,
}

impl ContactEvent {
    /// Create a new contact event.
    #[must_use]
    pub fn new(
        contacts: Vec<ContactPoint>,
        relative_velocity: Vector3<f64>,
        collider: Collider,
        object: CollidingObject,
    ) -> Self {
        Self {
            contacts,
            relative_velocity,
            collider,
            object,
        }
    }

    /// Magnitude of the relative velocity.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.relative_velocity.norm()
    }

    /// Whether the event carries any contact points.
    #[must_use]
    pub fn has_contacts(&self) -> bool {
        !self.contacts.is_empty()
    }

    /// First contact point, advanced by one frame.
    #[must_use]
    pub fn corrected_point(&self, delta_time: f64) -> Option<Point3<f64>> {
        self.contacts.first().map(|c| c.corrected(delta_time))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_corrected_point() {
        let c = ContactPoint::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(2.0, 0.0, -4.0));
        assert_eq!(c.corrected(0.5), Point3::new(2.0, 2.0, 1.0));
        assert_eq!(c.corrected(0.0), c.point);
    }

    #[test]
    fn test_empty_event() {
        let event = ContactEvent::new(
            Vec::new(),
            Vector3::zeros(),
            Collider::default(),
            CollidingObject::default(),
        );
        assert!(!event.has_contacts());
        assert_eq!(event.corrected_point(0.02), None);
        assert_eq!(event.speed(), 0.0);
    }

    #[test]
    fn test_object_handles() {
        let obj = CollidingObject::part("wing", PartId::new(4));
        assert_eq!(obj.part, Some(PartId::new(4)));
        assert_eq!(CollidingObject::named("bn_spA01").part, None);
    }
}
