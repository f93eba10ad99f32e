//! Part hierarchy types.
//!
//! A vessel is a tree of parts. Only physically significant parts receive
//! collision callbacks from the host; the rest report their contacts through
//! their nearest significant ancestor. The tree is stored as an arena so that
//! effect modules can refer to parts by a stable [`PartId`] instead of holding
//! live references into the host scene graph.

use nalgebra::{Point3, Vector3};

use crate::{Bounds, FxError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier for a part in a [`PartTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartId(pub u32);

impl PartId {
    /// Create a new part ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for PartId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Part({})", self.0)
    }
}

/// Rigid body attached to a part.
///
/// A part without a rigid body has been destroyed or not yet spawned into
/// the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    /// World-space linear velocity.
    pub velocity: Vector3<f64>,
}

impl RigidBody {
    /// Create a rigid body moving with the given velocity.
    #[must_use]
    pub fn moving(velocity: Vector3<f64>) -> Self {
        Self { velocity }
    }
}

/// Wheel state reported by the host's wheel module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WheelModule {
    /// Whether the wheel has been broken.
    pub damaged: bool,
}

/// Wheel sub-component of a part.
///
/// Skids and hover pads carry a wheel collider without a wheel module.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wheel {
    /// World-space bounds of the wheel collider.
    pub collider: Bounds,
    /// Wheel module, when the part has one.
    pub module: Option<WheelModule>,
}

impl Wheel {
    /// Create a wheel with an intact wheel module.
    #[must_use]
    pub fn intact(collider: Bounds) -> Self {
        Self {
            collider,
            module: Some(WheelModule { damaged: false }),
        }
    }

    /// Create a wheel collider with no wheel module (skids, hover pads).
    #[must_use]
    pub fn collider_only(collider: Bounds) -> Self {
        Self {
            collider,
            module: None,
        }
    }

    /// True when a wheel module is present and not damaged.
    #[must_use]
    pub fn is_intact(&self) -> bool {
        self.module.is_some_and(|m| !m.damaged)
    }

    /// Distance from a point to the wheel collider.
    #[must_use]
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        self.collider.distance_to(point)
    }
}

/// A node in the vessel hierarchy.
///
/// # Example
///
/// ```
/// use fx_types::{Bounds, Part};
/// use nalgebra::{Point3, Vector3};
///
/// let part = Part::new("fuelTank", Point3::new(0.0, 0.0, 0.0))
///     .with_collider(Bounds::from_center(Point3::origin(), Vector3::new(1.0, 1.0, 2.0)));
///
/// // Surface distance, not center distance
/// assert_eq!(part.distance_to(&Point3::new(0.0, 0.0, 5.0)), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Part {
    /// Host name of the part.
    pub name: String,
    /// World-space position of the part origin.
    pub position: Point3<f64>,
    /// Collision volume, if the part has one.
    pub collider: Option<Bounds>,
    /// Wheel sub-component, if any.
    pub wheel: Option<Wheel>,
    /// Rigid body; `None` once the part has been destroyed.
    pub rigid_body: Option<RigidBody>,
    /// Whether the host delivers collision callbacks to this part directly.
    pub physically_significant: bool,
    parent: Option<PartId>,
    children: Vec<PartId>,
}

impl Part {
    /// Create a physically significant part at rest with no collider.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Point3<f64>) -> Self {
        Self {
            name: name.into(),
            position,
            collider: None,
            wheel: None,
            rigid_body: Some(RigidBody::default()),
            physically_significant: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the collision volume.
    #[must_use]
    pub fn with_collider(mut self, collider: Bounds) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Attach a wheel sub-component.
    #[must_use]
    pub fn with_wheel(mut self, wheel: Wheel) -> Self {
        self.wheel = Some(wheel);
        self
    }

    /// Set the rigid body velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.rigid_body = Some(RigidBody::moving(velocity));
        self
    }

    /// Mark the part as physically insignificant.
    ///
    /// Its collisions are then reported on its significant ancestor.
    #[must_use]
    pub fn physically_insignificant(mut self) -> Self {
        self.physically_significant = false;
        self
    }

    /// Parent part, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<PartId> {
        self.parent
    }

    /// Child parts in stored order.
    #[must_use]
    pub fn children(&self) -> &[PartId] {
        &self.children
    }

    /// Rigid body velocity, if the part still has a rigid body.
    #[must_use]
    pub fn velocity(&self) -> Option<Vector3<f64>> {
        self.rigid_body.map(|rb| rb.velocity)
    }

    /// Distance from a point to this part.
    ///
    /// Uses the collision volume when present, otherwise the part origin.
    #[must_use]
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        match &self.collider {
            Some(bounds) => bounds.distance_to(point),
            None => nalgebra::distance(&self.position, point),
        }
    }

    /// Whether a point is closer to the wheel collider than to the body.
    ///
    /// Always false for parts without a wheel.
    #[must_use]
    pub fn is_wheel_contact(&self, point: &Point3<f64>) -> bool {
        self.wheel
            .as_ref()
            .is_some_and(|wheel| wheel.distance_to(point) < self.distance_to(point))
    }
}

/// Arena of parts with explicit parent/child links.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartTree {
    slots: Vec<Option<Part>>,
}

impl PartTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a root part.
    pub fn add_root(&mut self, mut part: Part) -> PartId {
        part.parent = None;
        part.children.clear();
        self.push(part)
    }

    /// Insert a part as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is unknown or destroyed.
    pub fn attach(&mut self, mut part: Part, parent: PartId) -> Result<PartId> {
        self.get(parent)?;
        part.parent = Some(parent);
        part.children.clear();
        let id = self.push(part);
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Move an existing part (and its subtree) under a new parent.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is unknown or destroyed, or if the new
    /// parent lies inside the moved subtree.
    pub fn reparent(&mut self, child: PartId, new_parent: PartId) -> Result<()> {
        self.get(child)?;
        self.get(new_parent)?;

        let mut cursor = Some(new_parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(FxError::HierarchyCycle {
                    child: child.raw(),
                    parent: new_parent.raw(),
                });
            }
            cursor = self.get(id)?.parent;
        }

        self.detach(child)?;
        self.get_mut(child)?.parent = Some(new_parent);
        self.get_mut(new_parent)?.children.push(child);
        Ok(())
    }

    /// Tear down a part.
    ///
    /// The part is unlinked from its parent and its children become roots.
    /// The ID is never reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the part is unknown or already destroyed.
    pub fn destroy(&mut self, id: PartId) -> Result<Part> {
        self.detach(id)?;
        let part = self
            .slots
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(FxError::PartDestroyed(id.raw()))?;
        for &child in &part.children {
            if let Some(Some(c)) = self.slots.get_mut(child.index()) {
                c.parent = None;
            }
        }
        Ok(part)
    }

    /// Look up a live part.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID was never issued or the part was destroyed.
    pub fn get(&self, id: PartId) -> Result<&Part> {
        match self.slots.get(id.index()) {
            Some(Some(part)) => Ok(part),
            Some(None) => Err(FxError::PartDestroyed(id.raw())),
            None => Err(FxError::InvalidPartId(id.raw())),
        }
    }

    /// Look up a live part mutably.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID was never issued or the part was destroyed.
    pub fn get_mut(&mut self, id: PartId) -> Result<&mut Part> {
        match self.slots.get_mut(id.index()) {
            Some(Some(part)) => Ok(part),
            Some(None) => Err(FxError::PartDestroyed(id.raw())),
            None => Err(FxError::InvalidPartId(id.raw())),
        }
    }

    /// Look up a live part, returning `None` when it is gone.
    #[must_use]
    pub fn find(&self, id: PartId) -> Option<&Part> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Children of a part, empty if the part is gone.
    #[must_use]
    pub fn children(&self, id: PartId) -> &[PartId] {
        self.find(id).map_or(&[], Part::children)
    }

    /// Number of live parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the tree holds no live parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over live parts in ID order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (PartId, &Part)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|part| (PartId(i as u32), part)))
    }

    fn push(&mut self, part: Part) -> PartId {
        #[allow(clippy::cast_possible_truncation)]
        let id = PartId(self.slots.len() as u32);
        self.slots.push(Some(part));
        id
    }

    fn detach(&mut self, id: PartId) -> Result<()> {
        let parent = self.get(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(p) = self.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }
        self.get_mut(id)?.parent = None;
        Ok(())
    }
}
