//! Contact attribution.
//!
//! The host reports every contact against the physically significant part
//! that owns the collider. Small physically insignificant children (fins,
//! struts, landing legs) ride along on their parent's rigid body, so a
//! contact that actually grazed one of them arrives at the parent. The
//! resolver decides which part should own the effect.

use fx_types::{PartId, PartTree, Point3};
use tracing::trace;

/// Where a contact's effects should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution {
    /// The child that owns the contact, or `None` if the receiving part does.
    pub target: Option<PartId>,
    /// Whether the winning child was hit on its wheel collider.
    pub is_wheel: bool,
}

impl Attribution {
    /// Attribution to the receiving part itself.
    pub const SELF: Self = Self {
        target: None,
        is_wheel: false,
    };

    /// Whether the contact was moved to a child.
    #[must_use]
    pub fn is_redirected(&self) -> bool {
        self.target.is_some()
    }
}

/// Find the part closest to `point` among `parent` and its effect-bearing,
/// physically insignificant direct children.
///
/// Distances are to collision volumes, falling back to the part origin. A
/// child's wheel collider counts when it is strictly closer than its body.
/// Ties keep the parent, or the earlier child.
///
/// `has_module` reports whether a child carries collision effects; children
/// without them are never candidates.
///
/// # Example
///
/// ```
/// use fx_contact::resolve_target;
/// use fx_types::{Part, PartTree};
/// use nalgebra::Point3;
///
/// let mut tree = PartTree::new();
/// let hull = tree.add_root(Part::new("hull", Point3::new(10.0, 0.0, 0.0)));
/// let leg = tree
///     .attach(
///         Part::new("leg", Point3::new(5.0, 0.0, 0.0)).physically_insignificant(),
///         hull,
///     )
///     .unwrap();
///
/// let attribution = resolve_target(&tree, hull, &Point3::origin(), |_| true);
/// assert_eq!(attribution.target, Some(leg));
/// ```
pub fn resolve_target<F>(
    tree: &PartTree,
    parent: PartId,
    point: &Point3<f64>,
    has_module: F,
) -> Attribution
where
    F: Fn(PartId) -> bool,
{
    let Some(parent_part) = tree.find(parent) else {
        return Attribution::SELF;
    };

    let mut best = parent_part.distance_to(point);
    let mut attribution = Attribution::SELF;

    for &child_id in parent_part.children() {
        let Some(child) = tree.find(child_id) else {
            continue;
        };
        if child.physically_significant || !has_module(child_id) {
            continue;
        }

        let mut distance = child.distance_to(point);
        let mut is_wheel = false;
        if let Some(wheel) = &child.wheel {
            let wheel_distance = wheel.distance_to(point);
            if wheel_distance < distance {
                distance = wheel_distance;
                is_wheel = true;
            }
        }

        if distance < best {
            best = distance;
            attribution = Attribution {
                target: Some(child_id),
                is_wheel,
            };
        }
    }

    trace!(
        %parent,
        target = ?attribution.target,
        is_wheel = attribution.is_wheel,
        distance = best,
        "Resolved contact"
    );
    attribution
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use fx_types::{Bounds, Part, Wheel};
    use nalgebra::Vector3;

    fn at(name: &str, x: f64) -> Part {
        Part::new(name, Point3::new(x, 0.0, 0.0))
    }

    fn boxed(name: &str, x: f64) -> Part {
        at(name, x).with_collider(Bounds::from_center(
            Point3::new(x, 0.0, 0.0),
            Vector3::new(0.5, 0.5, 0.5),
        ))
    }

    #[test]
    fn test_closest_child_wins() {
        let mut tree = PartTree::new();
        let parent = tree.add_root(at("parent", 10.0));
        let _far = tree
            .attach(at("far", 8.0).physically_insignificant(), parent)
            .unwrap();
        let near = tree
            .attach(at("near", 5.0).physically_insignificant(), parent)
            .unwrap();

        let attribution = resolve_target(&tree, parent, &Point3::origin(), |_| true);
        assert_eq!(attribution.target, Some(near));
        assert!(!attribution.is_wheel);
    }

    #[test]
    fn test_parent_closest_keeps_self() {
        let mut tree = PartTree::new();
        let parent = tree.add_root(at("parent", 3.0));
        tree.attach(at("a", 8.0).physically_insignificant(), parent)
            .unwrap();
        tree.attach(at("b", 5.0).physically_insignificant(), parent)
            .unwrap();

        let attribution = resolve_target(&tree, parent, &Point3::origin(), |_| true);
        assert_eq!(attribution, Attribution::SELF);
        assert!(!attribution.is_redirected());
    }

    #[test]
    fn test_ties_favor_parent_then_earlier_child() {
        let mut tree = PartTree::new();
        let parent = tree.add_root(at("parent", 5.0));
        tree.attach(at("tie", -5.0).physically_insignificant(), parent)
            .unwrap();
        assert_eq!(
            resolve_target(&tree, parent, &Point3::origin(), |_| true),
            Attribution::SELF
        );

        let mut tree = PartTree::new();
        let parent = tree.add_root(at("parent", 9.0));
        let first = tree
            .attach(at("first", 4.0).physically_insignificant(), parent)
            .unwrap();
        tree.attach(at("second", -4.0).physically_insignificant(), parent)
            .unwrap();
        let attribution = resolve_target(&tree, parent, &Point3::origin(), |_| true);
        assert_eq!(attribution.target, Some(first));
    }

    #[test]
    fn test_significant_and_moduleless_children_skipped() {
        let mut tree = PartTree::new();
        let parent = tree.add_root(at("parent", 10.0));
        let rigid = tree.attach(at("rigid", 1.0), parent).unwrap();
        let bare = tree
            .attach(at("bare", 2.0).physically_insignificant(), parent)
            .unwrap();
        let fin = tree
            .attach(at("fin", 6.0).physically_insignificant(), parent)
            .unwrap();

        let attribution = resolve_target(&tree, parent, &Point3::origin(), |id| id != bare);
        assert_eq!(attribution.target, Some(fin));
        assert_ne!(attribution.target, Some(rigid));
    }

    #[test]
    fn test_only_direct_children() {
        let mut tree = PartTree::new();
        let parent = tree.add_root(at("parent", 10.0));
        let child = tree
            .attach(at("child", 8.0).physically_insignificant(), parent)
            .unwrap();
        tree.attach(at("grandchild", 0.5).physically_insignificant(), child)
            .unwrap();

        let attribution = resolve_target(&tree, parent, &Point3::origin(), |_| true);
        assert_eq!(attribution.target, Some(child));
    }

    #[test]
    fn test_wheel_collider_closer_than_body() {
        let mut tree = PartTree::new();
        let parent = tree.add_root(boxed("parent", 10.0));
        let wheel = Wheel::intact(Bounds::from_center(
            Point3::new(2.0, 0.0, 0.0),
            Vector3::new(0.5, 0.5, 0.5),
        ));
        let gear = tree
            .attach(
                boxed("gear", 4.0).with_wheel(wheel).physically_insignificant(),
                parent,
            )
            .unwrap();

        let attribution = resolve_target(&tree, parent, &Point3::origin(), |_| true);
        assert_eq!(attribution.target, Some(gear));
        assert!(attribution.is_wheel);

        // Contact on the far side of the body: body wins over the wheel
        let attribution = resolve_target(&tree, parent, &Point3::new(5.0, 0.0, 0.0), |_| true);
        assert_eq!(attribution.target, Some(gear));
        assert!(!attribution.is_wheel);
    }

    #[test]
    fn test_missing_parent() {
        let tree = PartTree::new();
        let attribution = resolve_target(&tree, PartId::new(3), &Point3::origin(), |_| true);
        assert_eq!(attribution, Attribution::SELF);
    }
}
