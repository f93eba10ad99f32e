//! Core types for physics-driven collision effects.
//!
//! This crate provides the data the effect engine consumes:
//!
//! - [`PartTree`] / [`Part`] - Vessel hierarchy as an arena addressed by [`PartId`]
//! - [`Bounds`] - World-space collision volumes
//! - [`ContactEvent`] - One physics contact as delivered by the host
//! - [`Environment`] - Per-frame atmosphere, location and volume state
//! - [`Color`] - Dust and light colors
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They do not play sounds or emit particles.
//! They are the common language between the host engine's physics callbacks
//! and the effect selection logic in `fx-contact`.
//!
//! # Example
//!
//! ```
//! use fx_types::{Bounds, Part, PartTree};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut tree = PartTree::new();
//! let pod = tree.add_root(Part::new("pod", Point3::origin()));
//! let fin = tree
//!     .attach(
//!         Part::new("fin", Point3::new(0.0, 0.0, -2.0))
//!             .with_collider(Bounds::from_center(
//!                 Point3::new(0.0, 0.0, -2.0),
//!                 Vector3::new(0.1, 0.5, 0.5),
//!             ))
//!             .physically_insignificant(),
//!         pod,
//!     )
//!     .unwrap();
//!
//! assert_eq!(tree.children(pod), &[fin]);
//! assert!(!tree.get(fin).unwrap().physically_significant);
//! ```

#![doc(html_root_url = "https://docs.rs/fx-types/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod bounds;
mod color;
mod contact;
mod environment;
mod error;
mod part;

pub use bounds::Bounds;
pub use color::Color;
pub use contact::{Collider, CollidingObject, ContactEvent, ContactPoint};
pub use environment::Environment;
pub use error::FxError;
pub use part::{Part, PartId, PartTree, RigidBody, Wheel, WheelModule};

// Re-export math types for convenience
pub use nalgebra::{Point3, Vector3};

/// Result type for effect operations.
pub type Result<T> = std::result::Result<T, FxError>;
