//! Contract implementations for every shape kind.
//!
//! Each kind is a zero-sized marker implementing [`Shape`](crate::Shape),
//! with a `pack` function next to it that appends a block in the layout
//! its `hit` reads. Keeping both sides in one file keeps the layout in
//! one place.

mod sphere;
mod cuboid;
mod plane;
mod csg;
mod transform;
mod bounded;

pub use sphere::{Sphere, SphereParams};
pub use cuboid::{Aabb, Cuboid};
pub use plane::{Plane, PlaneParams};
pub use csg::{Children, Difference, DifferenceParams, Intersection, Union, MAX_CHILDREN, MAX_SPANS};
pub use transform::{Transform, TransformParams};
pub use bounded::{Bounded, BoundedParams};

use shapebuf_math::Vec3;

/// Unit vector along `axis` with the given sign.
#[inline]
pub(crate) fn axis_normal(axis: usize, sign: f32) -> Vec3 {
    let mut n = Vec3::zeros();
    n[axis] = sign;
    n
}
