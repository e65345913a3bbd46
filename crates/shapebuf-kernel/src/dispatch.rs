//! Type tags and the tag dispatcher.
//!
//! The set of shape kinds is closed. [`hit`] reads the tag in integer
//! slot 0 of a block and forwards to the matching [`Shape`] implementation
//! with a single `match`; there are no trait objects or function pointers.
//!
//! Composites call back into [`hit`] for their children in one of two
//! ways, which can be combined freely:
//!
//! - **offset advance**: same ray, view advanced to the child block
//!   ([`hit_at`]),
//! - **ray substitution**: same view, different ray value
//!   (`hit(&other_ray, view)`).

use crate::shapes::{Bounded, Cuboid, Difference, Intersection, Plane, Sphere, Transform, Union};
use crate::{BufView, Hit, Offset, Pack, Ray, Shape};

/// Every shape kind that can appear in a parameter block.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Sphere given by center and radius.
    Sphere = 1,
    /// Axis-aligned box given by its min and max corners.
    Cuboid = 2,
    /// Half-space bounded by a plane.
    Plane = 3,
    /// Boolean union of N children.
    Union = 10,
    /// Boolean intersection of N children.
    Intersection = 11,
    /// Boolean difference of two children.
    Difference = 12,
    /// Child shape under an affine transform.
    Transform = 20,
    /// Child shape behind a bounding box test.
    Bounded = 21,
}

impl ShapeKind {
    /// All kinds, in tag order.
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Sphere,
        ShapeKind::Cuboid,
        ShapeKind::Plane,
        ShapeKind::Union,
        ShapeKind::Intersection,
        ShapeKind::Difference,
        ShapeKind::Transform,
        ShapeKind::Bounded,
    ];

    /// The integer tag of this kind.
    #[inline]
    pub const fn tag(self) -> i32 {
        self as i32
    }

    /// Look up the kind for a tag.
    #[inline]
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            1 => Some(ShapeKind::Sphere),
            2 => Some(ShapeKind::Cuboid),
            3 => Some(ShapeKind::Plane),
            10 => Some(ShapeKind::Union),
            11 => Some(ShapeKind::Intersection),
            12 => Some(ShapeKind::Difference),
            20 => Some(ShapeKind::Transform),
            21 => Some(ShapeKind::Bounded),
            _ => None,
        }
    }

    /// Lowercase name, for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cuboid => "cuboid",
            ShapeKind::Plane => "plane",
            ShapeKind::Union => "union",
            ShapeKind::Intersection => "intersection",
            ShapeKind::Difference => "difference",
            ShapeKind::Transform => "transform",
            ShapeKind::Bounded => "bounded",
        }
    }

    /// Whether the child count is stored in the block (integer slot 1).
    pub fn is_variadic(self) -> bool {
        matches!(self, ShapeKind::Union | ShapeKind::Intersection)
    }

    /// Size of this kind's own block, excluding any children.
    ///
    /// `count` is the stored child count for variadic kinds and is
    /// ignored otherwise.
    pub fn block_len(self, count: usize) -> Offset {
        match self {
            ShapeKind::Sphere => Sphere::block_len(count),
            ShapeKind::Cuboid => Cuboid::block_len(count),
            ShapeKind::Plane => Plane::block_len(count),
            ShapeKind::Union => Union::block_len(count),
            ShapeKind::Intersection => Intersection::block_len(count),
            ShapeKind::Difference => Difference::block_len(count),
            ShapeKind::Transform => Transform::block_len(count),
            ShapeKind::Bounded => Bounded::block_len(count),
        }
    }

    /// Integer slots of the block holding relative child offsets, in
    /// declaration order. Each offset takes two slots starting there.
    pub fn child_slots(self, count: usize) -> impl Iterator<Item = usize> {
        let (first, n) = match self {
            ShapeKind::Sphere | ShapeKind::Cuboid | ShapeKind::Plane => (0, 0),
            ShapeKind::Union | ShapeKind::Intersection => (2, count),
            ShapeKind::Difference => (1, 2),
            ShapeKind::Transform | ShapeKind::Bounded => (1, 1),
        };
        (0..n).map(move |i| first + 2 * i)
    }
}

impl TryFrom<i32> for ShapeKind {
    type Error = i32;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        ShapeKind::from_tag(tag).ok_or(tag)
    }
}

/// Test `ray` against the shape whose block starts at `view`.
///
/// Unknown tags resolve to a miss.
#[inline]
pub fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
    match ShapeKind::from_tag(view.tag())? {
        ShapeKind::Sphere => Sphere::hit(ray, view),
        ShapeKind::Cuboid => Cuboid::hit(ray, view),
        ShapeKind::Plane => Plane::hit(ray, view),
        ShapeKind::Union => Union::hit(ray, view),
        ShapeKind::Intersection => Intersection::hit(ray, view),
        ShapeKind::Difference => Difference::hit(ray, view),
        ShapeKind::Transform => Transform::hit(ray, view),
        ShapeKind::Bounded => Bounded::hit(ray, view),
    }
}

/// Test `ray` against the block at `offset` relative to `view`.
#[inline]
pub fn hit_at(ray: &Ray, view: BufView<'_>, offset: Offset) -> Option<Hit> {
    hit(ray, view.child(offset))
}
