//! The intersection contract shared by every shape kind.
//!
//! A shape test receives a ray and a [`BufView`] that begins exactly at the
//! shape's parameter block, and answers with an optional [`Hit`]. The test
//! is a pure function of its inputs: it never writes to the buffers and
//! never allocates. There is no error channel; a malformed block is a
//! scene construction defect and a test must still settle on hit or miss.

use std::cmp::Ordering;

use shapebuf_math::Vec3;

use crate::{BufView, Offset, ParamBuffers, Ray, ShapeKind};

/// Result of a successful intersection test.
///
/// `enter <= exit`, and both lie inside the tested ray's `[near, far]`
/// range. Distances are in units of the tested ray's direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Parametric distance where the ray enters the shape.
    pub enter: f32,
    /// Parametric distance where the ray leaves the shape.
    pub exit: f32,
    /// Outward unit normal at the entry surface.
    pub normal: Vec3,
    /// Outward unit normal at the exit surface.
    pub exit_normal: Vec3,
}

impl Hit {
    /// Build a hit from a geometric interval, clipped to the ray's range.
    ///
    /// Normals are those of the geometric entry and exit surfaces even if
    /// clipping moved the distances. Returns `None` if the clipped interval
    /// is empty or NaN.
    #[inline]
    pub fn clipped(ray: &Ray, enter: f32, exit: f32, normal: Vec3, exit_normal: Vec3) -> Option<Self> {
        if enter.is_nan() || exit.is_nan() {
            return None;
        }
        let enter = enter.max(ray.near());
        let exit = exit.min(ray.far());
        if enter <= exit {
            Some(Self {
                enter,
                exit,
                normal,
                exit_normal,
            })
        } else {
            None
        }
    }

    /// Total order on every field: entry first, then exit, then normals.
    ///
    /// Composites use this to pick between children so the result never
    /// depends on the order children were declared in.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.enter
            .total_cmp(&other.enter)
            .then(self.exit.total_cmp(&other.exit))
            .then_with(|| cmp_vec(&self.normal, &other.normal))
            .then_with(|| cmp_vec(&self.exit_normal, &other.exit_normal))
    }
}

pub(crate) fn cmp_vec(a: &Vec3, b: &Vec3) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.z.total_cmp(&b.z))
}

/// A shape kind that can be tested through the contract.
///
/// Implementors are zero-sized markers: the shape's data lives in the
/// parameter buffers, not in `self`.
pub trait Shape {
    /// Tag stored in integer slot 0 of this kind's blocks.
    const KIND: ShapeKind;

    /// Test `ray` against the block at the start of `view`.
    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit>;
}

/// Block layout of a shape kind, with typed access to its parameters.
///
/// `pack_params` and `unpack` are inverses: a block written from some
/// parameters reads back as the same parameters. Child offsets in the
/// parameters are relative to the block, as stored.
pub trait Pack: Shape {
    /// Parameters held in one block.
    type Params;

    /// Integer slots, tag included, before any per-child offsets.
    const INTS: usize;

    /// Float slots.
    const FLOATS: usize;

    /// Append a block holding `params`.
    fn pack_params(buf: &mut ParamBuffers, params: &Self::Params) -> Offset;

    /// Read the block at the start of `view`.
    fn unpack(view: BufView<'_>) -> Self::Params;

    /// Size of one block declaring `count` children.
    ///
    /// `count` only matters for variadic kinds.
    fn block_len(count: usize) -> Offset {
        let children = if Self::KIND.is_variadic() { 2 * count } else { 0 };
        Offset::new(Self::INTS + children, Self::FLOATS)
    }
}

/// Kernel-style form of the contract: output slots plus a hit flag.
///
/// On a hit `out` is overwritten and `true` returned. On a miss `out` is
/// left as it was and must not be read as a result.
#[inline]
pub fn hit_into(ray: &Ray, view: BufView<'_>, out: &mut Hit) -> bool {
    match crate::dispatch::hit(ray, view) {
        Some(hit) => {
            *out = hit;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapebuf_math::Point3;

    fn ray() -> Ray {
        Ray::new(Point3::origin(), Vec3::z()).with_range(1.0, 5.0)
    }

    #[test]
    fn test_clipped_inside_range() {
        let hit = Hit::clipped(&ray(), 2.0, 3.0, -Vec3::z(), Vec3::z()).unwrap();
        assert_eq!(hit.enter, 2.0);
        assert_eq!(hit.exit, 3.0);
    }

    #[test]
    fn test_clipped_to_range() {
        let hit = Hit::clipped(&ray(), -2.0, 9.0, -Vec3::z(), Vec3::z()).unwrap();
        assert_eq!(hit.enter, 1.0);
        assert_eq!(hit.exit, 5.0);
        assert_eq!(hit.normal, -Vec3::z());
    }

    #[test]
    fn test_clipped_outside_range() {
        assert!(Hit::clipped(&ray(), 6.0, 9.0, Vec3::z(), Vec3::z()).is_none());
        assert!(Hit::clipped(&ray(), -3.0, 0.5, Vec3::z(), Vec3::z()).is_none());
        assert!(Hit::clipped(&ray(), f32::NAN, 3.0, Vec3::z(), Vec3::z()).is_none());
    }

    #[test]
    fn test_clipped_degenerate_interval() {
        let hit = Hit::clipped(&ray(), 2.0, 2.0, Vec3::x(), Vec3::x()).unwrap();
        assert_eq!(hit.enter, hit.exit);
    }

    #[test]
    fn test_total_cmp() {
        let a = Hit::clipped(&ray(), 2.0, 3.0, Vec3::x(), Vec3::x()).unwrap();
        let b = Hit::clipped(&ray(), 2.0, 4.0, Vec3::x(), Vec3::x()).unwrap();
        let c = Hit::clipped(&ray(), 2.0, 3.0, Vec3::y(), Vec3::x()).unwrap();
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(c.total_cmp(&a), Ordering::Less);
        assert_eq!(a.total_cmp(&a), Ordering::Equal);
    }
}
