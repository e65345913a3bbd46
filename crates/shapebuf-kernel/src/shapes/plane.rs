//! Ray-half-space intersection (closed form).
//!
//! Block layout: `int = [tag]`, `float = [point xyz, normal xyz]`.
//!
//! The solid side is the one behind the normal. A ray that crosses the
//! plane is inside on one side of the crossing, so one end of the hit
//! interval is unbounded; unbounded ends report the plane normal.

use shapebuf_math::{Point3, Tolerance, Vec3};

use crate::{BufView, Hit, Offset, Pack, ParamBuffers, Ray, Shape, ShapeKind};

/// Half-space bounded by a plane through `point` with outward `normal`.
pub struct Plane;

/// Parameters of a half-space block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneParams {
    /// Any point on the plane.
    pub point: Point3,
    /// Outward normal; need not be unit length.
    pub normal: Vec3,
}

impl Plane {
    /// Append a half-space block.
    pub fn pack(buf: &mut ParamBuffers, point: Point3, normal: Vec3) -> Offset {
        Self::pack_params(buf, &PlaneParams { point, normal })
    }
}

impl Pack for Plane {
    type Params = PlaneParams;
    const INTS: usize = 1;
    const FLOATS: usize = 6;

    fn pack_params(buf: &mut ParamBuffers, params: &PlaneParams) -> Offset {
        let (p, n) = (params.point, params.normal);
        buf.push_block(&[Self::KIND.tag()], &[p.x, p.y, p.z, n.x, n.y, n.z])
    }

    fn unpack(view: BufView<'_>) -> PlaneParams {
        PlaneParams {
            point: view.point3(0),
            normal: view.vec3(3),
        }
    }
}

impl Shape for Plane {
    const KIND: ShapeKind = ShapeKind::Plane;

    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
        let PlaneParams { point, normal } = Self::unpack(view);
        let tol = Tolerance::DEFAULT;

        let len = normal.norm();
        if tol.is_zero(len) || tol.is_zero(ray.direction().norm_squared()) {
            return None;
        }
        let n = normal / len;

        // Signed distance of the origin, positive outside
        let dist = n.dot(&(ray.origin() - point));
        let denom = n.dot(&ray.direction());

        if tol.is_zero(denom) {
            return if dist > 0.0 {
                None
            } else {
                Hit::clipped(ray, f32::NEG_INFINITY, f32::INFINITY, n, n)
            };
        }

        let t = -dist / denom;
        if denom < 0.0 {
            // Heading into the solid side
            Hit::clipped(ray, t, f32::INFINITY, n, n)
        } else {
            Hit::clipped(ray, f32::NEG_INFINITY, t, n, n)
        }
    }
}
