//! Ray-box intersection (slab method with face normals).
//!
//! Block layout: `int = [tag]`, `float = [min xyz, max xyz]`.

use shapebuf_math::{Point3, Tolerance, Vec3};

use super::axis_normal;
use crate::{BufView, Hit, Offset, Pack, ParamBuffers, Ray, Shape, ShapeKind};

/// Axis-aligned box given by its min and max corners.
pub struct Cuboid;

/// Corners of an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    pub(crate) fn to_floats(self) -> [f32; 6] {
        let (a, b) = (self.min, self.max);
        [a.x, a.y, a.z, b.x, b.y, b.z]
    }

    pub(crate) fn read(view: BufView<'_>) -> Self {
        Self {
            min: view.point3(0),
            max: view.point3(3),
        }
    }
}

impl Cuboid {
    /// Append a box block.
    pub fn pack(buf: &mut ParamBuffers, min: Point3, max: Point3) -> Offset {
        Self::pack_params(buf, &Aabb { min, max })
    }
}

impl Pack for Cuboid {
    type Params = Aabb;
    const INTS: usize = 1;
    const FLOATS: usize = 6;

    fn pack_params(buf: &mut ParamBuffers, params: &Aabb) -> Offset {
        buf.push_block(&[Self::KIND.tag()], &params.to_floats())
    }

    fn unpack(view: BufView<'_>) -> Aabb {
        Aabb::read(view)
    }
}

impl Shape for Cuboid {
    const KIND: ShapeKind = ShapeKind::Cuboid;

    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
        let Aabb { min, max } = Self::unpack(view);
        let tol = Tolerance::DEFAULT;

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut n_enter = Vec3::zeros();
        let mut n_exit = Vec3::zeros();
        let mut crossed = false;

        for axis in 0..3 {
            // Zero-extent boxes have no interior
            let extent = max[axis] - min[axis];
            if extent.is_nan() || extent <= 0.0 {
                return None;
            }

            let o = ray.origin()[axis];
            let d = ray.direction()[axis];
            if tol.is_zero(d) {
                // Parallel to this slab: inside it for every t, or never
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }

            crossed = true;
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((min[axis] - o) * inv, (max[axis] - o) * inv);
            let sign = if d > 0.0 { -1.0 } else { 1.0 };
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                n_enter = axis_normal(axis, sign);
            }
            if t1 < t_exit {
                t_exit = t1;
                n_exit = axis_normal(axis, -sign);
            }
        }

        if !crossed || t_enter > t_exit {
            return None;
        }
        Hit::clipped(ray, t_enter, t_exit, n_enter, n_exit)
    }
}
