//! Bounding box node: skip a child unless the ray touches its box.
//!
//! Block layout: `int = [tag, di, df]`, `float = [min xyz, max xyz]`.

use shapebuf_math::Point3;

use super::cuboid::Aabb;
use crate::dispatch::hit;
use crate::{BufView, Hit, Offset, Pack, ParamBuffers, Ray, Shape, ShapeKind};

/// Child shape guarded by an axis-aligned bounding box.
pub struct Bounded;

/// Parameters of a bounded block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedParams {
    /// The guarding box.
    pub bounds: Aabb,
    /// Relative offset of the child block.
    pub child: Offset,
}

impl Bounded {
    /// Append a bounded header. The child offset in slot 1 is filled in later.
    pub fn pack(buf: &mut ParamBuffers, min: Point3, max: Point3) -> Offset {
        let params = BoundedParams {
            bounds: Aabb { min, max },
            child: Offset::ZERO,
        };
        Self::pack_params(buf, &params)
    }
}

impl Pack for Bounded {
    type Params = BoundedParams;
    const INTS: usize = 3;
    const FLOATS: usize = 6;

    fn pack_params(buf: &mut ParamBuffers, params: &BoundedParams) -> Offset {
        let [di, df] = params.child.to_slots();
        buf.push_block(&[Self::KIND.tag(), di, df], &params.bounds.to_floats())
    }

    fn unpack(view: BufView<'_>) -> BoundedParams {
        BoundedParams {
            bounds: Aabb::read(view),
            child: view.offset_at(1),
        }
    }
}

impl Shape for Bounded {
    const KIND: ShapeKind = ShapeKind::Bounded;

    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
        let BoundedParams { bounds, child } = Self::unpack(view);
        ray.intersect_aabb(&bounds.min, &bounds.max)?;
        hit(ray, view.child(child))
    }
}
