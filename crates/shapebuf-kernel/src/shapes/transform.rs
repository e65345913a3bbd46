//! Affine instances: a child shape tested in its own local frame.
//!
//! Block layout: `int = [tag, di, df]`,
//! `float = [inverse linear 3x3 row-major, inverse translation xyz]`.
//!
//! The incoming ray is mapped into the child's frame and the child is
//! tested with that substituted ray. The local direction is normalised,
//! so local distances are `s` times the caller's distances, where `s` is
//! the length of the mapped direction; results are divided by `s` before
//! returning.

use shapebuf_math::{unpack_affine, Mat3, Transform as AffineMap, Vec3, AFFINE_FLOATS};

use crate::dispatch::hit;
use crate::{BufView, Hit, Offset, Pack, ParamBuffers, Ray, Shape, ShapeKind};

/// Child shape placed by an affine map.
pub struct Transform;

/// Parameters of a transform block: the parent-to-child map and the child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    /// Linear part of the inverse map.
    pub linear: Mat3,
    /// Translation of the inverse map.
    pub translation: Vec3,
    /// Relative offset of the child block.
    pub child: Offset,
}

impl Transform {
    /// Append a transform header for `map` (child frame to parent frame).
    /// The child offset in slot 1 is filled in later.
    ///
    /// Returns `None` if `map` is singular.
    pub fn pack(buf: &mut ParamBuffers, map: &AffineMap) -> Option<Offset> {
        let packed = map.pack_inverse()?;
        let (linear, translation) = unpack_affine(&packed);
        let params = TransformParams {
            linear,
            translation,
            child: Offset::ZERO,
        };
        Some(Self::pack_params(buf, &params))
    }
}

impl Pack for Transform {
    type Params = TransformParams;
    const INTS: usize = 3;
    const FLOATS: usize = AFFINE_FLOATS;

    fn pack_params(buf: &mut ParamBuffers, params: &TransformParams) -> Offset {
        let mut floats = [0.0f32; AFFINE_FLOATS];
        for row in 0..3 {
            for col in 0..3 {
                floats[row * 3 + col] = params.linear[(row, col)];
            }
        }
        floats[9..].copy_from_slice(params.translation.as_slice());
        let [di, df] = params.child.to_slots();
        buf.push_block(&[Self::KIND.tag(), di, df], &floats)
    }

    fn unpack(view: BufView<'_>) -> TransformParams {
        let (linear, translation) = unpack_affine(view.floats(0, AFFINE_FLOATS));
        TransformParams {
            linear,
            translation,
            child: view.offset_at(1),
        }
    }
}

impl Shape for Transform {
    const KIND: ShapeKind = ShapeKind::Transform;

    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
        let TransformParams {
            linear,
            translation,
            child,
        } = Self::unpack(view);

        let (local, scale) = ray.transformed(&linear, &translation)?;
        let inner = hit(&local, view.child(child))?;

        // Normals go back through the transpose of the inverse linear part
        let back = linear.transpose();
        let enter = (inner.enter / scale).max(ray.near());
        let exit = (inner.exit / scale).min(ray.far());
        if enter > exit {
            return None;
        }
        Some(Hit {
            enter,
            exit,
            normal: (back * inner.normal).normalize(),
            exit_normal: (back * inner.exit_normal).normalize(),
        })
    }
}
