//! Packing a scene description into parameter buffers.
//!
//! Nodes are packed depth first: a composite's header goes in before its
//! children, and each child offset is linked into the header once the
//! child has been packed, so children always follow their parent.

use log::{debug, trace};
use shapebuf_ir::{Node, NodeId, SceneDoc, ShapeOp, Vec3 as IrVec3};
use shapebuf_kernel::shapes::{Bounded, Cuboid, Difference, Intersection, Plane, Sphere, Transform, Union, MAX_CHILDREN};
use shapebuf_kernel::{Offset, ParamBuffers, ShapeKind};
use shapebuf_math::{Point3, Transform as AffineMap, Vec3};

use crate::validate::validate;
use crate::{Limits, PackedScene, Result, SceneError};

/// Pack the document's root node into a validated scene.
pub fn build(doc: &SceneDoc, limits: &Limits) -> Result<PackedScene> {
    let root = doc.root.ok_or(SceneError::NoRoot)?;
    build_node(doc, root, limits)
}

/// Pack the node `root` of `doc` into a validated scene.
pub fn build_node(doc: &SceneDoc, root: NodeId, limits: &Limits) -> Result<PackedScene> {
    limits.check()?;
    let mut builder = SceneBuilder {
        doc,
        limits,
        buffers: ParamBuffers::new(),
        path: Vec::new(),
    };
    let offset = builder.pack(root, 1)?;
    let buffers = builder.buffers;

    let stats = validate(&buffers, offset, limits)?;
    debug!(
        "packed scene: {} ints, {} floats, {} blocks, depth {}",
        buffers.ints().len(),
        buffers.floats().len(),
        stats.blocks,
        stats.depth
    );
    Ok(PackedScene::new_unchecked(buffers, offset))
}

/// Build a scene straight from JSON text.
pub fn build_json(json: &str, limits: &Limits) -> Result<PackedScene> {
    let doc = SceneDoc::from_json(json)?;
    build(&doc, limits)
}

struct SceneBuilder<'a> {
    doc: &'a SceneDoc,
    limits: &'a Limits,
    buffers: ParamBuffers,
    /// Nodes on the way from the root to the one being packed.
    path: Vec<NodeId>,
}

impl SceneBuilder<'_> {
    fn pack(&mut self, id: NodeId, depth: usize) -> Result<Offset> {
        if depth > self.limits.max_depth {
            return Err(SceneError::DepthExceeded(self.limits.max_depth));
        }
        if self.path.contains(&id) {
            return Err(SceneError::Cycle(id));
        }
        let node = self.doc.nodes.get(&id).ok_or(SceneError::MissingNode(id))?;

        self.path.push(id);
        let at = self.pack_op(node, depth)?;
        self.path.pop();

        self.check_size()?;
        trace!("node {} ({:?}) packed at {:?}", id, node.name, at);
        Ok(at)
    }

    fn pack_op(&mut self, node: &Node, depth: usize) -> Result<Offset> {
        let id = node.id;
        match &node.op {
            ShapeOp::Sphere { center, radius } => {
                let radius = *radius as f32;
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(invalid(id, "radius must be positive and finite"));
                }
                Ok(Sphere::pack(&mut self.buffers, point(id, center)?, radius))
            }
            ShapeOp::Cuboid { min, max } => {
                let (min, max) = corners(id, min, max)?;
                Ok(Cuboid::pack(&mut self.buffers, min, max))
            }
            ShapeOp::Plane { point: p, normal } => {
                let normal = vector(id, normal)?;
                if normal.norm() == 0.0 {
                    return Err(invalid(id, "plane normal is zero"));
                }
                Ok(Plane::pack(&mut self.buffers, point(id, p)?, normal.normalize()))
            }
            ShapeOp::Union { children } => {
                self.check_children(id, ShapeKind::Union, children.len())?;
                let at = Union::pack(&mut self.buffers, children.len()).ok_or_else(|| too_many(children.len()))?;
                self.link_all(ShapeKind::Union, at, children, depth)?;
                Ok(at)
            }
            ShapeOp::Intersection { children } => {
                self.check_children(id, ShapeKind::Intersection, children.len())?;
                let at = Intersection::pack(&mut self.buffers, children.len()).ok_or_else(|| too_many(children.len()))?;
                self.link_all(ShapeKind::Intersection, at, children, depth)?;
                Ok(at)
            }
            ShapeOp::Difference { left, right } => {
                let at = Difference::pack(&mut self.buffers);
                self.link_all(ShapeKind::Difference, at, &[*left, *right], depth)?;
                Ok(at)
            }
            ShapeOp::Translate { child, offset } => {
                let v = vector(id, offset)?;
                self.pack_transform(id, AffineMap::translation(v.x, v.y, v.z), *child, depth)
            }
            ShapeOp::Rotate { child, angles } => {
                let a = vector(id, angles)?;
                let map = AffineMap::rotation_xyz(a.x.to_radians(), a.y.to_radians(), a.z.to_radians());
                self.pack_transform(id, map, *child, depth)
            }
            ShapeOp::Scale { child, factor } => {
                let f = vector(id, factor)?;
                self.pack_transform(id, AffineMap::scale(f.x, f.y, f.z), *child, depth)
            }
            ShapeOp::Bounded { child, min, max } => {
                let (min, max) = corners(id, min, max)?;
                let at = Bounded::pack(&mut self.buffers, min, max);
                self.link_all(ShapeKind::Bounded, at, &[*child], depth)?;
                Ok(at)
            }
        }
    }

    fn pack_transform(&mut self, id: NodeId, map: AffineMap, child: NodeId, depth: usize) -> Result<Offset> {
        let at = Transform::pack(&mut self.buffers, &map).ok_or(SceneError::SingularTransform(id))?;
        self.link_all(ShapeKind::Transform, at, &[child], depth)?;
        Ok(at)
    }

    fn check_children(&self, id: NodeId, kind: ShapeKind, count: usize) -> Result<()> {
        if count == 0 {
            return Err(SceneError::EmptyComposite { id, kind: kind.name() });
        }
        if count > self.limits.max_children {
            return Err(SceneError::TooManyChildren {
                count,
                max: self.limits.max_children,
            });
        }
        Ok(())
    }

    /// Pack each child after the header at `at` and store its offset.
    fn link_all(&mut self, kind: ShapeKind, at: Offset, children: &[NodeId], depth: usize) -> Result<()> {
        for (slot, &child) in kind.child_slots(children.len()).zip(children) {
            let child_at = self.pack(child, depth + 1)?;
            self.buffers
                .link_child(at, slot, child_at)
                .ok_or(SceneError::NonForwardOffset { kind: kind.name(), at })?;
        }
        Ok(())
    }

    fn check_size(&self) -> Result<()> {
        let end = self.buffers.end();
        if end.int > self.limits.max_ints || end.float > self.limits.max_floats {
            return Err(SceneError::BufferTooLarge {
                ints: end.int,
                floats: end.float,
                max_ints: self.limits.max_ints,
                max_floats: self.limits.max_floats,
            });
        }
        Ok(())
    }
}

fn too_many(count: usize) -> SceneError {
    SceneError::TooManyChildren {
        count,
        max: MAX_CHILDREN,
    }
}

fn invalid(id: NodeId, reason: &str) -> SceneError {
    SceneError::InvalidParameter {
        id,
        reason: reason.to_string(),
    }
}

fn vector(id: NodeId, v: &IrVec3) -> Result<Vec3> {
    let out = Vec3::new(v.x as f32, v.y as f32, v.z as f32);
    if out.iter().all(|c| c.is_finite()) {
        Ok(out)
    } else {
        Err(invalid(id, "coordinates must be finite"))
    }
}

fn point(id: NodeId, v: &IrVec3) -> Result<Point3> {
    vector(id, v).map(Point3::from)
}

fn corners(id: NodeId, min: &IrVec3, max: &IrVec3) -> Result<(Point3, Point3)> {
    let (min, max) = (point(id, min)?, point(id, max)?);
    if (0..3).any(|axis| min[axis] >= max[axis]) {
        return Err(invalid(id, "min corner must be below max corner on every axis"));
    }
    Ok((min, max))
}
