#![warn(missing_docs)]

//! Ray intersection over shapes packed in flat parameter buffers.
//!
//! Shapes live as tagged blocks in a pair of integer and float buffers.
//! Composite shapes refer to their children by relative offsets, so any
//! subtree can be traced on its own or moved elsewhere in the buffers
//! without being repacked.
//!
//! # Example
//!
//! ```
//! use shapebuf::prelude::*;
//!
//! let mut doc = SceneDoc::new();
//! let a = doc.add(1, None, ShapeOp::Sphere { center: IrVec3::new(-3.0, 0.0, 0.0), radius: 1.0 });
//! let b = doc.add(2, None, ShapeOp::Sphere { center: IrVec3::new(3.0, 0.0, 0.0), radius: 1.0 });
//! doc.root = Some(doc.add(3, Some("pair"), ShapeOp::Union { children: vec![a, b] }));
//!
//! let scene = build(&doc, &Limits::default()).unwrap();
//! let hit = scene.trace(&Ray::new(Point3::new(3.0, 0.0, -10.0), Vec3::z())).unwrap();
//! assert!((hit.enter - 9.0).abs() < 1e-5);
//! ```

pub use shapebuf_ir;
pub use shapebuf_kernel;
pub use shapebuf_math;
pub use shapebuf_scene;

pub use shapebuf_kernel::{dispatch, hit_into, BufView, Hit, Offset, Pack, ParamBuffers, Ray, Shape, ShapeKind};
pub use shapebuf_scene::{build, build_json, build_node, Limits, PackedScene, SceneError};

/// Commonly used items.
pub mod prelude {
    pub use shapebuf_ir::{NodeId, SceneDoc, ShapeOp, Vec3 as IrVec3};
    pub use shapebuf_kernel::shapes::{Bounded, Cuboid, Difference, Intersection, Plane, Sphere, Transform, Union};
    pub use shapebuf_kernel::{dispatch, hit_into, BufView, Hit, Offset, Pack, ParamBuffers, Ray, Shape, ShapeKind};
    pub use shapebuf_math::{Point3, Transform as AffineMap, Vec3};
    pub use shapebuf_scene::{build, build_json, build_node, Limits, PackedScene, SceneError};
}
