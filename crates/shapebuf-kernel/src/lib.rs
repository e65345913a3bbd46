#![warn(missing_docs)]

//! Flat-buffer shape intersection kernel.
//!
//! Shapes are not objects. A scene is two flat buffers of packed
//! parameters, one `i32` and one `f32`, and a shape is the block that
//! starts at a given [`Offset`] pair. Every kind implements the same
//! contract, [`Shape::hit`], and [`dispatch::hit`] picks the
//! implementation from the tag in the block's first integer slot.
//!
//! # Architecture
//!
//! - [`Ray`] - origin, direction and valid parametric range
//! - [`ParamBuffers`] / [`BufView`] / [`Offset`] - buffers and relative addressing
//! - [`Hit`] / [`Shape`] / [`Pack`] - the intersection contract and block layouts
//! - [`dispatch`] - tag lookup and the two ways composites call children
//! - [`shapes`] - primitives, boolean composites, transforms and bounds
//! - [`gpu`] - Pod views for device upload
//!
//! # Example
//!
//! ```
//! use shapebuf_kernel::{dispatch, shapes::Sphere, ParamBuffers, Ray};
//! use shapebuf_math::{Point3, Vec3};
//!
//! let mut buf = ParamBuffers::new();
//! let sphere = Sphere::pack(&mut buf, Point3::origin(), 1.0);
//!
//! let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::z());
//! let hit = dispatch::hit(&ray, buf.view_at(sphere)).unwrap();
//! assert_eq!((hit.enter, hit.exit), (4.0, 6.0));
//! ```

mod buffer;
mod contract;
mod ray;
pub mod dispatch;
pub mod gpu;
pub mod shapes;

pub use buffer::{BufView, Offset, ParamBuffers};
pub use contract::{hit_into, Hit, Pack, Shape};
pub use dispatch::ShapeKind;
pub use ray::Ray;
