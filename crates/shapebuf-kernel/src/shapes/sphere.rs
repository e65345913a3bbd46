//! Ray-sphere intersection (quadratic equation).
//!
//! Block layout: `int = [tag]`, `float = [cx, cy, cz, r]`.

use shapebuf_math::{Point3, Tolerance};

use crate::{BufView, Hit, Offset, Pack, ParamBuffers, Ray, Shape, ShapeKind};

/// Sphere given by center and radius.
pub struct Sphere;

/// Parameters of a sphere block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    /// Center of the sphere.
    pub center: Point3,
    /// Radius of the sphere.
    pub radius: f32,
}

impl Sphere {
    /// Append a sphere block.
    pub fn pack(buf: &mut ParamBuffers, center: Point3, radius: f32) -> Offset {
        Self::pack_params(buf, &SphereParams { center, radius })
    }
}

impl Pack for Sphere {
    type Params = SphereParams;
    const INTS: usize = 1;
    const FLOATS: usize = 4;

    fn pack_params(buf: &mut ParamBuffers, params: &SphereParams) -> Offset {
        let c = params.center;
        buf.push_block(&[Self::KIND.tag()], &[c.x, c.y, c.z, params.radius])
    }

    fn unpack(view: BufView<'_>) -> SphereParams {
        SphereParams {
            center: view.point3(0),
            radius: view.float(3),
        }
    }
}

impl Shape for Sphere {
    const KIND: ShapeKind = ShapeKind::Sphere;

    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
        let SphereParams { center, radius } = Self::unpack(view);
        if radius.is_nan() || radius <= 0.0 {
            return None;
        }

        let d = ray.direction();
        let a = d.dot(&d);
        if Tolerance::DEFAULT.is_zero(a) {
            return None;
        }

        // Quadratic |oc + t*d|^2 = r^2 with half b
        let oc = ray.origin() - center;
        let b = oc.dot(&d);
        let c = oc.dot(&oc) - radius * radius;
        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t0 = (-b - sqrt_disc) / a;
        let t1 = (-b + sqrt_disc) / a;

        let n0 = (ray.at(t0) - center) / radius;
        let n1 = (ray.at(t1) - center) / radius;
        Hit::clipped(ray, t0, t1, n0.normalize(), n1.normalize())
    }
}
