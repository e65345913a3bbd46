//! Ray representation and the ray-box slab test.

use shapebuf_math::{Mat3, Point3, Tolerance, Vec3};

/// A ray in 3D space with a valid parametric range `[near, far]`.
///
/// The direction is not required to be unit length; parametric distances
/// are always measured in multiples of `direction`. Rays are immutable:
/// a substituted ray (for example one moved into a shape's local frame)
/// is a new value built with [`Ray::new`] and [`Ray::with_range`].
///
/// ```compile_fail
/// use shapebuf_kernel::Ray;
/// use shapebuf_math::{Point3, Vec3};
///
/// let mut ray = Ray::new(Point3::origin(), Vec3::z());
/// ray.direction = Vec3::x();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Point3,
    direction: Vec3,
    near: f32,
    far: f32,
    /// Precomputed reciprocal of direction components for slab tests.
    inv_direction: Vec3,
    /// Sign of direction components (0 if positive, 1 if negative).
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray valid over `[0, +inf]`.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        let inv = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let sign = [
            if inv.x < 0.0 { 1 } else { 0 },
            if inv.y < 0.0 { 1 } else { 0 },
            if inv.z < 0.0 { 1 } else { 0 },
        ];
        Self {
            origin,
            direction,
            near: 0.0,
            far: f32::INFINITY,
            inv_direction: inv,
            sign,
        }
    }

    /// Origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Lower bound of the valid parametric range.
    #[inline]
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Upper bound of the valid parametric range.
    #[inline]
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Copy of this ray restricted to `[near, far]`.
    pub fn with_range(self, near: f32, far: f32) -> Self {
        Self { near, far, ..self }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + t * self.direction
    }

    /// Whether `t` lies inside the valid range.
    #[inline]
    pub fn contains(&self, t: f32) -> bool {
        t >= self.near && t <= self.far
    }

    /// Map the ray through `linear * p + translation` into another frame.
    ///
    /// The mapped direction is normalised. Returns the new ray together
    /// with the length `s` of the mapped direction: distances along the new
    /// ray are `s` times distances along this one, and the range is scaled
    /// to match. Returns `None` if the map collapses the direction.
    pub fn transformed(&self, linear: &Mat3, translation: &Vec3) -> Option<(Ray, f32)> {
        let direction = linear * self.direction;
        let scale = direction.norm();
        if Tolerance::DEFAULT.is_zero(scale) {
            return None;
        }
        let origin = Point3::from(linear * self.origin.coords + translation);
        let ray = Ray::new(origin, direction / scale).with_range(self.near * scale, self.far * scale);
        Some((ray, scale))
    }

    /// Test the ray against an axis-aligned box using the slab method.
    ///
    /// Returns the overlap of the box interval with `[near, far]`, or
    /// `None` if they do not overlap. Components where the origin lies
    /// exactly on a slab of a parallel axis produce NaN and are skipped,
    /// which keeps the test conservative.
    #[inline]
    pub fn intersect_aabb(&self, min: &Point3, max: &Point3) -> Option<(f32, f32)> {
        let bounds = [min, max];

        let tx1 = (bounds[self.sign[0]].x - self.origin.x) * self.inv_direction.x;
        let tx2 = (bounds[1 - self.sign[0]].x - self.origin.x) * self.inv_direction.x;

        let mut t_min = tx1;
        let mut t_max = tx2;

        let ty1 = (bounds[self.sign[1]].y - self.origin.y) * self.inv_direction.y;
        let ty2 = (bounds[1 - self.sign[1]].y - self.origin.y) * self.inv_direction.y;

        t_min = t_min.max(ty1);
        t_max = t_max.min(ty2);

        let tz1 = (bounds[self.sign[2]].z - self.origin.z) * self.inv_direction.z;
        let tz2 = (bounds[1 - self.sign[2]].z - self.origin.z) * self.inv_direction.z;

        t_min = t_min.max(tz1).max(self.near);
        t_max = t_max.min(tz2).min(self.far);

        if t_max >= t_min {
            Some((t_min, t_max))
        } else {
            None
        }
    }
}
