//! Device-compatible views of rays, hits and parameter buffers.
//!
//! These `#[repr(C)]` Pod types mirror [`Ray`] and [`Hit`] with 16-byte
//! aligned vectors so they can be copied into storage buffers as-is.

use bytemuck::{Pod, Zeroable};
use shapebuf_math::{Point3, Vec3};

use crate::{Hit, ParamBuffers, Ray};

/// Device-compatible ray.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuRay {
    /// Origin xyz; `w` holds the range start.
    pub origin: [f32; 4],
    /// Direction xyz; `w` holds the range end.
    pub direction: [f32; 4],
}

impl From<&Ray> for GpuRay {
    fn from(ray: &Ray) -> Self {
        Self {
            origin: [ray.origin().x, ray.origin().y, ray.origin().z, ray.near()],
            direction: [ray.direction().x, ray.direction().y, ray.direction().z, ray.far()],
        }
    }
}

impl From<GpuRay> for Ray {
    fn from(gpu: GpuRay) -> Self {
        let [ox, oy, oz, near] = gpu.origin;
        let [dx, dy, dz, far] = gpu.direction;
        Ray::new(Point3::new(ox, oy, oz), Vec3::new(dx, dy, dz)).with_range(near, far)
    }
}

/// Device-compatible intersection result.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuHit {
    /// Entry normal xyz; `w` holds the entry distance.
    pub normal_enter: [f32; 4],
    /// Exit normal xyz; `w` holds the exit distance.
    pub normal_exit: [f32; 4],
    /// 1 for a hit, 0 for a miss. Other fields are zero on a miss.
    pub hit: u32,
    /// Padding.
    pub _pad: [u32; 3],
}

impl From<Option<Hit>> for GpuHit {
    fn from(hit: Option<Hit>) -> Self {
        match hit {
            Some(h) => Self {
                normal_enter: [h.normal.x, h.normal.y, h.normal.z, h.enter],
                normal_exit: [h.exit_normal.x, h.exit_normal.y, h.exit_normal.z, h.exit],
                hit: 1,
                _pad: [0; 3],
            },
            None => Self::zeroed(),
        }
    }
}

impl GpuHit {
    /// Convert back into the host result type.
    pub fn to_hit(&self) -> Option<Hit> {
        if self.hit == 0 {
            return None;
        }
        let [nx, ny, nz, enter] = self.normal_enter;
        let [ex, ey, ez, exit] = self.normal_exit;
        Some(Hit {
            enter,
            exit,
            normal: Vec3::new(nx, ny, nz),
            exit_normal: Vec3::new(ex, ey, ez),
        })
    }
}

impl ParamBuffers {
    /// Integer buffer as raw bytes for upload.
    pub fn int_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.ints())
    }

    /// Float buffer as raw bytes for upload.
    pub fn float_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.floats())
    }
}

/// Rays as raw bytes for upload.
pub fn ray_bytes(rays: &[GpuRay]) -> &[u8] {
    bytemuck::cast_slice(rays)
}
