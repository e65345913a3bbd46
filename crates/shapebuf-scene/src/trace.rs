//! Packed scenes and ray tracing over them.

use log::debug;
use rayon::prelude::*;
use shapebuf_kernel::gpu::{GpuHit, GpuRay};
use shapebuf_kernel::{dispatch, hit_into, BufView, Hit, Offset, ParamBuffers, Ray};

use crate::validate::{validate, LayoutStats};
use crate::{Limits, Result};

/// Parameter buffers together with the offset of the top-level shape.
///
/// Only shared borrows of the buffers exist once a scene is packed, so a
/// scene can be traced from any number of threads at once.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedScene {
    buffers: ParamBuffers,
    root: Offset,
}

impl PackedScene {
    /// Wrap buffers produced elsewhere, validating their layout first.
    pub fn from_parts(buffers: ParamBuffers, root: Offset, limits: &Limits) -> Result<(Self, LayoutStats)> {
        let stats = validate(&buffers, root, limits)?;
        Ok((Self { buffers, root }, stats))
    }

    pub(crate) fn new_unchecked(buffers: ParamBuffers, root: Offset) -> Self {
        Self { buffers, root }
    }

    /// The packed buffers.
    pub fn buffers(&self) -> &ParamBuffers {
        &self.buffers
    }

    /// Offset of the top-level shape.
    pub fn root(&self) -> Offset {
        self.root
    }

    /// View starting at the top-level shape.
    pub fn view(&self) -> BufView<'_> {
        self.buffers.view_at(self.root)
    }

    /// Trace one ray against the top-level shape.
    pub fn trace(&self, ray: &Ray) -> Option<Hit> {
        dispatch::hit(ray, self.view())
    }

    /// Trace one ray into caller-owned output slots; see [`hit_into`].
    pub fn trace_into(&self, ray: &Ray, out: &mut Hit) -> bool {
        hit_into(ray, self.view(), out)
    }

    /// Trace many rays in parallel, one task per ray.
    ///
    /// Results are returned in the order of `rays`.
    pub fn trace_batch(&self, rays: &[Ray]) -> Vec<Option<Hit>> {
        let hits: Vec<Option<Hit>> = rays.par_iter().map(|ray| self.trace(ray)).collect();
        debug!(
            "traced {} rays, {} hits",
            rays.len(),
            hits.iter().filter(|h| h.is_some()).count()
        );
        hits
    }

    /// Trace device-layout rays in parallel, producing device-layout hits.
    pub fn trace_gpu_batch(&self, rays: &[GpuRay]) -> Vec<GpuHit> {
        rays.par_iter()
            .map(|&ray| GpuHit::from(self.trace(&Ray::from(ray))))
            .collect()
    }
}
