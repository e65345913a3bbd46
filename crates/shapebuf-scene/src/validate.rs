//! Layout validation for packed parameter buffers.
//!
//! The kernel trusts every block it reads. Validation walks the block tree
//! from a root offset once, before tracing, and checks that every tag is
//! known, every block fits in the buffers, every child offset points past
//! its parent's header, and that the limits hold.

use std::collections::HashMap;

use shapebuf_kernel::{Offset, ParamBuffers, ShapeKind};

use crate::{Limits, Result, SceneError};

/// Summary of a validated block tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutStats {
    /// Distinct blocks reachable from the root.
    pub blocks: usize,
    /// Deepest nesting level (a lone primitive has depth 1).
    pub depth: usize,
}

/// Validate the block tree rooted at `root`.
pub fn validate(buffers: &ParamBuffers, root: Offset, limits: &Limits) -> Result<LayoutStats> {
    let ints = buffers.ints().len();
    let floats = buffers.floats().len();
    if ints > limits.max_ints || floats > limits.max_floats {
        return Err(SceneError::BufferTooLarge {
            ints,
            floats,
            max_ints: limits.max_ints,
            max_floats: limits.max_floats,
        });
    }

    let mut walker = Walker {
        buffers,
        limits,
        heights: HashMap::new(),
    };
    let depth = walker.block(root, 1)?;
    Ok(LayoutStats {
        blocks: walker.heights.len(),
        depth,
    })
}

struct Walker<'a> {
    buffers: &'a ParamBuffers,
    limits: &'a Limits,
    /// Height of every block already checked, so shared blocks are walked once.
    heights: HashMap<Offset, usize>,
}

impl Walker<'_> {
    /// Check the block at `at`, reached at nesting level `depth`, and
    /// return the height of its subtree.
    fn block(&mut self, at: Offset, depth: usize) -> Result<usize> {
        let max_depth = self.limits.max_depth;
        if depth > max_depth {
            return Err(SceneError::DepthExceeded(max_depth));
        }
        if let Some(&height) = self.heights.get(&at) {
            if depth + height - 1 > max_depth {
                return Err(SceneError::DepthExceeded(max_depth));
            }
            return Ok(height);
        }

        let ints = self.buffers.ints();
        let floats = self.buffers.floats();

        let tag = *ints
            .get(at.int)
            .ok_or(SceneError::BlockOutOfBounds { kind: "block", at })?;
        let kind = ShapeKind::from_tag(tag).ok_or(SceneError::UnknownTag { tag, at: at.int })?;

        let count = if kind.is_variadic() {
            let stored = *ints
                .get(at.int + 1)
                .ok_or(SceneError::BlockOutOfBounds { kind: kind.name(), at })?;
            let count = usize::try_from(stored)
                .map_err(|_| SceneError::NegativeCount { count: stored, at: at.int })?;
            if count > self.limits.max_children {
                return Err(SceneError::TooManyChildren {
                    count,
                    max: self.limits.max_children,
                });
            }
            count
        } else {
            0
        };

        let len = kind.block_len(count);
        if at.int + len.int > ints.len() || at.float + len.float > floats.len() {
            return Err(SceneError::BlockOutOfBounds { kind: kind.name(), at });
        }

        let mut height = 1;
        for slot in kind.child_slots(count) {
            let di = ints[at.int + slot];
            let df = ints[at.int + slot + 1];
            let rel = match (usize::try_from(di), usize::try_from(df)) {
                (Ok(di), Ok(df)) if di >= len.int && df >= len.float => Offset::new(di, df),
                _ => return Err(SceneError::NonForwardOffset { kind: kind.name(), at }),
            };
            height = height.max(1 + self.block(at + rel, depth + 1)?);
        }

        self.heights.insert(at, height);
        Ok(height)
    }
}
