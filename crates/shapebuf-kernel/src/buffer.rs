//! Parameter buffers and offset addressing.
//!
//! Every shape in a scene is described by a *parameter block*: a run of
//! `i32` slots in the integer buffer and a run of `f32` slots in the float
//! buffer. Blocks are addressed by an [`Offset`] pair, never by reference,
//! and composites locate their children by adding a stored relative offset
//! to their own position. A [`BufView`] is "the buffers starting at this
//! block", so a shape only ever sees indices relative to itself.

use std::ops::Add;

use shapebuf_math::{Point3, Vec3};

/// Position of a parameter block: start index into the integer buffer and
/// start index into the float buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset {
    /// Index into the integer buffer.
    pub int: usize,
    /// Index into the float buffer.
    pub float: usize,
}

impl Offset {
    /// The start of both buffers.
    pub const ZERO: Self = Self { int: 0, float: 0 };

    /// Create a new offset pair.
    pub const fn new(int: usize, float: usize) -> Self {
        Self { int, float }
    }

    /// Offset of `self` relative to `base`.
    ///
    /// Returns `None` if `self` lies before `base` in either buffer; such
    /// an offset cannot be stored in a parent block.
    pub fn relative_to(self, base: Offset) -> Option<Offset> {
        Some(Offset {
            int: self.int.checked_sub(base.int)?,
            float: self.float.checked_sub(base.float)?,
        })
    }

    /// The two integer slots a parent block stores this offset in.
    #[inline]
    pub fn to_slots(self) -> [i32; 2] {
        [self.int as i32, self.float as i32]
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset {
            int: self.int + rhs.int,
            float: self.float + rhs.float,
        }
    }
}

/// Owned integer and float parameter buffers for one scene.
///
/// Buffers only grow while a scene is being built. Once tracing starts
/// they are shared behind `&ParamBuffers` and never written again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBuffers {
    ints: Vec<i32>,
    floats: Vec<f32>,
}

impl ParamBuffers {
    /// Create empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing buffer contents, e.g. ones produced by another builder.
    pub fn from_parts(ints: Vec<i32>, floats: Vec<f32>) -> Self {
        Self { ints, floats }
    }

    /// Current end of both buffers, i.e. where the next block will start.
    pub fn end(&self) -> Offset {
        Offset::new(self.ints.len(), self.floats.len())
    }

    /// Whether both buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.ints.is_empty() && self.floats.is_empty()
    }

    /// Append a parameter block and return its offset.
    pub fn push_block(&mut self, ints: &[i32], floats: &[f32]) -> Offset {
        let at = self.end();
        self.ints.extend_from_slice(ints);
        self.floats.extend_from_slice(floats);
        at
    }

    /// Store the position of `child` in the parent block at `parent`.
    ///
    /// The two integer slots `slot` and `slot + 1` of the parent block
    /// receive the child offset relative to the parent. Returns `None`
    /// (and writes nothing) if the child does not lie after the parent or
    /// the slots fall outside the buffer.
    pub fn link_child(&mut self, parent: Offset, slot: usize, child: Offset) -> Option<()> {
        let rel = child.relative_to(parent)?;
        let di = i32::try_from(rel.int).ok()?;
        let df = i32::try_from(rel.float).ok()?;
        let at = parent.int + slot;
        if at + 1 >= self.ints.len() {
            return None;
        }
        self.ints[at] = di;
        self.ints[at + 1] = df;
        Some(())
    }

    /// The integer buffer.
    pub fn ints(&self) -> &[i32] {
        &self.ints
    }

    /// The float buffer.
    pub fn floats(&self) -> &[f32] {
        &self.floats
    }

    /// View of the whole buffers, starting at [`Offset::ZERO`].
    pub fn view(&self) -> BufView<'_> {
        BufView::new(&self.ints, &self.floats)
    }

    /// View starting at the block at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` lies past the end of either buffer.
    pub fn view_at(&self, offset: Offset) -> BufView<'_> {
        self.view().child(offset)
    }
}

/// Read-only view of the parameter buffers starting at one block.
///
/// Views are plain pairs of slices: cheap to copy, with no identity of
/// their own. Reading past the end of a buffer is a scene construction
/// defect and panics.
#[derive(Debug, Clone, Copy)]
pub struct BufView<'a> {
    ints: &'a [i32],
    floats: &'a [f32],
}

impl<'a> BufView<'a> {
    /// Create a view over the given slices.
    pub fn new(ints: &'a [i32], floats: &'a [f32]) -> Self {
        Self { ints, floats }
    }

    /// View of the block at `offset`, relative to this view's start.
    #[inline]
    pub fn child(&self, offset: Offset) -> BufView<'a> {
        BufView {
            ints: &self.ints[offset.int..],
            floats: &self.floats[offset.float..],
        }
    }

    /// Type tag of the block (integer slot 0).
    #[inline]
    pub fn tag(&self) -> i32 {
        self.ints[0]
    }

    /// Integer slot `i` read as a count or index.
    ///
    /// Negative values map to zero.
    #[inline]
    pub fn count(&self, i: usize) -> usize {
        usize::try_from(self.ints[i]).unwrap_or(0)
    }

    /// Relative child offset stored in integer slots `i` and `i + 1`.
    #[inline]
    pub fn offset_at(&self, i: usize) -> Offset {
        Offset::new(self.count(i), self.count(i + 1))
    }

    /// Float slot `i`.
    #[inline]
    pub fn float(&self, i: usize) -> f32 {
        self.floats[i]
    }

    /// `len` float slots starting at `i`.
    #[inline]
    pub fn floats(&self, i: usize, len: usize) -> &'a [f32] {
        &self.floats[i..i + len]
    }

    /// Three float slots starting at `i`, as a vector.
    #[inline]
    pub fn vec3(&self, i: usize) -> Vec3 {
        Vec3::new(self.floats[i], self.floats[i + 1], self.floats[i + 2])
    }

    /// Three float slots starting at `i`, as a point.
    #[inline]
    pub fn point3(&self, i: usize) -> Point3 {
        Point3::from(self.vec3(i))
    }
}
