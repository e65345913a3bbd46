//! Boolean composites: union, intersection and difference.
//!
//! Block layouts (child offsets are relative to the composite's block):
//!
//! - union / intersection: `int = [tag, n, di_0, df_0, .., di_n-1, df_n-1]`
//! - difference: `int = [tag, di_a, df_a, di_b, df_b]`
//!
//! None of them use the float buffer. A child answers with its first
//! interval inside the ray's range. When a combination needs a child's
//! next interval, the child is tested again with the same ray restricted
//! to start just past the previous one. Each combination reports the
//! nearest interval of the combined set and only depends on the set of
//! child intervals, never on declaration order.

use std::cmp::Ordering;

use crate::contract::cmp_vec;
use crate::dispatch::hit_at;
use crate::{BufView, Hit, Offset, Pack, ParamBuffers, Ray, Shape, ShapeKind};

/// Most children a union or intersection block may declare.
///
/// Child hits are gathered on the stack, so the count is bounded. The
/// kernel ignores stored children past this limit; `pack` refuses them.
pub const MAX_CHILDREN: usize = 16;

/// Most interval steps a composite takes along one ray.
///
/// An intersection or difference that has not settled after this many
/// steps reports a miss; a union stops growing its interval.
pub const MAX_SPANS: usize = 64;

/// Relative step past a finished interval before asking for the next one.
const SPAN_GAP: f32 = 1e-5;

/// Boolean union of N children.
pub struct Union;

/// Boolean intersection of N children.
pub struct Intersection;

/// Boolean difference of two children: first minus second.
pub struct Difference;

/// Relative child offsets of a union or intersection block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Children {
    offsets: [Offset; MAX_CHILDREN],
    len: usize,
}

impl Children {
    /// `count` children, all still to be linked.
    ///
    /// Returns `None` if `count` exceeds [`MAX_CHILDREN`].
    pub fn unlinked(count: usize) -> Option<Self> {
        Self::from_slice([Offset::ZERO; MAX_CHILDREN].get(..count)?)
    }

    /// Children at the given relative offsets.
    ///
    /// Returns `None` for more than [`MAX_CHILDREN`] offsets.
    pub fn from_slice(offsets: &[Offset]) -> Option<Self> {
        let mut children = Self {
            offsets: [Offset::ZERO; MAX_CHILDREN],
            len: offsets.len(),
        };
        children.offsets.get_mut(..offsets.len())?.copy_from_slice(offsets);
        Some(children)
    }

    /// The offsets, in declaration order.
    pub fn as_slice(&self) -> &[Offset] {
        &self.offsets[..self.len]
    }
}

/// Parameters of a difference block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceParams {
    /// Relative offset of the shape cut from.
    pub base: Offset,
    /// Relative offset of the subtracted shape.
    pub cut: Offset,
}

fn pack_children(buf: &mut ParamBuffers, kind: ShapeKind, children: &Children) -> Offset {
    let children = children.as_slice();
    let mut ints = Vec::with_capacity(2 + 2 * children.len());
    ints.extend([kind.tag(), children.len() as i32]);
    for child in children {
        ints.extend(child.to_slots());
    }
    buf.push_block(&ints, &[])
}

fn unpack_children(view: BufView<'_>, kind: ShapeKind) -> Children {
    let len = view.count(1).min(MAX_CHILDREN);
    let mut children = Children {
        offsets: [Offset::ZERO; MAX_CHILDREN],
        len,
    };
    for (offset, slot) in children.offsets.iter_mut().zip(kind.child_slots(len)) {
        *offset = view.offset_at(slot);
    }
    children
}

/// Next interval of the child at `offset` that starts after `t`.
fn next_span(ray: &Ray, view: BufView<'_>, offset: Offset, t: f32) -> Option<Hit> {
    let near = t + SPAN_GAP * t.abs().max(1.0);
    if !near.is_finite() || near > ray.far() {
        return None;
    }
    hit_at(&ray.with_range(near, ray.far()), view, offset)
}

fn entry_order(a: &Hit, b: &Hit) -> Ordering {
    a.enter.total_cmp(&b.enter).then_with(|| cmp_vec(&a.normal, &b.normal))
}

fn exit_order(a: &Hit, b: &Hit) -> Ordering {
    a.exit.total_cmp(&b.exit).then_with(|| cmp_vec(&a.exit_normal, &b.exit_normal))
}

impl Union {
    /// Append a union header for `count` children. Child offsets are
    /// filled in later with [`ParamBuffers::link_child`].
    ///
    /// Returns `None` if `count` exceeds [`MAX_CHILDREN`].
    pub fn pack(buf: &mut ParamBuffers, count: usize) -> Option<Offset> {
        Some(Self::pack_params(buf, &Children::unlinked(count)?))
    }
}

impl Intersection {
    /// Append an intersection header for `count` children.
    ///
    /// Returns `None` if `count` exceeds [`MAX_CHILDREN`].
    pub fn pack(buf: &mut ParamBuffers, count: usize) -> Option<Offset> {
        Some(Self::pack_params(buf, &Children::unlinked(count)?))
    }
}

impl Difference {
    /// Append a difference header. Slot 1 is the base, slot 3 the
    /// subtracted shape.
    pub fn pack(buf: &mut ParamBuffers) -> Offset {
        let params = DifferenceParams {
            base: Offset::ZERO,
            cut: Offset::ZERO,
        };
        Self::pack_params(buf, &params)
    }
}

impl Pack for Union {
    type Params = Children;
    const INTS: usize = 2;
    const FLOATS: usize = 0;

    fn pack_params(buf: &mut ParamBuffers, params: &Children) -> Offset {
        pack_children(buf, Self::KIND, params)
    }

    fn unpack(view: BufView<'_>) -> Children {
        unpack_children(view, Self::KIND)
    }
}

impl Pack for Intersection {
    type Params = Children;
    const INTS: usize = 2;
    const FLOATS: usize = 0;

    fn pack_params(buf: &mut ParamBuffers, params: &Children) -> Offset {
        pack_children(buf, Self::KIND, params)
    }

    fn unpack(view: BufView<'_>) -> Children {
        unpack_children(view, Self::KIND)
    }
}

impl Pack for Difference {
    type Params = DifferenceParams;
    const INTS: usize = 5;
    const FLOATS: usize = 0;

    fn pack_params(buf: &mut ParamBuffers, params: &DifferenceParams) -> Offset {
        let [di_a, df_a] = params.base.to_slots();
        let [di_b, df_b] = params.cut.to_slots();
        buf.push_block(&[Self::KIND.tag(), di_a, df_a, di_b, df_b], &[])
    }

    fn unpack(view: BufView<'_>) -> DifferenceParams {
        DifferenceParams {
            base: view.offset_at(1),
            cut: view.offset_at(3),
        }
    }
}

impl Shape for Union {
    const KIND: ShapeKind = ShapeKind::Union;

    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
        let children = Self::unpack(view);
        let children = children.as_slice();

        let mut merged = children
            .iter()
            .filter_map(|&child| hit_at(ray, view, child))
            .min_by(Hit::total_cmp)?;

        // Grow the nearest interval over every interval that overlaps its end
        for _ in 0..MAX_SPANS {
            if !merged.exit.is_finite() || merged.exit >= ray.far() {
                break;
            }
            let rest = ray.with_range(merged.exit, ray.far());
            let next = children
                .iter()
                .filter_map(|&child| hit_at(&rest, view, child))
                .filter(|hit| hit.enter <= merged.exit && hit.exit > merged.exit)
                .max_by(exit_order);
            let Some(next) = next else {
                break;
            };
            merged.exit = next.exit;
            merged.exit_normal = next.exit_normal;
        }
        Some(merged)
    }
}

impl Shape for Intersection {
    const KIND: ShapeKind = ShapeKind::Intersection;

    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
        let children = Self::unpack(view);
        let children = children.as_slice();

        let mut spans = [None::<Hit>; MAX_CHILDREN];
        for (span, &child) in spans.iter_mut().zip(children) {
            *span = Some(hit_at(ray, view, child)?);
        }
        let spans = &mut spans[..children.len()];

        for _ in 0..MAX_SPANS {
            let entry = spans.iter().flatten().copied().max_by(entry_order)?;
            let (slot, exit) = spans
                .iter()
                .enumerate()
                .filter_map(|(slot, span)| Some((slot, (*span)?)))
                .min_by(|(_, a), (_, b)| exit_order(a, b))?;
            if entry.enter <= exit.exit {
                return Some(Hit {
                    enter: entry.enter,
                    exit: exit.exit,
                    normal: entry.normal,
                    exit_normal: exit.exit_normal,
                });
            }
            // The child that ends first cannot reach the latest entry
            spans[slot] = Some(next_span(ray, view, children[slot], exit.exit)?);
        }
        None
    }
}

impl Shape for Difference {
    const KIND: ShapeKind = ShapeKind::Difference;

    fn hit(ray: &Ray, view: BufView<'_>) -> Option<Hit> {
        let DifferenceParams { base: a, cut: b } = Self::unpack(view);
        let mut base = hit_at(ray, view, a)?;
        let mut cut = hit_at(ray, view, b);

        for _ in 0..MAX_SPANS {
            let Some(c) = cut else {
                return Some(base);
            };
            if c.exit < base.enter {
                cut = next_span(ray, view, b, c.exit);
                continue;
            }
            if c.enter > base.exit {
                return Some(base);
            }
            if c.enter > base.enter {
                // The cut starts inside the base
                return Some(Hit {
                    enter: base.enter,
                    exit: c.enter,
                    normal: base.normal,
                    exit_normal: -c.normal,
                });
            }
            if c.exit >= base.exit {
                base = next_span(ray, view, a, base.exit)?;
            } else {
                // The cut covers the start of the base
                base = Hit {
                    enter: c.exit,
                    exit: base.exit,
                    normal: -c.exit_normal,
                    exit_normal: base.exit_normal,
                };
                cut = next_span(ray, view, b, c.exit);
            }
        }
        None
    }
}
