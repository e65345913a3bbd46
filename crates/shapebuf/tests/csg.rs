//! Composite shapes checked against point membership.
//!
//! Each scene is also written as a signed distance bound: negative inside
//! the solid, positive outside, zero on the surface. Sampling a ray through
//! it gives the intervals a hit must agree with.

use approx::assert_relative_eq;
use shapebuf::prelude::*;

/// Samples closer than this to the surface are not trusted either way.
const MARGIN: f32 = 0.02;
const STEP: f32 = 0.01;

fn sphere(p: Vec3, center: [f32; 3], radius: f32) -> f32 {
    (p - Vec3::new(center[0], center[1], center[2])).norm() - radius
}

fn cuboid(p: Vec3, min: [f32; 3], max: [f32; 3]) -> f32 {
    (0..3)
        .map(|i| (min[i] - p[i]).max(p[i] - max[i]))
        .fold(f32::NEG_INFINITY, f32::max)
}

/// Two balls and a post cut to a slab, drilled, then shifted off the origin.
fn drilled() -> (SceneDoc, impl Fn(Point3) -> f32) {
    let v = IrVec3::new;
    let mut doc = SceneDoc::new();
    let left = doc.add(1, None, ShapeOp::Sphere { center: v(-2.0, 0.0, 0.0), radius: 1.2 });
    let right = doc.add(2, None, ShapeOp::Sphere { center: v(2.0, 0.0, 0.0), radius: 1.2 });
    let post = doc.add(3, None, ShapeOp::Cuboid { min: v(-0.5, -0.5, -2.0), max: v(0.5, 0.5, 2.0) });
    let parts = doc.add(4, Some("parts"), ShapeOp::Union { children: vec![left, right, post] });
    let slab = doc.add(5, None, ShapeOp::Cuboid { min: v(-4.0, -0.9, -0.9), max: v(4.0, 0.9, 0.9) });
    let body = doc.add(6, Some("body"), ShapeOp::Intersection { children: vec![parts, slab] });
    let dimple = doc.add(7, None, ShapeOp::Sphere { center: v(-2.0, 0.0, 0.9), radius: 0.5 });
    let bore = doc.add(8, None, ShapeOp::Cuboid { min: v(-0.25, -2.0, -0.25), max: v(0.25, 2.0, 0.25) });
    let notch = doc.add(9, None, ShapeOp::Sphere { center: v(2.6, 0.0, 0.0), radius: 0.4 });
    let holes = doc.add(10, Some("holes"), ShapeOp::Union { children: vec![dimple, bore, notch] });
    let solid = doc.add(11, Some("solid"), ShapeOp::Difference { left: body, right: holes });
    doc.root = Some(doc.add(12, None, ShapeOp::Translate { child: solid, offset: v(0.5, 0.25, 0.0) }));

    let distance = |p: Point3| {
        let p = p.coords - Vec3::new(0.5, 0.25, 0.0);
        let parts = sphere(p, [-2.0, 0.0, 0.0], 1.2)
            .min(sphere(p, [2.0, 0.0, 0.0], 1.2))
            .min(cuboid(p, [-0.5, -0.5, -2.0], [0.5, 0.5, 2.0]));
        let body = parts.max(cuboid(p, [-4.0, -0.9, -0.9], [4.0, 0.9, 0.9]));
        let holes = sphere(p, [-2.0, 0.0, 0.9], 0.5)
            .min(cuboid(p, [-0.25, -2.0, -0.25], [0.25, 2.0, 0.25]))
            .min(sphere(p, [2.6, 0.0, 0.0], 0.4));
        body.max(-holes)
    };
    (doc, distance)
}

/// Deterministic rays through the scene, some starting inside it.
fn rays(n: usize) -> Vec<Ray> {
    let mut state: u32 = 0x9e37_79b9;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state as f32 / u32::MAX as f32) * 2.0 - 1.0
    };
    (0..n)
        .map(|_| {
            let origin = Vec3::new(next() * 6.0, next() * 3.0, next() * 3.0);
            let target = Vec3::new(next() * 3.0, next(), next());
            let near = (next() + 1.0) * 0.5;
            Ray::new(Point3::from(origin), (target - origin).normalize()).with_range(near, near + 20.0)
        })
        .collect()
}

#[test]
fn test_hits_agree_with_point_membership() {
    let (doc, distance) = drilled();
    let scene = build(&doc, &Limits::default()).unwrap();

    let mut hits = 0;
    for r in rays(400) {
        let hit = scene.trace(&r);
        let samples = ((r.far() - r.near()) / STEP) as usize;
        let at = |i: usize| r.near() + i as f32 * STEP;
        let first_inside = (0..=samples).map(at).find(|&t| distance(r.at(t)) < -MARGIN);

        let Some(hit) = hit else {
            assert!(first_inside.is_none(), "missed solid at t = {:?} on {:?}", first_inside, r);
            continue;
        };
        hits += 1;

        if let Some(t) = first_inside {
            assert!(hit.enter <= t + 1e-4, "entered at {} after inside sample {} on {:?}", hit.enter, t, r);
        }
        assert!(distance(r.at(hit.enter)) < MARGIN, "entry off the surface on {:?}", r);
        if hit.exit < r.far() {
            assert!(distance(r.at(hit.exit)) > -MARGIN, "exit inside the solid on {:?}", r);
        }
        for t in (0..=samples).map(at) {
            let d = distance(r.at(t));
            if t < hit.enter {
                assert!(d > -MARGIN, "inside at {} before entry {} on {:?}", t, hit.enter, r);
            } else if t <= hit.exit {
                assert!(d < MARGIN, "outside at {} within {:?} on {:?}", t, hit, r);
            }
        }
    }
    assert!(hits > 100, "only {} hits", hits);
}

#[test]
fn test_second_spans_through_the_scene_builder() {
    let v = IrVec3::new;
    let mut doc = SceneDoc::new();
    let left = doc.add(1, None, ShapeOp::Sphere { center: v(-3.0, 0.0, 0.0), radius: 1.0 });
    let right = doc.add(2, None, ShapeOp::Sphere { center: v(3.0, 0.0, 0.0), radius: 1.0 });
    let pair = doc.add(3, Some("pair"), ShapeOp::Union { children: vec![left, right] });
    let big = doc.add(4, None, ShapeOp::Sphere { center: v(3.0, 0.0, 0.0), radius: 1.5 });
    let block = doc.add(5, None, ShapeOp::Cuboid { min: v(-5.0, -2.0, -2.0), max: v(-1.0, 2.0, 2.0) });
    let both = doc.add(6, None, ShapeOp::Intersection { children: vec![pair, big] });
    let rest = doc.add(7, None, ShapeOp::Difference { left: pair, right: block });
    let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::x());

    for root in [both, rest] {
        let scene = build_node(&doc, root, &Limits::default()).unwrap();
        let hit = scene.trace(&ray).unwrap();
        assert_relative_eq!(hit.enter, 12.0, epsilon = 1e-5);
        assert_relative_eq!(hit.exit, 14.0, epsilon = 1e-5);
    }

    let wide = doc.add(8, None, ShapeOp::Cuboid { min: v(-4.0, -2.0, -2.0), max: v(4.0, 2.0, 2.0) });
    let middle = doc.add(9, None, ShapeOp::Sphere { center: v(0.0, 0.0, 0.0), radius: 1.0 });
    let cuts = doc.add(10, None, ShapeOp::Union { children: vec![left, middle] });
    let carved = doc.add(11, None, ShapeOp::Difference { left: wide, right: cuts });
    let scene = build_node(&doc, carved, &Limits::default()).unwrap();
    let hit = scene.trace(&ray).unwrap();
    assert_relative_eq!(hit.enter, 8.0, epsilon = 1e-5);
    assert_relative_eq!(hit.exit, 9.0, epsilon = 1e-5);
}
