//! Behavior of the intersection contract across shape kinds.

use approx::assert_relative_eq;
use shapebuf::prelude::*;

fn ray(origin: [f32; 3], direction: [f32; 3]) -> Ray {
    Ray::new(
        Point3::new(origin[0], origin[1], origin[2]),
        Vec3::new(direction[0], direction[1], direction[2]),
    )
}

fn unit_sphere_at(buf: &mut ParamBuffers, x: f32) -> Offset {
    Sphere::pack(buf, Point3::new(x, 0.0, 0.0), 1.0)
}

fn union_of(centers: &[f32]) -> (ParamBuffers, Offset) {
    let mut buf = ParamBuffers::new();
    let root = Union::pack(&mut buf, centers.len()).unwrap();
    for (i, &x) in centers.iter().enumerate() {
        let child = unit_sphere_at(&mut buf, x);
        buf.link_child(root, 2 + 2 * i, child).unwrap();
    }
    (buf, root)
}

/// Rays spread over a grid in front of the scene, pointing down +z.
fn grid(n: usize, half: f32) -> Vec<Ray> {
    let mut rays = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let x = -half + 2.0 * half * i as f32 / (n - 1) as f32;
            let y = -half + 2.0 * half * j as f32 / (n - 1) as f32;
            rays.push(ray([x, y, -10.0], [0.0, 0.0, 1.0]));
        }
    }
    rays
}

/// Deterministic rays from all around the origin.
fn scattered(n: usize) -> Vec<Ray> {
    let mut state: u32 = 0x2545_f491;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state as f32 / u32::MAX as f32) * 2.0 - 1.0
    };
    (0..n)
        .map(|_| {
            let origin = Vec3::new(next(), next(), next()) * 8.0;
            let target = Vec3::new(next(), next(), next()) * 1.5;
            let dir = target - origin;
            let near = (next() + 1.0) * 0.2;
            Ray::new(Point3::from(origin), dir).with_range(near, near + 2.0)
        })
        .collect()
}

#[test]
fn test_sphere_hit_from_front() {
    let mut buf = ParamBuffers::new();
    let at = Sphere::pack(&mut buf, Point3::origin(), 1.0);
    let hit = dispatch::hit(&ray([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]), buf.view_at(at)).unwrap();

    assert_relative_eq!(hit.enter, 4.0, epsilon = 1e-5);
    assert_relative_eq!(hit.exit, 6.0, epsilon = 1e-5);
    assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    assert_relative_eq!(hit.exit_normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
}

#[test]
fn test_sphere_miss() {
    let mut buf = ParamBuffers::new();
    Sphere::pack(&mut buf, Point3::origin(), 1.0);
    assert!(dispatch::hit(&ray([10.0, 0.0, 0.0], [0.0, 1.0, 0.0]), buf.view()).is_none());
}

#[test]
fn test_origin_inside_sphere() {
    let mut buf = ParamBuffers::new();
    Sphere::pack(&mut buf, Point3::origin(), 1.0);
    let hit = dispatch::hit(&ray([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]), buf.view()).unwrap();
    assert_relative_eq!(hit.enter, 0.0, epsilon = 1e-6);
    assert_relative_eq!(hit.exit, 1.0, epsilon = 1e-5);
}

#[test]
fn test_range_clipping() {
    let mut buf = ParamBuffers::new();
    Sphere::pack(&mut buf, Point3::origin(), 1.0);
    let base = ray([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]);

    assert!(dispatch::hit(&base.with_range(0.0, 3.0), buf.view()).is_none());
    assert!(dispatch::hit(&base.with_range(7.0, 9.0), buf.view()).is_none());

    let hit = dispatch::hit(&base.with_range(5.0, 10.0), buf.view()).unwrap();
    assert_relative_eq!(hit.enter, 5.0);
    assert_relative_eq!(hit.exit, 6.0, epsilon = 1e-5);
}

#[test]
fn test_union_order_independent() {
    let (ab, ab_root) = union_of(&[-3.0, 3.0]);
    let (ba, ba_root) = union_of(&[3.0, -3.0]);

    let mut hits = 0;
    for r in grid(21, 5.0) {
        let x = dispatch::hit(&r, ab.view_at(ab_root));
        let y = dispatch::hit(&r, ba.view_at(ba_root));
        assert_eq!(x, y);
        hits += x.is_some() as usize;
    }
    assert!(hits > 0);
}

#[test]
fn test_union_hits_either_child() {
    let (buf, root) = union_of(&[-3.0, 3.0]);
    let left = dispatch::hit(&ray([-3.0, 0.0, -10.0], [0.0, 0.0, 1.0]), buf.view_at(root)).unwrap();
    let right = dispatch::hit(&ray([3.0, 0.0, -10.0], [0.0, 0.0, 1.0]), buf.view_at(root)).unwrap();
    assert_relative_eq!(left.enter, 9.0, epsilon = 1e-5);
    assert_relative_eq!(right.enter, 9.0, epsilon = 1e-5);
    assert!(dispatch::hit(&ray([0.0, 0.0, -10.0], [0.0, 0.0, 1.0]), buf.view_at(root)).is_none());
}

#[test]
fn test_union_idempotent() {
    let (twice, root) = union_of(&[0.0, 0.0]);
    let mut once = ParamBuffers::new();
    unit_sphere_at(&mut once, 0.0);

    for r in grid(15, 2.0) {
        assert_eq!(dispatch::hit(&r, twice.view_at(root)), dispatch::hit(&r, once.view()));
    }
}

#[test]
fn test_offset_relocation() {
    fn subtree(buf: &mut ParamBuffers) -> Offset {
        let root = Difference::pack(buf);
        let base = Cuboid::pack(buf, Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let cut = Sphere::pack(buf, Point3::new(0.0, 0.0, -1.0), 0.75);
        buf.link_child(root, 1, base).unwrap();
        buf.link_child(root, 3, cut).unwrap();
        root
    }

    let mut fresh = ParamBuffers::new();
    let fresh_root = subtree(&mut fresh);

    let mut shifted = ParamBuffers::new();
    Plane::pack(&mut shifted, Point3::origin(), Vec3::x());
    Union::pack(&mut shifted, 3).unwrap();
    unit_sphere_at(&mut shifted, 7.0);
    let shifted_root = subtree(&mut shifted);
    assert_ne!(fresh_root, shifted_root);

    for r in grid(17, 1.5) {
        assert_eq!(
            dispatch::hit(&r, fresh.view_at(fresh_root)),
            dispatch::hit(&r, shifted.view_at(shifted_root))
        );
    }
}

#[test]
fn test_ray_substitution_matches_child() {
    let map = AffineMap::translation(2.0, 0.0, 0.0);
    let mut buf = ParamBuffers::new();
    let root = Transform::pack(&mut buf, &map).unwrap();
    let child = Sphere::pack(&mut buf, Point3::origin(), 1.0);
    buf.link_child(root, 1, child).unwrap();

    for r in grid(13, 4.0) {
        let outer = dispatch::hit(&r, buf.view_at(root));
        let local = Ray::new(r.origin() - Vec3::new(2.0, 0.0, 0.0), r.direction());
        let inner = dispatch::hit(&local, buf.view_at(child));
        match (outer, inner) {
            (Some(o), Some(i)) => {
                assert_relative_eq!(o.enter, i.enter, epsilon = 1e-5);
                assert_relative_eq!(o.exit, i.exit, epsilon = 1e-5);
                assert_relative_eq!(o.normal, i.normal, epsilon = 1e-5);
            }
            (None, None) => {}
            other => panic!("transform and substituted ray disagree: {:?}", other),
        }
    }
}

#[test]
fn test_unknown_tag_is_a_miss() {
    let buf = ParamBuffers::from_parts(vec![999, 0, 0], vec![0.0; 8]);
    assert!(dispatch::hit(&ray([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]), buf.view()).is_none());
}

#[test]
fn test_hit_into_keeps_slot_on_miss() {
    let mut buf = ParamBuffers::new();
    Sphere::pack(&mut buf, Point3::origin(), 1.0);
    let sentinel = Hit {
        enter: 42.0,
        exit: 43.0,
        normal: Vec3::x(),
        exit_normal: Vec3::y(),
    };

    let mut out = sentinel;
    assert!(!hit_into(&ray([10.0, 0.0, 0.0], [0.0, 1.0, 0.0]), buf.view(), &mut out));
    assert_eq!(out, sentinel);

    assert!(hit_into(&ray([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]), buf.view(), &mut out));
    assert_relative_eq!(out.enter, 4.0, epsilon = 1e-5);
}

fn mixed_scene() -> SceneDoc {
    let v = IrVec3::new;
    let mut doc = SceneDoc::new();
    let ball = doc.add(1, Some("ball"), ShapeOp::Sphere { center: v(0.0, 0.0, 0.0), radius: 1.2 });
    let block = doc.add(2, Some("block"), ShapeOp::Cuboid { min: v(-1.0, -1.0, -1.0), max: v(1.0, 1.0, 1.0) });
    let rounded = doc.add(3, None, ShapeOp::Intersection { children: vec![ball, block] });
    let hole = doc.add(4, None, ShapeOp::Sphere { center: v(0.0, 0.0, 1.0), radius: 0.5 });
    let cup = doc.add(5, Some("cup"), ShapeOp::Difference { left: rounded, right: hole });
    let turned = doc.add(6, None, ShapeOp::Rotate { child: cup, angles: v(30.0, 45.0, 0.0) });
    let squashed = doc.add(7, None, ShapeOp::Scale { child: turned, factor: v(1.0, 0.5, 2.0) });
    let floor = doc.add(8, None, ShapeOp::Plane { point: v(0.0, 0.0, -1.5), normal: v(0.0, 0.0, 1.0) });
    let slab = doc.add(9, None, ShapeOp::Cuboid { min: v(-3.0, -3.0, -3.0), max: v(3.0, 3.0, 3.0) });
    let base = doc.add(10, Some("base"), ShapeOp::Intersection { children: vec![floor, slab] });
    let moved = doc.add(11, None, ShapeOp::Translate { child: squashed, offset: v(0.5, 0.0, 0.0) });
    let all = doc.add(12, None, ShapeOp::Union { children: vec![moved, base] });
    doc.root = Some(doc.add(
        13,
        Some("scene"),
        ShapeOp::Bounded { child: all, min: v(-4.0, -4.0, -4.0), max: v(4.0, 4.0, 4.0) },
    ));
    doc
}

#[test]
fn test_hits_satisfy_contract() {
    let scene = build(&mixed_scene(), &Limits::default()).unwrap();

    let mut hits = 0;
    for r in scattered(2000) {
        let Some(hit) = scene.trace(&r) else { continue };
        hits += 1;
        assert!(hit.enter <= hit.exit, "{:?}", hit);
        assert!(hit.enter >= r.near() && hit.exit <= r.far(), "{:?} outside {}..{}", hit, r.near(), r.far());
        assert_relative_eq!(hit.normal.norm(), 1.0, epsilon = 1e-3);
        assert_relative_eq!(hit.exit_normal.norm(), 1.0, epsilon = 1e-3);
    }
    assert!(hits > 100);
}

#[test]
fn test_batch_matches_sequential() {
    let scene = build(&mixed_scene(), &Limits::default()).unwrap();
    let rays = scattered(500);
    let batch = scene.trace_batch(&rays);
    for (r, hit) in rays.iter().zip(batch) {
        assert_eq!(hit, scene.trace(r));
    }
}

#[test]
fn test_json_round_trip_traces_the_same() {
    let doc = mixed_scene();
    let json = doc.to_json().unwrap();
    let direct = build(&doc, &Limits::default()).unwrap();
    let parsed = build_json(&json, &Limits::default()).unwrap();

    assert_eq!(direct.buffers().ints(), parsed.buffers().ints());
    assert_eq!(direct.buffers().floats(), parsed.buffers().floats());
}

#[test]
fn test_limits_reject_deep_scene() {
    let limits = Limits {
        max_depth: 3,
        ..Limits::default()
    };
    let err = build(&mixed_scene(), &limits).unwrap_err();
    assert!(matches!(err, SceneError::DepthExceeded(3)));
}
