//! Scene description for shapebuf.
//!
//! A [`SceneDoc`] is a graph of [`Node`]s, each holding one [`ShapeOp`]:
//! a primitive, a boolean combination of other nodes, or a transform of
//! another node. The description is declarative; packing it into flat
//! parameter buffers is done by `shapebuf-scene`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the scene graph.
pub type NodeId = u64;

/// 3D vector with f64 components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Shape operation, the building block of the scene graph.
///
/// Each variant is either a leaf primitive or a combining/transform
/// operation that references child nodes by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeOp {
    /// Sphere given by center and radius.
    Sphere {
        /// Center of the sphere.
        center: Vec3,
        /// Radius of the sphere.
        radius: f64,
    },
    /// Axis-aligned box given by two corners.
    Cuboid {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },
    /// Half-space behind a plane.
    Plane {
        /// Any point on the plane.
        point: Vec3,
        /// Outward normal (need not be unit length).
        normal: Vec3,
    },
    /// Boolean union of any number of children.
    Union {
        /// Operands.
        children: Vec<NodeId>,
    },
    /// Boolean intersection of any number of children.
    Intersection {
        /// Operands.
        children: Vec<NodeId>,
    },
    /// Boolean difference (left minus right).
    Difference {
        /// Left operand (base).
        left: NodeId,
        /// Right operand (subtracted).
        right: NodeId,
    },
    /// Translation by an offset vector.
    Translate {
        /// Child node to translate.
        child: NodeId,
        /// Translation offset.
        offset: Vec3,
    },
    /// Rotation by Euler angles in degrees (applied as X, then Y, then Z).
    Rotate {
        /// Child node to rotate.
        child: NodeId,
        /// Rotation angles in degrees.
        angles: Vec3,
    },
    /// Non-uniform scale.
    Scale {
        /// Child node to scale.
        child: NodeId,
        /// Scale factors per axis.
        factor: Vec3,
    },
    /// Child guarded by a bounding box.
    Bounded {
        /// Child node.
        child: NodeId,
        /// Minimum corner of the bounds.
        min: Vec3,
        /// Maximum corner of the bounds.
        max: Vec3,
    },
}

impl ShapeOp {
    /// Child node ids in declaration order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            ShapeOp::Sphere { .. } | ShapeOp::Cuboid { .. } | ShapeOp::Plane { .. } => Vec::new(),
            ShapeOp::Union { children } | ShapeOp::Intersection { children } => children.clone(),
            ShapeOp::Difference { left, right } => vec![*left, *right],
            ShapeOp::Translate { child, .. }
            | ShapeOp::Rotate { child, .. }
            | ShapeOp::Scale { child, .. }
            | ShapeOp::Bounded { child, .. } => vec![*child],
        }
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// The operation this node represents.
    pub op: ShapeOp,
}

/// A scene document.
///
/// Nodes may be shared by several parents; each use is packed as its own
/// block, since parameter buffers are strictly linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDoc {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// All nodes in the graph, keyed by [`NodeId`].
    pub nodes: HashMap<NodeId, Node>,
    /// Node to pack as the top-level shape.
    pub root: Option<NodeId>,
}

impl Default for SceneDoc {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            nodes: HashMap::new(),
            root: None,
        }
    }
}

impl SceneDoc {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `id` and return the id.
    pub fn add(&mut self, id: NodeId, name: Option<&str>, op: ShapeOp) -> NodeId {
        self.nodes.insert(
            id,
            Node {
                id,
                name: name.map(str::to_string),
                op,
            },
        );
        id
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
