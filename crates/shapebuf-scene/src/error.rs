//! Error types for scene building and layout validation.

use shapebuf_ir::NodeId;
use shapebuf_kernel::Offset;
use thiserror::Error;

/// Errors that can occur while building or validating a scene.
///
/// Intersection tests themselves never fail; everything here is caught
/// before any ray is traced.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Document has no root node.
    #[error("scene has no root node")]
    NoRoot,

    /// A node references a node id that does not exist.
    #[error("node not found: {0}")]
    MissingNode(NodeId),

    /// A node is its own ancestor.
    #[error("cycle through node {0}")]
    Cycle(NodeId),

    /// A union or intersection with nothing to combine.
    #[error("{kind} node {id} has no children")]
    EmptyComposite {
        /// Node id.
        id: NodeId,
        /// Shape kind name.
        kind: &'static str,
    },

    /// A composite declares more children than the kernel gathers.
    #[error("composite has {count} children (max {max})")]
    TooManyChildren {
        /// Declared child count.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Composites are nested deeper than allowed.
    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),

    /// Packed buffers exceed the configured size.
    #[error("buffers too large: {ints} ints, {floats} floats (max {max_ints}, {max_floats})")]
    BufferTooLarge {
        /// Integer slots used.
        ints: usize,
        /// Float slots used.
        floats: usize,
        /// Configured integer limit.
        max_ints: usize,
        /// Configured float limit.
        max_floats: usize,
    },

    /// A transform node cannot be inverted.
    #[error("transform on node {0} is singular")]
    SingularTransform(NodeId),

    /// A primitive has parameters it cannot be traced with.
    #[error("invalid parameter on node {id}: {reason}")]
    InvalidParameter {
        /// Node id.
        id: NodeId,
        /// What is wrong.
        reason: String,
    },

    /// A block starts with a tag no shape kind uses.
    #[error("unknown shape tag {tag} at int offset {at}")]
    UnknownTag {
        /// The tag found.
        tag: i32,
        /// Integer buffer index of the block.
        at: usize,
    },

    /// A variadic composite stores a negative child count.
    #[error("negative child count {count} at int offset {at}")]
    NegativeCount {
        /// The stored count.
        count: i32,
        /// Integer buffer index of the block.
        at: usize,
    },

    /// A block does not fit in the buffers.
    #[error("{kind} block at {at:?} runs past the end of the buffers")]
    BlockOutOfBounds {
        /// Shape kind name, or "block" when the tag itself is missing.
        kind: &'static str,
        /// Offset of the block.
        at: Offset,
    },

    /// A child offset does not point past the parent's own header.
    #[error("{kind} block at {at:?} has a child offset that does not advance")]
    NonForwardOffset {
        /// Shape kind name.
        kind: &'static str,
        /// Offset of the parent block.
        at: Offset,
    },

    /// Limits that the kernel cannot honor.
    #[error("invalid limits: {0}")]
    InvalidLimits(String),

    /// Malformed TOML configuration.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Malformed scene JSON.
    #[error("scene JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error reading a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
