//! Scene size limits, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shapebuf_kernel::shapes::MAX_CHILDREN;

use crate::{Result, SceneError};

/// Size limits enforced when packing and validating scenes.
///
/// Any field missing from a TOML file keeps its default:
///
/// ```toml
/// max_depth = 32
/// max_children = 8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Deepest allowed nesting of blocks (a lone primitive has depth 1).
    pub max_depth: usize,
    /// Most children a union or intersection may have.
    pub max_children: usize,
    /// Most integer slots in a scene.
    pub max_ints: usize,
    /// Most float slots in a scene.
    pub max_floats: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_children: MAX_CHILDREN,
            max_ints: 1 << 20,
            max_floats: 1 << 22,
        }
    }
}

impl Limits {
    /// Parse limits from a TOML string and check them.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let limits: Limits = toml::from_str(s)?;
        limits.check()?;
        Ok(limits)
    }

    /// Read limits from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject limits the kernel cannot honor.
    pub fn check(&self) -> Result<()> {
        if self.max_children > MAX_CHILDREN {
            return Err(SceneError::InvalidLimits(format!(
                "max_children {} exceeds kernel maximum {}",
                self.max_children, MAX_CHILDREN
            )));
        }
        if self.max_depth == 0 {
            return Err(SceneError::InvalidLimits("max_depth must be at least 1".into()));
        }
        if self.max_ints > i32::MAX as usize || self.max_floats > i32::MAX as usize {
            return Err(SceneError::InvalidLimits(
                "buffer limits must fit in a 32-bit offset".into(),
            ));
        }
        Ok(())
    }
}
