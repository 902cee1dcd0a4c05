use std::path::Path;

use serde::{
  Deserialize,
  Serialize,
};

use crate::error::{
  HalaSceneError,
  HalaSceneErrorKind,
};
use crate::scene::layout::{
  HalaLayoutPlanner,
  DEFAULT_ALIGNMENT,
};

fn default_alignment() -> u32 {
  DEFAULT_ALIGNMENT
}

fn default_as_true() -> bool {
  true
}

/// The import configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalaImportConfig {
  /// The alignment of every region in the arena.
  #[serde(default = "default_alignment")]
  pub alignment: u32,
  /// Reject faces that are not triangles.
  #[serde(default = "default_as_true")]
  pub require_triangles: bool,
  /// Check face corner ranges against every channel and channel indices against their values.
  #[serde(default = "default_as_true")]
  pub validate_indices: bool,
  /// Import joints and weights of skinned glTF primitives.
  #[serde(default = "default_as_true")]
  pub import_skin: bool,
  /// Derive a bitangent channel from glTF normals and tangents.
  #[serde(default = "default_as_true")]
  pub generate_bitangents: bool,
}

/// The default implementation of the import configuration.
impl Default for HalaImportConfig {
  fn default() -> Self {
    Self {
      alignment: DEFAULT_ALIGNMENT,
      require_triangles: true,
      validate_indices: true,
      import_skin: true,
      generate_bitangents: true,
    }
  }
}

/// The implementation of the import configuration.
impl HalaImportConfig {
  /// Load the configuration from a JSON file.
  /// param path: The path of the JSON file.
  /// return: The configuration.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HalaSceneError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|err| HalaSceneError::new(
        HalaSceneErrorKind::Io,
        &format!("Read config file \"{:?}\" failed.", path),
        Some(Box::new(err))))?;
    Self::from_json(&content)
  }

  /// Parse the configuration from a JSON string.
  /// param content: The JSON string.
  /// return: The configuration.
  pub fn from_json(content: &str) -> Result<Self, HalaSceneError> {
    let config: Self = serde_json::from_str(content)
      .map_err(|err| HalaSceneError::new(HalaSceneErrorKind::Config, "Parse import config failed.", Some(Box::new(err))))?;
    config.validate()?;
    Ok(config)
  }

  /// Validate the configuration.
  pub fn validate(&self) -> Result<(), HalaSceneError> {
    self.layout_planner().map(|_| ())
  }

  /// Create the layout planner for this configuration.
  pub fn layout_planner(&self) -> Result<HalaLayoutPlanner, HalaSceneError> {
    HalaLayoutPlanner::new(self.alignment)
  }
}
