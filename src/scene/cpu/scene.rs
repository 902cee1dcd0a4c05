use std::path::Path;

use crate::error::{
  HalaSceneError,
  HalaSceneErrorKind,
};
use crate::config::HalaImportConfig;
use super::node::HalaSourceNode;
use super::mesh::HalaSourceMesh;
use super::super::loader::HalaGltfLoader;

/// An already parsed scene, the input of the storage importer.
#[derive(Debug, Clone, Default)]
pub struct HalaScene {
  pub nodes: Vec<HalaSourceNode>,
  pub meshes: Vec<HalaSourceMesh>,
}

/// The Drop implementation of the scene.
impl Drop for HalaScene {
  fn drop(&mut self) {
    log::debug!("A HalaScene dropped.");
  }
}

/// The implementation of the scene.
impl HalaScene {
  /// Create a new scene from a glTF file.
  /// param path: The path to the glTF file.
  /// param config: The import configuration.
  /// return: The scene.
  pub fn new<P: AsRef<Path>>(path: P, config: &HalaImportConfig) -> Result<Self, HalaSceneError> {
    // Check the file extension.
    let path = path.as_ref();
    let extension = path.extension()
      .ok_or(HalaSceneError::new(HalaSceneErrorKind::InvalidInput, &format!("Get file \"{:?}\" extension failed.", path), None))?;
    let scene = match extension.to_str() {
      // glTF file.
      Some("gltf") | Some("glb") => HalaGltfLoader::load(path, config),
      // Unsupported file.
      _ => Err(HalaSceneError::new(HalaSceneErrorKind::InvalidInput, &format!("Unsupported file \"{:?}\".", path), None)),
    }?;

    log::debug!("A HalaScene with {} nodes and {} meshes created.", scene.nodes.len(), scene.meshes.len());
    Ok(scene)
  }

  /// Get the total number of channels of all meshes.
  pub fn num_of_channels(&self) -> usize {
    self.meshes.iter().map(|mesh| mesh.num_of_channels()).sum()
  }
}
