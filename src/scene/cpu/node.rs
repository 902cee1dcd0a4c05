use super::mesh::HalaMeshId;

/// The identity of a node in the source scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalaNodeId(pub u64);

/// A node of the source scene, referencing its parent and mesh by identity.
#[derive(Debug, Clone)]
pub struct HalaSourceNode {
  pub id: HalaNodeId,
  pub name: String,
  pub parent: Option<HalaNodeId>,
  pub local_transform: glam::DMat4,
  pub mesh: Option<HalaMeshId>,
}

/// The default implementation of the node.
impl Default for HalaSourceNode {
  fn default() -> Self {
    Self {
      id: HalaNodeId(0),
      name: String::new(),
      parent: None,
      local_transform: glam::DMat4::IDENTITY,
      mesh: None,
    }
  }
}

impl HalaSourceNode {
  /// Create a new root node without mesh.
  /// param id: The identity of the node.
  /// param name: The name of the node.
  /// return: The node.
  pub fn new(id: HalaNodeId, name: &str) -> Self {
    Self {
      id,
      name: name.to_owned(),
      ..Default::default()
    }
  }
}
