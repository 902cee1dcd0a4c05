use crate::error::HalaSceneError;
use super::arena::HalaArena;
use super::directory::{
  HalaAttributeInfo,
  HalaFace,
  HalaMeshInfo,
  HalaNode,
};
use super::layout::HalaSceneLayout;
use super::view::{
  self,
  HalaAttributeView,
  HalaAttributeViewMut,
  HalaFaceView,
  HalaFaceViewMut,
  HalaMeshView,
  HalaSceneView,
};

/// The scene storage in the planning state.
/// Every offset is fixed and the arena is sized, only the content can change.
#[derive(Debug)]
pub struct HalaSceneStorageBuilder {
  nodes: Vec<HalaNode>,
  mesh_infos: Vec<HalaMeshInfo>,
  attrib_infos: Vec<HalaAttributeInfo>,
  arena: HalaArena,
}

/// The implementation of the scene storage builder.
impl HalaSceneStorageBuilder {
  /// Create a new builder from a complete layout.
  /// The arena is reserved to the planned size here and never grows again.
  /// param layout: The scene layout, checked before anything is reserved.
  /// return: The builder.
  pub fn new(layout: HalaSceneLayout) -> Result<Self, HalaSceneError> {
    layout.validate()?;
    let HalaSceneLayout { node_count, mesh_infos, attrib_infos, total_size } = layout;

    let mut arena = HalaArena::new();
    arena.reserve(total_size as u64)?;

    log::debug!(
      "A HalaSceneStorageBuilder with {} nodes, {} meshes, {} attributes and {} bytes created.",
      node_count, mesh_infos.len(), attrib_infos.len(), arena.len()
    );
    Ok(Self {
      nodes: vec![HalaNode::default(); node_count as usize],
      mesh_infos,
      attrib_infos,
      arena,
    })
  }

  pub fn mesh_infos(&self) -> &[HalaMeshInfo] {
    &self.mesh_infos
  }

  pub fn attrib_infos(&self) -> &[HalaAttributeInfo] {
    &self.attrib_infos
  }

  /// Get the node directory for writing.
  /// The number of nodes is fixed by the layout.
  pub fn nodes_mut(&mut self) -> &mut [HalaNode] {
    &mut self.nodes
  }

  /// Project the faces of a mesh for writing.
  /// param mesh_info: The mesh info.
  /// return: The mutable face view.
  pub fn face_view_mut(&mut self, mesh_info: HalaMeshInfo) -> HalaFaceViewMut<'_> {
    view::face_view_mut(&mut self.arena, &mesh_info)
  }

  /// Project the index and value arrays of an attribute for writing.
  /// param attrib_info: The attribute info.
  /// return: The mutable attribute view.
  pub fn attribute_view_mut(&mut self, attrib_info: HalaAttributeInfo) -> HalaAttributeViewMut<'_> {
    view::attribute_view_mut(&mut self.arena, &attrib_info)
  }

  /// Project the attribute descriptors of a mesh.
  pub fn mesh_view(&self, mesh_info: &HalaMeshInfo) -> HalaMeshView<'_> {
    view::mesh_view(&self.attrib_infos, mesh_info)
  }

  /// Finish the build, no more writes are possible afterward.
  /// return: The filled scene storage.
  pub fn finish(self) -> HalaSceneStorage {
    let Self { nodes, mesh_infos, attrib_infos, arena } = self;
    log::debug!("The scene storage with {} bytes is filled.", arena.len());
    HalaSceneStorage {
      nodes,
      mesh_infos,
      attrib_infos,
      arena,
    }
  }
}

/// The filled scene storage.
/// It owns the arena and the whole directory, all access is read-only.
#[derive(Debug, Clone)]
pub struct HalaSceneStorage {
  nodes: Vec<HalaNode>,
  mesh_infos: Vec<HalaMeshInfo>,
  attrib_infos: Vec<HalaAttributeInfo>,
  arena: HalaArena,
}

/// The Drop implementation of the scene storage.
impl Drop for HalaSceneStorage {
  fn drop(&mut self) {
    log::debug!("A HalaSceneStorage with {} bytes dropped.", self.arena.len());
  }
}

/// The implementation of the scene storage.
impl HalaSceneStorage {
  pub fn nodes(&self) -> &[HalaNode] {
    &self.nodes
  }

  pub fn mesh_infos(&self) -> &[HalaMeshInfo] {
    &self.mesh_infos
  }

  pub fn attrib_infos(&self) -> &[HalaAttributeInfo] {
    &self.attrib_infos
  }

  /// Get the raw content of the arena.
  pub fn data(&self) -> &[u8] {
    self.arena.bytes()
  }

  /// Project the node and mesh directories.
  pub fn scene_view(&self) -> HalaSceneView<'_> {
    HalaSceneView {
      nodes: &self.nodes,
      mesh_infos: &self.mesh_infos,
    }
  }

  /// Project the faces of a mesh.
  /// param mesh_info: The mesh info.
  /// return: The face view.
  pub fn face_view(&self, mesh_info: &HalaMeshInfo) -> HalaFaceView<'_> {
    view::face_view(&self.arena, mesh_info)
  }

  /// Project the index and value arrays of an attribute.
  /// param attrib_info: The attribute info.
  /// return: The attribute view.
  pub fn attribute_view(&self, attrib_info: &HalaAttributeInfo) -> HalaAttributeView<'_> {
    view::attribute_view(&self.arena, attrib_info)
  }

  /// Project the attribute descriptors of a mesh.
  /// param mesh_info: The mesh info.
  /// return: The mesh view.
  pub fn mesh_view(&self, mesh_info: &HalaMeshInfo) -> HalaMeshView<'_> {
    view::mesh_view(&self.attrib_infos, mesh_info)
  }

  pub fn nodes_bytes(&self) -> &[u8] {
    bytemuck::cast_slice(&self.nodes)
  }

  pub fn mesh_infos_bytes(&self) -> &[u8] {
    bytemuck::cast_slice(&self.mesh_infos)
  }

  pub fn attrib_infos_bytes(&self) -> &[u8] {
    bytemuck::cast_slice(&self.attrib_infos)
  }

  /// Get the faces of a mesh as raw bytes.
  pub fn faces_bytes(&self, mesh_info: &HalaMeshInfo) -> &[u8] {
    let faces: &[HalaFace] = self.face_view(mesh_info).faces;
    bytemuck::cast_slice(faces)
  }
}
