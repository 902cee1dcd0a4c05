use std::collections::HashMap;
use std::path::Path;

use crate::error::HalaSceneError;
use crate::config::HalaImportConfig;
use super::super::cpu::{
  HalaChannelRef,
  HalaMeshId,
  HalaNodeId,
  HalaScene,
  HalaSourceMesh,
};
use super::super::cpu::mesh::narrow_values;
use super::super::directory::{
  HalaAttributeInfo,
  HalaFace,
  HalaVertexAttribType,
  INVALID_INDEX,
};
use super::super::storage::{
  HalaSceneStorage,
  HalaSceneStorageBuilder,
};

/// The lookup from source identities to directory indices.
/// It is built once before the nodes are filled.
#[derive(Debug, Default)]
pub struct HalaIdentityLookup {
  node_to_index: HashMap<HalaNodeId, u32>,
  mesh_to_index: HashMap<HalaMeshId, u32>,
}

/// The implementation of the identity lookup.
impl HalaIdentityLookup {
  /// Create the lookup of a scene.
  /// param scene: The source scene.
  /// return: The lookup, or an error if an identity is used twice.
  pub fn new(scene: &HalaScene) -> Result<Self, HalaSceneError> {
    let mut node_to_index = HashMap::with_capacity(scene.nodes.len());
    for (index, node) in scene.nodes.iter().enumerate() {
      let index = Self::to_index(index, "node")?;
      if node_to_index.insert(node.id, index).is_some() {
        return Err(HalaSceneError::invalid_input(
          &format!("Node id {} is used by more than one node.", node.id.0)));
      }
    }

    let mut mesh_to_index = HashMap::with_capacity(scene.meshes.len());
    for (index, mesh) in scene.meshes.iter().enumerate() {
      let index = Self::to_index(index, "mesh")?;
      if mesh_to_index.insert(mesh.id, index).is_some() {
        return Err(HalaSceneError::invalid_input(
          &format!("Mesh id {} is used by more than one mesh.", mesh.id.0)));
      }
    }

    Ok(Self {
      node_to_index,
      mesh_to_index,
    })
  }

  pub fn resolve_node(&self, id: HalaNodeId) -> Option<u32> {
    self.node_to_index.get(&id).copied()
  }

  pub fn resolve_mesh(&self, id: HalaMeshId) -> Option<u32> {
    self.mesh_to_index.get(&id).copied()
  }

  fn to_index(index: usize, what: &str) -> Result<u32, HalaSceneError> {
    match u32::try_from(index) {
      Ok(index) if index < INVALID_INDEX => Ok(index),
      _ => Err(HalaSceneError::size_overflow(
        &format!("The {} index {} collides with the sentinel index.", what, index))),
    }
  }
}

/// The scene importer.
/// It plans the whole scene first, then fills the arena in one pass.
pub struct HalaSceneImporter;

/// The implementation of the scene importer.
impl HalaSceneImporter {
  /// Import a glTF file.
  /// param path: The path of the glTF file.
  /// param config: The import configuration.
  /// return: The filled scene storage.
  pub fn import_gltf<P: AsRef<Path>>(path: P, config: &HalaImportConfig) -> Result<HalaSceneStorage, HalaSceneError> {
    let scene = HalaScene::new(path, config)?;
    Self::import(&scene, config)
  }

  /// Import a parsed scene.
  /// param scene: The source scene.
  /// param config: The import configuration.
  /// return: The filled scene storage.
  pub fn import(scene: &HalaScene, config: &HalaImportConfig) -> Result<HalaSceneStorage, HalaSceneError> {
    let planner = config.layout_planner()?;

    // Plan with counts only.
    let mut mesh_descs = Vec::with_capacity(scene.meshes.len());
    for mesh in scene.meshes.iter() {
      Self::validate_mesh(mesh, config)?;
      mesh_descs.push(mesh.layout_desc()?);
    }
    let layout = planner.plan(scene.nodes.len(), &mesh_descs)?;
    let lookup = HalaIdentityLookup::new(scene)?;

    // Every offset is fixed from here on.
    let mut builder = HalaSceneStorageBuilder::new(layout)?;
    for (mesh_idx, mesh) in scene.meshes.iter().enumerate() {
      Self::fill_mesh(&mut builder, mesh_idx, mesh)?;
    }
    Self::fill_nodes(&mut builder, scene, &lookup);

    log::debug!(
      "Imported {} nodes and {} meshes with {} channels.",
      scene.nodes.len(), scene.meshes.len(), builder.attrib_infos().len()
    );
    Ok(builder.finish())
  }

  /// Check the faces and channels of a mesh before planning.
  fn validate_mesh(mesh: &HalaSourceMesh, config: &HalaImportConfig) -> Result<(), HalaSceneError> {
    if config.require_triangles {
      if let Some((face_idx, face)) = mesh.faces.iter().enumerate().find(|(_, face)| face.num_indices != 3) {
        return Err(HalaSceneError::invalid_input(&format!(
          "Face {} of mesh \"{}\" has {} corners, only triangles are supported.",
          face_idx, mesh.name, face.num_indices)));
      }
    }

    if config.validate_indices {
      for channel in mesh.channels()? {
        Self::validate_channel(mesh, &channel)?;
      }
    }
    Ok(())
  }

  fn validate_channel(mesh: &HalaSourceMesh, channel: &HalaChannelRef) -> Result<(), HalaSceneError> {
    let index_count = channel.indices.len() as u64;
    for (face_idx, face) in mesh.faces.iter().enumerate() {
      let end = face.index_begin as u64 + face.num_indices as u64;
      if end > index_count {
        return Err(HalaSceneError::invalid_input(&format!(
          "Face {} of mesh \"{}\" ends at corner {}, but the {:?} channel has {} indices.",
          face_idx, mesh.name, end, channel.attrib_type, index_count)));
      }
    }

    if let Some(index) = channel.indices.iter().find(|index| **index as usize >= channel.value_count) {
      return Err(HalaSceneError::invalid_input(&format!(
        "Mesh \"{}\" {:?} channel references value {}, but has {} values.",
        mesh.name, channel.attrib_type, index, channel.value_count)));
    }
    Ok(())
  }

  /// Write the faces and every channel of a mesh.
  /// Attribute records are in canonical order, the Nth record of a type is the Nth source set.
  fn fill_mesh(builder: &mut HalaSceneStorageBuilder, mesh_idx: usize, mesh: &HalaSourceMesh) -> Result<(), HalaSceneError> {
    let mesh_info = builder.mesh_infos()[mesh_idx];

    let faces = builder.face_view_mut(mesh_info).faces;
    for (dst, src) in faces.iter_mut().zip(mesh.faces.iter()) {
      *dst = HalaFace {
        indices_begin: src.index_begin,
        num_of_indices: src.num_indices,
      };
    }

    let attrib_infos = builder.mesh_view(&mesh_info).attrib_infos.to_vec();
    let mut set_counters = [0usize; HalaVertexAttribType::CANONICAL_ORDER.len()];
    for attrib_info in attrib_infos {
      let attrib_type = attrib_info.attrib_type();
      let counter = &mut set_counters[attrib_type.canonical_rank() as usize];
      let set = *counter;
      *counter += 1;

      Self::fill_channel(builder, attrib_info, mesh, attrib_type, set)?;
    }
    Ok(())
  }

  fn fill_channel(
    builder: &mut HalaSceneStorageBuilder,
    attrib_info: HalaAttributeInfo,
    mesh: &HalaSourceMesh,
    attrib_type: HalaVertexAttribType,
    set: usize,
  ) -> Result<(), HalaSceneError> {
    let missing = || HalaSceneError::invalid_input(
      &format!("Mesh \"{}\" has no {:?} channel {}.", mesh.name, attrib_type, set));
    let view = builder.attribute_view_mut(attrib_info);

    match attrib_type {
      HalaVertexAttribType::Position
      | HalaVertexAttribType::Normal
      | HalaVertexAttribType::Tangent
      | HalaVertexAttribType::BiTangent => {
        let channel = match attrib_type {
          HalaVertexAttribType::Position => mesh.positions.as_ref(),
          HalaVertexAttribType::Normal => mesh.normals.as_ref(),
          HalaVertexAttribType::Tangent => mesh.tangents.as_ref(),
          _ => mesh.bitangents.as_ref(),
        }.ok_or_else(missing)?;
        view.indices.copy_from_slice(&channel.indices);
        narrow_values(&channel.values, view.values);
      },
      HalaVertexAttribType::TexCoord => {
        let channel = mesh.uv_sets.get(set).ok_or_else(missing)?;
        view.indices.copy_from_slice(&channel.indices);
        narrow_values(&channel.values, view.values);
      },
      HalaVertexAttribType::Color => {
        let channel = mesh.color_sets.get(set).ok_or_else(missing)?;
        view.indices.copy_from_slice(&channel.indices);
        narrow_values(&channel.values, view.values);
      },
      HalaVertexAttribType::Joints
      | HalaVertexAttribType::Weights
      | HalaVertexAttribType::Blendshape => {
        let channel = mesh.skin_channel(attrib_type, set).ok_or_else(missing)?;
        view.indices.copy_from_slice(&channel.indices);
        for (dst, src) in view.values.iter_mut().zip(channel.values.iter()) {
          *dst = *src as f32;
        }
      },
    }
    Ok(())
  }

  /// Write the node directory.
  /// Unresolved references are written as the sentinel index.
  fn fill_nodes(builder: &mut HalaSceneStorageBuilder, scene: &HalaScene, lookup: &HalaIdentityLookup) {
    for (dst, src) in builder.nodes_mut().iter_mut().zip(scene.nodes.iter()) {
      dst.parent = match src.parent {
        Some(parent) => lookup.resolve_node(parent).unwrap_or_else(|| {
          log::warn!("The parent {} of node \"{}\" is not in the scene.", parent.0, src.name);
          INVALID_INDEX
        }),
        None => INVALID_INDEX,
      };
      dst.mesh_index = match src.mesh {
        Some(mesh) => lookup.resolve_mesh(mesh).unwrap_or_else(|| {
          log::warn!("The mesh {} of node \"{}\" is not in the scene.", mesh.0, src.name);
          INVALID_INDEX
        }),
        None => INVALID_INDEX,
      };
      dst.transform = src.local_transform.to_cols_array().map(|v| v as f32);
    }
  }
}

#[cfg(test)]
mod tests {
  use glam::{
    DMat4,
    DVec2,
    DVec3,
  };

  use super::*;
  use crate::error::HalaSceneErrorKind;
  use crate::scene::cpu::{
    HalaSkinChannel,
    HalaSourceFace,
    HalaSourceNode,
    HalaVertexChannel,
  };

  fn triangle(id: u64) -> HalaSourceMesh {
    let mut mesh = HalaSourceMesh::new(HalaMeshId(id), "triangle");
    mesh.faces.push(HalaSourceFace { index_begin: 0, num_indices: 3 });
    mesh.positions = Some(HalaVertexChannel::new(
      vec![DVec3::ZERO, DVec3::X, DVec3::Y],
      vec![0, 1, 2],
    ));
    mesh
  }

  fn scene_of(nodes: Vec<HalaSourceNode>, meshes: Vec<HalaSourceMesh>) -> HalaScene {
    let mut scene = HalaScene::default();
    scene.nodes = nodes;
    scene.meshes = meshes;
    scene
  }

  #[test]
  fn lookup_rejects_duplicate_node_ids() {
    let scene = scene_of(
      vec![HalaSourceNode::new(HalaNodeId(7), "a"), HalaSourceNode::new(HalaNodeId(7), "b")],
      Vec::new(),
    );
    let err = HalaIdentityLookup::new(&scene).unwrap_err();
    assert_eq!(err.kind(), HalaSceneErrorKind::InvalidInput);
  }

  #[test]
  fn lookup_resolves_by_position() {
    let scene = scene_of(
      vec![HalaSourceNode::new(HalaNodeId(10), "a"), HalaSourceNode::new(HalaNodeId(3), "b")],
      vec![triangle(42)],
    );
    let lookup = HalaIdentityLookup::new(&scene).unwrap();
    assert_eq!(lookup.resolve_node(HalaNodeId(3)), Some(1));
    assert_eq!(lookup.resolve_mesh(HalaMeshId(42)), Some(0));
    assert_eq!(lookup.resolve_mesh(HalaMeshId(1)), None);
  }

  #[test]
  fn nodes_resolve_or_fall_back_to_sentinel() {
    let mut child = HalaSourceNode::new(HalaNodeId(2), "child");
    child.parent = Some(HalaNodeId(1));
    child.mesh = Some(HalaMeshId(99));
    child.local_transform = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
    let mut orphan = HalaSourceNode::new(HalaNodeId(3), "orphan");
    orphan.parent = Some(HalaNodeId(1000));
    orphan.mesh = Some(HalaMeshId(5));
    let scene = scene_of(
      vec![HalaSourceNode::new(HalaNodeId(1), "root"), child, orphan],
      vec![triangle(5)],
    );

    let storage = HalaSceneImporter::import(&scene, &HalaImportConfig::default()).unwrap();
    let nodes = storage.nodes();
    assert!(nodes[0].is_root());
    assert_eq!(nodes[1].parent, 0);
    assert_eq!(nodes[1].mesh_index, INVALID_INDEX);
    assert_eq!(nodes[1].transform[12..15], [1.0, 2.0, 3.0]);
    assert_eq!(nodes[2].parent, INVALID_INDEX);
    assert_eq!(nodes[2].mesh_index, 0);
  }

  #[test]
  fn non_triangle_faces_follow_the_config() {
    let mut mesh = triangle(1);
    mesh.faces[0].num_indices = 2;
    let scene = scene_of(Vec::new(), vec![mesh]);

    let err = HalaSceneImporter::import(&scene, &HalaImportConfig::default()).unwrap_err();
    assert_eq!(err.kind(), HalaSceneErrorKind::InvalidInput);

    let config = HalaImportConfig { require_triangles: false, ..Default::default() };
    let storage = HalaSceneImporter::import(&scene, &config).unwrap();
    let mesh_info = storage.mesh_infos()[0];
    assert_eq!(storage.face_view(&mesh_info).faces[0].num_of_indices, 2);
  }

  #[test]
  fn face_beyond_channel_indices_is_rejected() {
    let mut mesh = triangle(1);
    mesh.faces.push(HalaSourceFace { index_begin: 3, num_indices: 3 });
    let scene = scene_of(Vec::new(), vec![mesh]);
    let err = HalaSceneImporter::import(&scene, &HalaImportConfig::default()).unwrap_err();
    assert_eq!(err.kind(), HalaSceneErrorKind::InvalidInput);
  }

  #[test]
  fn index_beyond_values_is_rejected() {
    let mut mesh = triangle(1);
    mesh.uv_sets.push(HalaVertexChannel::new(vec![DVec2::ZERO], vec![0, 0, 1]));
    let scene = scene_of(Vec::new(), vec![mesh]);
    let err = HalaSceneImporter::import(&scene, &HalaImportConfig::default()).unwrap_err();
    assert_eq!(err.kind(), HalaSceneErrorKind::InvalidInput);
  }

  #[test]
  fn skin_channels_are_narrowed() {
    let mut mesh = triangle(1);
    mesh.skin_channels.push(HalaSkinChannel {
      attrib_type: HalaVertexAttribType::Weights,
      num_value_per_index: 2,
      values: vec![0.25, 0.75, 1.0, 0.0],
      indices: vec![0, 1, 0],
    });
    mesh.skin_channels.push(HalaSkinChannel {
      attrib_type: HalaVertexAttribType::Joints,
      num_value_per_index: 2,
      values: vec![0.0, 1.0],
      indices: vec![0, 0, 0],
    });
    let scene = scene_of(Vec::new(), vec![mesh]);

    let storage = HalaSceneImporter::import(&scene, &HalaImportConfig::default()).unwrap();
    let mesh_view = storage.mesh_view(&storage.mesh_infos()[0]);
    let types = mesh_view.attrib_infos.iter().map(|info| info.attrib_type()).collect::<Vec<_>>();
    assert_eq!(types, vec![HalaVertexAttribType::Position, HalaVertexAttribType::Joints, HalaVertexAttribType::Weights]);

    let weights = storage.attribute_view(&mesh_view.attrib_infos[2]);
    assert_eq!(weights.num_of_values(), 2);
    assert_eq!(weights.corner_value(1), &[1.0, 0.0]);
    let joints = storage.attribute_view(&mesh_view.attrib_infos[1]);
    assert_eq!(joints.values, &[0.0, 1.0]);
  }
}
