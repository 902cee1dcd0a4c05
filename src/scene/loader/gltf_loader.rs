use std::path::Path;
use std::collections::VecDeque;

use glam::{
  DVec2,
  DVec3,
  DVec4,
  Vec3,
  Vec4,
  Vec4Swizzles,
};

use crate::error::{
  HalaSceneError,
  HalaSceneErrorKind,
};
use crate::config::HalaImportConfig;
use super::super::cpu::{
  HalaMeshId,
  HalaNodeId,
  HalaScene,
  HalaSkinChannel,
  HalaSourceFace,
  HalaSourceMesh,
  HalaSourceNode,
  HalaVertexChannel,
};
use super::super::directory::HalaVertexAttribType;

/// The largest number of morph targets whose position deltas fit one blendshape channel.
const MAX_MORPH_TARGETS: usize = u8::MAX as usize / 3;

/// The glTF loader.
pub struct HalaGltfLoader;

/// The implementation of the glTF loader.
impl HalaGltfLoader {
  /// Load the glTF file from the given path.
  /// param path: The path of the glTF file.
  /// param config: The import configuration.
  /// return: The loaded scene.
  pub fn load<P: AsRef<Path>>(path: P, config: &HalaImportConfig) -> Result<HalaScene, HalaSceneError> {
    let path = path.as_ref();
    let (gltf, buffers, _) = gltf::import(path)
      .map_err(|err| HalaSceneError::new(
        HalaSceneErrorKind::Gltf,
        &format!("Load glTF file \"{:?}\" failed.", path),
        Some(Box::new(err))))?;
    Self::load_document(&gltf, &buffers, config)
  }

  /// Load the glTF document from memory.
  /// Buffers must be embedded or given as data URIs.
  /// param bytes: The content of a .gltf or .glb file.
  /// param config: The import configuration.
  /// return: The loaded scene.
  pub fn load_slice(bytes: &[u8], config: &HalaImportConfig) -> Result<HalaScene, HalaSceneError> {
    let (gltf, buffers, _) = gltf::import_slice(bytes)
      .map_err(|err| HalaSceneError::new(HalaSceneErrorKind::Gltf, "Load glTF data failed.", Some(Box::new(err))))?;
    Self::load_document(&gltf, &buffers, config)
  }

  fn load_document(
    gltf: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    config: &HalaImportConfig,
  ) -> Result<HalaScene, HalaSceneError> {
    // Load all meshes, one source mesh per triangle primitive.
    let mut loaded_meshes = Vec::new();
    let mut primitive_mesh_ids = Vec::new();
    for mesh in gltf.meshes() {
      let mesh_name = mesh.name().unwrap_or("<Unnamed>");
      log::debug!("Loading mesh \"{}\".", mesh_name);

      let mut mesh_ids = Vec::new();
      for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
          log::warn!(
            "Primitive {} of mesh \"{}\" uses mode {:?}, only triangles are loaded.",
            primitive.index(), mesh_name, primitive.mode()
          );
          continue;
        }

        let id = HalaMeshId(loaded_meshes.len() as u64);
        let name = format!("{}#{}", mesh_name, primitive.index());
        loaded_meshes.push(Self::load_primitive(&primitive, id, &name, buffers, config)?);
        mesh_ids.push(id);
      }
      primitive_mesh_ids.push(mesh_ids);
    }

    // Load all nodes of the default scene.
    let scene = gltf.default_scene()
      .or_else(|| gltf.scenes().next())
      .ok_or(HalaSceneError::invalid_input("No scene in glTF document."))?;
    if gltf.scenes().len() > 1 {
      log::warn!("More than one scene in glTF document. Only the scene \"{}\" will be loaded.", scene.name().unwrap_or("<Unnamed>"));
    }
    log::debug!("Loading scene \"{}\".", scene.name().unwrap_or("<Unnamed>"));

    let mut loaded_nodes: Vec<HalaSourceNode> = Vec::new();
    let mut node_queue = VecDeque::new();
    node_queue.extend(scene.nodes().map(|node| (None, node)));

    while let Some((parent, node)) = node_queue.pop_front() {
      let id = HalaNodeId(loaded_nodes.len() as u64);
      let name = node.name().unwrap_or("<Unnamed>").to_owned();
      let mut loaded_node = HalaSourceNode::new(id, &name);
      loaded_node.parent = parent;
      loaded_node.local_transform = glam::Mat4::from_cols_array_2d(&node.transform().matrix()).as_dmat4();

      // Extra primitives hang below the node with an identity transform.
      let mesh_ids = node.mesh()
        .and_then(|mesh| primitive_mesh_ids.get(mesh.index()))
        .map_or(&[][..], |ids| ids.as_slice());
      loaded_node.mesh = mesh_ids.first().copied();
      loaded_nodes.push(loaded_node);

      for (i, mesh_id) in mesh_ids.iter().enumerate().skip(1) {
        let mut primitive_node = HalaSourceNode::new(HalaNodeId(loaded_nodes.len() as u64), &format!("{}#{}", name, i));
        primitive_node.parent = Some(id);
        primitive_node.mesh = Some(*mesh_id);
        loaded_nodes.push(primitive_node);
      }

      node_queue.extend(node.children().map(|child| (Some(id), child)));
    }

    log::debug!("Loaded {} nodes and {} meshes from glTF document.", loaded_nodes.len(), loaded_meshes.len());
    let mut loaded_scene = HalaScene::default();
    loaded_scene.nodes = loaded_nodes;
    loaded_scene.meshes = loaded_meshes;
    Ok(loaded_scene)
  }

  /// Load a triangle primitive as a source mesh.
  /// Every channel shares the index buffer of the primitive.
  /// param primitive: The gltf primitive.
  /// param id: The identity of the new mesh.
  /// param name: The name of the new mesh.
  /// param buffers: The buffer data.
  /// param config: The import configuration.
  /// return: The loaded mesh.
  fn load_primitive(
    primitive: &gltf::Primitive,
    id: HalaMeshId,
    name: &str,
    buffers: &[gltf::buffer::Data],
    config: &HalaImportConfig,
  ) -> Result<HalaSourceMesh, HalaSceneError> {
    log::debug!("Loading primitive \"{}\".", name);
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions = reader.read_positions()
      .ok_or(HalaSceneError::invalid_input(&format!("Read positions from mesh \"{}\" failed.", name)))?
      .map(|p| Vec3::from(p).as_dvec3())
      .collect::<Vec<_>>();
    let indices = match reader.read_indices() {
      Some(indices) => indices.into_u32().collect::<Vec<_>>(),
      None => (0..positions.len() as u32).collect::<Vec<_>>(),
    };
    if indices.len() % 3 != 0 {
      return Err(HalaSceneError::invalid_input(
        &format!("Mesh \"{}\" has {} indices, not a whole number of triangles.", name, indices.len())));
    }

    let mut mesh = HalaSourceMesh::new(id, name);
    mesh.faces = (0..indices.len() as u32 / 3)
      .map(|i| HalaSourceFace { index_begin: i * 3, num_indices: 3 })
      .collect();

    let normals = reader.read_normals()
      .map(|normals| normals.map(|n| Vec3::from(n).as_dvec3()).collect::<Vec<_>>());
    let tangents = reader.read_tangents()
      .map(|tangents| tangents.map(|t| Vec4::from(t).as_dvec4()).collect::<Vec<_>>());

    if config.generate_bitangents {
      if let (Some(normals), Some(tangents)) = (&normals, &tangents) {
        let bitangents = normals.iter()
          .zip(tangents.iter())
          .map(|(n, t)| n.cross(t.xyz()) * t.w)
          .collect::<Vec<DVec3>>();
        mesh.bitangents = Some(HalaVertexChannel::new(bitangents, indices.clone()));
      }
    }
    mesh.positions = Some(HalaVertexChannel::new(positions, indices.clone()));
    mesh.normals = normals.map(|normals| HalaVertexChannel::new(normals, indices.clone()));
    mesh.tangents = tangents.map(|tangents| {
      HalaVertexChannel::new(tangents.iter().map(|t| t.xyz()).collect(), indices.clone())
    });

    let mut set = 0;
    while let Some(tex_coords) = reader.read_tex_coords(set) {
      let values = tex_coords.into_f32().map(|uv| DVec2::new(uv[0] as f64, uv[1] as f64)).collect::<Vec<_>>();
      mesh.uv_sets.push(HalaVertexChannel::new(values, indices.clone()));
      set += 1;
    }

    let mut set = 0;
    while let Some(colors) = reader.read_colors(set) {
      let values = colors.into_rgba_f32().map(|c| Vec4::from(c).as_dvec4()).collect::<Vec<DVec4>>();
      mesh.color_sets.push(HalaVertexChannel::new(values, indices.clone()));
      set += 1;
    }

    if config.import_skin {
      let mut set = 0;
      while let Some(joints) = reader.read_joints(set) {
        let values = joints.into_u16().flat_map(|j| j.map(f64::from)).collect();
        mesh.skin_channels.push(Self::skin_channel(HalaVertexAttribType::Joints, 4, values, &indices));
        set += 1;
      }

      let mut set = 0;
      while let Some(weights) = reader.read_weights(set) {
        let values = weights.into_f32().flat_map(|w| w.map(f64::from)).collect();
        mesh.skin_channels.push(Self::skin_channel(HalaVertexAttribType::Weights, 4, values, &indices));
        set += 1;
      }
    }

    if let Some(blendshape) = Self::load_blendshape(&reader, name, mesh.positions.as_ref().map_or(0, |p| p.values.len()), &indices) {
      mesh.skin_channels.push(blendshape);
    }

    log::debug!("Loaded mesh \"{}\" with {} faces and {} channels.", name, mesh.faces.len(), mesh.num_of_channels());
    Ok(mesh)
  }

  /// Load the position deltas of all morph targets as one blendshape channel.
  /// The deltas of one vertex are stored target after target.
  fn load_blendshape<'a, 's, F>(
    reader: &gltf::mesh::Reader<'a, 's, F>,
    name: &str,
    num_of_vertices: usize,
    indices: &[u32],
  ) -> Option<HalaSkinChannel>
  where
    F: Clone + Fn(gltf::Buffer<'a>) -> Option<&'s [u8]>,
  {
    let targets = reader.read_morph_targets()
      .filter_map(|(positions, _, _)| positions.map(|p| p.collect::<Vec<[f32; 3]>>()))
      .collect::<Vec<_>>();
    if targets.is_empty() {
      return None;
    }
    if targets.len() > MAX_MORPH_TARGETS {
      log::warn!("Mesh \"{}\" has {} morph targets, the blendshape channel is skipped.", name, targets.len());
      return None;
    }
    if targets.iter().any(|target| target.len() != num_of_vertices) {
      log::warn!("Morph targets of mesh \"{}\" do not match its vertices, the blendshape channel is skipped.", name);
      return None;
    }

    let mut values = Vec::with_capacity(num_of_vertices * targets.len() * 3);
    for vertex in 0..num_of_vertices {
      for target in targets.iter() {
        values.extend(target[vertex].map(f64::from));
      }
    }
    Some(Self::skin_channel(HalaVertexAttribType::Blendshape, (targets.len() * 3) as u8, values, indices))
  }

  fn skin_channel(attrib_type: HalaVertexAttribType, num_value_per_index: u8, values: Vec<f64>, indices: &[u32]) -> HalaSkinChannel {
    HalaSkinChannel {
      attrib_type,
      num_value_per_index,
      values,
      indices: indices.to_vec(),
    }
  }
}
