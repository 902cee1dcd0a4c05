use base64::Engine;
use serde_json::json;

use hala_scene_storage::prelude::*;

/// Build a glTF document with one node tree and one mesh of three primitives:
/// an indexed skinned triangle, a non-indexed triangle and a point list.
fn triangle_gltf() -> Vec<u8> {
  let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
  let normals: [f32; 9] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
  let tangents: [f32; 12] = [1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, -1.0];
  let weights: [f32; 12] = [1.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
  let joints: [u8; 12] = [0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0];
  let indices: [u16; 3] = [0, 2, 1];

  let mut buffer = Vec::new();
  buffer.extend_from_slice(bytemuck::cast_slice(&positions));
  buffer.extend_from_slice(bytemuck::cast_slice(&normals));
  buffer.extend_from_slice(bytemuck::cast_slice(&tangents));
  buffer.extend_from_slice(bytemuck::cast_slice(&weights));
  buffer.extend_from_slice(&joints);
  buffer.extend_from_slice(bytemuck::cast_slice(&indices));
  let uri = format!(
    "data:application/octet-stream;base64,{}",
    base64::engine::general_purpose::STANDARD.encode(&buffer)
  );

  let document = json!({
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "name": "main", "nodes": [0] }],
    "nodes": [
      { "name": "root", "children": [1] },
      { "name": "child", "mesh": 0, "translation": [1.0, 2.0, 3.0] }
    ],
    "meshes": [{
      "name": "tri",
      "primitives": [
        {
          "attributes": { "POSITION": 0, "NORMAL": 1, "TANGENT": 2, "WEIGHTS_0": 3, "JOINTS_0": 4 },
          "indices": 5,
          "mode": 4
        },
        { "attributes": { "POSITION": 0 }, "mode": 4 },
        { "attributes": { "POSITION": 0 }, "mode": 0 }
      ]
    }],
    "buffers": [{ "byteLength": buffer.len(), "uri": uri }],
    "bufferViews": [
      { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
      { "buffer": 0, "byteOffset": 36, "byteLength": 36 },
      { "buffer": 0, "byteOffset": 72, "byteLength": 48 },
      { "buffer": 0, "byteOffset": 120, "byteLength": 48 },
      { "buffer": 0, "byteOffset": 168, "byteLength": 12 },
      { "buffer": 0, "byteOffset": 180, "byteLength": 6 }
    ],
    "accessors": [
      { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
      { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
      { "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC4" },
      { "bufferView": 3, "componentType": 5126, "count": 3, "type": "VEC4" },
      { "bufferView": 4, "componentType": 5121, "count": 3, "type": "VEC4" },
      { "bufferView": 5, "componentType": 5123, "count": 3, "type": "SCALAR" }
    ]
  });
  serde_json::to_vec(&document).expect("serialize glTF document")
}

#[test]
fn nodes_are_loaded_breadth_first() -> anyhow::Result<()> {
  let scene = HalaGltfLoader::load_slice(&triangle_gltf(), &HalaImportConfig::default())?;

  // The point primitive is skipped.
  assert_eq!(scene.meshes.len(), 2);
  assert_eq!(scene.nodes.len(), 3);
  assert_eq!(scene.nodes[0].name, "root");
  assert!(scene.nodes[0].parent.is_none());
  assert!(scene.nodes[0].mesh.is_none());
  assert_eq!(scene.nodes[1].parent, Some(scene.nodes[0].id));
  assert_eq!(scene.nodes[1].mesh, Some(scene.meshes[0].id));
  assert_eq!(scene.nodes[2].parent, Some(scene.nodes[1].id));
  assert_eq!(scene.nodes[2].mesh, Some(scene.meshes[1].id));
  assert_eq!(scene.nodes[2].local_transform, glam::DMat4::IDENTITY);
  Ok(())
}

#[test]
fn primitives_become_corner_indexed_meshes() -> anyhow::Result<()> {
  let scene = HalaGltfLoader::load_slice(&triangle_gltf(), &HalaImportConfig::default())?;

  let indexed = &scene.meshes[0];
  assert_eq!(indexed.faces.len(), 1);
  assert_eq!(indexed.faces[0].index_begin, 0);
  assert_eq!(indexed.faces[0].num_indices, 3);
  assert_eq!(indexed.positions.as_ref().map(|p| p.indices.clone()), Some(vec![0, 2, 1]));
  assert_eq!(indexed.num_of_channels(), 6);

  let bitangents = indexed.bitangents.as_ref().expect("derived bitangents");
  assert_eq!(bitangents.values[0], glam::DVec3::Y);
  assert_eq!(bitangents.values[2], -glam::DVec3::Y);

  let plain = &scene.meshes[1];
  assert_eq!(plain.num_of_channels(), 1);
  assert_eq!(plain.positions.as_ref().map(|p| p.indices.clone()), Some(vec![0, 1, 2]));
  Ok(())
}

#[test]
fn config_disables_optional_channels() -> anyhow::Result<()> {
  let config = HalaImportConfig {
    import_skin: false,
    generate_bitangents: false,
    ..Default::default()
  };
  let scene = HalaGltfLoader::load_slice(&triangle_gltf(), &config)?;
  let mesh = &scene.meshes[0];
  assert!(mesh.bitangents.is_none());
  assert!(mesh.skin_channels.is_empty());
  assert_eq!(mesh.num_of_channels(), 3);
  Ok(())
}

#[test]
fn loaded_scene_imports_into_storage() -> anyhow::Result<()> {
  let config = HalaImportConfig::default();
  let scene = HalaGltfLoader::load_slice(&triangle_gltf(), &config)?;
  let storage = HalaSceneImporter::import(&scene, &config)?;

  assert_eq!(storage.nodes().len(), 3);
  assert_eq!(storage.nodes()[1].parent, 0);
  assert_eq!(storage.nodes()[1].mesh_index, 0);
  assert_eq!(&storage.nodes()[1].transform[12..15], &[1.0, 2.0, 3.0]);
  assert_eq!(storage.nodes()[2].mesh_index, 1);

  let mesh_view = storage.mesh_view(&storage.mesh_infos()[0]);
  let types = mesh_view.attrib_infos.iter().map(|info| info.attrib_type()).collect::<Vec<_>>();
  assert_eq!(types, vec![
    HalaVertexAttribType::Position,
    HalaVertexAttribType::Normal,
    HalaVertexAttribType::Tangent,
    HalaVertexAttribType::BiTangent,
    HalaVertexAttribType::Joints,
    HalaVertexAttribType::Weights,
  ]);

  let weights = mesh_view.find(HalaVertexAttribType::Weights, 0).expect("weights");
  assert_eq!(weights.num_value_per_index, 4);
  let view = storage.attribute_view(weights);
  assert_eq!(view.value(1), &[0.5, 0.5, 0.0, 0.0]);

  let joints = mesh_view.find(HalaVertexAttribType::Joints, 0).expect("joints");
  assert_eq!(storage.attribute_view(joints).value(2), &[1.0, 0.0, 0.0, 0.0]);
  Ok(())
}

#[test]
fn gltf_file_imports_from_disk() -> anyhow::Result<()> {
  let path = std::env::temp_dir().join(format!("hala_scene_storage_{}.gltf", std::process::id()));
  std::fs::write(&path, triangle_gltf())?;
  let result = HalaSceneImporter::import_gltf(&path, &HalaImportConfig::default());
  std::fs::remove_file(&path)?;

  let storage = result?;
  assert_eq!(storage.mesh_infos().len(), 2);
  Ok(())
}

#[test]
fn unsupported_extension_is_rejected() {
  let err = HalaScene::new("scene.obj", &HalaImportConfig::default()).unwrap_err();
  assert_eq!(err.kind(), HalaSceneErrorKind::InvalidInput);
}

#[test]
fn document_without_scene_is_rejected() {
  let document = serde_json::to_vec(&json!({ "asset": { "version": "2.0" } })).unwrap();
  let err = HalaGltfLoader::load_slice(&document, &HalaImportConfig::default()).unwrap_err();
  assert_eq!(err.kind(), HalaSceneErrorKind::InvalidInput);
}

#[test]
fn malformed_document_is_a_gltf_error() {
  let err = HalaGltfLoader::load_slice(b"{ not gltf", &HalaImportConfig::default()).unwrap_err();
  assert_eq!(err.kind(), HalaSceneErrorKind::Gltf);
}
