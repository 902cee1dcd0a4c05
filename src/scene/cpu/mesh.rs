use glam::{
  DVec2,
  DVec3,
  DVec4,
};

use crate::error::HalaSceneError;
use crate::scene::directory::HalaVertexAttribType;
use crate::scene::layout::{
  HalaChannelLayoutDesc,
  HalaMeshLayoutDesc,
};

/// The identity of a mesh in the source scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalaMeshId(pub u64);

/// A face of the source mesh as a range of corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalaSourceFace {
  pub index_begin: u32,
  pub num_indices: u32,
}

/// A double precision value of a vertex attribute channel.
pub trait HalaChannelValue: Copy {
  const NUM_COMPONENTS: u8;

  /// Write the components narrowed to single precision.
  /// param dst: The destination, exactly NUM_COMPONENTS long.
  fn write_f32(&self, dst: &mut [f32]);
}

impl HalaChannelValue for DVec2 {
  const NUM_COMPONENTS: u8 = 2;

  fn write_f32(&self, dst: &mut [f32]) {
    dst[0] = self.x as f32;
    dst[1] = self.y as f32;
  }
}

impl HalaChannelValue for DVec3 {
  const NUM_COMPONENTS: u8 = 3;

  fn write_f32(&self, dst: &mut [f32]) {
    dst[0] = self.x as f32;
    dst[1] = self.y as f32;
    dst[2] = self.z as f32;
  }
}

impl HalaChannelValue for DVec4 {
  const NUM_COMPONENTS: u8 = 4;

  fn write_f32(&self, dst: &mut [f32]) {
    dst[0] = self.x as f32;
    dst[1] = self.y as f32;
    dst[2] = self.z as f32;
    dst[3] = self.w as f32;
  }
}

/// Narrow double precision values into a flat f32 array, component by component.
/// param src: The values.
/// param dst: The destination, NUM_COMPONENTS floats per value.
pub fn narrow_values<T: HalaChannelValue>(src: &[T], dst: &mut [f32]) {
  let num_components = T::NUM_COMPONENTS as usize;
  assert_eq!(dst.len(), src.len() * num_components, "Destination does not match {} values.", src.len());
  for (value, out) in src.iter().zip(dst.chunks_exact_mut(num_components)) {
    value.write_f32(out);
  }
}

/// A vertex attribute channel with one index per corner into its distinct values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HalaVertexChannel<T> {
  pub values: Vec<T>,
  pub indices: Vec<u32>,
}

impl<T: HalaChannelValue> HalaVertexChannel<T> {
  pub fn new(values: Vec<T>, indices: Vec<u32>) -> Self {
    Self { values, indices }
  }
}

/// A type erased view of an existing channel of a source mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalaChannelRef<'a> {
  pub attrib_type: HalaVertexAttribType,
  pub indices: &'a [u32],
  pub value_count: usize,
  pub num_value_per_index: u8,
}

impl<'a> HalaChannelRef<'a> {
  fn new<T: HalaChannelValue>(attrib_type: HalaVertexAttribType, channel: &'a HalaVertexChannel<T>) -> Self {
    Self {
      attrib_type,
      indices: &channel.indices,
      value_count: channel.values.len(),
      num_value_per_index: T::NUM_COMPONENTS,
    }
  }
}

/// A variable arity channel, used for joints, weights and blendshapes.
/// Values are stored flat, `num_value_per_index` floats per distinct value.
#[derive(Debug, Clone, PartialEq)]
pub struct HalaSkinChannel {
  pub attrib_type: HalaVertexAttribType,
  pub num_value_per_index: u8,
  pub values: Vec<f64>,
  pub indices: Vec<u32>,
}

impl HalaSkinChannel {
  pub fn value_count(&self) -> usize {
    if self.num_value_per_index == 0 {
      0
    } else {
      self.values.len() / self.num_value_per_index as usize
    }
  }
}

/// A triangulated mesh of the source scene.
#[derive(Debug, Clone)]
pub struct HalaSourceMesh {
  pub id: HalaMeshId,
  pub name: String,
  pub faces: Vec<HalaSourceFace>,
  pub positions: Option<HalaVertexChannel<DVec3>>,
  pub normals: Option<HalaVertexChannel<DVec3>>,
  pub tangents: Option<HalaVertexChannel<DVec3>>,
  pub bitangents: Option<HalaVertexChannel<DVec3>>,
  pub uv_sets: Vec<HalaVertexChannel<DVec2>>,
  pub color_sets: Vec<HalaVertexChannel<DVec4>>,
  pub skin_channels: Vec<HalaSkinChannel>,
}

/// The implementation of the source mesh.
impl HalaSourceMesh {
  /// Create a new mesh without faces and channels.
  /// param id: The identity of the mesh.
  /// param name: The name of the mesh.
  /// return: The mesh.
  pub fn new(id: HalaMeshId, name: &str) -> Self {
    Self {
      id,
      name: name.to_owned(),
      faces: Vec::new(),
      positions: None,
      normals: None,
      tangents: None,
      bitangents: None,
      uv_sets: Vec::new(),
      color_sets: Vec::new(),
      skin_channels: Vec::new(),
    }
  }

  /// Get the number of existing channels.
  pub fn num_of_channels(&self) -> usize {
    [&self.positions, &self.normals, &self.tangents, &self.bitangents].iter().filter(|c| c.is_some()).count()
      + self.uv_sets.len()
      + self.color_sets.len()
      + self.skin_channels.len()
  }

  /// Get the skin channel that is the Nth channel of its type.
  pub fn skin_channel(&self, attrib_type: HalaVertexAttribType, set: usize) -> Option<&HalaSkinChannel> {
    self.skin_channels.iter().filter(|c| c.attrib_type == attrib_type).nth(set)
  }

  /// Enumerate the existing channels in declaration order.
  /// Skin channels are checked for a valid arity.
  /// return: The channels.
  pub fn channels(&self) -> Result<Vec<HalaChannelRef<'_>>, HalaSceneError> {
    let mut channels = Vec::with_capacity(self.num_of_channels());
    let singles = [
      (&self.positions, HalaVertexAttribType::Position),
      (&self.normals, HalaVertexAttribType::Normal),
      (&self.tangents, HalaVertexAttribType::Tangent),
      (&self.bitangents, HalaVertexAttribType::BiTangent),
    ];
    for (channel, attrib_type) in singles {
      if let Some(channel) = channel {
        channels.push(HalaChannelRef::new(attrib_type, channel));
      }
    }
    channels.extend(self.uv_sets.iter().map(|c| HalaChannelRef::new(HalaVertexAttribType::TexCoord, c)));
    channels.extend(self.color_sets.iter().map(|c| HalaChannelRef::new(HalaVertexAttribType::Color, c)));

    for skin in self.skin_channels.iter() {
      if skin.attrib_type.fixed_num_value_per_index().is_some() {
        return Err(HalaSceneError::invalid_input(
          &format!("Mesh \"{}\" stores a {:?} channel as a skin channel.", self.name, skin.attrib_type)));
      }
      if skin.num_value_per_index == 0 || skin.values.len() % skin.num_value_per_index as usize != 0 {
        return Err(HalaSceneError::invalid_input(&format!(
          "Mesh \"{}\" {:?} channel has {} values, not a multiple of {}.",
          self.name, skin.attrib_type, skin.values.len(), skin.num_value_per_index)));
      }
      channels.push(HalaChannelRef {
        attrib_type: skin.attrib_type,
        indices: &skin.indices,
        value_count: skin.value_count(),
        num_value_per_index: skin.num_value_per_index,
      });
    }
    Ok(channels)
  }

  /// Describe the counts of this mesh for the layout planner.
  /// Only existing channels are described.
  /// return: The mesh layout description.
  pub fn layout_desc(&self) -> Result<HalaMeshLayoutDesc, HalaSceneError> {
    let channels = self.channels()?
      .into_iter()
      .map(|channel| HalaChannelLayoutDesc {
        attrib_type: channel.attrib_type,
        index_count: channel.indices.len(),
        value_count: channel.value_count,
        num_value_per_index: channel.num_value_per_index,
      })
      .collect();

    Ok(HalaMeshLayoutDesc {
      face_count: self.faces.len(),
      channels,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn narrowing_keeps_component_order() {
    let src = [DVec4::new(0.1, 0.2, 0.3, 0.4), DVec4::new(1.0, 2.0, 3.0, 4.0)];
    let mut dst = [0.0f32; 8];
    narrow_values(&src, &mut dst);
    assert_eq!(dst, [0.1f64 as f32, 0.2f64 as f32, 0.3f64 as f32, 0.4f64 as f32, 1.0, 2.0, 3.0, 4.0]);
  }

  #[test]
  #[should_panic]
  fn narrowing_rejects_mismatched_destination() {
    let src = [DVec2::new(1.0, 2.0)];
    let mut dst = [0.0f32; 3];
    narrow_values(&src, &mut dst);
  }

  #[test]
  fn layout_desc_lists_existing_channels_only() {
    let mut mesh = HalaSourceMesh::new(HalaMeshId(1), "quad");
    mesh.faces = vec![
      HalaSourceFace { index_begin: 0, num_indices: 3 },
      HalaSourceFace { index_begin: 3, num_indices: 3 },
    ];
    mesh.positions = Some(HalaVertexChannel::new(vec![DVec3::ZERO; 4], vec![0, 1, 2, 0, 2, 3]));
    mesh.uv_sets.push(HalaVertexChannel::new(vec![DVec2::ZERO; 4], vec![0, 1, 2, 0, 2, 3]));
    mesh.uv_sets.push(HalaVertexChannel::new(vec![DVec2::ONE; 1], vec![0; 6]));

    let desc = mesh.layout_desc().unwrap();
    assert_eq!(mesh.num_of_channels(), 3);
    assert_eq!(desc.face_count, 2);
    assert_eq!(desc.channels.len(), 3);
    assert_eq!(desc.channels[2].value_count, 1);
    assert_eq!(desc.channels[2].num_value_per_index, 2);
  }

  #[test]
  fn skin_channel_must_divide_by_arity() {
    let mut mesh = HalaSourceMesh::new(HalaMeshId(2), "skinned");
    mesh.skin_channels.push(HalaSkinChannel {
      attrib_type: HalaVertexAttribType::Weights,
      num_value_per_index: 4,
      values: vec![1.0; 6],
      indices: vec![0, 0, 0],
    });
    assert!(mesh.layout_desc().is_err());

    mesh.skin_channels[0].values = vec![0.25; 8];
    let desc = mesh.layout_desc().unwrap();
    assert_eq!(desc.channels[0].value_count, 2);
  }
}
