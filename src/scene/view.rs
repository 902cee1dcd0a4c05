use super::arena::HalaArena;
use super::directory::{
  HalaAttributeInfo,
  HalaFace,
  HalaMeshInfo,
  HalaNode,
  HalaVertexAttribType,
};

/// The faces of a mesh.
/// Views borrow the arena, so they cannot outlive it or survive a resize.
#[derive(Debug, Clone, Copy)]
pub struct HalaFaceView<'a> {
  pub faces: &'a [HalaFace],
}

/// The mutable faces of a mesh.
#[derive(Debug)]
pub struct HalaFaceViewMut<'a> {
  pub faces: &'a mut [HalaFace],
}

/// The index and value arrays of one attribute channel.
#[derive(Debug, Clone, Copy)]
pub struct HalaAttributeView<'a> {
  pub indices: &'a [u32],
  pub values: &'a [f32],
  pub num_value_per_index: usize,
}

/// The mutable index and value arrays of one attribute channel.
#[derive(Debug)]
pub struct HalaAttributeViewMut<'a> {
  pub indices: &'a mut [u32],
  pub values: &'a mut [f32],
  pub num_value_per_index: usize,
}

/// The attribute descriptors of a mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalaMeshView<'a> {
  pub attrib_infos: &'a [HalaAttributeInfo],
}

/// The node and mesh directories of a scene.
#[derive(Debug, Clone, Copy)]
pub struct HalaSceneView<'a> {
  pub nodes: &'a [HalaNode],
  pub mesh_infos: &'a [HalaMeshInfo],
}

/// Project the faces of a mesh.
/// param arena: The arena.
/// param mesh_info: The mesh info.
/// return: The face view.
pub fn face_view<'a>(arena: &'a HalaArena, mesh_info: &HalaMeshInfo) -> HalaFaceView<'a> {
  HalaFaceView {
    faces: arena.slice(mesh_info.face_offset, mesh_info.face_count),
  }
}

/// Project the mutable faces of a mesh.
/// param arena: The arena.
/// param mesh_info: The mesh info.
/// return: The mutable face view.
pub fn face_view_mut<'a>(arena: &'a mut HalaArena, mesh_info: &HalaMeshInfo) -> HalaFaceViewMut<'a> {
  HalaFaceViewMut {
    faces: arena.slice_mut(mesh_info.face_offset, mesh_info.face_count),
  }
}

/// Project the index and value arrays of an attribute.
/// param arena: The arena.
/// param attrib_info: The attribute info.
/// return: The attribute view.
pub fn attribute_view<'a>(arena: &'a HalaArena, attrib_info: &HalaAttributeInfo) -> HalaAttributeView<'a> {
  HalaAttributeView {
    indices: arena.slice(attrib_info.index_offset, attrib_info.index_count),
    values: arena.slice(attrib_info.value_offset, attrib_info.num_of_floats() as u32),
    num_value_per_index: attrib_info.num_value_per_index as usize,
  }
}

/// Project the mutable index and value arrays of an attribute.
/// The planner always places the index array before the value array.
/// param arena: The arena.
/// param attrib_info: The attribute info.
/// return: The mutable attribute view.
pub fn attribute_view_mut<'a>(arena: &'a mut HalaArena, attrib_info: &HalaAttributeInfo) -> HalaAttributeViewMut<'a> {
  let (indices, values) = arena.split_mut(
    (attrib_info.index_offset, attrib_info.index_count),
    (attrib_info.value_offset, attrib_info.num_of_floats() as u32),
  );
  HalaAttributeViewMut {
    indices,
    values,
    num_value_per_index: attrib_info.num_value_per_index as usize,
  }
}

/// Project the attribute descriptors of a mesh.
/// param attrib_infos: The attribute directory of the scene.
/// param mesh_info: The mesh info.
/// return: The mesh view.
pub fn mesh_view<'a>(attrib_infos: &'a [HalaAttributeInfo], mesh_info: &HalaMeshInfo) -> HalaMeshView<'a> {
  let start = mesh_info.attribute_start as usize;
  let end = start + mesh_info.attribute_count as usize;
  HalaMeshView {
    attrib_infos: &attrib_infos[start..end],
  }
}

impl<'a> HalaFaceView<'a> {
  pub fn len(&self) -> usize {
    self.faces.len()
  }

  pub fn is_empty(&self) -> bool {
    self.faces.is_empty()
  }

  /// Iterate the corner ranges of all faces.
  pub fn corner_ranges(&self) -> impl Iterator<Item = std::ops::Range<usize>> + 'a {
    let faces = self.faces;
    faces.iter().map(|face| {
      let begin = face.indices_begin as usize;
      begin..begin + face.num_of_indices as usize
    })
  }
}

impl<'a> HalaAttributeView<'a> {
  /// Get the number of distinct values.
  pub fn num_of_values(&self) -> usize {
    if self.num_value_per_index == 0 {
      0
    } else {
      self.values.len() / self.num_value_per_index
    }
  }

  /// Get the components of a distinct value.
  /// param value_index: The index of the value.
  /// return: The components.
  pub fn value(&self, value_index: usize) -> &'a [f32] {
    let values = self.values;
    let start = value_index * self.num_value_per_index;
    &values[start..start + self.num_value_per_index]
  }

  /// Get the components of the value referenced by a corner.
  /// param corner: The corner position in the index array.
  /// return: The components.
  pub fn corner_value(&self, corner: usize) -> &'a [f32] {
    self.value(self.indices[corner] as usize)
  }
}

impl<'a> HalaMeshView<'a> {
  pub fn len(&self) -> usize {
    self.attrib_infos.len()
  }

  pub fn is_empty(&self) -> bool {
    self.attrib_infos.is_empty()
  }

  /// Find the Nth channel of a type.
  /// param attrib_type: The attribute type.
  /// param set: The set number within the type, 0 for single channels.
  /// return: The attribute info if the channel exists.
  pub fn find(&self, attrib_type: HalaVertexAttribType, set: usize) -> Option<&'a HalaAttributeInfo> {
    let attrib_infos = self.attrib_infos;
    attrib_infos.iter()
      .filter(|info| info.try_attrib_type() == Some(attrib_type))
      .nth(set)
  }

  /// Count the channels of a type.
  pub fn count(&self, attrib_type: HalaVertexAttribType) -> usize {
    self.attrib_infos.iter().filter(|info| info.try_attrib_type() == Some(attrib_type)).count()
  }
}
