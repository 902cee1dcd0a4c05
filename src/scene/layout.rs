use crate::error::{
  HalaSceneError,
  HalaSceneErrorKind,
};
use super::directory::{
  HalaAttributeInfo,
  HalaFace,
  HalaMeshInfo,
  HalaVertexAttribType,
  INVALID_INDEX,
};

/// The default alignment of every region in the arena.
pub const DEFAULT_ALIGNMENT: u32 = 16;

/// Round `x` up to a multiple of `a`.
/// param x: The value.
/// param a: The alignment, must be a power of two.
/// return: The aligned value.
pub fn align_up(x: u64, a: u64) -> u64 {
  assert!(a.is_power_of_two(), "Alignment {} is not a power of two.", a);
  (x + (a - 1)) & !(a - 1)
}

/// The counts of one vertex attribute channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalaChannelLayoutDesc {
  pub attrib_type: HalaVertexAttribType,
  pub index_count: usize,
  pub value_count: usize,
  pub num_value_per_index: u8,
}

/// The counts of one mesh.
/// Channels of the same type keep their source order, the Nth TexCoord channel is UV set N.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalaMeshLayoutDesc {
  pub face_count: usize,
  pub channels: Vec<HalaChannelLayoutDesc>,
}

/// The complete placement of a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalaSceneLayout {
  pub node_count: u32,
  pub mesh_infos: Vec<HalaMeshInfo>,
  pub attrib_infos: Vec<HalaAttributeInfo>,
  /// The number of bytes the arena must hold.
  pub total_size: u32,
}

/// The implementation of the scene layout.
impl HalaSceneLayout {
  /// Check that every region of the layout is aligned and lies inside the arena.
  /// Layouts from `HalaLayoutPlanner::plan` always pass, hand-built ones may not.
  /// return: The result.
  pub fn validate(&self) -> Result<(), HalaSceneError> {
    if self.node_count == INVALID_INDEX {
      return Err(HalaSceneError::invalid_input("The node count collides with the sentinel index."));
    }

    let total_size = self.total_size as u64;
    let check_region = |what: &str, offset: u32, len: u64| -> Result<u64, HalaSceneError> {
      if offset % DEFAULT_ALIGNMENT != 0 {
        return Err(HalaSceneError::invalid_input(
          &format!("The {} offset {} is not aligned to {}.", what, offset, DEFAULT_ALIGNMENT)));
      }
      let end = offset as u64 + len;
      if end > total_size {
        return Err(HalaSceneError::invalid_input(
          &format!("The {} region [{}, {}) exceeds the arena size {}.", what, offset, end, total_size)));
      }
      Ok(end)
    };

    for (mesh_idx, mesh_info) in self.mesh_infos.iter().enumerate() {
      let face_bytes = mesh_info.face_count as u64 * std::mem::size_of::<HalaFace>() as u64;
      check_region("face", mesh_info.face_offset, face_bytes)?;

      let attribute_end = mesh_info.attribute_start as u64 + mesh_info.attribute_count as u64;
      if attribute_end > self.attrib_infos.len() as u64 {
        return Err(HalaSceneError::invalid_input(&format!(
          "Mesh {} attributes [{}, {}) exceed the {} attribute records.",
          mesh_idx, mesh_info.attribute_start, attribute_end, self.attrib_infos.len())));
      }
    }

    for (attrib_idx, attrib_info) in self.attrib_infos.iter().enumerate() {
      if attrib_info.try_attrib_type().is_none() {
        return Err(HalaSceneError::invalid_input(&format!("Attribute {} has no valid type.", attrib_idx)));
      }
      let index_end = check_region("index", attrib_info.index_offset, attrib_info.index_bytes() as u64)?;
      check_region("value", attrib_info.value_offset, attrib_info.value_bytes() as u64)?;
      // The index array must end before the value array starts.
      if index_end > attrib_info.value_offset as u64 {
        return Err(HalaSceneError::invalid_input(&format!(
          "Attribute {} index array ends at {}, after its value array starts at {}.",
          attrib_idx, index_end, attrib_info.value_offset)));
      }
    }
    Ok(())
  }
}

/// The layout planner.
/// It only sees counts, so it runs to completion before any byte is written.
#[derive(Debug, Clone, Copy)]
pub struct HalaLayoutPlanner {
  alignment: u32,
}

/// The default implementation of the layout planner.
impl Default for HalaLayoutPlanner {
  fn default() -> Self {
    Self {
      alignment: DEFAULT_ALIGNMENT,
    }
  }
}

/// The implementation of the layout planner.
impl HalaLayoutPlanner {
  /// Create a new layout planner.
  /// param alignment: The alignment of every region, a power of two not less than 16.
  /// return: The layout planner.
  pub fn new(alignment: u32) -> Result<Self, HalaSceneError> {
    if !alignment.is_power_of_two() || alignment < DEFAULT_ALIGNMENT {
      return Err(HalaSceneError::new(
        HalaSceneErrorKind::InvalidAlignment,
        &format!("Alignment {} must be a power of two not less than {}.", alignment, DEFAULT_ALIGNMENT),
        None,
      ));
    }
    Ok(Self { alignment })
  }

  pub fn alignment(&self) -> u32 {
    self.alignment
  }

  /// Plan the placement of every mesh region.
  /// param node_count: The number of nodes in the scene.
  /// param meshes: The mesh counts in source order.
  /// return: The scene layout.
  pub fn plan(&self, node_count: usize, meshes: &[HalaMeshLayoutDesc]) -> Result<HalaSceneLayout, HalaSceneError> {
    let node_count = Self::to_index_count(node_count, "node")?;
    let _ = Self::to_index_count(meshes.len(), "mesh")?;

    let alignment = self.alignment as u64;
    let mut cursor = 0u64;
    let mut mesh_infos = Vec::with_capacity(meshes.len());
    let mut attrib_infos = Vec::new();

    for (mesh_idx, mesh) in meshes.iter().enumerate() {
      let face_count = Self::to_u32(mesh.face_count, "face count")?;
      let face_offset = Self::checked_offset(align_up(cursor, alignment))?;
      cursor = face_offset as u64 + face_count as u64 * std::mem::size_of::<HalaFace>() as u64;

      let channels = Self::canonical_channels(mesh_idx, &mesh.channels)?;
      let attribute_start = Self::to_index_count(attrib_infos.len(), "attribute")?;
      for channel in channels {
        let index_count = Self::to_u32(channel.index_count, "index count")?;
        let value_count = Self::to_u32(channel.value_count, "value count")?;
        let mut attrib_info = HalaAttributeInfo::new(
          channel.attrib_type,
          index_count,
          value_count,
          channel.num_value_per_index,
        );

        attrib_info.index_offset = Self::checked_offset(align_up(cursor, alignment))?;
        cursor = attrib_info.index_offset as u64 + attrib_info.index_bytes() as u64;
        attrib_info.value_offset = Self::checked_offset(align_up(cursor, alignment))?;
        cursor = attrib_info.value_offset as u64 + attrib_info.value_bytes() as u64;
        Self::checked_offset(cursor)?;

        log::debug!(
          "Planned mesh {} attribute {:?}: index_offset={}, index_count={}, value_offset={}, value_count={}.",
          mesh_idx, channel.attrib_type, attrib_info.index_offset, index_count, attrib_info.value_offset, value_count
        );
        attrib_infos.push(attrib_info);
      }
      let attribute_end = Self::to_index_count(attrib_infos.len(), "attribute")?;
      let attribute_count = attribute_end - attribute_start;

      log::debug!(
        "Planned mesh {}: face_offset={}, face_count={}, attribute_count={}.",
        mesh_idx, face_offset, face_count, attribute_count
      );
      mesh_infos.push(HalaMeshInfo {
        face_offset,
        face_count,
        attribute_start,
        attribute_count,
      });
    }

    let total_size = Self::checked_offset(cursor)?;
    Ok(HalaSceneLayout {
      node_count,
      mesh_infos,
      attrib_infos,
      total_size,
    })
  }

  /// Validate the channels of a mesh and sort them into the canonical order.
  /// The sort is stable so sets of the same type keep their source order.
  fn canonical_channels(
    mesh_idx: usize,
    channels: &[HalaChannelLayoutDesc],
  ) -> Result<Vec<HalaChannelLayoutDesc>, HalaSceneError> {
    let mut seen = 0u32;
    for channel in channels.iter() {
      let attrib_type = channel.attrib_type;
      if !attrib_type.allows_multiple_sets() && seen & attrib_type as u32 != 0 {
        return Err(HalaSceneError::invalid_input(
          &format!("Mesh {} has more than one {:?} channel.", mesh_idx, attrib_type)));
      }
      seen |= attrib_type as u32;

      if channel.num_value_per_index == 0 {
        return Err(HalaSceneError::invalid_input(
          &format!("Mesh {} {:?} channel has no components.", mesh_idx, attrib_type)));
      }
      if let Some(expected) = attrib_type.fixed_num_value_per_index() {
        if channel.num_value_per_index != expected {
          return Err(HalaSceneError::invalid_input(&format!(
            "Mesh {} {:?} channel has {} components, expected {}.",
            mesh_idx, attrib_type, channel.num_value_per_index, expected)));
        }
      }
    }

    let mut sorted = channels.to_vec();
    sorted.sort_by_key(|channel| channel.attrib_type.canonical_rank());
    Ok(sorted)
  }

  fn to_u32(value: usize, what: &str) -> Result<u32, HalaSceneError> {
    u32::try_from(value)
      .map_err(|_| HalaSceneError::size_overflow(&format!("The {} {} exceeds the 32-bit range.", what, value)))
  }

  /// Convert a sequence length, which must stay below the sentinel index.
  fn to_index_count(len: usize, what: &str) -> Result<u32, HalaSceneError> {
    match u32::try_from(len) {
      Ok(len) if len < INVALID_INDEX => Ok(len),
      _ => Err(HalaSceneError::size_overflow(
        &format!("The {} count {} collides with the sentinel index.", what, len))),
    }
  }

  fn checked_offset(offset: u64) -> Result<u32, HalaSceneError> {
    u32::try_from(offset)
      .map_err(|_| HalaSceneError::size_overflow(&format!("The arena offset {} exceeds the 32-bit range.", offset)))
  }
}
