use bytemuck::{
  Pod,
  Zeroable,
};
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
};

/// The sentinel index meaning "no such reference".
pub const INVALID_INDEX: u32 = u32::MAX;

/// The vertex attribute type.
/// The discriminants are single-bit flags to stay binary compatible with existing consumers,
/// but an attribute always carries exactly one type.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HalaVertexAttribType {
  Position = 1 << 0,
  Normal = 1 << 1,
  Tangent = 1 << 2,
  BiTangent = 1 << 3,
  TexCoord = 1 << 4,
  Color = 1 << 5,
  Joints = 1 << 6,
  Weights = 1 << 7,
  Blendshape = 1 << 8,
}

/// The implementation of the vertex attribute type.
impl HalaVertexAttribType {
  /// All attribute types in the canonical layout order.
  pub const CANONICAL_ORDER: [HalaVertexAttribType; 9] = [
    Self::Position,
    Self::Normal,
    Self::Tangent,
    Self::BiTangent,
    Self::TexCoord,
    Self::Color,
    Self::Joints,
    Self::Weights,
    Self::Blendshape,
  ];

  /// Get the attribute type from the raw flag value.
  /// param bits: The raw flag value.
  /// return: The attribute type or None if the value is not exactly one known flag.
  pub fn from_bits(bits: u32) -> Option<Self> {
    Self::CANONICAL_ORDER.into_iter().find(|t| *t as u32 == bits)
  }

  /// Get the position of this type in the canonical layout order.
  pub fn canonical_rank(self) -> u32 {
    (self as u32).trailing_zeros()
  }

  /// Whether a mesh may carry more than one channel of this type.
  pub fn allows_multiple_sets(self) -> bool {
    !matches!(self, Self::Position | Self::Normal | Self::Tangent | Self::BiTangent)
  }

  /// Get the fixed number of components of this type.
  /// return: The number of components, or None for variable arity types.
  pub fn fixed_num_value_per_index(self) -> Option<u8> {
    match self {
      Self::Position | Self::Normal | Self::Tangent | Self::BiTangent => Some(3),
      Self::TexCoord => Some(2),
      Self::Color => Some(4),
      Self::Joints | Self::Weights | Self::Blendshape => None,
    }
  }
}

/// Accept only a raw flag that names exactly one attribute type.
fn deserialize_attrib_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
  let bits = u32::deserialize(deserializer)?;
  HalaVertexAttribType::from_bits(bits)
    .map(|attrib_type| attrib_type as u32)
    .ok_or_else(|| serde::de::Error::custom(format!("invalid attribute type flag {:#x}", bits)))
}

/// A node of the scene hierarchy.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct HalaNode {
  pub parent: u32,
  /// Column-major 4x4 local transform.
  pub transform: [f32; 16],
  pub mesh_index: u32,
}

/// The default implementation of the node.
impl Default for HalaNode {
  fn default() -> Self {
    Self {
      parent: INVALID_INDEX,
      transform: glam::Mat4::IDENTITY.to_cols_array(),
      mesh_index: INVALID_INDEX,
    }
  }
}

impl HalaNode {
  pub fn is_root(&self) -> bool {
    self.parent == INVALID_INDEX
  }

  pub fn has_mesh(&self) -> bool {
    self.mesh_index != INVALID_INDEX
  }

  /// Get the local transform as a matrix.
  pub fn local_transform(&self) -> glam::Mat4 {
    glam::Mat4::from_cols_array(&self.transform)
  }
}

/// The location of a mesh's faces and attribute descriptors.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct HalaMeshInfo {
  /// Byte offset of the face array in the arena.
  pub face_offset: u32,
  pub face_count: u32,
  /// Index of the first attribute descriptor of this mesh in the attribute directory.
  pub attribute_start: u32,
  pub attribute_count: u32,
}

/// A face as a range of corners in the per-channel index arrays.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct HalaFace {
  pub indices_begin: u32,
  pub num_of_indices: u32,
}

/// The location and shape of one vertex attribute channel.
/// All records of a directory are plain old data, so the whole directory can be handed over as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct HalaAttributeInfo {
  /// Byte offset of the u32 index array.
  pub index_offset: u32,
  /// Byte offset of the f32 value array.
  pub value_offset: u32,
  /// The raw flag of the attribute type.
  #[serde(deserialize_with = "deserialize_attrib_type")]
  attrib_type: u32,
  pub index_count: u32,
  pub value_count: u32,
  /// 3 for vector3, max bones for joints and weights, 3 * max blendshapes for blendshapes.
  pub num_value_per_index: u8,
  #[serde(skip)]
  _padding: [u8; 3],
}

/// The implementation of the attribute info.
impl HalaAttributeInfo {
  /// Create a new attribute info without placement.
  /// param attrib_type: The attribute type.
  /// param index_count: The number of indices.
  /// param value_count: The number of distinct values.
  /// param num_value_per_index: The number of f32 components of one value.
  /// return: The attribute info.
  pub fn new(attrib_type: HalaVertexAttribType, index_count: u32, value_count: u32, num_value_per_index: u8) -> Self {
    Self {
      index_offset: 0,
      value_offset: 0,
      attrib_type: attrib_type as u32,
      index_count,
      value_count,
      num_value_per_index,
      _padding: [0; 3],
    }
  }

  /// Get the attribute type.
  /// Panics on an unknown flag, use `try_attrib_type` for records cast from foreign bytes.
  pub fn attrib_type(&self) -> HalaVertexAttribType {
    match self.try_attrib_type() {
      Some(attrib_type) => attrib_type,
      None => panic!("Invalid attribute type flag {:#x}.", self.attrib_type),
    }
  }

  /// Get the attribute type.
  /// return: The attribute type or None if the raw flag is not exactly one known flag.
  pub fn try_attrib_type(&self) -> Option<HalaVertexAttribType> {
    HalaVertexAttribType::from_bits(self.attrib_type)
  }

  /// Get the number of f32 elements in the value array.
  pub fn num_of_floats(&self) -> usize {
    self.value_count as usize * self.num_value_per_index as usize
  }

  /// Get the byte size of the index array.
  pub fn index_bytes(&self) -> usize {
    self.index_count as usize * std::mem::size_of::<u32>()
  }

  /// Get the byte size of the value array.
  pub fn value_bytes(&self) -> usize {
    self.num_of_floats() * std::mem::size_of::<f32>()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn record_sizes_are_stable() {
    assert_eq!(std::mem::size_of::<HalaNode>(), 72);
    assert_eq!(std::mem::size_of::<HalaMeshInfo>(), 16);
    assert_eq!(std::mem::size_of::<HalaFace>(), 8);
    assert_eq!(std::mem::size_of::<HalaAttributeInfo>(), 24);
  }

  #[test]
  fn attrib_type_flags() {
    assert_eq!(HalaVertexAttribType::from_bits(1 << 4), Some(HalaVertexAttribType::TexCoord));
    assert_eq!(HalaVertexAttribType::from_bits(0b11), None);
    assert_eq!(HalaVertexAttribType::from_bits(0), None);
    assert_eq!(HalaVertexAttribType::Position.canonical_rank(), 0);
    assert_eq!(HalaVertexAttribType::Blendshape.canonical_rank(), 8);
    assert!(HalaVertexAttribType::Color.allows_multiple_sets());
    assert!(!HalaVertexAttribType::Normal.allows_multiple_sets());
  }

  #[test]
  fn default_node_uses_sentinels() {
    let node = HalaNode::default();
    assert!(node.is_root());
    assert!(!node.has_mesh());
    assert_eq!(node.local_transform(), glam::Mat4::IDENTITY);
  }

  #[test]
  fn zeroed_record_has_no_type() {
    let info: HalaAttributeInfo = bytemuck::Zeroable::zeroed();
    assert_eq!(info.try_attrib_type(), None);

    let mut bytes = [0u8; 24];
    bytes[8..12].copy_from_slice(&(1u32 << 5).to_ne_bytes());
    let info: HalaAttributeInfo = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(info.try_attrib_type(), Some(HalaVertexAttribType::Color));
  }

  #[test]
  fn deserialize_rejects_unknown_type_flag() {
    let record = |attrib_type: u32| format!(
      r#"{{"index_offset":0,"value_offset":16,"attrib_type":{},"index_count":3,"value_count":3,"num_value_per_index":3}}"#,
      attrib_type,
    );
    assert!(serde_json::from_str::<HalaAttributeInfo>(&record(3)).is_err());
    assert!(serde_json::from_str::<HalaAttributeInfo>(&record(0)).is_err());

    let info = serde_json::from_str::<HalaAttributeInfo>(&record(1)).unwrap();
    assert_eq!(info.attrib_type(), HalaVertexAttribType::Position);
    let round_trip = serde_json::to_string(&info).unwrap();
    assert_eq!(serde_json::from_str::<HalaAttributeInfo>(&round_trip).unwrap(), info);
  }

  #[test]
  fn attribute_info_sizes() {
    let info = HalaAttributeInfo::new(HalaVertexAttribType::Color, 6, 4, 4);
    assert_eq!(info.attrib_type(), HalaVertexAttribType::Color);
    assert_eq!(info.num_of_floats(), 16);
    assert_eq!(info.index_bytes(), 24);
    assert_eq!(info.value_bytes(), 64);
  }
}
