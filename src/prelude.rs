pub use crate::error::{
  HalaSceneError,
  HalaSceneErrorKind,
};
pub use crate::config::HalaImportConfig;
pub use crate::scene::{
  HalaAttributeInfo,
  HalaFace,
  HalaMeshInfo,
  HalaNode,
  HalaVertexAttribType,
  INVALID_INDEX,
  HalaLayoutPlanner,
  HalaSceneStorage,
  HalaSceneStorageBuilder,
};
pub use crate::scene::cpu::{
  HalaMeshId,
  HalaNodeId,
  HalaScene,
  HalaSkinChannel,
  HalaSourceFace,
  HalaSourceMesh,
  HalaSourceNode,
  HalaVertexChannel,
};
pub use crate::scene::loader::{
  HalaGltfLoader,
  HalaSceneImporter,
};
