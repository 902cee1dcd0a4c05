pub mod directory;
pub mod layout;
pub mod arena;
pub mod view;
pub mod storage;
pub mod cpu;
pub mod loader;

pub use directory::{
  HalaAttributeInfo,
  HalaFace,
  HalaMeshInfo,
  HalaNode,
  HalaVertexAttribType,
  INVALID_INDEX,
};
pub use layout::{
  align_up,
  HalaChannelLayoutDesc,
  HalaLayoutPlanner,
  HalaMeshLayoutDesc,
  HalaSceneLayout,
};
pub use arena::HalaArena;
pub use view::{
  HalaAttributeView,
  HalaAttributeViewMut,
  HalaFaceView,
  HalaFaceViewMut,
  HalaMeshView,
  HalaSceneView,
};
pub use storage::{
  HalaSceneStorage,
  HalaSceneStorageBuilder,
};
