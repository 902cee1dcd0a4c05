pub mod node;
pub mod mesh;
pub mod scene;

pub use node::{
  HalaNodeId,
  HalaSourceNode,
};
pub use mesh::{
  HalaChannelRef,
  HalaChannelValue,
  HalaMeshId,
  HalaSkinChannel,
  HalaSourceFace,
  HalaSourceMesh,
  HalaVertexChannel,
};
pub use scene::HalaScene;
