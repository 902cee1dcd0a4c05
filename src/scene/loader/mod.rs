pub mod gltf_loader;
pub mod importer;

pub use gltf_loader::HalaGltfLoader;
pub use importer::{
  HalaIdentityLookup,
  HalaSceneImporter,
};
