use thiserror::Error;

/// The kind of the error of the hala-scene-storage crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalaSceneErrorKind {
  /// An offset, a count or the total arena size does not fit the 32-bit representation.
  SizeOverflow,
  /// The configured alignment is not a power of two or is too small.
  InvalidAlignment,
  /// The source scene violates an input contract.
  InvalidInput,
  /// The import configuration could not be parsed.
  Config,
  /// A file could not be read.
  Io,
  /// The glTF document could not be imported.
  Gltf,
}

/// The error type of the hala-scene-storage crate.
#[derive(Error, Debug)]
pub struct HalaSceneError {
  kind: HalaSceneErrorKind,
  msg: String,
  #[source]
  source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// The implementation of the error type of the hala-scene-storage crate.
impl HalaSceneError {
  /// Create a new error.
  /// param kind: The kind of the error.
  /// param msg: The message of the error.
  /// param source: The source of the error.
  /// return: The error.
  pub fn new(kind: HalaSceneErrorKind, msg: &str, source: Option<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Self {
      kind,
      msg: msg.to_string(),
      source,
    }
  }

  /// Create a new size overflow error.
  pub fn size_overflow(msg: &str) -> Self {
    Self::new(HalaSceneErrorKind::SizeOverflow, msg, None)
  }

  /// Create a new invalid input error.
  pub fn invalid_input(msg: &str) -> Self {
    Self::new(HalaSceneErrorKind::InvalidInput, msg, None)
  }

  pub fn kind(&self) -> HalaSceneErrorKind {
    self.kind
  }

  pub fn message(&self) -> &str {
    &self.msg
  }
}

impl std::convert::From<std::io::Error> for HalaSceneError {
  fn from(err: std::io::Error) -> Self {
    Self {
      kind: HalaSceneErrorKind::Io,
      msg: err.to_string(),
      source: Some(Box::new(err)),
    }
  }
}

impl std::convert::From<gltf::Error> for HalaSceneError {
  fn from(err: gltf::Error) -> Self {
    Self {
      kind: HalaSceneErrorKind::Gltf,
      msg: err.to_string(),
      source: Some(Box::new(err)),
    }
  }
}

/// The implementation Display trait for the error type of the hala-scene-storage crate.
impl std::fmt::Display for HalaSceneError {
  /// Format the error.
  /// param f: The formatter.
  /// return: The result.
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.msg)
  }
}
