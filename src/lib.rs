pub mod prelude;
pub mod error;
pub mod config;
pub mod scene;
