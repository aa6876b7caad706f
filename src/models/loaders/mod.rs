pub mod manifest_loader;

pub use manifest_loader::load_sources_manifest;
