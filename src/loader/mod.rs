//! Scene asset loading
//!
//! [`AssetLoader`] reads one glTF/GLB file with progress reporting and hands
//! back a [`LoadedAsset`]: the scene node plus any embedded cameras.

pub mod asset_loader;
pub mod gltf_import;

#[cfg(test)]
pub(crate) mod test_assets;

pub use asset_loader::{read_with_progress, AssetLoader, LoadEvent, LoadProgress};
pub use gltf_import::{import_bytes, LoadedAsset};
