//! # Scene Management Module
//!
//! The scene graph root, the nodes loaded into it, and the fixed light rig.
//!
//! ## Key Components
//!
//! - [`Scene`] - Root container owning lights and nodes
//! - [`SceneNode`] - A loaded asset with its meshes and transform
//! - [`Mesh`] - Triangle mesh with lazily created GPU buffers
//! - [`Vertex3D`] - GPU vertex format
//!
//! Nodes are added once after a successful load and stay for the life of the
//! process. GPU buffers are created by [`Scene::init_gpu_resources`] once a
//! device exists.

pub mod light;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use light::{AmbientLight, DirectionalLight, Lighting};
pub use object::{DrawObject, Mesh, SceneNode};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
