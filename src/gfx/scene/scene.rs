use wgpu::Device;

use super::light::Lighting;
use super::object::SceneNode;
use crate::config::LightingConfig;

/// Scene graph root: the fixed light rig plus every node added to it
pub struct Scene {
    pub lighting: Lighting,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// Creates an empty scene lit by one ambient and one directional light
    pub fn new(lighting: &LightingConfig) -> Self {
        Self {
            lighting: Lighting::from(lighting),
            nodes: Vec::new(),
        }
    }

    /// Adds a node to the root. Nodes are never removed.
    pub fn add(&mut self, node: SceneNode) -> &mut SceneNode {
        self.nodes.push(node);
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    /// Uploads every node that has no GPU resources yet
    pub fn init_gpu_resources(&mut self, device: &Device, transform_layout: &wgpu::BindGroupLayout) {
        for node in self.nodes.iter_mut().filter(|n| n.gpu_resources.is_none()) {
            node.init_gpu_resources(device, transform_layout);
        }
    }

    /// Syncs node transforms to the GPU
    pub fn update_transforms(&self, queue: &wgpu::Queue) {
        for node in &self.nodes {
            node.update_transform(queue);
        }
    }

    /// Gets the total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Gets statistics about the scene
    pub fn statistics(&self) -> SceneStatistics {
        SceneStatistics {
            node_count: self.nodes.len(),
            mesh_count: self.nodes.iter().map(|n| n.meshes.len()).sum(),
            total_triangles: self.nodes.iter().map(SceneNode::triangle_count).sum(),
            total_vertices: self.nodes.iter().map(SceneNode::vertex_count).sum(),
        }
    }
}

/// Scene statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub mesh_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}
