//! Converts a parsed glTF document into a scene node and its cameras
//!
//! The node hierarchy of the default scene is flattened: every triangle
//! primitive becomes one [`Mesh`] whose vertices are already in the scene's
//! coordinate space. Cameras keep the world placement of the node that
//! references them.

use std::path::Path;

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, Quaternion, Rad, SquareMatrix, Vector3};
use log::{debug, warn};

use crate::error::AssetLoadError;
use crate::gfx::camera::scene_camera::{SceneCamera, INFINITE_FAR_FALLBACK};
use crate::gfx::scene::object::{Mesh, SceneNode};
use crate::gfx::scene::vertex::Vertex3D;

/// Result of a successful load
pub struct LoadedAsset {
    pub node: SceneNode,
    /// Embedded cameras in document order
    pub cameras: Vec<SceneCamera>,
}

impl std::fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedAsset")
            .field("node", &self.node.name)
            .field("meshes", &self.node.meshes.len())
            .field("cameras", &self.cameras.len())
            .finish()
    }
}

/// Parses glTF JSON or binary GLB bytes.
///
/// `base_dir` resolves external buffer URIs; embedded and data-URI buffers
/// need none.
pub fn import_bytes(bytes: &[u8], base_dir: Option<&Path>) -> Result<LoadedAsset, AssetLoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base_dir, blob)?;
    build_asset(&document, &buffers)
}

fn build_asset(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<LoadedAsset, AssetLoadError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetLoadError::NoScene)?;

    let mut meshes = Vec::new();
    // first world transform seen for each camera index
    let mut camera_transforms: Vec<Option<Matrix4<f32>>> = vec![None; document.cameras().len()];

    // the crate accepts cyclic `children`, so every node may be entered once
    let mut visited = vec![false; document.nodes().len()];
    let mut stack: Vec<(gltf::Node, Matrix4<f32>)> = scene
        .nodes()
        .map(|node| (node, Matrix4::identity()))
        .collect();
    stack.reverse();

    while let Some((node, parent)) = stack.pop() {
        let seen = visited
            .get_mut(node.index())
            .ok_or(AssetLoadError::InvalidHierarchy { node: node.index() })?;
        if *seen {
            return Err(AssetLoadError::InvalidHierarchy { node: node.index() });
        }
        *seen = true;

        let world = parent * Matrix4::from(node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            collect_mesh(&mesh, world, buffers, &mut meshes)?;
        }
        if let Some(camera) = node.camera() {
            let slot = &mut camera_transforms[camera.index()];
            if slot.is_none() {
                *slot = Some(world);
            }
        }

        let children: Vec<_> = node.children().map(|child| (child, world)).collect();
        stack.extend(children.into_iter().rev());
    }

    let cameras = document
        .cameras()
        .map(|camera| {
            let transform = camera_transforms[camera.index()].unwrap_or_else(Matrix4::identity);
            build_camera(&camera, transform)
        })
        .collect();

    let name = scene
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("scene_{}", scene.index()));

    Ok(LoadedAsset {
        node: SceneNode::new(name, meshes),
        cameras,
    })
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<Mesh>,
) -> Result<(), AssetLoadError> {
    let mesh_name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
    let normal_matrix = normal_matrix(world);

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            warn!(
                "Skipping {:?} primitive {} of mesh `{}`",
                primitive.mode(),
                primitive.index(),
                mesh_name
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or(AssetLoadError::InvalidPrimitive {
                mesh: mesh_name.clone(),
                primitive: primitive.index(),
                reason: "POSITION accessor missing or out of bounds",
            })?
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if indices.len() % 3 != 0 || indices.iter().any(|&i| i as usize >= positions.len()) {
            return Err(AssetLoadError::InvalidPrimitive {
                mesh: mesh_name,
                primitive: primitive.index(),
                reason: "index buffer does not describe triangles",
            });
        }

        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => Mesh::calculate_vertex_normals(&positions, &indices),
        };
        if normals.len() != positions.len() {
            return Err(AssetLoadError::InvalidPrimitive {
                mesh: mesh_name,
                primitive: primitive.index(),
                reason: "NORMAL count differs from POSITION count",
            });
        }

        let color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        let vertices = positions
            .iter()
            .zip(&normals)
            .map(|(position, normal)| {
                let p = world * Vector3::from(*position).extend(1.0);
                let n = normal_matrix * Vector3::from(*normal);
                let n = if n.magnitude2() > 0.0 { n.normalize() } else { n };
                Vertex3D {
                    position: [p.x, p.y, p.z],
                    normal: n.into(),
                    color,
                }
            })
            .collect();

        debug!(
            "Mesh `{}` primitive {}: {} vertices, {} triangles",
            mesh_name,
            primitive.index(),
            positions.len(),
            indices.len() / 3
        );
        out.push(Mesh::new(vertices, indices));
    }
    Ok(())
}

/// Inverse transpose of the upper 3x3, for transforming normals
fn normal_matrix(world: Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    upper
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(upper)
}

fn build_camera(camera: &gltf::Camera, world: Matrix4<f32>) -> SceneCamera {
    let mut scene_camera = match camera.projection() {
        gltf::camera::Projection::Perspective(perspective) => SceneCamera::perspective(
            Rad(perspective.yfov()).into(),
            perspective.aspect_ratio().unwrap_or(1.0),
            perspective.znear(),
            perspective.zfar().unwrap_or(INFINITE_FAR_FALLBACK),
        ),
        gltf::camera::Projection::Orthographic(orthographic) => SceneCamera::orthographic(
            orthographic.xmag(),
            orthographic.ymag(),
            orthographic.znear(),
            orthographic.zfar(),
        ),
    };

    if let Some(name) = camera.name() {
        scene_camera.name = Some(name.to_string());
    }

    scene_camera.position = world.w.truncate();
    let x = world.x.truncate();
    let y = world.y.truncate();
    let z = world.z.truncate();
    if x.magnitude2() > 0.0 && y.magnitude2() > 0.0 && z.magnitude2() > 0.0 {
        let rotation = Matrix3::from_cols(x.normalize(), y.normalize(), z.normalize());
        scene_camera.rotation = Quaternion::from(rotation).normalize();
    }
    scene_camera
}
