//! Small glTF documents with embedded buffers, shared by tests

/// One triangle in the XY plane under a parent node translated by +2 on Y.
/// No cameras.
pub const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "name": "Triangle", "nodes": [0] } ],
  "nodes": [
    { "name": "Parent", "translation": [0.0, 2.0, 0.0], "children": [1] },
    { "name": "Child", "mesh": 0 }
  ],
  "meshes": [
    { "name": "Tri", "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ] }
  ],
  "materials": [
    { "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.5, 0.25, 1.0] } }
  ],
  "buffers": [
    { "byteLength": 44, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA=" }
  ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

/// No geometry, three cameras. Camera 0 ("A") is referenced by the last
/// node, camera 1 ("B") by the first, camera 2 is orthographic and unplaced.
pub const CAMERAS_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0, 1] } ],
  "nodes": [
    { "name": "CamB", "camera": 1, "translation": [0.0, 0.0, 10.0] },
    { "name": "CamA", "camera": 0, "translation": [0.0, 0.0, 20.0] }
  ],
  "cameras": [
    { "name": "A", "type": "perspective", "perspective": { "yfov": 0.5, "znear": 0.1, "zfar": 100.0 } },
    { "name": "B", "type": "perspective", "perspective": { "yfov": 1.0, "znear": 0.1 } },
    { "name": "C", "type": "orthographic", "orthographic": { "xmag": 2.0, "ymag": 2.0, "znear": 0.1, "zfar": 50.0 } }
  ]
}"#;

/// A document without any scene
pub const EMPTY_GLTF: &str = r#"{ "asset": { "version": "2.0" } }"#;

/// A node that lists itself as its own child
pub const CYCLIC_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "name": "loop", "children": [0] } ]
}"#;
