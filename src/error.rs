//! Error types for asset loading
//!
//! A failed load is the only error the viewer recognises. It is reported once
//! through the load callbacks, logged, and never retried.

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while fetching and parsing a scene asset
#[derive(Debug, Error)]
pub enum AssetLoadError {
    /// The asset file could not be opened or read
    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a valid glTF/GLB document or its buffers are unavailable
    #[error("failed to parse glTF asset")]
    Parse(#[from] gltf::Error),

    /// The document contains no scene to display
    #[error("asset contains no scene")]
    NoScene,

    /// The node graph is not a forest: a node is reachable twice from the scene
    #[error("node {node} appears more than once in the scene hierarchy")]
    InvalidHierarchy { node: usize },

    /// The loader thread panicked before producing a result
    #[error("asset loader panicked: {0}")]
    Panicked(String),

    /// A primitive could not be turned into a triangle mesh
    #[error("mesh `{mesh}` primitive {primitive}: {reason}")]
    InvalidPrimitive {
        mesh: String,
        primitive: usize,
        reason: &'static str,
    },
}

impl AssetLoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Human-readable one-line message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The chain of underlying causes, outermost first.
    ///
    /// Empty when the error has no source.
    pub fn details(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = self.source();
        while let Some(cause) = current {
            chain.push(cause.to_string());
            current = cause.source();
        }
        chain
    }
}
