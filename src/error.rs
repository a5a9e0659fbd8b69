//! Error types for scene setup, assets and GPU initialization.

use thiserror::Error;

/// Failures while bringing up or driving the wgpu backend.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(String),

    #[error("Failed to find suitable GPU adapter")]
    AdapterNotFound,

    #[error("Failed to request device: {0}")]
    DeviceRequest(String),

    #[error("Surface texture error: {0}")]
    SurfaceTexture(#[from] wgpu::SurfaceError),
}

/// Problems with the loaded boat model hierarchy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("Model has no node named '{0}'")]
    MissingNode(String),

    #[error("Node '{0}' has no bounding box")]
    MissingBounds(String),

    #[error("Node '{0}' has no mesh")]
    MissingMesh(String),

    #[error("Asset loader disconnected before delivering a model")]
    LoaderDisconnected,
}

/// Rejected parameter sets, reported once at scene construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name}: minimum {min} exceeds maximum {max}")]
    InvertedRange { name: &'static str, min: f32, max: f32 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must lie in [{lo}, {hi}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        lo: f32,
        hi: f32,
    },
}
