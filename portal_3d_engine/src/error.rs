//! Error types for the Portal3D engine
//!
//! Errors only come out of resource creation (textures, pipelines, command
//! lists) and shader linking. The per-frame path degrades instead of failing:
//! see `Composer::render`.

use std::fmt;

/// Result type for Portal3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Portal3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (device, command recording, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, frame buffer, pass, etc.)
    InvalidResource(String),

    /// Shader stages could not be linked into a program
    ShaderLinkFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::ShaderLinkFailed(msg) => write!(f, "Shader link failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
