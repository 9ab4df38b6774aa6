//! Error types for the AR compositor
//!
//! This module defines the single error type used throughout the crate:
//! malformed caller input, driver-reported failures, shader build failures,
//! uniform binding failures and use of released resources.

use std::fmt;
use crate::graphics_api::{ApiErrorCode, ShaderStage};

/// Result type for AR compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// AR compositor errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Malformed caller input (non-contiguous entries, wrong array length, ...)
    InvalidArgument(String),

    /// The graphics driver reported one or more error codes right after a call
    GraphicsApiError {
        /// What the caller was trying to do
        reason: String,
        /// Name of the failing graphics-API call
        call: &'static str,
        /// Every error code that was queued by the driver
        codes: Vec<ApiErrorCode>,
    },

    /// A shader stage failed to compile
    ShaderCompileError {
        /// Stage that failed
        stage: ShaderStage,
        /// Driver-provided diagnostic log
        log: String,
    },

    /// The program failed to link (driver-provided diagnostic log)
    ShaderLinkError(String),

    /// The driver rejected the attachment combination (driver status code)
    FramebufferIncomplete(u32),

    /// The named uniform does not exist in the program
    UnknownUniform(String),

    /// Applying the named uniform failed
    UniformApplyError {
        /// Uniform name as given to the setter
        name: String,
        /// Underlying failure
        source: Box<Error>,
    },

    /// Operation attempted on a released resource
    UseAfterFree(String),

    /// Asset lookup failure
    ResourceNotFound(String),

    /// The asset exists but could not be read
    AssetReadError {
        /// Asset name as requested
        name: String,
        /// Underlying I/O message
        message: String,
    },

    /// Non-indexed mesh whose vertex streams disagree on vertex count
    InconsistentVertexCount {
        /// Vertex count of the first stream
        expected: usize,
        /// Vertex count of the first mismatching stream
        found: usize,
    },

    /// Image bytes could not be decoded
    ImageDecodeError(String),

    /// A shared lock was poisoned by a panicking thread
    LockPoisoned(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::GraphicsApiError { reason, call, codes } => {
                write!(f, "{}: {}: ", reason, call)?;
                for (i, code) in codes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", code)?;
                }
                Ok(())
            }
            Error::ShaderCompileError { stage, log } => {
                write!(f, "{:?} shader compilation failed: {}", stage, log)
            }
            Error::ShaderLinkError(log) => write!(f, "Shader link failed: {}", log),
            Error::FramebufferIncomplete(status) => {
                write!(f, "Framebuffer construction not complete: code {:#06x}", status)
            }
            Error::UnknownUniform(name) => write!(f, "Shader uniform does not exist: {}", name),
            Error::UniformApplyError { name, source } => {
                write!(f, "Error setting uniform `{}': {}", name, source)
            }
            Error::UseAfterFree(what) => write!(f, "Use after free: {}", what),
            Error::ResourceNotFound(name) => write!(f, "Resource not found: {}", name),
            Error::AssetReadError { name, message } => {
                write!(f, "Failed to read asset '{}': {}", name, message)
            }
            Error::InconsistentVertexCount { expected, found } => write!(
                f,
                "Vertex buffers have mismatching numbers of vertices: expected {}, found {}",
                expected, found
            ),
            Error::ImageDecodeError(msg) => write!(f, "Image decode failed: {}", msg),
            Error::LockPoisoned(what) => write!(f, "{} lock poisoned", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UniformApplyError { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
