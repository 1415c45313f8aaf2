//! Error types for the Galaxy3D visibility core
//!
//! This module defines the error types used throughout the culling and
//! shadow rendering pipeline. Most failures in this subsystem are
//! developer-facing diagnostics: the frame degrades (missing shadows,
//! skipped draws) but the process keeps running.

use std::fmt;

/// Result type for Galaxy3D operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D visibility errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error reported by the graphics device
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (render target, shader, buffer, key, ...)
    InvalidResource(String),

    /// Initialization failed (device objects, caches)
    InitializationFailed(String),

    /// A pipeline invariant was broken upstream (e.g. shadow map missing at render time)
    InvariantViolation(String),

    /// Shader variant could not be produced
    ShaderCompilationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
            Error::ShaderCompilationFailed(msg) => write!(f, "Shader compilation failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and build an `Error::BackendError` from the same message
///
/// # Example
///
/// ```ignore
/// let rt = device.render_target(key)
///     .ok_or_else(|| engine_err!("galaxy3d::ShadowRenderer", "target {:?} missing", key))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an error and return early with an `Error::BackendError`
///
/// A leading `InvariantViolation =>` selects the invariant-violation variant.
#[macro_export]
macro_rules! engine_bail {
    (InvariantViolation => $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        return Err($crate::galaxy3d::Error::InvariantViolation(message));
    }};
    ($source:expr, $($arg:tt)*) => {{
        return Err($crate::engine_err!($source, $($arg)*));
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
