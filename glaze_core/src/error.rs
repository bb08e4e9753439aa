// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types surfaced at the presenter boundary.
//!
//! Every platform call a backend makes is mapped to a [`PlatformError`] that
//! names the failing operation. Public operations return [`Error`], which adds
//! the conditions the core itself detects.

use thiserror::Error;

/// A single platform step failed.
///
/// `operation` is the name of the platform call (for example
/// `"ICompositionDrawingSurfaceInterop::BeginDraw"`), and `code` is the raw
/// platform result code (an `HRESULT` on Windows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("{operation} failed (0x{code:08X})")]
pub struct PlatformError {
    operation: &'static str,
    code: i32,
}

impl PlatformError {
    /// Creates an error for the named platform operation.
    #[must_use]
    pub const fn new(operation: &'static str, code: i32) -> Self {
        Self { operation, code }
    }

    /// Returns the name of the platform operation that failed.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Returns the raw platform result code.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }
}

/// Errors returned by compositor, layer, and host operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Error {
    /// The OS composition service is not available.
    ///
    /// Not retriable; the host must fall back to a non-composited path.
    #[error("composition is not available on this system")]
    CapabilityUnavailable,
    /// A platform step failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// The object was released, or its compositor has stopped.
    #[error("object is disposed")]
    Disposed,
    /// The compositor's loop is already running on this thread.
    #[error("compositor is already running")]
    AlreadyRunning,
    /// The previous composition connection on this thread is still live.
    ///
    /// Returned when a compositor is requested while a released one is
    /// still winding down its loop.
    #[error("a composition connection is still live on this thread")]
    ConnectionLive,
    /// A frame with zero width or height was presented.
    #[error("cannot present an empty {width}x{height} frame")]
    EmptyFrame {
        /// Requested width in device pixels.
        width: u32,
        /// Requested height in device pixels.
        height: u32,
    },
}

impl Error {
    /// Returns the failing platform operation, if this is a platform error.
    #[must_use]
    pub const fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Platform(err) => Some(err.operation()),
            _ => None,
        }
    }
}
