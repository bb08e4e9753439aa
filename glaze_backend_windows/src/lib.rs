// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windows backend for glaze.
//!
//! Implements the [`glaze_core`] platform seams on top of
//! `Windows.UI.Composition` and Direct3D 11:
//!
//! - [`WindowsPlatform`]: capability probe and connection factory
//! - [`WinComposition`]: compositor, dispatcher queue, and message pump
//! - [`D3D11Device`]: the rendering pipeline's device, opening shared textures
//! - [`WinDrawingSurface`]: drawing surface the presenter copies frames into
//!
//! The crate is empty on other targets.

#![cfg(windows)]
#![expect(
    unsafe_code,
    reason = "Windows backend calls Direct3D, WinRT interop, and Win32 messaging"
)]

mod api;
mod context;
mod device;
mod effect;
mod error;
mod probe;
mod surface;

pub use api::{WinComposition, WindowTarget, WindowsPlatform};
pub use context::CompositionContext;
pub use device::{D3D11Context, D3D11Device};
pub use probe::is_composition_available;
pub use surface::{WinDrawingSurface, WinVisual};
