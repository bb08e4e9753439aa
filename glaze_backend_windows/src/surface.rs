// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition drawing surfaces and visuals.

use glaze_core::PlatformError;
use glaze_core::backend::{DrawTarget, DrawingSurface, Visual};
use glaze_core::config::{AlphaMode, PixelFormat, SurfaceFormat};
use glaze_core::geometry::{SurfaceOffset, SurfaceSize};
use windows::Graphics::DirectX::{DirectXAlphaMode, DirectXPixelFormat};
use windows::UI::Composition::{CompositionBrush, CompositionDrawingSurface, SpriteVisual};
use windows::Win32::Foundation::{E_INVALIDARG, POINT, SIZE};
use windows::Win32::Graphics::Direct3D11::ID3D11Texture2D;
use windows::Win32::System::WinRT::Composition::ICompositionDrawingSurfaceInterop;
use windows::core::Interface;
use windows_numerics::Vector2;

use crate::error::{ResultExt, failed};

const RESIZE: &str = "ICompositionDrawingSurfaceInterop::Resize";

/// Converts a surface size to the interop's signed extent.
///
/// Sizes beyond `i32::MAX` are rejected rather than clamped.
fn pixel_extent(size: SurfaceSize) -> Result<SIZE, PlatformError> {
    match (i32::try_from(size.width), i32::try_from(size.height)) {
        (Ok(cx), Ok(cy)) => Ok(SIZE { cx, cy }),
        _ => Err(failed(RESIZE, E_INVALIDARG)),
    }
}

/// A drawing surface bound to one Direct3D device.
///
/// The interop interface is resolved once at creation.
#[derive(Debug)]
pub struct WinDrawingSurface {
    pub(crate) surface: CompositionDrawingSurface,
    interop: ICompositionDrawingSurfaceInterop,
    size: SurfaceSize,
}

impl WinDrawingSurface {
    pub(crate) fn new(
        surface: CompositionDrawingSurface,
        size: SurfaceSize,
    ) -> Result<Self, PlatformError> {
        let interop = surface
            .cast::<ICompositionDrawingSurfaceInterop>()
            .platform("ICompositionDrawingSurface::QueryInterface<ICompositionDrawingSurfaceInterop>")?;
        Ok(Self {
            surface,
            interop,
            size,
        })
    }
}

impl DrawingSurface for WinDrawingSurface {
    type Texture = ID3D11Texture2D;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), PlatformError> {
        let pixels = pixel_extent(size)?;
        // SAFETY: the interop interface belongs to a live surface.
        unsafe { self.interop.Resize(pixels) }.platform(RESIZE)?;
        tracing::trace!(?size, "drawing surface resized");
        self.size = size;
        Ok(())
    }

    fn begin_draw(&mut self) -> Result<DrawTarget<ID3D11Texture2D>, PlatformError> {
        let mut offset = POINT::default();
        // SAFETY: a null update rect covers the whole surface; `offset` is a
        // valid out pointer for the duration of the call.
        let texture = unsafe { self.interop.BeginDraw::<ID3D11Texture2D>(None, &mut offset) }
            .platform("ICompositionDrawingSurfaceInterop::BeginDraw")?;
        Ok(DrawTarget {
            texture,
            offset: SurfaceOffset::new(offset.x, offset.y),
        })
    }

    fn end_draw(&mut self) -> Result<(), PlatformError> {
        // SAFETY: paired with the successful `begin_draw` that preceded it.
        unsafe { self.interop.EndDraw() }.platform("ICompositionDrawingSurfaceInterop::EndDraw")
    }
}

/// A sprite visual in a window's tree.
#[derive(Clone, Debug)]
pub struct WinVisual(pub(crate) SpriteVisual);

impl Visual for WinVisual {
    type Brush = CompositionBrush;

    fn set_brush(&self, brush: &CompositionBrush) -> Result<(), PlatformError> {
        self.0.SetBrush(brush).platform("ISpriteVisual::put_Brush")
    }

    fn set_size(&self, size: kurbo::Size) -> Result<(), PlatformError> {
        self.0
            .SetSize(to_vector(size))
            .platform("IVisual::put_Size")
    }
}

/// Converts a size to the compositor's float vector.
#[expect(
    clippy::cast_possible_truncation,
    reason = "visual sizes are device pixels, well within f32 range"
)]
pub(crate) fn to_vector(size: kurbo::Size) -> Vector2 {
    Vector2 {
        X: size.width as f32,
        Y: size.height as f32,
    }
}

pub(crate) fn pixel_format(format: SurfaceFormat) -> DirectXPixelFormat {
    match format.pixel_format {
        PixelFormat::Bgra8Unorm => DirectXPixelFormat::B8G8R8A8UIntNormalized,
    }
}

pub(crate) fn alpha_mode(format: SurfaceFormat) -> DirectXAlphaMode {
    match format.alpha_mode {
        AlphaMode::Premultiplied => DirectXAlphaMode::Premultiplied,
        AlphaMode::Ignore => DirectXAlphaMode::Ignore,
    }
}
