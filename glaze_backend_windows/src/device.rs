// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direct3D 11 device wrappers.

use core::ffi::c_void;

use glaze_core::PlatformError;
use glaze_core::backend::{DeviceContext, GpuDevice, SharedTextureHandle};
use glaze_core::geometry::SurfaceOffset;
use windows::Win32::Foundation::{E_POINTER, HANDLE};
use windows::Win32::Graphics::Direct3D11::{ID3D11Device, ID3D11DeviceContext, ID3D11Texture2D};
use windows::core::Interface;

use crate::error::{ResultExt, failed};

/// The rendering pipeline's Direct3D 11 device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct D3D11Device(pub ID3D11Device);

impl D3D11Device {
    /// Wraps a device.
    #[must_use]
    pub fn new(device: ID3D11Device) -> Self {
        Self(device)
    }

    /// Wraps a borrowed raw `ID3D11Device*`, adding a reference.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `raw` must be null or point to a live `ID3D11Device`.
    pub unsafe fn from_raw_borrowed(raw: *mut c_void) -> Option<Self> {
        // SAFETY: upheld by the caller.
        unsafe { ID3D11Device::from_raw_borrowed(&raw) }
            .cloned()
            .map(Self)
    }
}

impl GpuDevice for D3D11Device {
    type Texture = ID3D11Texture2D;
    type Context = D3D11Context;

    fn is_same_device(&self, other: &Self) -> bool {
        self.0.as_raw() == other.0.as_raw()
    }

    fn immediate_context(&self) -> Result<D3D11Context, PlatformError> {
        // SAFETY: the device is live for the duration of the call.
        let context = unsafe { self.0.GetImmediateContext() }
            .platform("ID3D11Device::GetImmediateContext")?;
        Ok(D3D11Context(context))
    }

    fn open_shared_texture(
        &self,
        handle: SharedTextureHandle,
    ) -> Result<ID3D11Texture2D, PlatformError> {
        const OP: &str = "ID3D11Device::OpenSharedResource";
        let mut texture: Option<ID3D11Texture2D> = None;
        // SAFETY: the handle is opaque to us; the runtime validates it and
        // reports a bad handle as an error.
        unsafe {
            self.0
                .OpenSharedResource(HANDLE(handle.0 as *mut c_void), &mut texture)
        }
        .platform(OP)?;
        texture.ok_or_else(|| failed(OP, E_POINTER))
    }
}

/// Immediate context of a [`D3D11Device`].
#[derive(Clone, Debug)]
pub struct D3D11Context(ID3D11DeviceContext);

impl DeviceContext for D3D11Context {
    type Texture = ID3D11Texture2D;

    fn copy_texture(
        &self,
        target: &ID3D11Texture2D,
        offset: SurfaceOffset,
        source: &ID3D11Texture2D,
    ) {
        let (x, y) = draw_offset(offset);
        // SAFETY: both textures are live; a null source box copies the whole
        // source subresource.
        unsafe {
            self.0
                .CopySubresourceRegion(target, 0, x, y, 0, source, 0, None);
        }
    }
}

/// Converts a draw offset to copy coordinates, clamping negatives to zero.
fn draw_offset(offset: SurfaceOffset) -> (u32, u32) {
    (
        u32::try_from(offset.x).unwrap_or(0),
        u32::try_from(offset.y).unwrap_or(0),
    )
}
