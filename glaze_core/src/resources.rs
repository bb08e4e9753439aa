// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device-bound resources of a composition layer.

use crate::backend::{CompositionApi, GpuDevice};
use crate::config::SurfaceFormat;
use crate::error::PlatformError;
use crate::geometry::SurfaceSize;

/// Everything a layer binds to one GPU device.
///
/// Built as a unit, so a layer holds either a complete set or none.
pub(crate) struct DeviceResources<A: CompositionApi> {
    pub(crate) device: A::Device,
    pub(crate) context: <A::Device as GpuDevice>::Context,
    /// Kept alive for the surface allocated from it.
    _graphics: A::GraphicsDevice,
    pub(crate) surface: A::Surface,
    pub(crate) brush: A::Brush,
}

impl<A: CompositionApi> DeviceResources<A> {
    /// Builds a fresh resource set for `device` with a 0×0 surface.
    pub(crate) fn create(
        api: &A,
        device: &A::Device,
        format: SurfaceFormat,
    ) -> Result<Self, PlatformError> {
        let context = device.immediate_context()?;
        let graphics = api.create_graphics_device(device)?;
        let surface = api.create_drawing_surface(&graphics, SurfaceSize::ZERO, format)?;
        let brush = api.create_surface_brush(&surface)?;
        Ok(Self {
            device: device.clone(),
            context,
            _graphics: graphics,
            surface,
            brush,
        })
    }

    /// Returns `true` if these resources were built for `device`.
    pub(crate) fn is_bound_to(&self, device: &A::Device) -> bool {
        self.device.is_same_device(device)
    }
}
