// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-window presenter.
//!
//! A [`CompositionLayer`] copies a texture from the caller's GPU device into a
//! device-bound drawing surface shown by the window's content visual. It
//! rebinds its resources when the device changes, resizes the surface when
//! the frame size changes, and swaps the background brush for blur-behind.
//!
//! # Present sequence
//!
//! ```text
//!   device changed? ──yes──► stage new resources (context, graphics device,
//!        │                   0×0 surface, surface brush)
//!        ▼
//!   open shared texture ──► resize surface if needed ──► begin draw
//!        ──► GPU copy at draw offset ──► end draw ──► size/brush the visual
//! ```
//!
//! A present either completes or leaves the layer as it was: staged
//! resources are only swapped in after the whole sequence succeeds, and the
//! reported [`size`](CompositionLayer::size) only changes on success.

use alloc::rc::Rc;
use core::cell::Cell;

use crate::backend::{
    CompositionApi, DeviceContext, DrawingSurface, GpuDevice, SharedTextureHandle, Visual,
    VisualTree,
};
use crate::commit::CompositorState;
use crate::config::CompositorConfig;
use crate::error::{Error, PlatformError};
use crate::geometry::SurfaceSize;
use crate::resources::DeviceResources;
use crate::trace::{
    BlurBehindEvent, DeviceRebuiltEvent, FramePresentedEvent, PresentFailedEvent,
    SurfaceResizedEvent, Tracer,
};

/// Presents frames into one native window.
///
/// Created by [`Compositor::create_layer`](crate::compositor::Compositor::create_layer).
/// Dropping the layer releases its visual tree and device resources.
pub struct CompositionLayer<A: CompositionApi> {
    id: u32,
    resources: Option<DeviceResources<A>>,
    tree: VisualTree<A>,
    backdrop: A::Brush,
    config: CompositorConfig,
    size: SurfaceSize,
    blur_behind: bool,
    frames: u64,
    lifecycle: Rc<Cell<CompositorState>>,
    // Dropped last: the connection outlives every object created from it.
    api: Rc<A>,
}

impl<A: CompositionApi> core::fmt::Debug for CompositionLayer<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompositionLayer")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("blur_behind", &self.blur_behind)
            .field("has_device", &self.resources.is_some())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl<A: CompositionApi> CompositionLayer<A> {
    pub(crate) fn new(
        id: u32,
        api: Rc<A>,
        tree: VisualTree<A>,
        backdrop: A::Brush,
        config: CompositorConfig,
        lifecycle: Rc<Cell<CompositorState>>,
    ) -> Self {
        Self {
            id,
            resources: None,
            tree,
            backdrop,
            config,
            size: SurfaceSize::ZERO,
            blur_behind: false,
            frames: 0,
            lifecycle,
            api,
        }
    }

    /// Identifier of this layer, unique within its compositor.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Size of the last successfully presented frame (0×0 before the first).
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Whether the background currently shows the blurred backdrop.
    #[must_use]
    pub fn blur_behind(&self) -> bool {
        self.blur_behind
    }

    /// Whether a GPU device is bound.
    #[must_use]
    pub fn has_device(&self) -> bool {
        self.resources.is_some()
    }

    /// Number of frames presented successfully.
    #[must_use]
    pub fn presented_frames(&self) -> u64 {
        self.frames
    }

    /// The composition connection this layer was created from.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copies the shared texture into this layer's surface.
    ///
    /// See [`present_traced`](Self::present_traced).
    pub fn present(
        &mut self,
        device: &A::Device,
        texture: SharedTextureHandle,
        width: u32,
        height: u32,
    ) -> Result<(), Error> {
        self.present_traced(device, texture, width, height, &mut Tracer::none())
    }

    /// Copies the shared texture into this layer's surface, reporting to
    /// `tracer`.
    ///
    /// Rebuilds device resources if `device` is not the bound device, and
    /// resizes the surface if `width`×`height` differs from its current size.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyFrame`] if either extent is zero.
    /// - [`Error::Disposed`] if the compositor has stopped.
    /// - [`Error::Platform`] naming the first platform step that failed. The
    ///   frame is dropped and the layer keeps its previous device and size.
    pub fn present_traced(
        &mut self,
        device: &A::Device,
        texture: SharedTextureHandle,
        width: u32,
        height: u32,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error> {
        let size = SurfaceSize::new(width, height);
        match self.try_present(device, texture, size, tracer) {
            Ok(()) => {
                tracer.frame_presented(&FramePresentedEvent {
                    layer: self.id,
                    frame_index: self.frames,
                    size,
                });
                self.frames += 1;
                Ok(())
            }
            Err(error) => {
                tracer.present_failed(&PresentFailedEvent {
                    layer: self.id,
                    error,
                });
                Err(error)
            }
        }
    }

    fn try_present(
        &mut self,
        device: &A::Device,
        texture: SharedTextureHandle,
        size: SurfaceSize,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error> {
        self.ensure_live()?;
        if size.is_empty() {
            return Err(Error::EmptyFrame {
                width: size.width,
                height: size.height,
            });
        }

        let (mut active, displaced, rebuilt) = match self.resources.take() {
            Some(current) if current.is_bound_to(device) => (current, None, false),
            displaced => {
                let format = self.config.surface_format;
                match DeviceResources::<A>::create(&self.api, device, format) {
                    Ok(staged) => (staged, displaced, true),
                    Err(err) => {
                        self.resources = displaced;
                        return Err(err.into());
                    }
                }
            }
        };

        if let Err(err) = self.draw_frame(&mut active, texture, size, rebuilt, tracer) {
            self.resources = if rebuilt { displaced } else { Some(active) };
            return Err(err.into());
        }

        if rebuilt {
            tracer.device_rebuilt(&DeviceRebuiltEvent {
                layer: self.id,
                replaced: displaced.is_some(),
            });
        }
        self.resources = Some(active);
        self.size = size;
        Ok(())
    }

    fn draw_frame(
        &self,
        resources: &mut DeviceResources<A>,
        texture: SharedTextureHandle,
        size: SurfaceSize,
        rebuilt: bool,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), PlatformError> {
        // Opened before any surface mutation so a bad handle changes nothing.
        let source = resources.device.open_shared_texture(texture)?;

        let from = resources.surface.size();
        if from != size {
            resources.surface.resize(size)?;
            tracer.surface_resized(&SurfaceResizedEvent {
                layer: self.id,
                from,
                to: size,
            });
        }

        let target = resources.surface.begin_draw()?;
        resources
            .context
            .copy_texture(&target.texture, target.offset, &source);
        resources.surface.end_draw()?;

        let resized = size != self.size;
        if resized {
            self.tree.content.set_size(size.to_kurbo())?;
        }
        if rebuilt && let Err(err) = self.tree.content.set_brush(&resources.brush) {
            // The layer keeps its previous size, so the visual must too.
            if resized {
                let _ = self.tree.content.set_size(self.size.to_kurbo());
            }
            return Err(err);
        }
        Ok(())
    }

    /// Shows the blurred backdrop (`true`) or the opaque background
    /// (`false`) behind the content.
    ///
    /// No-op if the state is unchanged. The opaque brush is created fresh on
    /// every transition to `false`.
    pub fn set_blur_behind(&mut self, enabled: bool) -> Result<(), Error> {
        self.set_blur_behind_traced(enabled, &mut Tracer::none())
    }

    /// Like [`set_blur_behind`](Self::set_blur_behind), reporting to
    /// `tracer`.
    pub fn set_blur_behind_traced(
        &mut self,
        enabled: bool,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error> {
        self.ensure_live()?;
        if enabled == self.blur_behind {
            return Ok(());
        }
        if enabled {
            self.tree.background.set_brush(&self.backdrop)?;
        } else {
            let opaque = self.api.create_color_brush(self.config.opaque_background)?;
            self.tree.background.set_brush(&opaque)?;
        }
        self.blur_behind = enabled;
        tracer.blur_behind(&BlurBehindEvent {
            layer: self.id,
            enabled,
        });
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), Error> {
        if self.lifecycle.get() == CompositorState::Stopped {
            Err(Error::Disposed)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Compositor;
    use crate::config::Color;
    use crate::fake::{Call, FakeApi, FakeBrush, FakePlatform, Role, fake_window};

    fn setup() -> (FakePlatform, Compositor<FakeApi>) {
        let platform = FakePlatform::new();
        let compositor = Compositor::initialize(&platform, CompositorConfig::default())
            .expect("fake connection");
        (platform, compositor)
    }

    const HANDLE: SharedTextureHandle = SharedTextureHandle(0x40);

    #[test]
    fn present_sizes_surface_to_frame() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        let device = platform.device(7);

        assert!(!layer.has_device());
        layer.present(&device, HANDLE, 800, 600).unwrap();

        assert!(layer.has_device());
        assert_eq!(layer.size(), SurfaceSize::new(800, 600));
        assert_eq!(platform.resizes(), [SurfaceSize::new(800, 600)]);
        assert_eq!(layer.presented_frames(), 1);
    }

    #[test]
    fn identical_presents_skip_rebuild_and_resize() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        let device = platform.device(7);

        layer.present(&device, HANDLE, 640, 480).unwrap();
        platform.clear_calls();
        layer.present(&device, HANDLE, 640, 480).unwrap();

        let calls = platform.calls();
        assert_eq!(platform.count(|c| matches!(c, Call::CreateGraphicsDevice { .. })), 0);
        assert_eq!(platform.count(|c| matches!(c, Call::Resize { .. })), 0);
        assert_eq!(platform.count(|c| matches!(c, Call::SetSize { .. })), 0);
        assert!(calls.iter().any(|c| matches!(c, Call::BeginDraw { .. })));
        assert!(calls.iter().any(|c| matches!(c, Call::Copy { .. })));
        assert!(calls.iter().any(|c| matches!(c, Call::EndDraw { .. })));
    }

    #[test]
    fn copy_lands_at_draw_offset() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        layer.present(&platform.device(1), HANDLE, 32, 32).unwrap();

        let copy = platform
            .calls()
            .into_iter()
            .find(|c| matches!(c, Call::Copy { .. }));
        assert_eq!(
            copy,
            Some(Call::Copy {
                device: 1,
                source: HANDLE.0,
                offset: crate::fake::DRAW_OFFSET,
            })
        );
    }

    #[test]
    fn resize_only_when_size_changes() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        let device = platform.device(7);

        layer.present(&device, HANDLE, 100, 100).unwrap();
        layer.present(&device, HANDLE, 100, 100).unwrap();
        layer.present(&device, HANDLE, 200, 100).unwrap();
        layer.present(&device, HANDLE, 200, 100).unwrap();

        assert_eq!(
            platform.resizes(),
            [SurfaceSize::new(100, 100), SurfaceSize::new(200, 100)]
        );
        assert_eq!(layer.size(), SurfaceSize::new(200, 100));
    }

    #[test]
    fn device_change_rebuilds_once() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        let a = platform.device(1);
        let b = platform.device(2);

        layer.present(&a, HANDLE, 64, 64).unwrap();
        platform.clear_calls();
        layer.present(&b, HANDLE, 64, 64).unwrap();
        layer.present(&b, HANDLE, 64, 64).unwrap();
        layer.present(&b.clone(), HANDLE, 64, 64).unwrap();

        assert_eq!(
            platform.count(|c| matches!(c, Call::CreateGraphicsDevice { device: 2 })),
            1
        );
        // A fresh surface starts at 0×0, so the new device needs one resize.
        assert_eq!(platform.count(|c| matches!(c, Call::Resize { .. })), 1);
        let content_brushes = platform.count(|c| {
            matches!(
                c,
                Call::SetBrush {
                    role: Role::Content,
                    brush: FakeBrush::Surface(_),
                    ..
                }
            )
        });
        assert_eq!(content_brushes, 1);
    }

    #[test]
    fn unopenable_texture_leaves_layer_unchanged() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        let a = platform.device(1);
        layer.present(&a, HANDLE, 300, 200).unwrap();
        platform.clear_calls();

        let err = layer
            .present(&a, SharedTextureHandle(0), 500, 400)
            .unwrap_err();

        assert_eq!(err.operation(), Some("ID3D11Device::OpenSharedResource"));
        assert_eq!(layer.size(), SurfaceSize::new(300, 200));
        assert_eq!(platform.count(|c| matches!(c, Call::Resize { .. })), 0);
        assert_eq!(platform.count(|c| matches!(c, Call::BeginDraw { .. })), 0);
        assert_eq!(layer.presented_frames(), 1);
    }

    #[test]
    fn failed_rebuild_keeps_previous_device() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        let a = platform.device(1);
        let b = platform.device(2);
        layer.present(&a, HANDLE, 50, 50).unwrap();

        platform.fail("ICompositor::CreateSurfaceBrushWithSurface");
        let err = layer.present(&b, HANDLE, 50, 50).unwrap_err();
        assert_eq!(
            err.operation(),
            Some("ICompositor::CreateSurfaceBrushWithSurface")
        );

        platform.clear_failures();
        platform.clear_calls();
        layer.present(&a, HANDLE, 50, 50).unwrap();
        assert_eq!(platform.count(|c| matches!(c, Call::CreateGraphicsDevice { .. })), 0);
    }

    #[test]
    fn failed_draw_after_rebuild_discards_staged_resources() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        let a = platform.device(1);
        let b = platform.device(2);
        layer.present(&a, HANDLE, 50, 50).unwrap();

        platform.fail("ICompositionDrawingSurfaceInterop::BeginDraw");
        assert!(layer.present(&b, HANDLE, 50, 50).is_err());
        platform.clear_failures();

        // Device A is still bound; B is staged again on its next present.
        platform.clear_calls();
        layer.present(&b, HANDLE, 50, 50).unwrap();
        assert_eq!(
            platform.count(|c| matches!(c, Call::CreateGraphicsDevice { device: 2 })),
            1
        );
        assert_eq!(platform.open_draw_sessions(), 0);
    }

    #[test]
    fn failed_brush_swap_after_rebuild_restores_visual_size() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        let a = platform.device(1);
        let b = platform.device(2);
        layer.present(&a, HANDLE, 50, 50).unwrap();

        platform.fail("ISpriteVisual::put_Brush");
        let err = layer.present(&b, HANDLE, 80, 80).unwrap_err();
        assert_eq!(err.operation(), Some("ISpriteVisual::put_Brush"));
        platform.clear_failures();

        layer.present(&a, HANDLE, 50, 50).unwrap();
        assert_eq!(layer.size(), SurfaceSize::new(50, 50));
        assert_eq!(
            platform.content_sizes(),
            [
                kurbo::Size::new(50.0, 50.0),
                kurbo::Size::new(80.0, 80.0),
                kurbo::Size::new(50.0, 50.0),
            ]
        );
    }

    #[test]
    fn empty_frame_is_rejected_before_any_platform_call() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        platform.clear_calls();

        let err = layer
            .present(&platform.device(1), HANDLE, 0, 480)
            .unwrap_err();
        assert_eq!(
            err,
            Error::EmptyFrame {
                width: 0,
                height: 480
            }
        );
        assert!(platform.calls().is_empty());
        assert!(!layer.has_device());
    }

    #[test]
    fn enabling_blur_twice_substitutes_once() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        platform.clear_calls();

        layer.set_blur_behind(true).unwrap();
        layer.set_blur_behind(true).unwrap();

        assert_eq!(platform.background_brushes(), [FakeBrush::Backdrop(0)]);
        assert!(layer.blur_behind());
    }

    #[test]
    fn disabling_blur_while_disabled_is_noop() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        platform.clear_calls();

        layer.set_blur_behind(false).unwrap();

        assert!(platform.calls().is_empty());
    }

    #[test]
    fn blur_round_trip_ends_on_shared_backdrop() {
        let (platform, compositor) = setup();
        let mut first = compositor.create_layer(fake_window(1)).unwrap();
        let mut second = compositor.create_layer(fake_window(2)).unwrap();
        platform.clear_calls();

        first.set_blur_behind(true).unwrap();
        first.set_blur_behind(false).unwrap();
        first.set_blur_behind(true).unwrap();
        second.set_blur_behind(true).unwrap();

        let brushes = platform.background_brushes();
        assert_eq!(brushes.len(), 4);
        assert!(matches!(brushes[1], FakeBrush::Color(Color::WHITE, _)));
        // Every layer of one compositor shares the single backdrop brush.
        assert_eq!(brushes[2], FakeBrush::Backdrop(0));
        assert_eq!(brushes[3], FakeBrush::Backdrop(0));
        assert_eq!(
            platform.count(|c| matches!(c, Call::CreateBackdropBrush)),
            0
        );
    }

    #[test]
    fn failed_brush_swap_keeps_flag() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        layer.set_blur_behind(true).unwrap();

        platform.fail("ICompositor::CreateColorBrushWithColor");
        let err = layer.set_blur_behind(false).unwrap_err();
        assert_eq!(err.operation(), Some("ICompositor::CreateColorBrushWithColor"));
        assert!(layer.blur_behind());
    }

    #[test]
    fn stopped_compositor_disposes_layers() {
        let (platform, compositor) = setup();
        let mut layer = compositor.create_layer(fake_window(1)).unwrap();
        platform.script_quit();
        compositor.run(|| {}).unwrap();

        assert_eq!(
            layer.present(&platform.device(1), HANDLE, 10, 10),
            Err(Error::Disposed)
        );
        assert_eq!(layer.set_blur_behind(true), Err(Error::Disposed));
    }
}
