// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windows.UI.Composition connection.

use core::ffi::c_void;
use core::fmt;

use glaze_core::PlatformError;
use glaze_core::backend::{CompositionApi, Dispatch, Platform, VisualTree};
use glaze_core::commit::CommitSignal;
use glaze_core::config::{Color, SurfaceFormat};
use glaze_core::effect::{BACKDROP_SOURCE_NAME, BackdropEffect};
use glaze_core::geometry::SurfaceSize;
use raw_window_handle::RawWindowHandle;
use windows::Foundation::{AsyncActionCompletedHandler, Size};
use windows::System::DispatcherQueueController;
use windows::UI::Composition::Desktop::DesktopWindowTarget;
use windows::UI::Composition::{
    CompositionBrush, CompositionGraphicsDevice, Compositor as UiCompositor, ContainerVisual,
    SpriteVisual,
};
use windows::Win32::Foundation::{E_INVALIDARG, GetLastError, HWND};
use windows::Win32::System::WinRT::Composition::{ICompositorDesktopInterop, ICompositorInterop};
use windows::Win32::System::WinRT::{
    CreateDispatcherQueueController, DQTAT_COM_NONE, DQTYPE_THREAD_CURRENT, DispatcherQueueOptions,
};
use windows::Win32::UI::WindowsAndMessaging::{DispatchMessageW, GetMessageW, MSG, TranslateMessage};
use windows::core::{HSTRING, Interface};
use windows_numerics::Vector2;

use crate::context::CompositionContext;
use crate::device::D3D11Device;
use crate::effect::backdrop_graph;
use crate::error::{ResultExt, failed};
use crate::probe::is_composition_available;
use crate::surface::{WinDrawingSurface, WinVisual, alpha_mode, pixel_format};

/// Keeps a window's composition target and container root alive.
pub struct WindowTarget {
    _root: ContainerVisual,
    _target: DesktopWindowTarget,
}

impl fmt::Debug for WindowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowTarget").finish_non_exhaustive()
    }
}

/// A Windows.UI.Composition connection bound to the calling thread.
///
/// Owns the compositor, the thread's dispatcher queue, and the runtime
/// initialization. Fields drop in declaration order, so the runtime is
/// uninitialized last.
pub struct WinComposition {
    compositor: UiCompositor,
    interop: ICompositorInterop,
    desktop: ICompositorDesktopInterop,
    _dispatcher: DispatcherQueueController,
    _context: CompositionContext,
}

impl fmt::Debug for WinComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WinComposition").finish_non_exhaustive()
    }
}

impl WinComposition {
    /// Connects on the calling thread.
    ///
    /// Initializes the Windows Runtime, creates a dispatcher queue for the
    /// thread, and creates the compositor.
    pub fn connect() -> Result<Self, PlatformError> {
        let context = CompositionContext::new()?;
        let options = DispatcherQueueOptions {
            dwSize: options_size(),
            threadType: DQTYPE_THREAD_CURRENT,
            apartmentType: DQTAT_COM_NONE,
        };
        // SAFETY: `options` is fully initialized and the runtime is live on
        // this thread.
        let dispatcher = unsafe { CreateDispatcherQueueController(options) }
            .platform("CreateDispatcherQueueController")?;
        let compositor = UiCompositor::new().platform("Compositor::new")?;
        let interop = compositor
            .cast::<ICompositorInterop>()
            .platform("ICompositor::QueryInterface<ICompositorInterop>")?;
        let desktop = compositor
            .cast::<ICompositorDesktopInterop>()
            .platform("ICompositor::QueryInterface<ICompositorDesktopInterop>")?;
        tracing::debug!("composition connection established");
        Ok(Self {
            compositor,
            interop,
            desktop,
            _dispatcher: dispatcher,
            _context: context,
        })
    }

    /// The underlying compositor.
    #[must_use]
    pub fn compositor(&self) -> &UiCompositor {
        &self.compositor
    }

    fn sprite(&self) -> Result<SpriteVisual, PlatformError> {
        self.compositor
            .CreateSpriteVisual()
            .platform("ICompositor::CreateSpriteVisual")
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the options struct is a few bytes"
)]
fn options_size() -> u32 {
    size_of::<DispatcherQueueOptions>() as u32
}

fn hwnd(window: RawWindowHandle) -> Option<HWND> {
    match window {
        RawWindowHandle::Win32(handle) => Some(HWND(handle.hwnd.get() as *mut c_void)),
        _ => None,
    }
}

fn ui_color(color: Color) -> windows::UI::Color {
    windows::UI::Color {
        A: color.a,
        R: color.r,
        G: color.g,
        B: color.b,
    }
}

const FILL: Vector2 = Vector2 { X: 1.0, Y: 1.0 };

impl CompositionApi for WinComposition {
    type Device = D3D11Device;
    type GraphicsDevice = CompositionGraphicsDevice;
    type Surface = WinDrawingSurface;
    type Brush = CompositionBrush;
    type Visual = WinVisual;
    type Target = WindowTarget;

    fn create_graphics_device(
        &self,
        device: &D3D11Device,
    ) -> Result<CompositionGraphicsDevice, PlatformError> {
        // SAFETY: the device is live; the compositor adds its own reference.
        let graphics = unsafe { self.interop.CreateGraphicsDevice(&device.0) }
            .platform("ICompositorInterop::CreateGraphicsDevice")?;
        tracing::debug!("composition graphics device created");
        Ok(graphics)
    }

    fn create_drawing_surface(
        &self,
        graphics: &CompositionGraphicsDevice,
        size: SurfaceSize,
        format: SurfaceFormat,
    ) -> Result<WinDrawingSurface, PlatformError> {
        let kurbo::Size { width, height } = size.to_kurbo();
        let surface = graphics
            .CreateDrawingSurface(
                to_size(width, height),
                pixel_format(format),
                alpha_mode(format),
            )
            .platform("ICompositionGraphicsDevice::CreateDrawingSurface")?;
        WinDrawingSurface::new(surface, size)
    }

    fn create_surface_brush(
        &self,
        surface: &WinDrawingSurface,
    ) -> Result<CompositionBrush, PlatformError> {
        self.compositor
            .CreateSurfaceBrushWithSurface(&surface.surface)
            .platform("ICompositor::CreateSurfaceBrushWithSurface")?
            .cast()
            .platform("ICompositionSurfaceBrush::QueryInterface<ICompositionBrush>")
    }

    fn create_color_brush(&self, color: Color) -> Result<CompositionBrush, PlatformError> {
        self.compositor
            .CreateColorBrushWithColor(ui_color(color))
            .platform("ICompositor::CreateColorBrushWithColor")?
            .cast()
            .platform("ICompositionColorBrush::QueryInterface<ICompositionBrush>")
    }

    fn create_backdrop_brush(
        &self,
        effect: &BackdropEffect,
    ) -> Result<CompositionBrush, PlatformError> {
        let graph = backdrop_graph(effect).platform("IGraphicsEffect::Create")?;
        let factory = self
            .compositor
            .CreateEffectFactory(&graph)
            .platform("ICompositor::CreateEffectFactory")?;
        let brush = factory
            .CreateBrush()
            .platform("ICompositionEffectFactory::CreateBrush")?;
        let backdrop = self
            .compositor
            .CreateBackdropBrush()
            .platform("ICompositor3::CreateBackdropBrush")?
            .cast::<CompositionBrush>()
            .platform("ICompositionBackdropBrush::QueryInterface<ICompositionBrush>")?;
        brush
            .SetSourceParameter(&HSTRING::from(BACKDROP_SOURCE_NAME), &backdrop)
            .platform("ICompositionEffectBrush::SetSourceParameter")?;
        tracing::debug!(
            blur = effect.blur_standard_deviation,
            saturation = effect.saturation,
            "backdrop brush created"
        );
        brush
            .cast()
            .platform("ICompositionEffectBrush::QueryInterface<ICompositionBrush>")
    }

    fn create_visual_tree(
        &self,
        window: RawWindowHandle,
    ) -> Result<VisualTree<Self>, PlatformError> {
        const OP: &str = "ICompositorDesktopInterop::CreateDesktopWindowTarget";
        let hwnd = hwnd(window).ok_or_else(|| failed(OP, E_INVALIDARG))?;
        // SAFETY: `hwnd` comes from the host's live window handle.
        let target = unsafe { self.desktop.CreateDesktopWindowTarget(hwnd, false) }.platform(OP)?;

        let root = self
            .compositor
            .CreateContainerVisual()
            .platform("ICompositor::CreateContainerVisual")?;
        root.SetRelativeSizeAdjustment(FILL)
            .platform("IVisual2::put_RelativeSizeAdjustment")?;
        target
            .SetRoot(&root)
            .platform("ICompositionTarget::put_Root")?;

        let background = self.sprite()?;
        background
            .SetRelativeSizeAdjustment(FILL)
            .platform("IVisual2::put_RelativeSizeAdjustment")?;
        let content = self.sprite()?;

        let children = root
            .Children()
            .platform("IContainerVisual::get_Children")?;
        children
            .InsertAtTop(&content)
            .platform("IVisualCollection::InsertAtTop")?;
        children
            .InsertAtBottom(&background)
            .platform("IVisualCollection::InsertAtBottom")?;

        tracing::debug!(hwnd = ?hwnd.0, "visual tree attached to window");
        Ok(VisualTree {
            target: WindowTarget {
                _root: root,
                _target: target,
            },
            content: WinVisual(content),
            background: WinVisual(background),
        })
    }

    fn request_commit(&self, signal: &CommitSignal) -> Result<(), PlatformError> {
        let action = self
            .compositor
            .RequestCommitAsync()
            .platform("ICompositor5::RequestCommitAsync")?;
        let signal = signal.clone();
        action
            .SetCompleted(&AsyncActionCompletedHandler::new(move |_, _| {
                signal.complete();
                Ok(())
            }))
            .platform("IAsyncAction::put_Completed")?;
        tracing::trace!("commit requested");
        Ok(())
    }

    fn dispatch_message(&self) -> Result<Dispatch, PlatformError> {
        let mut msg = MSG::default();
        // SAFETY: `msg` is a valid out pointer; no window filter.
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match ret.0 {
            0 => {
                tracing::debug!("quit message received");
                Ok(Dispatch::Quit)
            }
            -1 => {
                // SAFETY: reads the calling thread's last-error value.
                let code = unsafe { GetLastError() }.to_hresult();
                Err(failed("GetMessageW", code))
            }
            _ => {
                // SAFETY: `msg` was filled in by `GetMessageW`.
                unsafe {
                    _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
                Ok(Dispatch::Message)
            }
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "surface sizes are device pixels, well within f32 range"
)]
fn to_size(width: f64, height: f64) -> Size {
    Size {
        Width: width as f32,
        Height: height as f32,
    }
}

/// The Windows composition platform.
///
/// Pass to [`Compositor::initialize`](glaze_core::compositor::Compositor::initialize)
/// or [`Host::new`](glaze_core::host::Host::new).
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowsPlatform;

impl Platform for WindowsPlatform {
    type Api = WinComposition;

    fn is_composition_available(&self) -> bool {
        is_composition_available()
    }

    fn connect(&self) -> Result<WinComposition, PlatformError> {
        WinComposition::connect()
    }
}
