// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Glaze splits platform-specific work into *backend* crates. A backend
//! implements the capability traits in this module over native objects:
//!
//! - **[`Platform`]**: Probes for the composition service and opens a
//!   connection on the calling thread.
//!
//! - **[`CompositionApi`]**: The connection itself. Creates graphics devices,
//!   drawing surfaces, brushes and visual trees, requests commit-completion
//!   notifications, and pumps the thread's native message queue.
//!
//! - **[`GpuDevice`] / [`DeviceContext`]**: The caller's GPU device: identity
//!   comparison, shared-texture opening, and the GPU-side copy.
//!
//! - **[`DrawingSurface`]**: A device-bound surface with a resize and a
//!   begin/end draw session.
//!
//! - **[`Visual`]**: A node of the per-window visual tree that can show a
//!   brush.
//!
//! Every fallible method returns a [`PlatformError`] naming the platform call
//! that failed. The core never retries.
//!
//! # Crate boundaries
//!
//! `glaze_core` owns the presenter decisions (rebuild, resize, brush swaps,
//! commit pacing) and this contract module. Backend crates depend on
//! `glaze_core` and provide platform glue. Hosts depend on both and hand a
//! backend [`Platform`] to [`Compositor::initialize`] or [`Host::new`].
//!
//! [`Compositor::initialize`]: crate::compositor::Compositor::initialize
//! [`Host::new`]: crate::host::Host::new

use raw_window_handle::RawWindowHandle;

use crate::commit::CommitSignal;
use crate::config::{Color, SurfaceFormat};
use crate::effect::BackdropEffect;
use crate::error::PlatformError;
use crate::geometry::{SurfaceOffset, SurfaceSize};

/// An opaque, platform-defined handle to a GPU texture shared by the
/// rendering pipeline (a DXGI shared handle on Windows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SharedTextureHandle(pub isize);

/// Outcome of waiting for one native message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// A message was received and dispatched.
    Message,
    /// The thread received a quit request.
    Quit,
}

/// The writable target of an open draw session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawTarget<T> {
    /// Texture backing the drawing surface.
    pub texture: T,
    /// Where the surface's pixels start inside `texture`.
    pub offset: SurfaceOffset,
}

/// A GPU device supplied by the rendering pipeline.
///
/// Clones share the same underlying device.
pub trait GpuDevice: Clone {
    /// Texture type the device opens and copies between.
    type Texture;
    /// Immediate context used for the GPU-side copy.
    type Context: DeviceContext<Texture = Self::Texture>;

    /// Returns `true` if `other` refers to the same underlying device.
    fn is_same_device(&self, other: &Self) -> bool;

    /// Returns the device's immediate context.
    fn immediate_context(&self) -> Result<Self::Context, PlatformError>;

    /// Opens a texture shared by another device or process.
    fn open_shared_texture(&self, handle: SharedTextureHandle)
    -> Result<Self::Texture, PlatformError>;
}

/// A device context that records GPU commands.
pub trait DeviceContext {
    /// Texture type the context copies between.
    type Texture;

    /// Copies the full extent of `source` into `target` at `offset`.
    fn copy_texture(&self, target: &Self::Texture, offset: SurfaceOffset, source: &Self::Texture);
}

/// A device-bound surface the OS compositor samples from.
pub trait DrawingSurface {
    /// Texture type handed out by draw sessions.
    type Texture;

    /// Returns the current surface size.
    fn size(&self) -> SurfaceSize;

    /// Resizes the surface. Contents are undefined until the next draw.
    fn resize(&mut self, size: SurfaceSize) -> Result<(), PlatformError>;

    /// Opens a draw session covering the whole surface.
    fn begin_draw(&mut self) -> Result<DrawTarget<Self::Texture>, PlatformError>;

    /// Closes the open draw session and publishes its contents.
    fn end_draw(&mut self) -> Result<(), PlatformError>;
}

/// A node in a window's visual tree.
pub trait Visual {
    /// Brush type this visual can show.
    type Brush;

    /// Replaces the brush painted into this visual.
    fn set_brush(&self, brush: &Self::Brush) -> Result<(), PlatformError>;

    /// Sets the visual's size in device pixels.
    fn set_size(&self, size: kurbo::Size) -> Result<(), PlatformError>;
}

/// The per-window visual tree built by
/// [`CompositionApi::create_visual_tree`].
///
/// `target` holds the window binding and the container root. `background`
/// sits below `content`; both background and container fill the target.
pub struct VisualTree<A: CompositionApi> {
    /// Window composition target (keeps the tree attached to the window).
    pub target: A::Target,
    /// Visual showing presented frames.
    pub content: A::Visual,
    /// Visual showing the opaque or blurred background.
    pub background: A::Visual,
}

impl<A: CompositionApi> core::fmt::Debug for VisualTree<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisualTree").finish_non_exhaustive()
    }
}

/// A connection to the OS composition service, bound to one thread.
pub trait CompositionApi: Sized {
    /// The caller's GPU device type.
    type Device: GpuDevice;
    /// Composition wrapper around a GPU device.
    type GraphicsDevice;
    /// Drawing surface created from a graphics device.
    type Surface: DrawingSurface<Texture = <Self::Device as GpuDevice>::Texture>;
    /// Any brush a visual can show.
    type Brush: Clone;
    /// A visual tree node.
    type Visual: Visual<Brush = Self::Brush>;
    /// A window composition target.
    type Target;

    /// Wraps `device` so the compositor can allocate surfaces on it.
    fn create_graphics_device(
        &self,
        device: &Self::Device,
    ) -> Result<Self::GraphicsDevice, PlatformError>;

    /// Creates a drawing surface on `graphics`.
    fn create_drawing_surface(
        &self,
        graphics: &Self::GraphicsDevice,
        size: SurfaceSize,
        format: SurfaceFormat,
    ) -> Result<Self::Surface, PlatformError>;

    /// Creates a brush that paints `surface`.
    fn create_surface_brush(&self, surface: &Self::Surface) -> Result<Self::Brush, PlatformError>;

    /// Creates a solid color brush.
    fn create_color_brush(&self, color: Color) -> Result<Self::Brush, PlatformError>;

    /// Creates the blur + saturation brush over the content behind the
    /// window.
    fn create_backdrop_brush(&self, effect: &BackdropEffect) -> Result<Self::Brush, PlatformError>;

    /// Binds a composition target to `window` and builds its visual tree.
    fn create_visual_tree(&self, window: RawWindowHandle)
    -> Result<VisualTree<Self>, PlatformError>;

    /// Requests a commit and arranges for `signal` to be completed when the
    /// commit has been applied.
    fn request_commit(&self, signal: &CommitSignal) -> Result<(), PlatformError>;

    /// Waits for the next native message on this thread and dispatches it.
    fn dispatch_message(&self) -> Result<Dispatch, PlatformError>;
}

/// Entry point of a backend: capability probe and connection factory.
pub trait Platform {
    /// The connection type this platform produces.
    type Api: CompositionApi;

    /// Returns `true` if the OS composition service can be used.
    ///
    /// Must have no side effects and be callable before any connection
    /// exists.
    fn is_composition_available(&self) -> bool;

    /// Connects to the composition service on the calling thread.
    fn connect(&self) -> Result<Self::Api, PlatformError>;
}
