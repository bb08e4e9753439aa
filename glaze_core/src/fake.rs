// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory backend for unit tests.
//!
//! Records every platform call in a shared journal, fails any named
//! operation on request, and replays a script of native messages.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::num::NonZeroIsize;

use raw_window_handle::{RawWindowHandle, Win32WindowHandle};

use crate::backend::{
    CompositionApi, DeviceContext, Dispatch, DrawTarget, DrawingSurface, GpuDevice, Platform,
    SharedTextureHandle, Visual, VisualTree,
};
use crate::commit::{CommitSignal, ShutdownHandle};
use crate::config::{Color, SurfaceFormat};
use crate::effect::BackdropEffect;
use crate::error::PlatformError;
use crate::geometry::{SurfaceOffset, SurfaceSize};

/// Offset every fake draw session reports.
pub(crate) const DRAW_OFFSET: SurfaceOffset = SurfaceOffset::new(16, 32);

const E_FAIL: i32 = 0x8000_4005_u32 as i32;
const E_INVALIDARG: i32 = 0x8007_0057_u32 as i32;

/// Which visual of a tree a call targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Role {
    Content,
    Background,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FakeBrush {
    Color(Color, u32),
    Backdrop(u32),
    Surface(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FakeTexture {
    Shared(isize),
    Surface(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    ImmediateContext { device: u32 },
    CreateGraphicsDevice { device: u32 },
    CreateDrawingSurface { device: u32, size: SurfaceSize },
    CreateSurfaceBrush { surface: u32 },
    CreateColorBrush(Color),
    CreateBackdropBrush,
    CreateVisualTree { tree: u32, window: RawWindowHandle },
    OpenSharedTexture { device: u32, handle: isize },
    Resize { surface: u32, size: SurfaceSize },
    BeginDraw { surface: u32 },
    Copy {
        device: u32,
        source: isize,
        offset: SurfaceOffset,
    },
    EndDraw { surface: u32 },
    SetBrush {
        tree: u32,
        role: Role,
        brush: FakeBrush,
    },
    SetSize {
        tree: u32,
        role: Role,
        size: kurbo::Size,
    },
    RequestCommit,
    Dispatch,
}

/// A scripted native message.
#[derive(Debug)]
pub(crate) enum Step {
    /// An unrelated message.
    Message,
    /// The pending commit completes while this message is dispatched.
    CompleteCommit,
    /// Another thread requests shutdown while this message is dispatched.
    Shutdown(ShutdownHandle),
    /// The thread receives a quit message.
    Quit,
}

#[derive(Debug, Default)]
struct Journal {
    calls: Vec<Call>,
    failures: Vec<&'static str>,
    script: VecDeque<Step>,
    next_id: u32,
    backdrops: u32,
    pending_commit: Option<CommitSignal>,
    open_sessions: i32,
    connections: u32,
}

type Shared = Rc<RefCell<Journal>>;

impl Journal {
    fn check(&self, operation: &'static str) -> Result<(), PlatformError> {
        if self.failures.contains(&operation) {
            Err(PlatformError::new(operation, E_FAIL))
        } else {
            Ok(())
        }
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn record(journal: &Shared, operation: &'static str, call: Call) -> Result<(), PlatformError> {
    let mut journal = journal.borrow_mut();
    journal.check(operation)?;
    journal.calls.push(call);
    Ok(())
}

/// Builds a window handle for tests.
pub(crate) fn fake_window(hwnd: isize) -> RawWindowHandle {
    let hwnd = NonZeroIsize::new(hwnd).expect("test windows are non-null");
    RawWindowHandle::Win32(Win32WindowHandle::new(hwnd))
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct FakePlatform {
    journal: Shared,
    available: bool,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self {
            journal: Shared::default(),
            available: true,
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub(crate) fn device(&self, id: u32) -> FakeDevice {
        FakeDevice {
            id,
            journal: self.journal.clone(),
        }
    }

    pub(crate) fn fail(&self, operation: &'static str) {
        self.journal.borrow_mut().failures.push(operation);
    }

    pub(crate) fn clear_failures(&self) {
        self.journal.borrow_mut().failures.clear();
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.journal.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.journal.borrow_mut().calls.clear();
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.journal.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Sizes passed to surface resizes, in order.
    pub(crate) fn resizes(&self) -> Vec<SurfaceSize> {
        self.journal
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Resize { size, .. } => Some(*size),
                _ => None,
            })
            .collect()
    }

    /// Brushes assigned to background visuals, in order.
    pub(crate) fn background_brushes(&self) -> Vec<FakeBrush> {
        self.journal
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::SetBrush {
                    role: Role::Background,
                    brush,
                    ..
                } => Some(brush.clone()),
                _ => None,
            })
            .collect()
    }

    /// Sizes assigned to content visuals, in order.
    pub(crate) fn content_sizes(&self) -> Vec<kurbo::Size> {
        self.journal
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::SetSize {
                    role: Role::Content,
                    size,
                    ..
                } => Some(*size),
                _ => None,
            })
            .collect()
    }

    /// Number of connections not yet dropped.
    pub(crate) fn live_connections(&self) -> u32 {
        self.journal.borrow().connections
    }

    pub(crate) fn open_draw_sessions(&self) -> i32 {
        self.journal.borrow().open_sessions
    }

    pub(crate) fn script(&self, steps: impl IntoIterator<Item = Step>) {
        self.journal.borrow_mut().script.extend(steps);
    }

    pub(crate) fn script_quit(&self) {
        self.script([Step::Quit]);
    }

    /// Returns `true` if a requested commit has not completed yet.
    pub(crate) fn commit_pending(&self) -> bool {
        self.journal.borrow().pending_commit.is_some()
    }
}

impl Platform for FakePlatform {
    type Api = FakeApi;

    fn is_composition_available(&self) -> bool {
        self.available
    }

    fn connect(&self) -> Result<FakeApi, PlatformError> {
        let mut journal = self.journal.borrow_mut();
        journal.check("CreateDispatcherQueueController")?;
        // One dispatcher queue per thread.
        assert_eq!(journal.connections, 0, "thread already has a connection");
        journal.connections += 1;
        drop(journal);
        Ok(FakeApi {
            journal: self.journal.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct FakeDevice {
    id: u32,
    journal: Shared,
}

#[derive(Debug)]
pub(crate) struct FakeContext {
    device: u32,
    journal: Shared,
}

impl GpuDevice for FakeDevice {
    type Texture = FakeTexture;
    type Context = FakeContext;

    fn is_same_device(&self, other: &Self) -> bool {
        self.id == other.id
    }

    fn immediate_context(&self) -> Result<FakeContext, PlatformError> {
        record(
            &self.journal,
            "ID3D11Device::GetImmediateContext",
            Call::ImmediateContext { device: self.id },
        )?;
        Ok(FakeContext {
            device: self.id,
            journal: self.journal.clone(),
        })
    }

    fn open_shared_texture(
        &self,
        handle: SharedTextureHandle,
    ) -> Result<FakeTexture, PlatformError> {
        const OP: &str = "ID3D11Device::OpenSharedResource";
        if handle.0 == 0 {
            return Err(PlatformError::new(OP, E_INVALIDARG));
        }
        record(
            &self.journal,
            OP,
            Call::OpenSharedTexture {
                device: self.id,
                handle: handle.0,
            },
        )?;
        Ok(FakeTexture::Shared(handle.0))
    }
}

impl DeviceContext for FakeContext {
    type Texture = FakeTexture;

    fn copy_texture(&self, target: &FakeTexture, offset: SurfaceOffset, source: &FakeTexture) {
        assert!(matches!(target, FakeTexture::Surface(_)));
        let FakeTexture::Shared(source) = *source else {
            panic!("copy source must be a shared texture");
        };
        assert!(
            self.journal.borrow().open_sessions > 0,
            "copy outside a draw session"
        );
        self.journal.borrow_mut().calls.push(Call::Copy {
            device: self.device,
            source,
            offset,
        });
    }
}

// ---------------------------------------------------------------------------
// Surface, brushes, visuals
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct FakeGraphicsDevice {
    device: u32,
}

#[derive(Debug)]
pub(crate) struct FakeSurface {
    id: u32,
    size: SurfaceSize,
    drawing: bool,
    journal: Shared,
}

impl DrawingSurface for FakeSurface {
    type Texture = FakeTexture;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), PlatformError> {
        assert!(!self.drawing, "resize during a draw session");
        record(
            &self.journal,
            "ICompositionDrawingSurfaceInterop::Resize",
            Call::Resize {
                surface: self.id,
                size,
            },
        )?;
        self.size = size;
        Ok(())
    }

    fn begin_draw(&mut self) -> Result<DrawTarget<FakeTexture>, PlatformError> {
        assert!(!self.drawing, "nested draw session");
        assert!(!self.size.is_empty(), "draw on an empty surface");
        record(
            &self.journal,
            "ICompositionDrawingSurfaceInterop::BeginDraw",
            Call::BeginDraw { surface: self.id },
        )?;
        self.drawing = true;
        self.journal.borrow_mut().open_sessions += 1;
        Ok(DrawTarget {
            texture: FakeTexture::Surface(self.id),
            offset: DRAW_OFFSET,
        })
    }

    fn end_draw(&mut self) -> Result<(), PlatformError> {
        assert!(self.drawing, "end without begin");
        self.drawing = false;
        self.journal.borrow_mut().open_sessions -= 1;
        record(
            &self.journal,
            "ICompositionDrawingSurfaceInterop::EndDraw",
            Call::EndDraw { surface: self.id },
        )
    }
}

#[derive(Debug)]
pub(crate) struct FakeVisual {
    tree: u32,
    role: Role,
    journal: Shared,
}

impl Visual for FakeVisual {
    type Brush = FakeBrush;

    fn set_brush(&self, brush: &FakeBrush) -> Result<(), PlatformError> {
        record(
            &self.journal,
            "ISpriteVisual::put_Brush",
            Call::SetBrush {
                tree: self.tree,
                role: self.role,
                brush: brush.clone(),
            },
        )
    }

    fn set_size(&self, size: kurbo::Size) -> Result<(), PlatformError> {
        record(
            &self.journal,
            "IVisual::put_Size",
            Call::SetSize {
                tree: self.tree,
                role: self.role,
                size,
            },
        )
    }
}

#[derive(Debug)]
pub(crate) struct FakeTarget;

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct FakeApi {
    journal: Shared,
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.journal.borrow_mut().connections -= 1;
    }
}

impl CompositionApi for FakeApi {
    type Device = FakeDevice;
    type GraphicsDevice = FakeGraphicsDevice;
    type Surface = FakeSurface;
    type Brush = FakeBrush;
    type Visual = FakeVisual;
    type Target = FakeTarget;

    fn create_graphics_device(
        &self,
        device: &FakeDevice,
    ) -> Result<FakeGraphicsDevice, PlatformError> {
        record(
            &self.journal,
            "ICompositorInterop::CreateGraphicsDevice",
            Call::CreateGraphicsDevice { device: device.id },
        )?;
        Ok(FakeGraphicsDevice { device: device.id })
    }

    fn create_drawing_surface(
        &self,
        graphics: &FakeGraphicsDevice,
        size: SurfaceSize,
        _format: SurfaceFormat,
    ) -> Result<FakeSurface, PlatformError> {
        record(
            &self.journal,
            "ICompositionGraphicsDevice::CreateDrawingSurface",
            Call::CreateDrawingSurface {
                device: graphics.device,
                size,
            },
        )?;
        let id = self.journal.borrow_mut().id();
        Ok(FakeSurface {
            id,
            size,
            drawing: false,
            journal: self.journal.clone(),
        })
    }

    fn create_surface_brush(&self, surface: &FakeSurface) -> Result<FakeBrush, PlatformError> {
        record(
            &self.journal,
            "ICompositor::CreateSurfaceBrushWithSurface",
            Call::CreateSurfaceBrush {
                surface: surface.id,
            },
        )?;
        Ok(FakeBrush::Surface(surface.id))
    }

    fn create_color_brush(&self, color: Color) -> Result<FakeBrush, PlatformError> {
        record(
            &self.journal,
            "ICompositor::CreateColorBrushWithColor",
            Call::CreateColorBrush(color),
        )?;
        let id = self.journal.borrow_mut().id();
        Ok(FakeBrush::Color(color, id))
    }

    fn create_backdrop_brush(&self, _effect: &BackdropEffect) -> Result<FakeBrush, PlatformError> {
        record(
            &self.journal,
            "ICompositionEffectFactory::CreateBrush",
            Call::CreateBackdropBrush,
        )?;
        let mut journal = self.journal.borrow_mut();
        let id = journal.backdrops;
        journal.backdrops += 1;
        Ok(FakeBrush::Backdrop(id))
    }

    fn create_visual_tree(
        &self,
        window: RawWindowHandle,
    ) -> Result<VisualTree<Self>, PlatformError> {
        let tree = self.journal.borrow_mut().id();
        record(
            &self.journal,
            "ICompositorDesktopInterop::CreateDesktopWindowTarget",
            Call::CreateVisualTree { tree, window },
        )?;
        let visual = |role| FakeVisual {
            tree,
            role,
            journal: self.journal.clone(),
        };
        Ok(VisualTree {
            target: FakeTarget,
            content: visual(Role::Content),
            background: visual(Role::Background),
        })
    }

    fn request_commit(&self, signal: &CommitSignal) -> Result<(), PlatformError> {
        let mut journal = self.journal.borrow_mut();
        journal.check("ICompositor5::RequestCommitAsync")?;
        assert!(
            journal.pending_commit.is_none(),
            "a commit is already pending"
        );
        journal.pending_commit = Some(signal.clone());
        journal.calls.push(Call::RequestCommit);
        Ok(())
    }

    fn dispatch_message(&self) -> Result<Dispatch, PlatformError> {
        let mut journal = self.journal.borrow_mut();
        journal.check("GetMessageW")?;
        journal.calls.push(Call::Dispatch);
        match journal.script.pop_front() {
            Some(Step::Message) => Ok(Dispatch::Message),
            Some(Step::CompleteCommit) => {
                if let Some(signal) = journal.pending_commit.take() {
                    signal.complete();
                }
                Ok(Dispatch::Message)
            }
            Some(Step::Shutdown(handle)) => {
                handle.request();
                Ok(Dispatch::Message)
            }
            // An exhausted script ends the loop instead of blocking forever.
            Some(Step::Quit) | None => Ok(Dispatch::Quit),
        }
    }
}
