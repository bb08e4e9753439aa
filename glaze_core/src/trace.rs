// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the presenter and the commit loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! presenter instrumentation calls at each step. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::error::Error;
use crate::geometry::SurfaceSize;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why the run loop returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// A [`ShutdownHandle`](crate::commit::ShutdownHandle) requested it.
    Shutdown,
    /// The OS posted a quit message to the thread.
    Quit,
    /// A platform step of the loop failed.
    Failed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a layer binds a new GPU device and its device-dependent
/// resources are swapped in.
#[derive(Clone, Copy, Debug)]
pub struct DeviceRebuiltEvent {
    /// Layer identifier, unique within its compositor.
    pub layer: u32,
    /// `true` if a previously bound device was replaced.
    pub replaced: bool,
}

/// Emitted when a layer's drawing surface is resized.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceResizedEvent {
    /// Layer identifier.
    pub layer: u32,
    /// Surface size before the resize.
    pub from: SurfaceSize,
    /// Surface size after the resize.
    pub to: SurfaceSize,
}

/// Emitted after a frame was copied into a layer's surface.
#[derive(Clone, Copy, Debug)]
pub struct FramePresentedEvent {
    /// Layer identifier.
    pub layer: u32,
    /// Per-layer count of successful presents, starting at 0.
    pub frame_index: u64,
    /// Presented size.
    pub size: SurfaceSize,
}

/// Emitted when a present is aborted and the frame is dropped.
#[derive(Clone, Copy, Debug)]
pub struct PresentFailedEvent {
    /// Layer identifier.
    pub layer: u32,
    /// Why the present failed.
    pub error: Error,
}

/// Emitted when a layer's background brush is substituted.
#[derive(Clone, Copy, Debug)]
pub struct BlurBehindEvent {
    /// Layer identifier.
    pub layer: u32,
    /// New blur-behind state.
    pub enabled: bool,
}

/// Emitted when the run loop requests a commit-completion notification.
#[derive(Clone, Copy, Debug)]
pub struct CommitRequestedEvent {
    /// Number of commits requested before this one.
    pub commit_index: u64,
}

/// Emitted right before the tick callback runs for a completed commit.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent {
    /// Index of the commit that completed.
    pub commit_index: u64,
}

/// Emitted when the run loop returns.
#[derive(Clone, Copy, Debug)]
pub struct LoopStoppedEvent {
    /// Commits that completed while the loop ran.
    pub completed_commits: u64,
    /// Why the loop stopped.
    pub reason: StopReason,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from layers and the run loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when device-dependent resources are rebuilt.
    fn on_device_rebuilt(&mut self, e: &DeviceRebuiltEvent) {
        _ = e;
    }

    /// Called when a drawing surface is resized.
    fn on_surface_resized(&mut self, e: &SurfaceResizedEvent) {
        _ = e;
    }

    /// Called after a successful present.
    fn on_frame_presented(&mut self, e: &FramePresentedEvent) {
        _ = e;
    }

    /// Called when a present fails.
    fn on_present_failed(&mut self, e: &PresentFailedEvent) {
        _ = e;
    }

    /// Called when the background brush is substituted.
    fn on_blur_behind(&mut self, e: &BlurBehindEvent) {
        _ = e;
    }

    /// Called when a commit is requested.
    fn on_commit_requested(&mut self, e: &CommitRequestedEvent) {
        _ = e;
    }

    /// Called before the tick callback runs.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called when the run loop returns.
    fn on_loop_stopped(&mut self, e: &LoopStoppedEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($self:ident, $method:ident, $e:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $e;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`DeviceRebuiltEvent`].
    #[inline]
    pub fn device_rebuilt(&mut self, e: &DeviceRebuiltEvent) {
        emit!(self, on_device_rebuilt, e);
    }

    /// Emits a [`SurfaceResizedEvent`].
    #[inline]
    pub fn surface_resized(&mut self, e: &SurfaceResizedEvent) {
        emit!(self, on_surface_resized, e);
    }

    /// Emits a [`FramePresentedEvent`].
    #[inline]
    pub fn frame_presented(&mut self, e: &FramePresentedEvent) {
        emit!(self, on_frame_presented, e);
    }

    /// Emits a [`PresentFailedEvent`].
    #[inline]
    pub fn present_failed(&mut self, e: &PresentFailedEvent) {
        emit!(self, on_present_failed, e);
    }

    /// Emits a [`BlurBehindEvent`].
    #[inline]
    pub fn blur_behind(&mut self, e: &BlurBehindEvent) {
        emit!(self, on_blur_behind, e);
    }

    /// Emits a [`CommitRequestedEvent`].
    #[inline]
    pub fn commit_requested(&mut self, e: &CommitRequestedEvent) {
        emit!(self, on_commit_requested, e);
    }

    /// Emits a [`TickEvent`].
    #[inline]
    pub fn tick(&mut self, e: &TickEvent) {
        emit!(self, on_tick, e);
    }

    /// Emits a [`LoopStoppedEvent`].
    #[inline]
    pub fn loop_stopped(&mut self, e: &LoopStoppedEvent) {
        emit!(self, on_loop_stopped, e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
