// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection owner and commit/tick loop.
//!
//! A [`Compositor`] wraps one connection to the OS composition service. It
//! builds the shared blur-behind brush once, creates a [`CompositionLayer`]
//! per window, and runs the thread's message loop, calling back into the
//! host after every applied commit.
//!
//! # Run loop
//!
//! ```text
//!   request commit ─► AwaitingCommit
//!        ▲                 │ dispatch messages until the commit completes
//!        │                 ▼
//!        └──── on_tick ◄─ Idle
//! ```
//!
//! Exactly one commit is pending at any time, so ticks are paced by the
//! composition service. Shutdown is checked before and after every
//! dispatched message.
//!
//! # Threading
//!
//! The compositor and its layers share the connection through `Rc` and are
//! `!Send`: everything happens on the thread that created them. The only
//! cross-thread entry point is [`ShutdownHandle`].

use alloc::rc::{Rc, Weak};
use core::cell::Cell;

use raw_window_handle::RawWindowHandle;

use crate::backend::{CompositionApi, Dispatch, Platform, Visual};
use crate::commit::{CommitPhase, CommitSignal, CompositorState, ShutdownHandle};
use crate::config::CompositorConfig;
use crate::error::Error;
use crate::layer::CompositionLayer;
use crate::trace::{CommitRequestedEvent, LoopStoppedEvent, StopReason, TickEvent, Tracer};

/// Owner of a composition-service connection on the current thread.
pub struct Compositor<A: CompositionApi> {
    backdrop: A::Brush,
    config: CompositorConfig,
    shutdown: ShutdownHandle,
    lifecycle: Rc<Cell<CompositorState>>,
    phase: Cell<CommitPhase>,
    next_layer_id: Cell<u32>,
    requested_commits: Cell<u64>,
    completed_commits: Cell<u64>,
    api: Rc<A>,
}

impl<A: CompositionApi> core::fmt::Debug for Compositor<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Compositor")
            .field("state", &self.state())
            .field("phase", &self.phase.get())
            .field("completed_commits", &self.completed_commits.get())
            .finish_non_exhaustive()
    }
}

impl<A: CompositionApi> Compositor<A> {
    /// Connects to the composition service on the calling thread and builds
    /// the shared backdrop brush.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityUnavailable`] if `platform` reports no
    ///   composition support.
    /// - [`Error::Platform`] if connecting or building the brush fails.
    pub fn initialize<P>(platform: &P, config: CompositorConfig) -> Result<Self, Error>
    where
        P: Platform<Api = A>,
    {
        if !platform.is_composition_available() {
            return Err(Error::CapabilityUnavailable);
        }
        let api = platform.connect()?;
        Self::new(api, config)
    }

    /// Wraps an existing connection.
    pub fn new(api: A, config: CompositorConfig) -> Result<Self, Error> {
        let backdrop = api.create_backdrop_brush(&config.backdrop)?;
        Ok(Self {
            backdrop,
            config,
            shutdown: ShutdownHandle::new(),
            lifecycle: Rc::new(Cell::new(CompositorState::Initialized)),
            phase: Cell::new(CommitPhase::Idle),
            next_layer_id: Cell::new(0),
            requested_commits: Cell::new(0),
            completed_commits: Cell::new(0),
            api: Rc::new(api),
        })
    }

    /// Creates a presenter for `window`.
    ///
    /// The window gets a composition target with a content visual above an
    /// opaque background visual.
    ///
    /// # Errors
    ///
    /// - [`Error::Disposed`] if the compositor has stopped.
    /// - [`Error::Platform`] if any part of the visual tree cannot be built.
    pub fn create_layer(&self, window: RawWindowHandle) -> Result<CompositionLayer<A>, Error> {
        if self.lifecycle.get() == CompositorState::Stopped {
            return Err(Error::Disposed);
        }
        let tree = self.api.create_visual_tree(window)?;
        let opaque = self.api.create_color_brush(self.config.opaque_background)?;
        tree.background.set_brush(&opaque)?;

        let id = self.next_layer_id.get();
        self.next_layer_id.set(id.wrapping_add(1));
        Ok(CompositionLayer::new(
            id,
            Rc::clone(&self.api),
            tree,
            self.backdrop.clone(),
            self.config,
            Rc::clone(&self.lifecycle),
        ))
    }

    /// Runs the message loop, calling `on_tick` once after every applied
    /// commit.
    ///
    /// See [`run_traced`](Self::run_traced).
    pub fn run(&self, on_tick: impl FnMut()) -> Result<(), Error> {
        self.run_traced(on_tick, &mut Tracer::none())
    }

    /// Runs the message loop, reporting to `tracer`.
    ///
    /// Returns when shutdown is requested through a [`ShutdownHandle`] or
    /// the thread receives a quit message. The compositor is stopped
    /// afterwards: its layers report [`Error::Disposed`].
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] if called from inside `on_tick`.
    /// - [`Error::Disposed`] if the loop already ran to completion.
    /// - [`Error::Platform`] if requesting a commit or waiting for a message
    ///   fails. The compositor stops.
    pub fn run_traced(
        &self,
        mut on_tick: impl FnMut(),
        tracer: &mut Tracer<'_>,
    ) -> Result<(), Error> {
        match self.lifecycle.get() {
            CompositorState::Running | CompositorState::ShutdownRequested => {
                return Err(Error::AlreadyRunning);
            }
            CompositorState::Stopped => return Err(Error::Disposed),
            CompositorState::Initialized => {}
        }
        self.lifecycle.set(CompositorState::Running);

        let result = self.pump(&mut on_tick, tracer);

        self.lifecycle.set(CompositorState::Stopped);
        self.phase.set(CommitPhase::Idle);
        tracer.loop_stopped(&LoopStoppedEvent {
            completed_commits: self.completed_commits.get(),
            reason: *result.as_ref().unwrap_or(&StopReason::Failed),
        });
        result.map(|_| ())
    }

    fn pump(
        &self,
        on_tick: &mut impl FnMut(),
        tracer: &mut Tracer<'_>,
    ) -> Result<StopReason, Error> {
        let signal = CommitSignal::new();
        self.request_commit(&signal, tracer)?;
        loop {
            if self.shutdown.is_requested() {
                return Ok(StopReason::Shutdown);
            }
            if self.api.dispatch_message()? == Dispatch::Quit {
                return Ok(StopReason::Quit);
            }
            if self.shutdown.is_requested() {
                return Ok(StopReason::Shutdown);
            }
            if signal.take_completed() {
                self.phase.set(CommitPhase::Idle);
                let commit_index = self.completed_commits.get();
                self.completed_commits.set(commit_index + 1);
                tracer.tick(&TickEvent { commit_index });
                on_tick();
                self.request_commit(&signal, tracer)?;
            }
        }
    }

    fn request_commit(&self, signal: &CommitSignal, tracer: &mut Tracer<'_>) -> Result<(), Error> {
        self.api.request_commit(signal)?;
        let commit_index = self.requested_commits.get();
        self.requested_commits.set(commit_index + 1);
        self.phase.set(CommitPhase::AwaitingCommit);
        tracer.commit_requested(&CommitRequestedEvent { commit_index });
        Ok(())
    }

    /// Returns a handle that stops the run loop from any thread.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CompositorState {
        match self.lifecycle.get() {
            CompositorState::Stopped => CompositorState::Stopped,
            _ if self.shutdown.is_requested() => CompositorState::ShutdownRequested,
            state => state,
        }
    }

    /// Where the run loop is in its commit cycle.
    #[must_use]
    pub fn commit_phase(&self) -> CommitPhase {
        self.phase.get()
    }

    /// Number of commits applied since the loop started.
    #[must_use]
    pub fn completed_commits(&self) -> u64 {
        self.completed_commits.get()
    }

    /// The configuration this compositor was created with.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// The underlying connection.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Tracks the connection without keeping it alive.
    ///
    /// The connection is released once this compositor and every layer
    /// created from it are dropped.
    pub(crate) fn connection(&self) -> Weak<A> {
        Rc::downgrade(&self.api)
    }
}
