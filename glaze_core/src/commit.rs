// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commit pacing and cooperative shutdown.
//!
//! The run loop keeps at most one commit pending. A backend completes the
//! [`CommitSignal`] from its commit-completion callback; the loop polls the
//! signal after every dispatched message. [`ShutdownHandle`] is the only
//! piece of compositor state that may cross threads.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// One-shot flag set when a requested commit has been applied.
#[derive(Clone, Debug, Default)]
pub struct CommitSignal {
    completed: Arc<AtomicBool>,
}

impl CommitSignal {
    /// Creates a signal with no completed commit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the pending commit as applied.
    ///
    /// Called by backends from their commit-completion callback.
    pub fn complete(&self) {
        self.completed.store(true, Ordering::Release);
    }

    /// Consumes a completion, returning `true` if one was pending.
    pub fn take_completed(&self) -> bool {
        self.completed.swap(false, Ordering::Acquire)
    }
}

/// Where the run loop is in its commit cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CommitPhase {
    /// No commit is pending.
    #[default]
    Idle,
    /// A commit was requested and its completion has not been observed.
    AwaitingCommit,
}

/// Lifecycle of a [`Compositor`](crate::compositor::Compositor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositorState {
    /// Connected, not yet running.
    Initialized,
    /// Inside `run`.
    Running,
    /// Shutdown was requested; `run` exits at its next check.
    ShutdownRequested,
    /// `run` returned. The compositor accepts no further work.
    Stopped,
}

/// Thread-safe handle that asks a compositor's run loop to exit.
///
/// The loop observes the request after the next dispatched message or
/// commit completion.
#[derive(Clone, Debug, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Creates a handle with no pending request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Idempotent.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Returns `true` once shutdown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
