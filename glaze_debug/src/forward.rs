// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forwarding to `tracing`.
//!
//! [`TracingSink`] turns each presenter event into a `tracing` event under the
//! `glaze` target, so it lands wherever the application's subscriber sends
//! its logs. Failures log at `error`, lifecycle changes at `debug`, and
//! per-frame events at `trace`.

use glaze_core::trace::{
    BlurBehindEvent, CommitRequestedEvent, DeviceRebuiltEvent, FramePresentedEvent,
    LoopStoppedEvent, PresentFailedEvent, StopReason, SurfaceResizedEvent, TickEvent, TraceSink,
};
use tracing::{debug, error, info, trace};

use crate::stop_reason_name;

/// Re-emits presenter events through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn on_device_rebuilt(&mut self, e: &DeviceRebuiltEvent) {
        debug!(
            target: "glaze",
            layer = e.layer,
            replaced = e.replaced,
            "device resources rebuilt"
        );
    }

    fn on_surface_resized(&mut self, e: &SurfaceResizedEvent) {
        debug!(
            target: "glaze",
            layer = e.layer,
            from = ?e.from,
            to = ?e.to,
            "surface resized"
        );
    }

    fn on_frame_presented(&mut self, e: &FramePresentedEvent) {
        trace!(
            target: "glaze",
            layer = e.layer,
            frame = e.frame_index,
            size = ?e.size,
            "frame presented"
        );
    }

    fn on_present_failed(&mut self, e: &PresentFailedEvent) {
        error!(
            target: "glaze",
            layer = e.layer,
            operation = e.error.operation(),
            "present failed: {}",
            e.error
        );
    }

    fn on_blur_behind(&mut self, e: &BlurBehindEvent) {
        debug!(
            target: "glaze",
            layer = e.layer,
            enabled = e.enabled,
            "blur-behind changed"
        );
    }

    fn on_commit_requested(&mut self, e: &CommitRequestedEvent) {
        trace!(target: "glaze", commit = e.commit_index, "commit requested");
    }

    fn on_tick(&mut self, e: &TickEvent) {
        trace!(target: "glaze", commit = e.commit_index, "tick");
    }

    fn on_loop_stopped(&mut self, e: &LoopStoppedEvent) {
        let reason = stop_reason_name(e.reason);
        if e.reason == StopReason::Failed {
            error!(
                target: "glaze",
                commits = e.completed_commits,
                reason,
                "commit loop stopped"
            );
        } else {
            info!(
                target: "glaze",
                commits = e.completed_commits,
                reason,
                "commit loop stopped"
            );
        }
    }
}
