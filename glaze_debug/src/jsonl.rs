// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON Lines export.
//!
//! [`JsonLinesSink`] writes each event as one JSON object per line, with an
//! `"event"` discriminator and the event's fields. Sizes are written as
//! `[width, height]` pairs. Events the destination refuses are counted and
//! logged through `tracing` rather than interrupting the presenter.

use std::io::Write;

use serde_json::{Value, json};

use glaze_core::geometry::SurfaceSize;
use glaze_core::trace::{
    BlurBehindEvent, CommitRequestedEvent, DeviceRebuiltEvent, FramePresentedEvent,
    LoopStoppedEvent, PresentFailedEvent, SurfaceResizedEvent, TickEvent, TraceSink,
};

use crate::stop_reason_name;

/// Writes one JSON object per event to a [`Write`] destination.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
    failed: u64,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink")
            .field("written", &self.written)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            failed: 0,
        }
    }

    /// Number of events written so far.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Number of events dropped because the destination failed.
    ///
    /// Each drop is also logged as a `tracing` warning.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Consumes the sink, returning the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, value: &Value) {
        let result = serde_json::to_writer(&mut self.writer, value)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        match result {
            Ok(()) => self.written += 1,
            Err(err) => {
                self.failed += 1;
                tracing::warn!(
                    target: "glaze",
                    event = %value["event"],
                    error = %err,
                    "dropped trace event"
                );
            }
        }
    }
}

fn size(s: SurfaceSize) -> Value {
    json!([s.width, s.height])
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_device_rebuilt(&mut self, e: &DeviceRebuiltEvent) {
        self.write(&json!({
            "event": "device_rebuilt",
            "layer": e.layer,
            "replaced": e.replaced,
        }));
    }

    fn on_surface_resized(&mut self, e: &SurfaceResizedEvent) {
        self.write(&json!({
            "event": "surface_resized",
            "layer": e.layer,
            "from": size(e.from),
            "to": size(e.to),
        }));
    }

    fn on_frame_presented(&mut self, e: &FramePresentedEvent) {
        self.write(&json!({
            "event": "frame_presented",
            "layer": e.layer,
            "frame_index": e.frame_index,
            "size": size(e.size),
        }));
    }

    fn on_present_failed(&mut self, e: &PresentFailedEvent) {
        self.write(&json!({
            "event": "present_failed",
            "layer": e.layer,
            "operation": e.error.operation(),
            "message": e.error.to_string(),
        }));
    }

    fn on_blur_behind(&mut self, e: &BlurBehindEvent) {
        self.write(&json!({
            "event": "blur_behind",
            "layer": e.layer,
            "enabled": e.enabled,
        }));
    }

    fn on_commit_requested(&mut self, e: &CommitRequestedEvent) {
        self.write(&json!({
            "event": "commit_requested",
            "commit_index": e.commit_index,
        }));
    }

    fn on_tick(&mut self, e: &TickEvent) {
        self.write(&json!({
            "event": "tick",
            "commit_index": e.commit_index,
        }));
    }

    fn on_loop_stopped(&mut self, e: &LoopStoppedEvent) {
        self.write(&json!({
            "event": "loop_stopped",
            "completed_commits": e.completed_commits,
            "reason": stop_reason_name(e.reason),
        }));
    }
}
