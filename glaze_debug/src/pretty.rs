// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use glaze_core::trace::{
    BlurBehindEvent, CommitRequestedEvent, DeviceRebuiltEvent, FramePresentedEvent,
    LoopStoppedEvent, PresentFailedEvent, SurfaceResizedEvent, TickEvent, TraceSink,
};

use crate::stop_reason_name;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_device_rebuilt(&mut self, e: &DeviceRebuiltEvent) {
        let _ = writeln!(
            self.writer,
            "[device] layer={} {}",
            e.layer,
            if e.replaced { "replaced" } else { "bound" },
        );
    }

    fn on_surface_resized(&mut self, e: &SurfaceResizedEvent) {
        let _ = writeln!(
            self.writer,
            "[resize] layer={} {:?} -> {:?}",
            e.layer, e.from, e.to,
        );
    }

    fn on_frame_presented(&mut self, e: &FramePresentedEvent) {
        let _ = writeln!(
            self.writer,
            "[present] layer={} frame={} size={:?}",
            e.layer, e.frame_index, e.size,
        );
    }

    fn on_present_failed(&mut self, e: &PresentFailedEvent) {
        let _ = writeln!(
            self.writer,
            "[present:FAILED] layer={} {}",
            e.layer, e.error
        );
    }

    fn on_blur_behind(&mut self, e: &BlurBehindEvent) {
        let _ = writeln!(
            self.writer,
            "[blur] layer={} {}",
            e.layer,
            if e.enabled { "on" } else { "off" },
        );
    }

    fn on_commit_requested(&mut self, e: &CommitRequestedEvent) {
        let _ = writeln!(self.writer, "[commit] index={}", e.commit_index);
    }

    fn on_tick(&mut self, e: &TickEvent) {
        let _ = writeln!(self.writer, "[tick] commit={}", e.commit_index);
    }

    fn on_loop_stopped(&mut self, e: &LoopStoppedEvent) {
        let _ = writeln!(
            self.writer,
            "[stop] commits={} reason={}",
            e.completed_commits,
            stop_reason_name(e.reason),
        );
    }
}
