// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, `tracing` forwarding, and JSON Lines export for glaze
//! diagnostics.
//!
//! This crate provides [`TraceSink`](glaze_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`forward::TracingSink`]: re-emits events as `tracing` events.
//! - [`jsonl::JsonLinesSink`]: one JSON object per event, for tooling.

pub mod forward;
pub mod jsonl;
pub mod pretty;

use glaze_core::trace::StopReason;

fn stop_reason_name(reason: StopReason) -> &'static str {
    match reason {
        StopReason::Shutdown => "shutdown",
        StopReason::Quit => "quit",
        StopReason::Failed => "failed",
    }
}
