// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform-independent core for presenting GPU textures through an OS
//! composition service.
//!
//! `glaze_core` owns the decision logic of a composition presenter: when to
//! rebuild device-bound resources, when to resize the drawing surface, which
//! brush the background visual shows, and how the commit loop paces frames.
//! Platform plumbing lives behind the capability traits in [`backend`] and is
//! implemented by backend crates (e.g. `glaze_backend_windows`). The crate is
//! `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   rendering pipeline (external)
//!       │  device + shared texture handle
//!       ▼
//!   CompositionLayer::present() ──► DrawingSurface (copy) ──► visual tree
//!                                                                │
//!                 ┌──────────────────────────────────────────────┘
//!                 ▼
//!   Compositor::run() ──► commit completed ──► on_tick() ──► request commit
//! ```
//!
//! **[`compositor`]**: Connection owner: shared backdrop brush, layer
//! factory, and the commit/tick loop.
//!
//! **[`layer`]**: Per-window presenter: device-change detection, resize,
//! draw-session copy, blur-behind toggling.
//!
//! **[`backend`]**: Capability traits a platform backend implements
//! ([`CompositionApi`](backend::CompositionApi), [`GpuDevice`](backend::GpuDevice),
//! [`DrawingSurface`](backend::DrawingSurface), [`Visual`](backend::Visual)).
//!
//! **[`commit`]**: Commit signal, commit phase, and the cross-thread
//! shutdown handle.
//!
//! **[`host`]**: Generational handle table for hosts that address
//! compositors and layers by integer handles.
//!
//! **[`effect`]**: Description of the blur + saturation backdrop effect.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! presenter instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod backend;
pub mod commit;
pub mod compositor;
pub mod config;
pub mod effect;
pub mod error;
pub mod geometry;
pub mod host;
pub mod layer;
mod resources;
pub mod trace;

#[cfg(test)]
mod fake;

pub use error::{Error, PlatformError};
