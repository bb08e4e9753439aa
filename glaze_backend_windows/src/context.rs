// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windows Runtime initialization for the composition thread.

use core::fmt;
use core::marker::PhantomData;

use glaze_core::PlatformError;
use windows::Win32::System::WinRT::{RO_INIT_SINGLETHREADED, RoInitialize, RoUninitialize};

use crate::error::ResultExt;

/// Keeps the Windows Runtime initialized as a single-threaded apartment on
/// the creating thread.
///
/// Must be dropped on the thread that created it, after every composition
/// object created in the apartment. `!Send` and `!Sync`.
pub struct CompositionContext {
    _not_send: PhantomData<*const ()>,
}

impl fmt::Debug for CompositionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionContext").finish_non_exhaustive()
    }
}

impl CompositionContext {
    /// Initializes the Windows Runtime on the calling thread.
    ///
    /// Fails if the thread already joined a multithreaded apartment.
    pub fn new() -> Result<Self, PlatformError> {
        // SAFETY: balanced by `RoUninitialize` in `Drop` on this same thread,
        // which `!Send` guarantees.
        unsafe { RoInitialize(RO_INIT_SINGLETHREADED) }.platform("RoInitialize")?;
        tracing::debug!("windows runtime initialized (STA)");
        Ok(Self {
            _not_send: PhantomData,
        })
    }
}

impl Drop for CompositionContext {
    fn drop(&mut self) {
        // SAFETY: `new` succeeded on this thread.
        unsafe { RoUninitialize() };
        tracing::debug!("windows runtime uninitialized");
    }
}
