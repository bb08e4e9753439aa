// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition capability probe.

use windows::Win32::Foundation::FreeLibrary;
use windows::Win32::System::LibraryLoader::{
    GetProcAddress, LOAD_LIBRARY_SEARCH_SYSTEM32, LoadLibraryExW,
};
use windows::core::{s, w};

/// Returns `true` if the system can host a composition dispatcher queue.
///
/// Looks up `CreateDispatcherQueueController` in `CoreMessaging.dll` from
/// the system directory, then unloads the library again.
pub fn is_composition_available() -> bool {
    // SAFETY: the module name is a static wide string; the search is
    // restricted to System32.
    let Ok(module) =
        (unsafe { LoadLibraryExW(w!("CoreMessaging.dll"), None, LOAD_LIBRARY_SEARCH_SYSTEM32) })
    else {
        tracing::debug!("CoreMessaging.dll not found");
        return false;
    };
    // SAFETY: `module` is a live module handle and the name is a static
    // C string.
    let found = unsafe { GetProcAddress(module, s!("CreateDispatcherQueueController")) }.is_some();
    // SAFETY: balances the successful `LoadLibraryExW` above.
    if let Err(err) = unsafe { FreeLibrary(module) } {
        tracing::warn!(%err, "FreeLibrary(CoreMessaging.dll) failed");
    }
    tracing::debug!(found, "composition capability probe");
    found
}
