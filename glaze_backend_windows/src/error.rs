// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping of Windows results onto [`PlatformError`].

use glaze_core::PlatformError;

/// Attaches the name of the failing platform call to a Windows result.
pub(crate) trait ResultExt<T> {
    fn platform(self, operation: &'static str) -> Result<T, PlatformError>;
}

impl<T> ResultExt<T> for windows_core::Result<T> {
    fn platform(self, operation: &'static str) -> Result<T, PlatformError> {
        self.map_err(|err| failed(operation, err.code()))
    }
}

/// Builds a [`PlatformError`] for `operation` and logs it.
pub(crate) fn failed(operation: &'static str, code: windows_core::HRESULT) -> PlatformError {
    tracing::warn!(operation, code = format_args!("0x{:08X}", code.0), "platform call failed");
    PlatformError::new(operation, code.0)
}
