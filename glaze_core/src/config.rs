// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor configuration.

use crate::effect::BackdropEffect;

/// An 8-bit-per-channel ARGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Alpha channel.
    pub a: u8,
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Fully opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Creates a color from red, green, blue, and alpha channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { a, r, g, b }
    }
}

/// Pixel format of a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 32-bit BGRA, 8 bits per channel, normalized unsigned integers.
    #[default]
    Bgra8Unorm,
}

/// Alpha interpretation of a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    /// Color channels are premultiplied by alpha.
    #[default]
    Premultiplied,
    /// Alpha is ignored; the surface is treated as opaque.
    Ignore,
}

/// Format and alpha mode used when creating drawing surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SurfaceFormat {
    /// Pixel layout.
    pub pixel_format: PixelFormat,
    /// Alpha interpretation.
    pub alpha_mode: AlphaMode,
}

/// Configuration for a [`Compositor`](crate::compositor::Compositor).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositorConfig {
    /// Parameters of the shared blur-behind brush.
    pub backdrop: BackdropEffect,
    /// Color of the opaque background shown when blur-behind is off.
    pub opaque_background: Color,
    /// Format of every layer's drawing surface.
    pub surface_format: SurfaceFormat,
}

impl CompositorConfig {
    /// Default configuration for Windows.UI.Composition.
    ///
    /// Premultiplied 32-bit BGRA surfaces, a white opaque background, and a
    /// 30 DIP blur boosted to 2× saturation.
    #[must_use]
    pub const fn windows() -> Self {
        Self {
            backdrop: BackdropEffect::DEFAULT,
            opaque_background: Color::WHITE,
            surface_format: SurfaceFormat {
                pixel_format: PixelFormat::Bgra8Unorm,
                alpha_mode: AlphaMode::Premultiplied,
            },
        }
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self::windows()
    }
}
