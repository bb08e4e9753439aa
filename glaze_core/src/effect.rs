// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Description of the translucent backdrop effect.
//!
//! The "blur behind" brush is a two-stage effect graph evaluated by the OS
//! compositor:
//!
//! ```text
//!   backdrop source ──► Gaussian blur ──► saturation ──► brush
//! ```
//!
//! This module only *describes* the graph: effect identifiers, property
//! values, and property order. Backends turn the description into native
//! effect objects. Property order matches the Direct2D property indices of
//! each effect.

/// Name of the source parameter the backdrop brush is bound to.
pub const BACKDROP_SOURCE_NAME: &str = "backdrop";

/// Direct2D Gaussian blur effect identifier (`CLSID_D2D1GaussianBlur`).
pub const GAUSSIAN_BLUR_EFFECT_ID: u128 = 0x1FEB6D69_2FE6_4AC9_8C58_1D7F93E7A6A5;

/// Direct2D saturation effect identifier (`CLSID_D2D1Saturation`).
pub const SATURATION_EFFECT_ID: u128 = 0x5CB2D9CF_327D_459F_A0CE_40C0B2086BF7;

/// Quality/speed trade-off of the Gaussian blur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BlurOptimization {
    /// Fastest, lowest quality.
    Speed,
    /// Balanced quality and speed.
    #[default]
    Balanced,
    /// Highest quality.
    Quality,
}

impl BlurOptimization {
    /// Returns the Direct2D enumeration value.
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Speed => 0,
            Self::Balanced => 1,
            Self::Quality => 2,
        }
    }
}

/// How the blur treats pixels beyond the input edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BorderMode {
    /// Edges fade to transparent.
    Soft,
    /// Edge pixels are clamped, keeping the result opaque at the border.
    #[default]
    Hard,
}

impl BorderMode {
    /// Returns the Direct2D enumeration value.
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Soft => 0,
            Self::Hard => 1,
        }
    }
}

/// A single effect property value, in property-index order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectProperty {
    /// A 32-bit float property.
    Float(f32),
    /// A 32-bit unsigned enumeration property.
    UInt(u32),
}

/// Parameters of the blur + saturation backdrop effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackdropEffect {
    /// Gaussian blur standard deviation, in DIPs.
    pub blur_standard_deviation: f32,
    /// Blur quality/speed trade-off.
    pub blur_optimization: BlurOptimization,
    /// Blur edge handling.
    pub blur_border_mode: BorderMode,
    /// Saturation multiplier applied after the blur (1.0 = unchanged).
    pub saturation: f32,
}

impl BackdropEffect {
    /// The system-style acrylic-like backdrop used by default.
    pub const DEFAULT: Self = Self {
        blur_standard_deviation: 30.0,
        blur_optimization: BlurOptimization::Balanced,
        blur_border_mode: BorderMode::Hard,
        saturation: 2.0,
    };

    /// Properties of the blur stage, indexed like
    /// `D2D1_GAUSSIANBLUR_PROP_*`.
    #[must_use]
    pub const fn blur_properties(&self) -> [EffectProperty; 3] {
        [
            EffectProperty::Float(self.blur_standard_deviation),
            EffectProperty::UInt(self.blur_optimization.to_raw()),
            EffectProperty::UInt(self.blur_border_mode.to_raw()),
        ]
    }

    /// Properties of the saturation stage, indexed like
    /// `D2D1_SATURATION_PROP_*`.
    #[must_use]
    pub const fn saturation_properties(&self) -> [EffectProperty; 1] {
        [EffectProperty::Float(self.saturation)]
    }
}

impl Default for BackdropEffect {
    fn default() -> Self {
        Self::DEFAULT
    }
}
