// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direct2D effect descriptions handed to the composition effect factory.
//!
//! The composition engine reads an effect graph through
//! `IGraphicsEffectD2D1Interop`: effect CLSID, indexed properties, and
//! sources. [`D2D1Effect`] answers those queries from a
//! [`BackdropEffect`](glaze_core::effect::BackdropEffect) description.

use std::cell::RefCell;

use glaze_core::effect::{
    BACKDROP_SOURCE_NAME, BackdropEffect, EffectProperty, GAUSSIAN_BLUR_EFFECT_ID,
    SATURATION_EFFECT_ID,
};
use windows::Foundation::{IPropertyValue, PropertyValue};
use windows::Graphics::Effects::{
    IGraphicsEffect, IGraphicsEffect_Impl, IGraphicsEffectSource, IGraphicsEffectSource_Impl,
};
use windows::UI::Composition::CompositionEffectSourceParameter;
use windows::Win32::Foundation::{E_BOUNDS, E_NOTIMPL};
use windows::Win32::System::WinRT::Graphics::Direct2D::{
    GRAPHICS_EFFECT_PROPERTY_MAPPING, IGraphicsEffectD2D1Interop, IGraphicsEffectD2D1Interop_Impl,
};
use windows_core::{GUID, HSTRING, Interface, PCWSTR, Result, implement};

/// One Direct2D effect node with its properties and inputs.
#[implement(IGraphicsEffect, IGraphicsEffectSource, IGraphicsEffectD2D1Interop)]
struct D2D1Effect {
    id: GUID,
    name: RefCell<HSTRING>,
    properties: Vec<EffectProperty>,
    sources: Vec<IGraphicsEffectSource>,
}

impl D2D1Effect {
    fn new(
        id: u128,
        name: &str,
        properties: &[EffectProperty],
        sources: Vec<IGraphicsEffectSource>,
    ) -> Self {
        Self {
            id: GUID::from_u128(id),
            name: RefCell::new(HSTRING::from(name)),
            properties: properties.to_vec(),
            sources,
        }
    }
}

impl IGraphicsEffect_Impl for D2D1Effect_Impl {
    fn Name(&self) -> Result<HSTRING> {
        Ok(self.name.borrow().clone())
    }

    fn SetName(&self, name: &HSTRING) -> Result<()> {
        *self.name.borrow_mut() = name.clone();
        Ok(())
    }
}

impl IGraphicsEffectSource_Impl for D2D1Effect_Impl {}

impl IGraphicsEffectD2D1Interop_Impl for D2D1Effect_Impl {
    fn GetEffectId(&self) -> Result<GUID> {
        Ok(self.id)
    }

    fn GetNamedPropertyMapping(
        &self,
        _name: &PCWSTR,
        _index: *mut u32,
        _mapping: *mut GRAPHICS_EFFECT_PROPERTY_MAPPING,
    ) -> Result<()> {
        // Properties are only addressed by index.
        Err(E_NOTIMPL.into())
    }

    fn GetPropertyCount(&self) -> Result<u32> {
        Ok(count(self.properties.len()))
    }

    fn GetProperty(&self, index: u32) -> Result<IPropertyValue> {
        let property = self
            .properties
            .get(index as usize)
            .ok_or_else(|| windows_core::Error::from(E_BOUNDS))?;
        property_value(*property)
    }

    fn GetSource(&self, index: u32) -> Result<IGraphicsEffectSource> {
        self.sources
            .get(index as usize)
            .cloned()
            .ok_or_else(|| E_BOUNDS.into())
    }

    fn GetSourceCount(&self) -> Result<u32> {
        Ok(count(self.sources.len()))
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn property_value(property: EffectProperty) -> Result<IPropertyValue> {
    match property {
        EffectProperty::Float(value) => PropertyValue::CreateSingle(value)?.cast(),
        EffectProperty::UInt(value) => PropertyValue::CreateUInt32(value)?.cast(),
    }
}

/// Builds the backdrop → Gaussian blur → saturation effect graph.
pub(crate) fn backdrop_graph(effect: &BackdropEffect) -> Result<IGraphicsEffect> {
    let backdrop: IGraphicsEffectSource =
        CompositionEffectSourceParameter::Create(&HSTRING::from(BACKDROP_SOURCE_NAME))?.cast()?;
    let blur: IGraphicsEffectSource = D2D1Effect::new(
        GAUSSIAN_BLUR_EFFECT_ID,
        "blur",
        &effect.blur_properties(),
        vec![backdrop],
    )
    .into();
    let saturation: IGraphicsEffect = D2D1Effect::new(
        SATURATION_EFFECT_ID,
        "saturation",
        &effect.saturation_properties(),
        vec![blur],
    )
    .into();
    Ok(saturation)
}
