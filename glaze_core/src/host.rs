// Copyright 2026 the Glaze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle-based interface for hosts.
//!
//! Hosts that cannot hold Rust values directly (a foreign runtime, a C API,
//! a scripting layer) address compositors and layers through small `Copy`
//! handles. [`Host`] owns the objects in generational slot tables: a handle
//! carries a slot index and the generation it was issued under, so a handle
//! that outlives its object fails with [`Error::Disposed`] instead of
//! reaching whatever reuses the slot.
//!
//! A host keeps at most one live compositor, since the composition service
//! allows one connection per thread. Requesting a compositor while one is
//! live returns the existing handle.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::fmt;

use raw_window_handle::RawWindowHandle;

use crate::backend::{CompositionApi, Platform, SharedTextureHandle};
use crate::commit::{CompositorState, ShutdownHandle};
use crate::compositor::Compositor;
use crate::config::CompositorConfig;
use crate::error::Error;
use crate::layer::CompositionLayer;

/// GPU device type accepted by a host over platform `P`.
pub type HostDevice<P> = <<P as Platform>::Api as CompositionApi>::Device;

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            idx: u32,
            generation: u32,
        }

        impl $name {
            /// Returns the raw slot index (for diagnostics only).
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.idx
            }

            /// Returns the generation counter.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.generation
            }

            /// Packs the handle into an integer for foreign callers.
            #[inline]
            #[must_use]
            pub const fn to_raw(self) -> u64 {
                ((self.generation as u64) << 32) | self.idx as u64
            }

            /// Unpacks a handle produced by [`to_raw`](Self::to_raw).
            #[inline]
            #[must_use]
            #[expect(
                clippy::cast_possible_truncation,
                reason = "each half of the raw value is exactly 32 bits"
            )]
            pub const fn from_raw(raw: u64) -> Self {
                Self {
                    idx: raw as u32,
                    generation: (raw >> 32) as u32,
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}@gen{})"), self.idx, self.generation)
            }
        }
    };
}

handle_type! {
    /// A handle to a compositor owned by a [`Host`].
    CompositorHandle
}

handle_type! {
    /// A handle to a composition layer owned by a [`Host`].
    LayerHandle
}

/// Generational slot storage.
#[derive(Debug)]
struct Slots<T> {
    entries: Vec<Option<T>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
}

impl<T> Slots<T> {
    const fn new() -> Self {
        Self {
            entries: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
        }
    }

    fn insert(&mut self, value: T) -> (u32, u32) {
        if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(value);
            (idx, self.generation[idx as usize])
        } else {
            let idx = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
            self.entries.push(Some(value));
            self.generation.push(0);
            (idx, 0)
        }
    }

    fn get(&self, idx: u32, generation: u32) -> Option<&T> {
        let i = idx as usize;
        if self.generation.get(i) != Some(&generation) {
            return None;
        }
        self.entries.get(i)?.as_ref()
    }

    fn get_mut(&mut self, idx: u32, generation: u32) -> Option<&mut T> {
        let i = idx as usize;
        if self.generation.get(i) != Some(&generation) {
            return None;
        }
        self.entries.get_mut(i)?.as_mut()
    }

    fn remove(&mut self, idx: u32, generation: u32) -> Option<T> {
        let i = idx as usize;
        if self.generation.get(i) != Some(&generation) {
            return None;
        }
        let value = self.entries.get_mut(i)?.take()?;
        self.release_slot(idx);
        Some(value)
    }

    /// Removes every value matching `pred`.
    fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        for i in 0..self.entries.len() {
            if self.entries[i].as_ref().is_some_and(&mut pred) {
                self.entries[i] = None;
                self.release_slot(u32::try_from(i).unwrap_or(u32::MAX));
            }
        }
    }

    fn release_slot(&mut self, idx: u32) {
        let i = idx as usize;
        // Bump generation so old handles immediately fail validation.
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(idx);
    }
}

/// A layer together with the compositor it was created from.
struct HostedLayer<A: CompositionApi> {
    owner: CompositorHandle,
    layer: CompositionLayer<A>,
}

/// Owns compositors and layers on behalf of a handle-based host.
///
/// Field order fixes drop order: layers go before the compositors whose
/// connection they were created from.
pub struct Host<P: Platform> {
    layers: Slots<HostedLayer<P::Api>>,
    compositors: Slots<Rc<Compositor<P::Api>>>,
    active: Option<CompositorHandle>,
    connection: Weak<P::Api>,
    platform: P,
    config: CompositorConfig,
}

impl<P: Platform> fmt::Debug for Host<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("active", &self.active)
            .field("connected", &self.is_connected())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: Platform> Host<P> {
    /// Creates an empty host over `platform`.
    pub fn new(platform: P, config: CompositorConfig) -> Self {
        Self {
            layers: Slots::new(),
            compositors: Slots::new(),
            active: None,
            connection: Weak::new(),
            platform,
            config,
        }
    }

    /// Returns `true` if the OS composition service can be used.
    pub fn is_composition_available(&self) -> bool {
        self.platform.is_composition_available()
    }

    /// Returns `true` while a composition connection created by this host
    /// is alive.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.strong_count() > 0
    }

    /// Returns the live compositor, creating it on first request.
    ///
    /// A compositor whose loop has stopped is released together with its
    /// layers, and a fresh one is created in its place.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionLive`] if a released compositor's loop is still
    ///   running on this thread.
    /// - Otherwise the same as [`Compositor::initialize`].
    pub fn create_compositor(&mut self) -> Result<CompositorHandle, Error> {
        if let Some(handle) = self.active {
            let live = self
                .compositors
                .get(handle.idx, handle.generation)
                .is_some_and(|c| c.state() != CompositorState::Stopped);
            if live {
                return Ok(handle);
            }
            drop(self.retire(handle));
        }
        if self.is_connected() {
            return Err(Error::ConnectionLive);
        }
        let compositor = Compositor::initialize(&self.platform, self.config)?;
        self.connection = compositor.connection();
        let (idx, generation) = self.compositors.insert(Rc::new(compositor));
        let handle = CompositorHandle { idx, generation };
        self.active = Some(handle);
        Ok(handle)
    }

    /// Requests shutdown of the compositor and releases it together with
    /// every layer created from it.
    ///
    /// The connection is released once a running loop has returned.
    pub fn release_compositor(&mut self, handle: CompositorHandle) -> Result<(), Error> {
        let compositor = self.retire(handle).ok_or(Error::Disposed)?;
        compositor.shutdown_handle().request();
        Ok(())
    }

    /// Removes a compositor and its layers from the tables.
    fn retire(&mut self, handle: CompositorHandle) -> Option<Rc<Compositor<P::Api>>> {
        let compositor = self.compositors.remove(handle.idx, handle.generation)?;
        self.layers.remove_where(|hosted| hosted.owner == handle);
        if self.active == Some(handle) {
            self.active = None;
        }
        Some(compositor)
    }

    /// Creates a layer for `window` on `compositor`.
    pub fn create_composition_layer(
        &mut self,
        compositor: CompositorHandle,
        window: RawWindowHandle,
    ) -> Result<LayerHandle, Error> {
        let layer = self.compositor(compositor)?.create_layer(window)?;
        let (idx, generation) = self.layers.insert(HostedLayer {
            owner: compositor,
            layer,
        });
        Ok(LayerHandle { idx, generation })
    }

    /// Presents a shared texture through `layer`.
    ///
    /// See [`CompositionLayer::present`].
    pub fn present_frame(
        &mut self,
        layer: LayerHandle,
        device: &HostDevice<P>,
        texture: SharedTextureHandle,
        width: u32,
        height: u32,
    ) -> Result<(), Error> {
        self.layer_mut(layer)?
            .present(device, texture, width, height)
    }

    /// Toggles blur-behind on `layer`.
    pub fn set_blur_behind(&mut self, layer: LayerHandle, enabled: bool) -> Result<(), Error> {
        self.layer_mut(layer)?.set_blur_behind(enabled)
    }

    /// Releases `layer` and its native visual tree.
    pub fn release_layer(&mut self, layer: LayerHandle) -> Result<(), Error> {
        self.layers
            .remove(layer.idx, layer.generation)
            .map(drop)
            .ok_or(Error::Disposed)
    }

    /// Runs `compositor`'s message loop on the calling thread.
    ///
    /// `on_tick` receives the host, so it can present frames, toggle blur,
    /// or release objects between commits. When the loop returns, the
    /// compositor and its layers are released, and so is the connection.
    pub fn run_compositor(
        &mut self,
        compositor: CompositorHandle,
        mut on_tick: impl FnMut(&mut Self),
    ) -> Result<(), Error> {
        let running = Rc::clone(
            self.compositors
                .get(compositor.idx, compositor.generation)
                .ok_or(Error::Disposed)?,
        );
        let result = running.run(|| on_tick(self));
        if running.state() == CompositorState::Stopped {
            drop(self.retire(compositor));
        }
        result
    }

    /// Returns a thread-safe shutdown handle for `compositor`.
    pub fn shutdown_handle(&self, compositor: CompositorHandle) -> Result<ShutdownHandle, Error> {
        Ok(self.compositor(compositor)?.shutdown_handle())
    }

    /// Looks up a compositor.
    pub fn compositor(&self, handle: CompositorHandle) -> Result<&Compositor<P::Api>, Error> {
        self.compositors
            .get(handle.idx, handle.generation)
            .map(|c| &**c)
            .ok_or(Error::Disposed)
    }

    /// Looks up a layer.
    pub fn layer(&self, handle: LayerHandle) -> Result<&CompositionLayer<P::Api>, Error> {
        self.layers
            .get(handle.idx, handle.generation)
            .map(|hosted| &hosted.layer)
            .ok_or(Error::Disposed)
    }

    fn layer_mut(&mut self, handle: LayerHandle) -> Result<&mut CompositionLayer<P::Api>, Error> {
        self.layers
            .get_mut(handle.idx, handle.generation)
            .map(|hosted| &mut hosted.layer)
            .ok_or(Error::Disposed)
    }

    /// The platform this host connects through.
    pub fn platform(&self) -> &P {
        &self.platform
    }
}
