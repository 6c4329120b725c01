#![forbid(unsafe_code)]

//! WASM frontend for SeaOfNet.
//!
//! Wraps a [`seanet_core::Session`] with:
//! - `fetch`-based loading of the font atlas and page content,
//! - a WebGPU renderer for the background field and the MSDF glyphs,
//! - a `requestAnimationFrame` loop and a window `mousemove` listener,
//! - `tracing` output to the developer console.
//!
//! Geometry, GPU data layouts, shaders and log formatting compile on every
//! target so they can be tested natively.

pub mod console;
pub mod pointer;
pub mod renderer;

#[cfg(target_arch = "wasm32")]
mod driver;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::SeaOfNet;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct SeaOfNet;

#[cfg(not(target_arch = "wasm32"))]
impl SeaOfNet {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
