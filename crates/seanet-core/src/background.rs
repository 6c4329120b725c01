#![forbid(unsafe_code)]

//! Background field: hashed noise, a vertical travelling wave and a cursor
//! falloff, quantized to steps of 0.4.
//!
//! [`field_value`] is the CPU reference of the fragment shader in the web
//! crate. It is a pure function of its inputs; the GPU version differs only
//! by float precision.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Lattice scale applied to fragment coordinates.
const LATTICE_SCALE: f32 = 2.0 * 0.152;
/// Lattice scroll speed (lattice units per second).
const LATTICE_SCROLL: f32 = 30.0;
const LATTICE_BIAS: f32 = 50.0;
/// Vertical wave speed in pixels per second and wavelength in pixels.
const WAVE_SPEED: f32 = 40.0;
const WAVE_LENGTH: f32 = 300.0;
/// The configured cursor radius is widened by this factor.
pub const MOUSE_RADIUS_SCALE: f32 = 1.2;
const QUANT_STEP: f32 = 0.4;

/// Inputs the background needs each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundInput {
    /// Cursor in framebuffer pixels, origin bottom-left.
    pub mouse: Vec2,
    pub time: f32,
}

/// Uniform block for the background pass.
///
/// Layout matches the WGSL `BgUniforms` struct (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BackgroundUniforms {
    pub mouse: [f32; 2],
    pub time: f32,
    /// Effective radius (already multiplied by [`MOUSE_RADIUS_SCALE`]).
    pub radius: f32,
    pub viewport: [f32; 2],
    pub _pad: [f32; 2],
}

impl BackgroundUniforms {
    #[must_use]
    pub fn new(input: BackgroundInput, mouse_radius: f32, viewport: Vec2) -> Self {
        Self {
            mouse: input.mouse.to_array(),
            time: input.time,
            radius: mouse_radius * MOUSE_RADIUS_SCALE,
            viewport: viewport.to_array(),
            _pad: [0.0; 2],
        }
    }
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn fract3(v: Vec3) -> Vec3 {
    v - v.floor()
}

/// Hash without sine: maps a lattice point to `[0, 1)`.
#[must_use]
pub fn hash2(p: Vec2) -> f32 {
    let mut p3 = fract3(Vec3::new(p.x, p.y, p.x) * 0.1031);
    let yzx = Vec3::new(p3.y, p3.z, p3.x);
    p3 += Vec3::splat(p3.dot(yzx + Vec3::splat(33.33)));
    fract((p3.x + p3.y) * p3.z)
}

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Grey level of one fragment. `frag` and `mouse` use a bottom-left origin.
#[must_use]
pub fn field_value(frag: Vec2, mouse: Vec2, time: f32, mouse_radius: f32) -> f32 {
    let lattice = frag * LATTICE_SCALE + Vec2::splat(time * LATTICE_SCROLL + LATTICE_BIAS);
    let noise = hash2(lattice);

    let radius = mouse_radius * MOUSE_RADIUS_SCALE;
    let circle = crate::sdf::smoothstep(0.2, 1.0, mouse.distance(frag) / radius);

    let wave = mix(1.0, 0.2, fract((frag.y + WAVE_SPEED * time) / WAVE_LENGTH));
    let fac = mix(0.8, 1.1, circle * wave);

    (noise * fac + 0.5).floor() * QUANT_STEP
}
