//! Synthesis of **involute gear outlines** by simulating the classical
//! rack-generation process: a trapezoidal rack is rolled without slipping along
//! the pitch circle and the conjugate (enveloping) tooth curve is recovered in
//! polar form, adaptively tessellated into an arc chain, optionally root-filleted,
//! and replicated into a complete closed gear outline.
//!
//! The crate is pure 2-D geometry: it produces [`Sketch`] callbacks that drive a
//! caller-supplied pen, and never owns solid-modeling or rendering resources.
//!
//! # Features
//! - **f64**: use f64 as Real (default)
//! - **f32**: use f32 as Real, conflicts with f64

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]

pub mod arcs;
pub mod clip;
pub mod cutter;
pub mod errors;
pub mod fillet;
pub mod float_types;
pub mod gears;
pub mod path;
pub mod rack;
pub mod sketch;
pub mod transform;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::GearError;
pub use gears::{GearPair, GearPairProps, SizeType, create_gear_pair};
pub use sketch::{Sketch, SketchPen};
