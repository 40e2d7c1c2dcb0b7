#![deny(unsafe_code)]
//! Core types for the Lichtenberg canvas.
//!
//! Provides the growth [`Domain`] and [`GridPos`] cells, the
//! [`PotentialField`] sampler with its [`Falloff`] policies, the
//! [`CounterRng`] counter-based PRNG, the [`Srgb`] stroke color, the
//! [`RunSeed`] replay description, JSON parameter helpers and the shared
//! [`LichtenbergError`] type.

pub mod color;
pub mod domain;
pub mod error;
pub mod field;
pub mod params;
pub mod prng;
pub mod seed;

pub use color::Srgb;
pub use domain::{Domain, GridPos};
pub use error::{LichtenbergError, Termination};
pub use field::{Falloff, FieldParams, PotentialField};
pub use prng::CounterRng;
pub use seed::RunSeed;
