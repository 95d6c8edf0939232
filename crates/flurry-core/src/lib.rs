//! Core types for the flurry snowfall effect.
//!
//! Holds the value types shared between the effect engine, the settings
//! file and the terminal host: sampling ranges, colors, travel direction and
//! the effect configuration with its merge and validation rules.

mod color;
mod config;
mod error;
mod range;

pub use color::Rgb;
pub use config::{ConfigOverrides, Direction, EffectConfig, FillMode};
pub use error::ConfigError;
pub use range::Range;
