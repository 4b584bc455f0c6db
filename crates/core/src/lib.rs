//! Ringlight core
//!
//! Hardware independent part of the ring light controller: the animation commands model,
//! the LED rings geometry and the rendering algorithms which turn a command into a sequence
//! of pixel buffer updates.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub use smart_leds::RGB8;

pub use crate::{
    action::{Action, Animation, Mode},
    animator::Animator,
    config::{RingGeometry, StripConfig},
    errors::{ConfigurationError, HardwareError},
    surface::PixelSurface,
};
#[cfg(feature = "std")]
pub use crate::{
    time::StdDelay,
    validate::{validate, FieldError, ValidationError},
};

pub mod action;
pub mod animator;
pub mod config;
pub mod errors;
pub mod surface;
#[cfg(feature = "std")]
pub mod time;
#[cfg(feature = "std")]
pub mod validate;

/// The color which turns the pixel off.
pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
