//! LED strip configuration and the two rings geometry.

use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Physical LED strip configuration.
///
/// Only the ring sizes and the brightness are interpreted by the controller, the rest of the
/// fields are passed as is to the hardware driver.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct StripConfig {
    /// Number of LEDs in the inner ring.
    pub inner: u16,
    /// Number of LEDs in the outer ring.
    pub outer: u16,
    /// Global brightness, 0 is the darkest and 255 is the brightest.
    pub brightness: u8,
    /// GPIO pin connected to the pixels.
    pub pin: u8,
    /// LED signal frequency.
    pub frequency_hz: u32,
    /// DMA channel used to generate the signal.
    pub dma: u8,
    /// Invert the signal line, for the NPN transistor level shifters.
    pub invert: bool,
    /// PWM channel.
    pub channel: u8,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            inner: 40,
            outer: 48,
            brightness: 255,
            pin: 18,
            frequency_hz: 800_000,
            dma: 10,
            invert: false,
            channel: 0,
        }
    }
}

impl StripConfig {
    /// Validates the ring sizes and returns the resulting geometry.
    pub fn geometry(&self) -> Result<RingGeometry, ConfigurationError> {
        RingGeometry::new(self.inner, self.outer)
    }
}

/// Validated layout of the two LED rings on a single strip.
///
/// The inner ring occupies the first `inner` pixels of the strip, the outer ring takes the
/// rest of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingGeometry {
    inner: u16,
    outer: u16,
}

impl RingGeometry {
    /// Creates a new rings geometry.
    ///
    /// Rings of equal length are rejected, because the inner ring drift is computed from
    /// the rings length difference.
    pub fn new(inner: u16, outer: u16) -> Result<Self, ConfigurationError> {
        if inner == 0 {
            return Err(ConfigurationError::EmptyRing("inner"));
        }
        if outer == 0 {
            return Err(ConfigurationError::EmptyRing("outer"));
        }
        if inner == outer {
            return Err(ConfigurationError::EqualRings(inner));
        }
        Ok(Self { inner, outer })
    }

    /// Number of LEDs in the inner ring.
    pub const fn inner(&self) -> usize {
        self.inner as usize
    }

    /// Number of LEDs in the outer ring.
    pub const fn outer(&self) -> usize {
        self.outer as usize
    }

    /// Total number of LEDs in the strip.
    pub const fn led_count(&self) -> usize {
        self.inner() + self.outer()
    }

    /// Strip indices of the inner ring pixels.
    pub const fn inner_range(&self) -> Range<usize> {
        0..self.inner()
    }

    /// Strip indices of the outer ring pixels.
    pub const fn outer_range(&self) -> Range<usize> {
        self.inner()..self.led_count()
    }

    /// Number of outer ring steps per one step of the inner ring drift.
    pub fn misstep(&self) -> f64 {
        f64::from(self.outer) / (f64::from(self.outer) - f64::from(self.inner))
    }

    /// Maps a logical position along the outer ring onto the strip indices of both rings.
    ///
    /// The inner ring has a different number of LEDs, so its pixel lags behind by
    /// `round(position / misstep)`.
    ///
    /// Returns `(inner, outer)` strip indices, the inner index is `None` if it falls outside
    /// of the inner ring.
    pub fn both_rings(&self, position: usize) -> (Option<usize>, usize) {
        let drift = round_ties_even(position as f64 / self.misstep()) as i64;
        let inner = usize::try_from(position as i64 - drift)
            .ok()
            .filter(|index| *index < self.inner());
        (inner, self.inner() + position)
    }

    /// Returns the number of lit outer ring positions after the given tick of a timer which
    /// lasts `seconds` ticks in total.
    pub fn timer_position(&self, tick: i64, seconds: i64) -> usize {
        debug_assert!(seconds > 0);

        let lit = (tick as f64 + 1.0) * f64::from(self.outer) / seconds as f64;
        round_ties_even(lit).clamp(0.0, f64::from(self.outer)) as usize
    }
}

/// Rounds to the nearest integer, ties go to the even one.
fn round_ties_even(value: f64) -> f64 {
    libm::rint(value)
}
