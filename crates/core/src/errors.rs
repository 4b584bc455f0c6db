use core::fmt::{self, Debug, Display};

use displaydoc::Display;

/// Errors that make the LED strip configuration unusable.
///
/// These errors are detected once on startup and must abort the process.
#[derive(Clone, Copy, PartialEq, Eq, Display, Debug)]
pub enum ConfigurationError {
    /// The {0} ring must contain at least one LED.
    EmptyRing(&'static str),
    /// Inner and outer rings have the same length ({0} LEDs), the rings mapping is undefined.
    EqualRings(u16),
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigurationError {}

/// Error reported by the low level pixel driver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HardwareError<E>(pub E);

impl<E> HardwareError<E> {
    /// Returns the underlying driver error.
    pub fn into_inner(self) -> E {
        self.0
    }
}

impl<E: Debug> Display for HardwareError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LED driver error: {:?}", self.0)
    }
}

#[cfg(feature = "std")]
impl<E: Debug> std::error::Error for HardwareError<E> {}
