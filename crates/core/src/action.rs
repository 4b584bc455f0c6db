//! Typed animation commands.

use core::fmt;

use crate::RGB8;

/// Animation modes supported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Progressively filling rings countdown.
    Timer,
    /// Brightness ramp of the whole strip.
    Flash,
    /// Pixel by pixel color fill.
    Wipe,
    /// Immediate fill of the whole strip.
    SetAll,
}

impl Mode {
    /// Returns mode with the given wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "timer" => Some(Self::Timer),
            "flash" => Some(Self::Flash),
            "wipe" => Some(Self::Wipe),
            "setAll" => Some(Self::SetAll),
            _ => None,
        }
    }

    /// Wire name of the mode.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Flash => "flash",
            Self::Wipe => "wipe",
            Self::SetAll => "setAll",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Animation with its mode specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    /// Fills both rings during the given number of seconds.
    Timer { color: RGB8, duration_secs: i64 },
    /// Ramps the whole strip intensity up to the given color.
    Flash { color: RGB8, wait_ms: u32 },
    /// Sets strip pixels one after another.
    Wipe { color: RGB8, wait_ms: u32 },
    /// Sets the whole strip to the given color.
    SetAll { color: RGB8 },
}

impl Animation {
    /// Returns an animation mode.
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Timer { .. } => Mode::Timer,
            Self::Flash { .. } => Mode::Flash,
            Self::Wipe { .. } => Mode::Wipe,
            Self::SetAll { .. } => Mode::SetAll,
        }
    }

    /// Returns an animation color.
    pub const fn color(&self) -> RGB8 {
        match *self {
            Self::Timer { color, .. }
            | Self::Flash { color, .. }
            | Self::Wipe { color, .. }
            | Self::SetAll { color } => color,
        }
    }
}

/// A validated animation command ready to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    /// Animation to render.
    pub animation: Animation,
    /// Turn the strip off once the animation completes.
    pub reset_after: bool,
}

impl Action {
    /// Creates a new action with the default reset behavior.
    ///
    /// The strip is cleared after every animation except `SetAll`.
    pub const fn new(animation: Animation) -> Self {
        let reset_after = !matches!(animation, Animation::SetAll { .. });
        Self {
            animation,
            reset_after,
        }
    }

    /// Overrides the reset behavior, `SetAll` actions are never reset.
    #[must_use]
    pub const fn with_reset(mut self, reset_after: bool) -> Self {
        self.reset_after = reset_after && !matches!(self.animation, Animation::SetAll { .. });
        self
    }

    /// Returns an action mode.
    pub const fn mode(&self) -> Mode {
        self.animation.mode()
    }
}

impl From<Animation> for Action {
    fn from(animation: Animation) -> Self {
        Self::new(animation)
    }
}
