//! LED rings rendering algorithms.
//!
//! Every animation is a deterministic sequence of pixel writes, flushes and delays. The visual
//! effect depends on timing, so all of them block the caller until the sequence completes.

use core::ops::Range;

use embedded_hal::blocking::delay::DelayMs;

use crate::{Action, Animation, HardwareError, PixelSurface, RingGeometry, BLACK, RGB8};

/// Duration of a single timer step.
const TIMER_TICK_MS: u32 = 1_000;

/// Renders animations onto the pixel surface.
pub struct Animator<'a, S, D> {
    surface: &'a mut S,
    delay: &'a mut D,
    geometry: RingGeometry,
}

impl<'a, S, D> Animator<'a, S, D>
where
    S: PixelSurface,
    D: DelayMs<u32>,
{
    /// Creates a new animator for the given surface.
    pub fn new(surface: &'a mut S, delay: &'a mut D, geometry: RingGeometry) -> Self {
        Self {
            surface,
            delay,
            geometry,
        }
    }

    /// Renders the action to completion and turns the strip off if requested.
    pub fn play(&mut self, action: &Action) -> Result<(), HardwareError<S::Error>> {
        match action.animation {
            Animation::Timer {
                color,
                duration_secs,
            } => self.draw_timer(color, duration_secs)?,
            Animation::Flash { color, wait_ms } => self.flash(color, wait_ms)?,
            Animation::Wipe { color, wait_ms } => {
                self.color_wipe(color, wait_ms, 0..self.geometry.led_count())?;
            }
            Animation::SetAll { color } => self.set_all(color)?,
        }

        if action.reset_after {
            self.clear()?;
        }
        Ok(())
    }

    /// Sets every pixel to the given color with a single flush.
    pub fn set_all(&mut self, color: RGB8) -> Result<(), HardwareError<S::Error>> {
        for index in 0..self.surface.num_pixels() {
            self.surface.set_pixel_color(index, color);
        }
        self.show()
    }

    /// Turns the whole strip off.
    pub fn clear(&mut self) -> Result<(), HardwareError<S::Error>> {
        self.set_all(BLACK)
    }

    /// Ramps the whole strip from black up to the given color.
    ///
    /// Each step raises every channel by one until it reaches its target value, the ramp is
    /// empty for the black color.
    pub fn flash(&mut self, color: RGB8, wait_ms: u32) -> Result<(), HardwareError<S::Error>> {
        let peak = color.r.max(color.g).max(color.b);
        for level in 0..peak {
            self.set_all(RGB8::new(
                color.r.min(level),
                color.g.min(level),
                color.b.min(level),
            ))?;
            self.delay.delay_ms(wait_ms);
        }
        Ok(())
    }

    /// Sets the pixels in the given range one after another, flushing each of them.
    pub fn color_wipe(
        &mut self,
        color: RGB8,
        wait_ms: u32,
        pixels: Range<usize>,
    ) -> Result<(), HardwareError<S::Error>> {
        for index in pixels {
            self.surface.set_pixel_color(index, color);
            self.show()?;
            self.delay.delay_ms(wait_ms);
        }
        Ok(())
    }

    /// Fills both rings in `seconds` steps, one step per second.
    pub fn draw_timer(&mut self, color: RGB8, seconds: i64) -> Result<(), HardwareError<S::Error>> {
        if seconds <= 0 {
            log::info!("Skipping a timer with no countdown");
            return Ok(());
        }

        for tick in 0..seconds {
            let position = self.geometry.timer_position(tick, seconds);
            for outer in 0..position {
                self.draw_both_rings(color, outer);
            }
            self.show()?;
            self.delay.delay_ms(TIMER_TICK_MS);
        }
        Ok(())
    }

    /// Lights the given outer ring position and the matching inner ring pixel.
    pub fn draw_both_rings(&mut self, color: RGB8, position: usize) {
        let (inner, outer) = self.geometry.both_rings(position);
        if let Some(inner) = inner {
            self.surface.set_pixel_color(inner, color);
        }
        self.surface.set_pixel_color(outer, color);
    }

    fn show(&mut self) -> Result<(), HardwareError<S::Error>> {
        self.surface.show().map_err(HardwareError)
    }
}
