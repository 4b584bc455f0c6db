//! Pixel surfaces on top of the `smart-leds` drivers.

use std::convert::Infallible;

use ringlight_core::{PixelSurface, BLACK, RGB8};
use smart_leds::{brightness, SmartLedsWrite};

/// Pixel surface which pushes its frame buffer through a `smart-leds` driver.
#[derive(Debug)]
pub struct SmartLedsSurface<W> {
    writer: W,
    frame: Vec<RGB8>,
    brightness: u8,
}

impl<W> SmartLedsSurface<W> {
    /// Creates a new surface with `len` pixels, all of them are turned off.
    pub fn new(writer: W, len: usize, brightness: u8) -> Self {
        Self {
            writer,
            frame: vec![BLACK; len],
            brightness,
        }
    }

    /// Returns the current frame buffer.
    pub fn frame(&self) -> &[RGB8] {
        &self.frame
    }

    /// Returns a reference to the underlying driver.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Returns the underlying driver.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> PixelSurface for SmartLedsSurface<W>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: std::fmt::Debug,
{
    type Error = W::Error;

    fn num_pixels(&self) -> usize {
        self.frame.len()
    }

    fn set_pixel_color(&mut self, index: usize, color: RGB8) {
        if let Some(pixel) = self.frame.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        self.writer
            .write(brightness(self.frame.iter().copied(), self.brightness))
    }
}

/// Simulated LED strip driver which writes frames to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter {
    frames: usize,
}

impl LogWriter {
    /// Returns the number of frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl SmartLedsWrite for LogWriter {
    type Error = Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let frame = iterator.into_iter().map(Into::into).collect::<Vec<RGB8>>();
        self.frames += 1;

        let lit = frame.iter().filter(|pixel| **pixel != BLACK).count();
        log::debug!("Frame #{}: {lit} of {} LEDs lit", self.frames, frame.len());
        log::trace!("Frame #{}: {frame:?}", self.frames);
        Ok(())
    }
}
