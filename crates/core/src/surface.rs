//! Pixel buffer abstraction.

use crate::RGB8;

/// LED strip with an in-memory pixel buffer.
///
/// Pixel writes only change the buffer, they become visible after the [`PixelSurface::show`]
/// call.
pub trait PixelSurface {
    /// Error reported by the underlying driver.
    type Error: core::fmt::Debug;
    /// Returns the number of pixels in the buffer.
    fn num_pixels(&self) -> usize;
    /// Sets the pixel with the given index, indices out of range are ignored.
    fn set_pixel_color(&mut self, index: usize, color: RGB8);
    /// Pushes the pixel buffer to the hardware.
    fn show(&mut self) -> Result<(), Self::Error>;
}

impl<T: ?Sized + PixelSurface> PixelSurface for &mut T {
    type Error = T::Error;

    fn num_pixels(&self) -> usize {
        T::num_pixels(self)
    }

    fn set_pixel_color(&mut self, index: usize, color: RGB8) {
        T::set_pixel_color(self, index, color);
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        T::show(self)
    }
}
