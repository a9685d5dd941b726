//! Packed 1-bpp frame buffer.
//!
//! Drawing goes through `embedded-graphics`; the packed raster is what the
//! panel driver consumes. One bit per pixel, MSB first, row major, white
//! (bit set) by default. The buffer can be snapshotted and restored whole,
//! which the home screen uses to avoid recomputing its cover region.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

const WIDTH_BYTES: usize = (DISPLAY_WIDTH as usize) / 8;
const BUFFER_SIZE: usize = WIDTH_BYTES * DISPLAY_HEIGHT as usize;

pub struct FrameBuffer {
    buffer: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            buffer: vec![0xFF; BUFFER_SIZE],
        }
    }

    /// Size in bytes of one full-screen raster.
    pub fn raster_len() -> usize {
        BUFFER_SIZE
    }

    /// Clear to white.
    pub fn clear(&mut self) {
        self.buffer.fill(0xFF);
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return;
        }
        let byte_index = y as usize * WIDTH_BYTES + (x as usize / 8);
        let bit = 7 - (x % 8);
        if color == BinaryColor::On {
            // Black: clear bit
            self.buffer[byte_index] &= !(1 << bit);
        } else {
            self.buffer[byte_index] |= 1 << bit;
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> BinaryColor {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return BinaryColor::Off;
        }
        let byte_index = y as usize * WIDTH_BYTES + (x as usize / 8);
        let bit = 7 - (x % 8);
        if self.buffer[byte_index] & (1 << bit) == 0 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        }
    }

    /// Raw raster for the panel driver.
    pub fn raster(&self) -> &[u8] {
        &self.buffer
    }

    /// Copy the whole raster into an owned buffer.
    pub fn snapshot(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    /// Restore a raster previously taken with `snapshot`.
    ///
    /// Returns false (leaving the buffer untouched) on a size mismatch.
    pub fn restore(&mut self, snapshot: &[u8]) -> bool {
        if snapshot.len() != self.buffer.len() {
            return false;
        }
        self.buffer.copy_from_slice(snapshot);
        true
    }

    /// Count of black pixels, for render smoke assertions.
    pub fn black_pixel_count(&self) -> usize {
        self.buffer
            .iter()
            .map(|byte| byte.count_zeros() as usize)
            .sum()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}
