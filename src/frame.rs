// 1-bit framebuffer the composer draws into and the panel buffer handed to the display.
// Bit layout matches the panel RAM: row-major, MSB first, 1 = white.

use crate::display::PanelSize;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame {frame:?} fits panel {panel:?} in neither orientation")]
    SizeMismatch { frame: (u32, u32), panel: (u32, u32) },
}

/// Monochrome bitmap. `BinaryColor::On` is ink (black), `Off` is paper (white).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u8>,
}

impl Frame {
    /// A white frame.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            stride,
            bits: vec![0xFF; stride * height as usize],
        }
    }

    /// Landscape frame for a panel mounted on its side: width = panel height, height = panel width.
    pub fn landscape(panel: PanelSize) -> Self {
        Self::new(panel.height, panel.width)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reset every pixel to white.
    pub fn clear(&mut self) {
        self.bits.fill(0xFF);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let byte = self.bits[y as usize * self.stride + x as usize / 8];
        let white = byte & (0x80 >> (x % 8)) != 0;
        Some(if white {
            BinaryColor::Off
        } else {
            BinaryColor::On
        })
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * self.stride + x as usize / 8;
        let mask = 0x80 >> (x % 8);
        match color {
            BinaryColor::On => self.bits[idx] &= !mask,
            BinaryColor::Off => self.bits[idx] |= mask,
        }
    }

    /// Number of ink pixels; handy for tests and diagnostics.
    pub fn ink_count(&self) -> usize {
        let mut n = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y) == Some(BinaryColor::On) {
                    n += 1;
                }
            }
        }
        n
    }

    /// Convert to the panel's native buffer.
    ///
    /// A frame already in panel orientation is copied as is. A landscape frame
    /// (`width == panel.height`, `height == panel.width`) is rotated 90° counter-clockwise,
    /// so frame pixel `(x, y)` lands on native `(y, width - 1 - x)`. Any other size is an error;
    /// nothing is produced that could blank the panel.
    pub fn panel_buffer(&self, panel: PanelSize) -> Result<Vec<u8>, FrameError> {
        if self.width == panel.width && self.height == panel.height {
            return Ok(self.bits.clone());
        }
        if self.width != panel.height || self.height != panel.width {
            return Err(FrameError::SizeMismatch {
                frame: self.dimensions(),
                panel: (panel.width, panel.height),
            });
        }
        let mut native = Frame::new(panel.width, panel.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y) == Some(BinaryColor::On) {
                    native.set_pixel(y, self.width - 1 - x, BinaryColor::On);
                }
            }
        }
        Ok(native.bits)
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel(point.x as u32, point.y as u32, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = match color {
            BinaryColor::On => 0x00,
            BinaryColor::Off => 0xFF,
        };
        self.bits.fill(fill);
        Ok(())
    }
}
