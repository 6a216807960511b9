// E-paper device abstraction and the Waveshare 2.13" V4 implementation.

mod epd2in13_v4;
#[cfg(target_os = "linux")]
pub mod linux;

pub use epd2in13_v4::{DisplayError, Epd2in13V4};

/// Addressable area in panel-native orientation (portrait for the 2.13" HAT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSize {
    pub width: u32,
    pub height: u32,
}

impl PanelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Bytes per native row.
    pub fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Size in bytes of a full native buffer.
    pub fn buffer_len(&self) -> usize {
        self.stride() * self.height as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Full,
    Partial,
}

/// The physical panel. Exactly one owner; every call blocks until the panel is idle again.
pub trait DisplayPort {
    type Error: std::error::Error + Send + Sync + 'static;

    fn size(&self) -> PanelSize;

    fn init(&mut self, mode: UpdateMode) -> Result<(), Self::Error>;

    /// Fill the whole panel with `fill` (0xFF = white) and refresh.
    fn clear(&mut self, fill: u8) -> Result<(), Self::Error>;

    /// Push a native-orientation buffer of [`PanelSize::buffer_len`] bytes with a partial refresh.
    fn display_partial(&mut self, buffer: &[u8]) -> Result<(), Self::Error>;

    /// Enter deep sleep.
    fn sleep(&mut self) -> Result<(), Self::Error>;

    /// Release the bus and GPIO lines.
    fn teardown(self) -> Result<(), Self::Error>
    where
        Self: Sized;
}
