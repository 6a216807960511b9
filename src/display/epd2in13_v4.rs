// Waveshare 2.13" e-Paper V4 (SSD1680-class controller, 122x250) over embedded-hal 1.0.

use super::{DisplayPort, PanelSize, UpdateMode};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use std::time::Duration;

pub const PANEL: PanelSize = PanelSize::new(122, 250);

/// spidev rejects single transfers above one page.
const MAX_CHUNK: usize = 4096;
const BUSY_POLL_MS: u32 = 10;

mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMPERATURE_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_1: u8 = 0x21;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

/// Update sequence selectors for DISPLAY_UPDATE_CONTROL_2.
const SEQUENCE_FULL: u8 = 0xF7;
const SEQUENCE_PARTIAL: u8 = 0xFF;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("spi: {0}")]
    Spi(String),
    #[error("gpio: {0}")]
    Pin(String),
    #[error("panel stayed busy for more than {0:?}")]
    BusyTimeout(Duration),
    #[error("buffer is {got} bytes, panel needs {expected}")]
    BufferSize { expected: usize, got: usize },
}

fn spi_err<E: core::fmt::Debug>(e: E) -> DisplayError {
    DisplayError::Spi(format!("{:?}", e))
}

fn pin_err<E: core::fmt::Debug>(e: E) -> DisplayError {
    DisplayError::Pin(format!("{:?}", e))
}

pub struct Epd2in13V4<SPI, BUSY, DC, RST, DELAY> {
    spi: SPI,
    busy: BUSY,
    dc: DC,
    rst: RST,
    delay: DELAY,
    busy_timeout: Duration,
    mode: Option<UpdateMode>,
}

impl<SPI, BUSY, DC, RST, DELAY> Epd2in13V4<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, busy: BUSY, dc: DC, rst: RST, delay: DELAY, busy_timeout: Duration) -> Self {
        Self {
            spi,
            busy,
            dc,
            rst,
            delay,
            busy_timeout,
            mode: None,
        }
    }

    /// Mode set by the last successful `init`.
    pub fn mode(&self) -> Option<UpdateMode> {
        self.mode
    }

    fn reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_high().map_err(pin_err)?;
        self.delay.delay_ms(20);
        self.rst.set_low().map_err(pin_err)?;
        self.delay.delay_ms(2);
        self.rst.set_high().map_err(pin_err)?;
        self.delay.delay_ms(20);
        Ok(())
    }

    fn command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(pin_err)?;
        self.spi.write(&[command]).map_err(spi_err)
    }

    fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(pin_err)?;
        for chunk in data.chunks(MAX_CHUNK) {
            self.spi.write(chunk).map_err(spi_err)?;
        }
        Ok(())
    }

    fn command_with(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.command(command)?;
        self.data(data)
    }

    /// BUSY is high while the controller works.
    fn wait_idle(&mut self) -> Result<(), DisplayError> {
        let mut waited = Duration::ZERO;
        while self.busy.is_high().map_err(pin_err)? {
            if waited >= self.busy_timeout {
                return Err(DisplayError::BusyTimeout(self.busy_timeout));
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            waited += Duration::from_millis(BUSY_POLL_MS as u64);
        }
        Ok(())
    }

    fn set_window(&mut self, x_start: u32, y_start: u32, x_end: u32, y_end: u32) -> Result<(), DisplayError> {
        self.command_with(
            cmd::SET_RAM_X_RANGE,
            &[(x_start >> 3) as u8, (x_end >> 3) as u8],
        )?;
        self.command_with(
            cmd::SET_RAM_Y_RANGE,
            &[
                y_start as u8,
                (y_start >> 8) as u8,
                y_end as u8,
                (y_end >> 8) as u8,
            ],
        )
    }

    fn set_cursor(&mut self, x: u32, y: u32) -> Result<(), DisplayError> {
        self.command_with(cmd::SET_RAM_X_COUNTER, &[x as u8])?;
        self.command_with(cmd::SET_RAM_Y_COUNTER, &[y as u8, (y >> 8) as u8])
    }

    fn full_window(&mut self) -> Result<(), DisplayError> {
        self.set_window(0, 0, PANEL.width - 1, PANEL.height - 1)?;
        self.set_cursor(0, 0)
    }

    fn driver_output(&mut self) -> Result<(), DisplayError> {
        let last_gate = PANEL.height - 1;
        self.command_with(
            cmd::DRIVER_OUTPUT_CONTROL,
            &[last_gate as u8, (last_gate >> 8) as u8, 0x00],
        )?;
        // X and Y increment, X first
        self.command_with(cmd::DATA_ENTRY_MODE, &[0x03])
    }

    fn turn_on(&mut self, sequence: u8) -> Result<(), DisplayError> {
        self.command_with(cmd::DISPLAY_UPDATE_CONTROL_2, &[sequence])?;
        self.command(cmd::MASTER_ACTIVATION)?;
        self.wait_idle()
    }

    fn init_full(&mut self) -> Result<(), DisplayError> {
        self.reset()?;
        self.wait_idle()?;
        self.command(cmd::SW_RESET)?;
        self.wait_idle()?;
        self.driver_output()?;
        self.full_window()?;
        self.command_with(cmd::BORDER_WAVEFORM, &[0x05])?;
        self.command_with(cmd::DISPLAY_UPDATE_CONTROL_1, &[0x00, 0x80])?;
        // internal temperature sensor
        self.command_with(cmd::TEMPERATURE_SENSOR, &[0x80])?;
        self.wait_idle()
    }

    /// Short reset pulse and partial-waveform border, shared by partial init and every partial push.
    fn prepare_partial(&mut self) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(pin_err)?;
        self.delay.delay_ms(1);
        self.rst.set_high().map_err(pin_err)?;
        self.command_with(cmd::BORDER_WAVEFORM, &[0x80])?;
        self.driver_output()?;
        self.full_window()
    }

    fn check_len(&self, buffer: &[u8]) -> Result<(), DisplayError> {
        let expected = PANEL.buffer_len();
        if buffer.len() != expected {
            return Err(DisplayError::BufferSize {
                expected,
                got: buffer.len(),
            });
        }
        Ok(())
    }

    /// Consume the driver, handing back the bus and pins.
    pub fn release(self) -> (SPI, BUSY, DC, RST, DELAY) {
        (self.spi, self.busy, self.dc, self.rst, self.delay)
    }
}

impl<SPI, BUSY, DC, RST, DELAY> DisplayPort for Epd2in13V4<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    type Error = DisplayError;

    fn size(&self) -> PanelSize {
        PANEL
    }

    fn init(&mut self, mode: UpdateMode) -> Result<(), DisplayError> {
        match mode {
            UpdateMode::Full => self.init_full()?,
            UpdateMode::Partial => {
                self.reset()?;
                self.wait_idle()?;
                self.prepare_partial()?;
            }
        }
        self.mode = Some(mode);
        Ok(())
    }

    fn clear(&mut self, fill: u8) -> Result<(), DisplayError> {
        let buffer = vec![fill; PANEL.buffer_len()];
        self.command_with(cmd::WRITE_RAM_BW, &buffer)?;
        self.turn_on(SEQUENCE_FULL)
    }

    fn display_partial(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.check_len(buffer)?;
        self.prepare_partial()?;
        self.command_with(cmd::WRITE_RAM_BW, buffer)?;
        self.turn_on(SEQUENCE_PARTIAL)
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        self.command_with(cmd::DEEP_SLEEP, &[0x01])?;
        self.delay.delay_ms(2_000);
        Ok(())
    }

    fn teardown(mut self) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(pin_err)?;
        self.dc.set_low().map_err(pin_err)?;
        // dropping closes the spidev handle and releases the GPIO line requests
        drop(self.release());
        Ok(())
    }
}
