// Opens the HAT on a Linux SBC: spidev for the bus, GPIO character device for RST/DC/BUSY.

use super::Epd2in13V4;
use crate::config::DisplayConfig;
use anyhow::Context;
use linux_embedded_hal::{
    CdevPin, Delay, SpidevDevice,
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
};
use std::time::Duration;

pub type HatDisplay = Epd2in13V4<SpidevDevice, CdevPin, CdevPin, CdevPin, Delay>;

const CONSUMER: &str = "epd-sysmon";

pub fn open(config: &DisplayConfig) -> anyhow::Result<HatDisplay> {
    let mut spi = SpidevDevice::open(&config.spi_device)
        .with_context(|| format!("opening SPI device {}", config.spi_device))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(config.spi_speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).context("configuring SPI")?;

    let mut chip = Chip::new(&config.gpio_chip)
        .with_context(|| format!("opening GPIO chip {}", config.gpio_chip))?;
    let mut request = |line: u32, flags: LineRequestFlags, name: &str| -> anyhow::Result<CdevPin> {
        let handle = chip
            .get_line(line)
            .with_context(|| format!("getting {} line {}", name, line))?
            .request(flags, 0, CONSUMER)
            .with_context(|| format!("requesting {} line {}", name, line))?;
        CdevPin::new(handle).with_context(|| format!("creating {} pin", name))
    };
    let rst = request(config.rst_pin, LineRequestFlags::OUTPUT, "RST")?;
    let dc = request(config.dc_pin, LineRequestFlags::OUTPUT, "DC")?;
    let busy = request(config.busy_pin, LineRequestFlags::INPUT, "BUSY")?;

    tracing::debug!(
        spi = %config.spi_device,
        gpio_chip = %config.gpio_chip,
        rst = config.rst_pin,
        dc = config.dc_pin,
        busy = config.busy_pin,
        "e-paper HAT opened"
    );

    Ok(Epd2in13V4::new(
        spi,
        busy,
        dc,
        rst,
        Delay {},
        Duration::from_millis(config.busy_timeout_ms),
    ))
}
