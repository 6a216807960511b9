// Frame -> panel buffer conversion tests

mod common;

use common::PANEL;
use embedded_graphics::pixelcolor::BinaryColor;
use epd_sysmon::display::PanelSize;
use epd_sysmon::frame::{Frame, FrameError};

fn native_is_ink(buffer: &[u8], panel: PanelSize, x: u32, y: u32) -> bool {
    let byte = buffer[y as usize * panel.stride() + x as usize / 8];
    byte & (0x80 >> (x % 8)) == 0
}

#[test]
fn test_landscape_frame_has_swapped_dimensions() {
    let frame = Frame::landscape(PANEL);
    assert_eq!(frame.dimensions(), (250, 122));
}

#[test]
fn test_blank_landscape_frame_gives_white_buffer() {
    let frame = Frame::landscape(PANEL);
    let buffer = frame.panel_buffer(PANEL).unwrap();
    assert_eq!(buffer.len(), 4000);
    assert!(buffer.iter().all(|b| *b == 0xFF));
}

#[test]
fn test_landscape_frame_rotates_counter_clockwise() {
    let mut frame = Frame::landscape(PANEL);
    frame.set_pixel(0, 0, BinaryColor::On);
    frame.set_pixel(249, 121, BinaryColor::On);
    frame.set_pixel(10, 20, BinaryColor::On);

    let buffer = frame.panel_buffer(PANEL).unwrap();
    assert!(native_is_ink(&buffer, PANEL, 0, 249));
    assert!(native_is_ink(&buffer, PANEL, 121, 0));
    assert!(native_is_ink(&buffer, PANEL, 20, 239));
    let ink: u32 = buffer.iter().map(|b| b.count_zeros()).sum();
    assert_eq!(ink, 3);
    assert_eq!(buffer[15], 0xBF);
}

#[test]
fn test_native_frame_is_copied_verbatim() {
    let mut frame = Frame::new(PANEL.width, PANEL.height);
    frame.set_pixel(5, 7, BinaryColor::On);
    assert_eq!(frame.panel_buffer(PANEL).unwrap(), frame.as_bytes());
}

#[test]
fn test_mismatched_frame_is_rejected() {
    let mut frame = Frame::new(64, 64);
    frame.set_pixel(1, 1, BinaryColor::On);
    assert_eq!(
        frame.panel_buffer(PANEL),
        Err(FrameError::SizeMismatch {
            frame: (64, 64),
            panel: (122, 250),
        })
    );
}
