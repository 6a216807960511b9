// Fixed five-line layout of a MetricSnapshot onto a landscape frame.

mod font;

pub use font::{FontError, Fonts, Typeface};

use crate::display::PanelSize;
use crate::frame::Frame;
use crate::models::MetricSnapshot;
use crate::refresh::Render;
use embedded_graphics::prelude::Point;

pub const LEFT_MARGIN: i32 = 10;
pub const FIRST_LINE_Y: i32 = 10;
pub const LINE_SPACING: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Body,
    Title,
}

/// One line of text at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub origin: Point,
    pub role: FontRole,
    pub text: String,
}

/// Where and with which face each snapshot line goes. Every line uses the body face.
pub fn layout(snapshot: &MetricSnapshot) -> [TextLine; 5] {
    let mut row = 0;
    snapshot.lines().map(|text| {
        let origin = Point::new(LEFT_MARGIN, FIRST_LINE_Y + LINE_SPACING * row);
        row += 1;
        TextLine {
            origin,
            role: FontRole::Body,
            text,
        }
    })
}

pub struct FrameComposer {
    fonts: Fonts,
    panel: PanelSize,
}

impl FrameComposer {
    pub fn new(fonts: Fonts, panel: PanelSize) -> Self {
        Self { fonts, panel }
    }

    pub fn fonts(&self) -> &Fonts {
        &self.fonts
    }

    /// A fresh white frame sized for the panel's landscape mounting.
    pub fn blank_frame(&self) -> Frame {
        Frame::landscape(self.panel)
    }

    pub fn compose(&self, snapshot: &MetricSnapshot) -> Frame {
        let mut frame = self.blank_frame();
        self.compose_into(snapshot, &mut frame);
        frame
    }

    /// Overwrite `frame` entirely: clear to white, then draw the layout in black.
    pub fn compose_into(&self, snapshot: &MetricSnapshot, frame: &mut Frame) {
        frame.clear();
        for line in layout(snapshot) {
            let face = match line.role {
                FontRole::Body => &self.fonts.body,
                FontRole::Title => &self.fonts.title,
            };
            let Ok(()) = face.draw_text(frame, line.origin, &line.text);
        }
    }
}

impl Render for FrameComposer {
    fn render(&self, snapshot: &MetricSnapshot, frame: &mut Frame) {
        self.compose_into(snapshot, frame);
    }
}
