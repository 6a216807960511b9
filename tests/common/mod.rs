// Shared test helpers: fixed snapshots, a recording display, stub source/renderer

#![allow(dead_code)]

use epd_sysmon::display::{DisplayPort, PanelSize, UpdateMode};
use epd_sysmon::frame::Frame;
use epd_sysmon::models::MetricSnapshot;
use epd_sysmon::refresh::{MetricSource, Render};
use embedded_graphics::pixelcolor::BinaryColor;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub const PANEL: PanelSize = PanelSize::new(122, 250);

pub fn sample_snapshot() -> MetricSnapshot {
    MetricSnapshot {
        timestamp: "2024-01-01 00:00:00".into(),
        ip_address: "192.168.1.5".into(),
        cpu_temperature: "45.0°C".into(),
        memory_usage_percent: "32%".into(),
        disk_usage_percent: "58%".into(),
    }
}

pub fn fallback_snapshot() -> MetricSnapshot {
    MetricSnapshot {
        timestamp: "2024-01-01 00:00:01".into(),
        ip_address: "No IP".into(),
        cpu_temperature: "N/A".into(),
        memory_usage_percent: "N/A".into(),
        disk_usage_percent: "N/A".into(),
    }
}

/// First TrueType font found on this machine; tests that rasterize text skip without one.
pub fn find_font() -> Option<PathBuf> {
    [
        "pic/Font.ttc",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/System/Library/Fonts/Helvetica.ttc",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.is_file())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init(UpdateMode),
    Clear(u8),
    Partial(Vec<u8>),
    Sleep,
    Teardown,
}

#[derive(Debug, thiserror::Error)]
#[error("mock display failure: {0}")]
pub struct MockError(pub &'static str);

/// Records every call. Optionally fails a given partial update, or fires a hook after N pushes.
pub struct RecordingDisplay {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub fail_partial_at: Option<usize>,
    pub fail_sleep: bool,
    pub on_push: Option<(usize, Box<dyn FnMut()>)>,
    pushes: usize,
}

impl RecordingDisplay {
    pub fn new() -> (Self, Rc<RefCell<Vec<Call>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
                fail_partial_at: None,
                fail_sleep: false,
                on_push: None,
                pushes: 0,
            },
            calls,
        )
    }
}

impl DisplayPort for RecordingDisplay {
    type Error = MockError;

    fn size(&self) -> PanelSize {
        PANEL
    }

    fn init(&mut self, mode: UpdateMode) -> Result<(), MockError> {
        self.calls.borrow_mut().push(Call::Init(mode));
        Ok(())
    }

    fn clear(&mut self, fill: u8) -> Result<(), MockError> {
        self.calls.borrow_mut().push(Call::Clear(fill));
        Ok(())
    }

    fn display_partial(&mut self, buffer: &[u8]) -> Result<(), MockError> {
        self.pushes += 1;
        if self.fail_partial_at == Some(self.pushes) {
            return Err(MockError("partial update"));
        }
        self.calls.borrow_mut().push(Call::Partial(buffer.to_vec()));
        if let Some((n, hook)) = self.on_push.as_mut()
            && *n == self.pushes
        {
            hook();
        }
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), MockError> {
        self.calls.borrow_mut().push(Call::Sleep);
        if self.fail_sleep {
            return Err(MockError("sleep"));
        }
        Ok(())
    }

    fn teardown(self) -> Result<(), MockError> {
        self.calls.borrow_mut().push(Call::Teardown);
        Ok(())
    }
}

/// Returns the same snapshot every time and counts calls.
pub struct StaticSource {
    pub snapshot: MetricSnapshot,
    pub samples: Rc<RefCell<usize>>,
}

impl StaticSource {
    pub fn new(snapshot: MetricSnapshot) -> Self {
        Self {
            snapshot,
            samples: Rc::new(RefCell::new(0)),
        }
    }
}

impl MetricSource for StaticSource {
    async fn sample(&mut self) -> MetricSnapshot {
        *self.samples.borrow_mut() += 1;
        self.snapshot.clone()
    }
}

/// Inks a single pixel at frame (0, 0) and records each frame size it was handed.
#[derive(Default)]
pub struct MarkRenderer {
    pub sizes: Rc<RefCell<Vec<(u32, u32)>>>,
}

impl Render for MarkRenderer {
    fn render(&self, _snapshot: &MetricSnapshot, frame: &mut Frame) {
        self.sizes.borrow_mut().push(frame.dimensions());
        frame.clear();
        frame.set_pixel(0, 0, BinaryColor::On);
    }
}
