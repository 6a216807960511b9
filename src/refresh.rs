// The sample -> compose -> push -> sleep cycle and its shutdown sequencing.
// One owner of the display, one frame in flight, no overlap between composing and pushing.

use crate::config::RefreshConfig;
use crate::display::{DisplayPort, UpdateMode};
use crate::frame::Frame;
use crate::models::MetricSnapshot;
use std::future::Future;
use std::time::{Duration, Instant};

/// Fill byte for an all-white panel.
pub const WHITE: u8 = 0xFF;

/// Something that yields a fresh snapshot each iteration. Must not fail.
pub trait MetricSource {
    fn sample(&mut self) -> impl Future<Output = MetricSnapshot>;
}

/// Something that draws a snapshot over the whole of a reusable frame.
pub trait Render {
    fn render(&self, snapshot: &MetricSnapshot, frame: &mut Frame);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Running,
    ShuttingDown,
    /// Never held by a live loop: [`RefreshLoop::shutdown`] consumes it and reports this
    /// state once sleep and teardown have succeeded.
    Terminated,
}

pub struct RefreshLoop<S, R, D> {
    source: S,
    renderer: R,
    display: D,
    frame: Frame,
    interval: Duration,
    stats_log_interval: Duration,
    state: LoopState,
    frames_pushed: u64,
}

impl<S, R, D> RefreshLoop<S, R, D>
where
    S: MetricSource,
    R: Render,
    D: DisplayPort,
{
    /// Initializing: full-update init, clear to white, allocate the reusable frame.
    /// Any error here is fatal for the caller.
    pub fn start(
        source: S,
        renderer: R,
        mut display: D,
        config: &RefreshConfig,
    ) -> Result<Self, D::Error> {
        tracing::debug!(state = ?LoopState::Initializing, "refresh loop");
        display.init(UpdateMode::Full)?;
        display.clear(WHITE)?;
        let frame = Frame::landscape(display.size());
        tracing::info!(
            frame_width = frame.width(),
            frame_height = frame.height(),
            interval_ms = config.interval_ms,
            "display initialized"
        );
        Ok(Self {
            source,
            renderer,
            display,
            frame,
            interval: config.interval(),
            stats_log_interval: config.stats_log_interval(),
            state: LoopState::Initializing,
            frames_pushed: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    /// Running: repeat until `shutdown` resolves. The interrupt is honoured while sampling
    /// and while sleeping; a push in progress always completes first.
    ///
    /// Returns the number of frames pushed. A display error ends the loop and is returned as is.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<u64, D::Error>
    where
        F: Future<Output = ()>,
    {
        self.state = LoopState::Running;
        tracing::debug!(state = ?self.state, "refresh loop");
        tokio::pin!(shutdown);
        let mut last_stats = Instant::now();
        let mut last_push = Duration::ZERO;

        loop {
            let snapshot = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                snapshot = self.source.sample() => snapshot,
            };

            if let Some(elapsed) = self.push(&snapshot)? {
                last_push = elapsed;
            }

            if last_stats.elapsed() >= self.stats_log_interval {
                tracing::info!(
                    frames_pushed = self.frames_pushed,
                    last_push_ms = last_push.as_millis() as u64,
                    "refresh stats"
                );
                last_stats = Instant::now();
            }

            // fixed delay; iteration latency is not subtracted
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!(
            frames_pushed = self.frames_pushed,
            last_push_ms = last_push.as_millis() as u64,
            "Interrupt received; leaving refresh loop"
        );
        self.state = LoopState::ShuttingDown;
        Ok(self.frames_pushed)
    }

    fn push(&mut self, snapshot: &MetricSnapshot) -> Result<Option<Duration>, D::Error> {
        self.renderer.render(snapshot, &mut self.frame);
        let buffer = match self.frame.panel_buffer(self.display.size()) {
            Ok(buffer) => buffer,
            Err(e) => {
                // keep the previous image rather than sending a blank one
                tracing::error!(error = %e, operation = "panel_buffer", "frame skipped");
                return Ok(None);
            }
        };
        let started = Instant::now();
        if let Err(e) = self.display.display_partial(&buffer) {
            tracing::error!(
                error = %e,
                operation = "display_partial",
                frame = self.frames_pushed + 1,
                "partial update failed"
            );
            return Err(e);
        }
        let elapsed = started.elapsed();
        self.frames_pushed += 1;
        tracing::debug!(
            frame = self.frames_pushed,
            push_ms = elapsed.as_millis() as u64,
            time = %snapshot.timestamp,
            "frame pushed"
        );
        Ok(Some(elapsed))
    }

    /// ShuttingDown: put the panel to sleep, then tear the device down. Teardown runs even if
    /// sleep fails; the first error is returned. Consumes the loop, so this happens once.
    pub fn shutdown(mut self) -> Result<LoopState, D::Error> {
        self.state = LoopState::ShuttingDown;
        tracing::info!(state = ?self.state, "Exiting...");
        let slept = self.display.sleep();
        if let Err(e) = &slept {
            tracing::warn!(error = %e, operation = "sleep", "display sleep failed");
        }
        let released = self.display.teardown();
        if let Err(e) = &released {
            tracing::warn!(error = %e, operation = "teardown", "display teardown failed");
        }
        slept.and(released)?;
        tracing::debug!(state = ?LoopState::Terminated, "refresh loop");
        Ok(LoopState::Terminated)
    }
}
