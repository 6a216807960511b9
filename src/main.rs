use anyhow::Result;
use epd_sysmon::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let app_config = config::AppConfig::load()?;
    run(app_config).await
}

#[cfg(target_os = "linux")]
async fn run(app_config: config::AppConfig) -> Result<()> {
    use anyhow::Context;
    use display::DisplayPort;

    let display = display::linux::open(&app_config.display)?;
    let fonts = composer::Fonts::load(&app_config.fonts.resolved()).context("loading fonts")?;
    tracing::debug!(
        body = %fonts.body.path().display(),
        body_size = fonts.body.size(),
        title = %fonts.title.path().display(),
        title_size = fonts.title.size(),
        "fonts loaded"
    );
    let composer = composer::FrameComposer::new(fonts, display.size());
    let sampler = sampler::MetricsSampler::new(&app_config.sampler);

    let mut refresh = refresh::RefreshLoop::start(sampler, composer, display, &app_config.refresh)
        .context("initializing e-paper display")?;

    let outcome = refresh.run(shutdown_signal()).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "refresh loop failed; putting display to sleep");
    }
    let cleanup = refresh.shutdown();

    outcome.context("refresh loop")?;
    cleanup.context("display shutdown")?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
async fn run(_app_config: config::AppConfig) -> Result<()> {
    anyhow::bail!("the e-paper backend needs Linux spidev and GPIO character devices")
}

/// Ctrl-C, or SIGTERM from a service manager.
#[cfg(target_os = "linux")]
async fn shutdown_signal() {
    let mut sigterm =
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}
