//! Simulated panel host loop.
//!
//! Stands in for the simulator: installs one gauge context, ticks it at a
//! frame interval, clicks it on a schedule, and renders status lines until
//! Ctrl-C (or an optional duration) ends the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use tracing::info;

use netgauge::config::ConfigFile;
use netgauge::gauge::{ContextId, DrawData, InstallData, MouseButton, MouseEvent, Plugin};
use netgauge::network::HttpNetwork;

use crate::error::CliError;
use crate::surface::TerminalSurface;

/// The single context id used by the simulated host.
const PANEL_CONTEXT: u64 = 1;

/// Arguments for the `run` command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Frames per second for the simulated panel loop
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Seconds between automatic clicks (0 clicks only once at start)
    #[arg(long, default_value_t = 10)]
    pub click_interval: u64,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration: Option<u64>,

    /// Simulated panel width at install
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Simulated panel height at install
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Override the configured click action (fetch or upload)
    #[arg(long)]
    pub action: Option<String>,
}

impl RunArgs {
    /// Interval between simulated frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

/// Run the simulated panel host.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let config = ConfigFile::load().map_err(|e| CliError::Config(e.to_string()))?;
    let mut gauge_config = config.gauge.clone();
    if let Some(action) = &args.action {
        gauge_config.click_action = action.parse().map_err(CliError::Config)?;
    }

    let backend = Arc::new(HttpNetwork::new(config.http_config())?);
    let mut plugin = Plugin::new(backend, gauge_config)?;
    let ctx = ContextId::new(PANEL_CONTEXT);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .map_err(|e| CliError::Signal(e.to_string()))?;
    }

    println!(
        "{}",
        style("netgauge simulated panel (Ctrl-C to exit)").bold()
    );
    info!(fps = args.fps, width = args.width, height = args.height, "panel starting");

    plugin.on_install(ctx, &InstallData::new(args.width, args.height));
    plugin.on_mouse(ctx, &MouseEvent::click(MouseButton::LeftSingle));

    let frame = args.frame_interval();
    let draw = DrawData::new(args.width as f32, args.height as f32);
    let mut surface = TerminalSurface::new();
    let started = Instant::now();
    let mut last_click = Instant::now();

    while running.load(Ordering::SeqCst) {
        if let Some(limit) = args.duration {
            if started.elapsed() >= Duration::from_secs(limit) {
                break;
            }
        }

        plugin.on_tick(ctx);
        plugin.on_render(ctx, &draw, &mut surface);

        if args.click_interval > 0
            && last_click.elapsed() >= Duration::from_secs(args.click_interval)
        {
            plugin.on_mouse(ctx, &MouseEvent::click(MouseButton::LeftSingle));
            last_click = Instant::now();
        }

        thread::sleep(frame);
    }

    plugin.on_teardown(ctx);
    let snapshot = plugin.telemetry();
    info!(%snapshot, "panel stopped");

    println!();
    println!("{}", style("Session summary").bold());
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{}", snapshot),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> RunArgs {
        RunArgs {
            fps: 30,
            click_interval: 10,
            duration: None,
            width: 800,
            height: 600,
            action: None,
        }
    }

    #[test]
    fn test_frame_interval_from_fps() {
        let mut args = base_args();
        assert_eq!(args.frame_interval(), Duration::from_millis(33));

        args.fps = 60;
        assert_eq!(args.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_frame_interval_clamps_zero_fps() {
        let mut args = base_args();
        args.fps = 0;
        assert_eq!(args.frame_interval(), Duration::from_millis(1000));
    }
}
