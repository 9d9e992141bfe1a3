#![cfg_attr(feature = "no-console", windows_subsystem = "windows")]

mod args;
mod ui;

use std::process::ExitCode;

use media::camera;
use media::capture::FRAME_CHANNEL_CAPACITY;
use media::display::DisplayScheduler;
use media::lifecycle::LifecycleController;
use util::channels::{bounded_channel, latest_channel};
use util::stop_signals;

use args::Args;

fn main() -> ExitCode {
    let args = Args::default();

    #[cfg(debug_assertions)]
    {
        use util::debug_log;
        if args.no_debug_logging {
            debug_log::disable();
        } else if args.debug_error_log_panics {
            debug_log::panic_on_errors::enable();
        }
    }

    // Bad arguments are fatal before anything (including the window) opens.
    let configs = args
        .capture_config()
        .and_then(|capture| Ok((capture, args.display_config()?)));
    let (capture_config, display_config) = match configs {
        Ok(configs) => configs,
        Err(e) => {
            println!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = stop_signals::polling::enable() {
        util::eprintln_and_exit!("Failed to enable stop signal polling: {e}");
    }

    println!("Camera number {}", capture_config.device_index + 1);
    println!("Image size {}", capture_config.resolution);
    if display_config.scale.get() > 1 {
        println!("Display scale {}:1", display_config.scale);
    }

    let (frame_taker, frame_putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
    let (metric_reader, metric_writer) = latest_channel::new();

    let lifecycle = LifecycleController::start(
        capture_config,
        camera::open_camera,
        frame_putter,
        metric_writer,
    )
    .unwrap_or_else(|e| util::eprintln_and_exit!("{e}"));

    let scheduler = DisplayScheduler::new(frame_taker, metric_reader, display_config);
    let exit_code = ui::run_ui(scheduler, &lifecycle);

    // The device has to be released before the process exits.
    let report = lifecycle.shutdown();
    util::debug_log_info!(
        "Capture finished ({}): {} captured, {} dropped.",
        report.exit,
        report.captured,
        report.dropped,
    );

    stop_signals::polling::disable();

    exit_code
}
