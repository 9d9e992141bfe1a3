//! Contains [run_ui], which opens the full-screen camera window.

use std::process::ExitCode;

use eframe::{App, Frame, NativeOptions};
use egui::load::SizedTexture;
use egui::{
    Align2, Area, CentralPanel, Color32, ColorImage, Context, Id, Image, Key, Order, Rect,
    RichText, TextureHandle, TextureOptions, Vec2, ViewportBuilder, ViewportCommand,
};

use media::display::{DisplayScheduler, DisplayState, TickOutcome};
use media::lifecycle::LifecycleController;
use util::{stop_signals, version};

/// How far the frame rate overlay sits from the window's top-left corner.
const OVERLAY_OFFSET: Vec2 = Vec2::new(8.0, 8.0);

/// The frame rate overlay's text size.
const OVERLAY_TEXT_SIZE: f32 = 18.0;

/// Opens a maximized, frameless window showing the camera feed, returning once
/// the window closes.
///
/// Closing the window (or pressing Escape, or sending a stop signal) asks
/// `lifecycle` to stop capturing. Joining the worker is left to the caller.
///
/// This function can only be run from the main thread.
pub fn run_ui(scheduler: DisplayScheduler, lifecycle: &LifecycleController) -> ExitCode {
    let window_title = version::window_title();
    let viewer = Viewer::new(scheduler, lifecycle);

    eframe::run_native(
        &window_title,
        NativeOptions {
            viewport: ViewportBuilder::default()
                .with_title(&window_title)
                .with_decorations(false)
                .with_maximized(true),
            ..Default::default()
        },
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
    .map_or_else(
        |e| {
            util::debug_log_error!("UI (run native) failed: {e}");
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

/// What gets drawn: the uploaded camera image and the overlay text. Only the
/// parts a tick changed are rebuilt.
struct Screen {
    texture: Option<TextureHandle>,
    overlay: RichText,
}

impl Screen {
    fn new(state: &DisplayState) -> Self {
        Self {
            texture: None,
            overlay: overlay_text(state),
        }
    }

    fn refresh(&mut self, ctx: &Context, state: &DisplayState, outcome: TickOutcome) {
        if outcome.image_updated {
            self.upload_image(ctx, state);
        }
        if outcome.overlay_updated {
            self.overlay = overlay_text(state);
        }
    }

    fn upload_image(&mut self, ctx: &Context, state: &DisplayState) {
        let Some(image) = state.image() else {
            return;
        };

        let color_image = ColorImage::from_rgba_unmultiplied(image.size(), image.rgba());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("camera_frame", color_image, TextureOptions::LINEAR));
            }
        }
    }
}

fn overlay_text(state: &DisplayState) -> RichText {
    RichText::new(state.overlay_text())
        .monospace()
        .size(OVERLAY_TEXT_SIZE)
        .color(Color32::WHITE)
}

/// The window's state. Everything here lives on the UI thread.
struct Viewer<'a> {
    scheduler: DisplayScheduler,
    lifecycle: &'a LifecycleController,
    state: DisplayState,
    screen: Screen,
    capture_stop_noticed: bool,
}

impl<'a> Viewer<'a> {
    fn new(scheduler: DisplayScheduler, lifecycle: &'a LifecycleController) -> Self {
        let state = DisplayState::default();
        Self {
            scheduler,
            lifecycle,
            screen: Screen::new(&state),
            state,
            capture_stop_noticed: false,
        }
    }

    fn close(&self, ctx: &Context) {
        self.lifecycle.request_stop();
        ctx.send_viewport_cmd(ViewportCommand::Close);
    }

    fn handle_close_triggers(&self, ctx: &Context) {
        if stop_signals::polling::consume() {
            util::debug_log_info!("Stop signal received, closing...");
            self.close(ctx);
        }

        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            self.close(ctx);
        }

        if ctx.input(|i| i.viewport().close_requested()) {
            self.lifecycle.request_stop();
        }
    }

    fn notice_capture_stop(&mut self) {
        if !self.capture_stop_noticed && self.scheduler.capture_stopped() {
            util::debug_log_warning!("Capture stopped, the last frame stays up.");
            self.capture_stop_noticed = true;
        }
    }
}

impl<'a> App for Viewer<'a> {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.handle_close_triggers(ctx);

        let outcome = self.scheduler.tick(&mut self.state);
        self.screen.refresh(ctx, &self.state, outcome);
        self.notice_capture_stop();

        CentralPanel::default()
            .frame(egui::Frame::NONE.fill(Color32::BLACK))
            .show(ctx, |ui| {
                let Some(texture) = &self.screen.texture else {
                    return;
                };

                // One image pixel per screen pixel, centred.
                let size = texture.size_vec2() / ctx.pixels_per_point();
                let rect = Rect::from_center_size(ui.max_rect().center(), size);
                Image::new(SizedTexture::new(texture.id(), size)).paint_at(ui, rect);
            });

        Area::new(Id::new("fps_overlay"))
            .order(Order::Foreground)
            .anchor(Align2::LEFT_TOP, OVERLAY_OFFSET)
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(self.screen.overlay.clone());
            });

        ctx.request_repaint_after(self.scheduler.interval());
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.lifecycle.request_stop();

        util::debug_log_info!("Closing camera window...");
    }
}

#[cfg(test)]
mod tests {
    use egui::RawInput;
    use media::capture::{FRAME_CHANNEL_CAPACITY, MetricSample};
    use media::display::DisplayConfig;
    use media::frame::{Frame, PixelLayout};
    use util::channels::{bounded_channel, latest_channel};

    use super::*;

    #[test]
    fn screen_only_changes_when_a_tick_brings_something_new() {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (reader, writer) = latest_channel::new();
        let scheduler = DisplayScheduler::new(taker, reader, DisplayConfig::default());
        let mut state = DisplayState::default();
        let mut screen = Screen::new(&state);

        _ = Context::default().run(RawInput::default(), |ctx| {
            let outcome = scheduler.tick(&mut state);
            assert_eq!(outcome, TickOutcome::default());
            screen.refresh(ctx, &state, outcome);
            assert!(screen.texture.is_none());
            assert_eq!(screen.overlay.text(), "0 FPS");

            let frame = Frame::from_fill((4, 3).into(), PixelLayout::Rgb24, &[1, 2, 3]);
            assert!(putter.try_put(frame));
            writer.put(MetricSample::new(30.0, None)).unwrap();

            let outcome = scheduler.tick(&mut state);
            assert!(outcome.image_updated && outcome.overlay_updated);
            screen.refresh(ctx, &state, outcome);
            assert_eq!(screen.texture.as_ref().map(|t| t.size()), Some([4, 3]));
            assert_eq!(screen.overlay.text(), "30 FPS");
        });
    }
}
