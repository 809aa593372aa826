//! HUD overlay: overview hint, the monitor terminal and the back button.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use super::terminal::{line_style, LineStyle, TerminalReveal};
use crate::camera::{ScreenZoomComplete, ZoomController, ZoomStateChanged};
use crate::config::WorkshopSettings;
use crate::interaction::{play_click, ClickSound, ClickVoice};
use crate::WorkshopSet;

/// What the overlay shows, driven by the zoom events.
#[derive(Resource, Default)]
pub struct HudState {
    pub zoomed: bool,
    pub terminal: TerminalReveal,
}

pub fn hud_plugin(app: &mut App) {
    app.add_plugins(EguiPlugin)
        .init_resource::<HudState>()
        .add_systems(
            Update,
            (hud_events_system, terminal_tick_system)
                .chain()
                .in_set(WorkshopSet::Present),
        )
        .add_systems(Update, hud_overlay_system.after(WorkshopSet::Present));
}

/// Starts the terminal on arrival, clears it when the camera leaves.
pub fn hud_events_system(
    mut state_changed: EventReader<ZoomStateChanged>,
    mut zoom_complete: EventReader<ScreenZoomComplete>,
    mut hud: ResMut<HudState>,
) {
    for ZoomStateChanged(zoomed) in state_changed.read() {
        hud.zoomed = *zoomed;
        if !zoomed {
            hud.terminal.reset();
        }
    }
    if zoom_complete.read().count() > 0 {
        debug!("screen zoom complete, starting terminal");
        hud.terminal.start();
    }
}

pub fn terminal_tick_system(time: Res<Time>, mut hud: ResMut<HudState>) {
    if hud.terminal.is_running() {
        hud.terminal.step(time.delta_secs());
    }
}

fn hud_overlay_system(
    mut commands: Commands,
    mut contexts: EguiContexts,
    hud: Res<HudState>,
    settings: Res<WorkshopSettings>,
    sound: Option<Res<ClickSound>>,
    voices: Query<Entity, With<ClickVoice>>,
    mut controller: ResMut<ZoomController>,
) {
    let ctx = contexts.ctx_mut();

    if !hud.zoomed && !controller.is_transitioning() {
        egui::Window::new("workshop-hint")
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -24.0])
            .resizable(false)
            .collapsible(false)
            .title_bar(false)
            .frame(panel_frame())
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("Click the computer to enter Kova")
                        .monospace()
                        .color(egui::Color32::from_rgb(255, 170, 51)),
                );
            });
        return;
    }

    if !hud.terminal.is_running() {
        return;
    }

    let mut back = false;
    egui::Window::new("kova-terminal")
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .min_width(480.0)
        .frame(panel_frame())
        .show(ctx, |ui| {
            ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
            for line in hud.terminal.visible() {
                let text = egui::RichText::new(*line).color(line_color(line_style(line)));
                let text = match line_style(line) {
                    LineStyle::Plain => text,
                    _ => text.strong(),
                };
                ui.label(text);
            }
            ui.add_space(8.0);
            back = ui.button("← Back").clicked();
        });

    if back && controller.zoom_back() {
        info!("back button pressed");
        play_click(
            &mut commands,
            sound.as_deref(),
            &voices,
            settings.interaction.click_volume,
        );
    }
}

fn panel_frame() -> egui::Frame {
    egui::Frame::default()
        .fill(egui::Color32::from_rgba_premultiplied(245, 235, 215, 235))
        .inner_margin(egui::Margin::same(12))
        .corner_radius(egui::CornerRadius::same(6))
}

fn line_color(style: LineStyle) -> egui::Color32 {
    match style {
        LineStyle::Prompt => egui::Color32::from_rgb(0x8B, 0x45, 0x13),
        LineStyle::Success => egui::Color32::from_rgb(0x22, 0x8B, 0x22),
        LineStyle::Progress => egui::Color32::from_rgb(0xD2, 0x69, 0x1E),
        LineStyle::Notice => egui::Color32::from_rgb(0xB2, 0x22, 0x22),
        LineStyle::Plain => egui::Color32::from_rgb(0x2F, 0x2F, 0x2F),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<HudState>()
            .add_event::<ZoomStateChanged>()
            .add_event::<ScreenZoomComplete>()
            .add_systems(Update, (hud_events_system, terminal_tick_system).chain());
        app
    }

    fn advance(app: &mut App, seconds: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(std::time::Duration::from_secs_f32(seconds));
        app.update();
    }

    #[test]
    fn terminal_starts_on_arrival_and_reveals_lines() {
        let mut app = test_app();
        app.world_mut().send_event(ZoomStateChanged(true));
        app.world_mut().send_event(ScreenZoomComplete);
        app.update();

        let hud = app.world().resource::<HudState>();
        assert!(hud.zoomed);
        assert!(hud.terminal.is_running());

        advance(&mut app, 0.25);
        advance(&mut app, 0.2);
        assert_eq!(app.world().resource::<HudState>().terminal.visible().len(), 2);
    }

    #[test]
    fn leaving_the_screen_clears_the_terminal() {
        let mut app = test_app();
        app.world_mut().send_event(ZoomStateChanged(true));
        app.world_mut().send_event(ScreenZoomComplete);
        advance(&mut app, 1.0);

        app.world_mut().send_event(ZoomStateChanged(false));
        app.update();

        let hud = app.world().resource::<HudState>();
        assert!(!hud.zoomed);
        assert!(!hud.terminal.is_running());
        assert!(hud.terminal.visible().is_empty());
    }
}
