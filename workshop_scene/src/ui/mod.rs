mod hud;
mod terminal;

pub use hud::{hud_events_system, hud_plugin, terminal_tick_system, HudState};
pub use terminal::{line_style, LineStyle, TerminalReveal, KOVA_SESSION};
