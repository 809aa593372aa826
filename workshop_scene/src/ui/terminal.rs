//! Scripted terminal shown on the monitor once the camera lands.

/// Lines printed by the fake `kova` session. Empty strings are blank lines.
pub const KOVA_SESSION: &[&str] = &[
    r"PS C:\Users\User> kova --version",
    "Kova Systems v1.0.0",
    "",
    r"PS C:\Users\User> kova init",
    "Initializing Kova Systems...",
    "Loading configuration...",
    "Connecting to Solana network...",
    "Initializing PoSC protocol...",
    "Setting up data validation...",
    "Configuring robot interfaces...",
    "Establishing secure channels...",
    "",
    "Kova Systems initialized successfully!",
    "",
    "Available commands:",
    "  kova status     - Check system status",
    "  kova connect    - Connect robot to network",
    "  kova contribute - Start data contribution",
    "  kova dashboard  - Open web dashboard",
    "",
    "Coming soon...",
    "",
    r"PS C:\Users\User>",
];

const PROMPT: &str = r"PS C:\Users\User>";
const PROGRESS_WORDS: [&str; 6] = [
    "Loading",
    "Connecting",
    "Initializing",
    "Setting",
    "Configuring",
    "Establishing",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Prompt,
    Success,
    Progress,
    Notice,
    Plain,
}

pub fn line_style(line: &str) -> LineStyle {
    if line.starts_with(PROMPT) {
        LineStyle::Prompt
    } else if line.contains("successfully") {
        LineStyle::Success
    } else if PROGRESS_WORDS.iter().any(|w| line.contains(w)) {
        LineStyle::Progress
    } else if line.contains("Coming soon") {
        LineStyle::Notice
    } else {
        LineStyle::Plain
    }
}

/// Reveals one line per `interval` seconds while running.
#[derive(Clone, Debug)]
pub struct TerminalReveal {
    lines: &'static [&'static str],
    interval: f32,
    shown: usize,
    elapsed: f32,
    running: bool,
}

impl TerminalReveal {
    pub fn new(lines: &'static [&'static str], interval: f32) -> Self {
        Self {
            lines,
            interval: interval.max(f32::EPSILON),
            shown: 0,
            elapsed: 0.0,
            running: false,
        }
    }

    /// Restarts the reveal from an empty screen.
    pub fn start(&mut self) {
        self.shown = 0;
        self.elapsed = 0.0;
        self.running = true;
    }

    pub fn reset(&mut self) {
        self.shown = 0;
        self.elapsed = 0.0;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_done(&self) -> bool {
        self.shown == self.lines.len()
    }

    pub fn step(&mut self, dt: f32) {
        if !self.running || self.is_done() {
            return;
        }
        self.elapsed += dt.max(0.0);
        while self.elapsed >= self.interval && !self.is_done() {
            self.elapsed -= self.interval;
            self.shown += 1;
        }
    }

    pub fn visible(&self) -> &[&'static str] {
        &self.lines[..self.shown]
    }
}

impl Default for TerminalReveal {
    fn default() -> Self {
        Self::new(KOVA_SESSION, 0.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_every_interval() {
        let mut reveal = TerminalReveal::default();
        reveal.start();

        reveal.step(0.1);
        assert!(reveal.visible().is_empty());
        reveal.step(0.15);
        assert_eq!(reveal.visible(), &KOVA_SESSION[..1]);
        reveal.step(0.4);
        assert_eq!(reveal.visible().len(), 3);
    }

    #[test]
    fn stops_at_the_last_line() {
        let mut reveal = TerminalReveal::default();
        reveal.start();
        reveal.step(60.0);
        assert!(reveal.is_done());
        assert_eq!(reveal.visible().len(), KOVA_SESSION.len());
    }

    #[test]
    fn idle_until_started_and_cleared_by_reset() {
        let mut reveal = TerminalReveal::default();
        reveal.step(1.0);
        assert!(reveal.visible().is_empty());

        reveal.start();
        reveal.step(1.0);
        reveal.reset();
        assert!(!reveal.is_running());
        assert!(reveal.visible().is_empty());
    }

    #[test]
    fn lines_are_styled_like_a_shell() {
        assert_eq!(line_style(KOVA_SESSION[0]), LineStyle::Prompt);
        assert_eq!(line_style("Kova Systems initialized successfully!"), LineStyle::Success);
        assert_eq!(line_style("Loading configuration..."), LineStyle::Progress);
        assert_eq!(line_style("Coming soon..."), LineStyle::Notice);
        assert_eq!(line_style("Available commands:"), LineStyle::Plain);
    }
}
