//! Failing-neon flicker as a frame-stepped state machine.
//!
//! The animator owns its RNG so a seeded instance replays the same schedule,
//! which is what the long-run tests rely on.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{FlickerMode, FlickerSettings};

/// Audio side effects the host must perform after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlickerCue {
    PlayHum,
    StopHum,
}

/// Output of one step: the visible state and the intensity multiplier.
#[derive(Clone, Debug, PartialEq)]
pub struct FlickerFrame {
    pub lit: bool,
    pub level: f32,
    pub cues: Vec<FlickerCue>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingFlip {
    lit: bool,
    remaining: f32,
}

#[derive(Clone, Debug)]
pub struct FlickerAnimator {
    settings: FlickerSettings,
    rng: StdRng,
    lit: bool,
    elapsed: f32,
    phase_duration: f32,
    pending: Option<PendingFlip>,
    glitch_elapsed: Option<f32>,
    hum_duration: Option<f32>,
    started: bool,
    cues: Vec<FlickerCue>,
}

impl FlickerAnimator {
    pub fn new(settings: FlickerSettings, rng: StdRng) -> Self {
        let phase_duration = settings.initial_phase;
        Self {
            settings,
            rng,
            lit: true,
            elapsed: 0.0,
            phase_duration,
            pending: None,
            glitch_elapsed: None,
            hum_duration: None,
            started: false,
            cues: Vec::new(),
        }
    }

    /// Seeded when `seed` is given, otherwise seeded from OS entropy.
    pub fn with_seed(settings: FlickerSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(settings, rng)
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn phase_duration(&self) -> f32 {
        self.phase_duration
    }

    pub fn is_glitching(&self) -> bool {
        self.glitch_elapsed.is_some()
    }

    pub fn has_pending_flip(&self) -> bool {
        self.pending.is_some()
    }

    /// Measured length of the hum clip, used to time lit phases.
    pub fn set_hum_duration(&mut self, seconds: f32) {
        if seconds.is_finite() && seconds > 0.0 {
            self.hum_duration = Some(seconds);
        }
    }

    pub fn hum_duration(&self) -> Option<f32> {
        self.hum_duration
    }

    /// The hum ended on its own: force the tube off.
    pub fn hum_finished(&mut self) {
        if self.settings.mode == FlickerMode::AudioSynced && self.lit && self.pending.is_none() {
            self.decide(false);
        }
    }

    pub fn step(&mut self, dt: f32) -> FlickerFrame {
        let dt = dt.max(0.0);
        self.elapsed += dt;

        // The tube starts lit, so the synced variant starts its hum with it.
        if !self.started {
            self.started = true;
            if self.settings.mode == FlickerMode::AudioSynced && self.lit {
                self.cues.push(FlickerCue::PlayHum);
            }
        }

        if let Some(mut pending) = self.pending {
            pending.remaining -= dt;
            if pending.remaining <= 0.0 {
                self.pending = None;
                self.flip(pending.lit);
            } else {
                self.pending = Some(pending);
            }
        }

        if let Some(glitch) = self.glitch_elapsed {
            let glitch = glitch + dt;
            self.glitch_elapsed = (glitch < self.settings.glitch.duration).then_some(glitch);
        }

        if self.pending.is_none() && self.elapsed >= self.phase_duration {
            self.decide(!self.lit);
        }

        FlickerFrame {
            lit: self.lit,
            level: self.level(),
            cues: std::mem::take(&mut self.cues),
        }
    }

    /// Intensity multiplier on the baselines, clamped to `[0, 1 + glitch ceiling]`.
    pub fn level(&self) -> f32 {
        let base = if self.lit { 1.0 } else { 0.0 };
        let jitter = self.glitch_elapsed.map_or(0.0, |t| self.glitch_jitter(t));
        (base + jitter).clamp(0.0, 1.0 + self.settings.glitch.ceiling)
    }

    fn glitch_jitter(&self, t: f32) -> f32 {
        let glitch = &self.settings.glitch;
        if glitch.duration <= 0.0 {
            return 0.0;
        }
        let decay = (-glitch.decay * t / glitch.duration).exp();
        glitch.amplitude * (std::f32::consts::TAU * glitch.frequency * t).sin() * decay
    }

    /// Schedules the next state. The phase clock restarts at the decision instant.
    fn decide(&mut self, next_lit: bool) {
        self.elapsed = 0.0;
        match self.settings.mode {
            FlickerMode::Simple => {
                self.phase_duration = draw(&mut self.rng, self.settings.simple_range);
                self.lit = next_lit;
            }
            FlickerMode::AudioSynced => {
                self.phase_duration = if next_lit {
                    let hum = self.hum_duration.unwrap_or(self.settings.hum_fallback);
                    hum + self.settings.hum_buffer
                } else {
                    draw(&mut self.rng, self.settings.unlit_range)
                };
                if self.settings.glitch.duration > 0.0 {
                    self.glitch_elapsed = Some(0.0);
                }
                if self.settings.visual_delay > 0.0 {
                    self.pending = Some(PendingFlip {
                        lit: next_lit,
                        remaining: self.settings.visual_delay,
                    });
                } else {
                    self.flip(next_lit);
                }
            }
        }
    }

    fn flip(&mut self, lit: bool) {
        if lit == self.lit {
            return;
        }
        self.lit = lit;
        self.cues.push(if lit {
            FlickerCue::PlayHum
        } else {
            FlickerCue::StopHum
        });
    }
}

fn draw(rng: &mut StdRng, range: [f32; 2]) -> f32 {
    let lo = range[0].min(range[1]);
    let hi = range[0].max(range[1]);
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn animator(mode: FlickerMode, seed: u64) -> FlickerAnimator {
        let settings = FlickerSettings {
            mode,
            ..FlickerSettings::default()
        };
        FlickerAnimator::with_seed(settings, Some(seed))
    }

    struct RunStats {
        lit_time: f32,
        total_time: f32,
        phases: Vec<(bool, f32)>,
        max_level: f32,
        min_level: f32,
        cues: Vec<FlickerCue>,
    }

    fn run(animator: &mut FlickerAnimator, seconds: f32) -> RunStats {
        let steps = (seconds / DT) as usize;
        let mut stats = RunStats {
            lit_time: 0.0,
            total_time: 0.0,
            phases: Vec::new(),
            max_level: f32::MIN,
            min_level: f32::MAX,
            cues: Vec::new(),
        };
        let mut current = animator.is_lit();
        let mut phase_time = 0.0;
        for _ in 0..steps {
            let frame = animator.step(DT);
            stats.total_time += DT;
            if frame.lit {
                stats.lit_time += DT;
            }
            stats.max_level = stats.max_level.max(frame.level);
            stats.min_level = stats.min_level.min(frame.level);
            stats.cues.extend(frame.cues);
            if frame.lit != current {
                stats.phases.push((current, phase_time));
                current = frame.lit;
                phase_time = 0.0;
            }
            phase_time += DT;
        }
        stats
    }

    #[test]
    fn simple_variant_stays_within_bounds_over_a_long_run() {
        let mut neon = animator(FlickerMode::Simple, 7);
        let stats = run(&mut neon, 1000.0);

        // The first phase uses the fixed initial duration.
        let phases = &stats.phases[1..];
        assert!(phases.len() > 200, "too few phases: {}", phases.len());
        for &(_, duration) in phases {
            assert!(
                (1.0 - 2.0 * DT..=4.0 + 2.0 * DT).contains(&duration),
                "phase of {duration}s outside 1-4s"
            );
        }
        let mean = phases.iter().map(|&(_, d)| d).sum::<f32>() / phases.len() as f32;
        assert!((2.0..=3.0).contains(&mean), "mean phase {mean}");

        let lit_fraction = stats.lit_time / stats.total_time;
        assert!((0.35..=0.65).contains(&lit_fraction), "lit fraction {lit_fraction}");

        assert!(stats.min_level >= 0.0);
        assert!(stats.max_level <= 1.0);
        assert!(stats.cues.is_empty(), "simple variant never touches audio");
    }

    #[test]
    fn simple_variant_toggles_instantly() {
        let mut neon = animator(FlickerMode::Simple, 1);
        assert!(neon.is_lit());
        let mut elapsed = 0.0;
        while neon.is_lit() {
            let frame = neon.step(DT);
            elapsed += DT;
            assert!(frame.level == 0.0 || frame.level == 1.0);
        }
        assert!((elapsed - 1.5).abs() <= DT * 1.5, "first phase lasted {elapsed}");
        assert_eq!(neon.level(), 0.0);
        assert!(!neon.has_pending_flip());
    }

    #[test]
    fn audio_variant_delays_the_visual_flip_and_glitches_at_decision() {
        let mut neon = animator(FlickerMode::AudioSynced, 3);
        let frame = neon.step(1.5);
        assert_eq!(frame.cues, vec![FlickerCue::PlayHum], "only the opening hum");
        assert!(frame.lit, "flip is delayed past the decision instant");
        assert!(neon.has_pending_flip());
        assert!(neon.is_glitching());

        let frame = neon.step(0.03);
        assert!(frame.lit);
        let frame = neon.step(0.03);
        assert!(!frame.lit);
        assert_eq!(frame.cues, vec![FlickerCue::StopHum]);
        assert!((2.0..8.0).contains(&neon.phase_duration()));
    }

    #[test]
    fn audio_variant_lit_phase_follows_hum_duration() {
        let mut neon = animator(FlickerMode::AudioSynced, 11);
        neon.set_hum_duration(1.25);
        // Skip the opening hum, which plays over the fixed first phase.
        neon.step(DT);

        let mut turned_on = false;
        for _ in 0..(20.0 / DT) as usize {
            let frame = neon.step(DT);
            if frame.cues.contains(&FlickerCue::PlayHum) {
                turned_on = true;
                break;
            }
        }
        assert!(turned_on);
        assert!(neon.is_lit());
        assert!((neon.phase_duration() - 1.35).abs() < 1e-5);
    }

    #[test]
    fn hum_finishing_forces_the_tube_off() {
        let mut neon = animator(FlickerMode::AudioSynced, 5);
        assert_eq!(neon.step(0.0).cues, vec![FlickerCue::PlayHum]);
        assert!(neon.is_lit());
        neon.hum_finished();
        assert!(neon.has_pending_flip());

        let frame = neon.step(0.06);
        assert!(!frame.lit);
        assert_eq!(frame.cues, vec![FlickerCue::StopHum]);

        // Already off: a late report is ignored.
        neon.hum_finished();
        assert!(!neon.has_pending_flip());
    }

    #[test]
    fn audio_variant_levels_stay_under_glitch_ceiling() {
        let mut neon = animator(FlickerMode::AudioSynced, 99);
        neon.set_hum_duration(2.0);
        let stats = run(&mut neon, 1000.0);

        let ceiling = 1.0 + FlickerSettings::default().glitch.ceiling;
        assert!(stats.min_level >= 0.0);
        assert!(stats.max_level <= ceiling);
        assert!(stats.max_level > 1.0, "glitch should overshoot at least once");

        let plays = stats.cues.iter().filter(|c| **c == FlickerCue::PlayHum).count();
        let stops = stats.cues.iter().filter(|c| **c == FlickerCue::StopHum).count();
        assert!(plays > 10);
        assert!(stops.abs_diff(plays) <= 1, "plays {plays} stops {stops}");

        for &(lit, duration) in &stats.phases[1..] {
            if lit {
                assert!((duration - 2.1).abs() <= 2.0 * DT, "lit phase {duration}");
            } else {
                assert!((2.0 - 2.0 * DT..=8.0 + 2.0 * DT).contains(&duration));
            }
        }
    }

    #[test]
    fn audio_variant_starts_with_the_hum() {
        let mut neon = animator(FlickerMode::AudioSynced, 8);
        let first = neon.step(DT);
        assert!(first.lit);
        assert_eq!(first.cues, vec![FlickerCue::PlayHum]);
        assert!(neon.step(DT).cues.is_empty());
    }

    #[test]
    fn same_seed_replays_the_same_schedule() {
        let mut a = animator(FlickerMode::Simple, 2024);
        let mut b = animator(FlickerMode::Simple, 2024);
        for _ in 0..5000 {
            assert_eq!(a.step(DT), b.step(DT));
        }
    }
}
