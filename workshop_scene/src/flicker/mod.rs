//! Neon tube flicker: drives the tube light rig and its hum sound.

mod animator;

use bevy::audio::{AudioSinkPlayback, Volume};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::audio::clip_length;
use crate::config::WorkshopSettings;
use crate::error::{load_failure, AssetError};
use crate::WorkshopSet;

pub use animator::{FlickerAnimator, FlickerCue, FlickerFrame};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlickerMode {
    /// Random lit/unlit phases, toggled instantly, silent.
    Simple,
    /// Lit phases last as long as the hum clip; flips are delayed and glitched.
    #[default]
    AudioSynced,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchSettings {
    pub duration: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub decay: f32,
    /// Headroom above the lit baseline the jitter may reach.
    pub ceiling: f32,
}

impl Default for GlitchSettings {
    fn default() -> Self {
        Self {
            duration: 0.3,
            amplitude: 0.6,
            frequency: 25.0,
            decay: 4.0,
            ceiling: 0.5,
        }
    }
}

/// Lit intensities; the animator's level scales all of them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeBaselines {
    pub main_intensity: f32,
    pub area_intensity: f32,
    pub fill_illuminance: f32,
    pub emissive_strength: f32,
}

impl Default for TubeBaselines {
    fn default() -> Self {
        Self {
            main_intensity: 875_000.0,
            area_intensity: 350_000.0,
            fill_illuminance: 1_050.0,
            emissive_strength: 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickerSettings {
    pub mode: FlickerMode,
    pub initial_phase: f32,
    pub simple_range: [f32; 2],
    pub unlit_range: [f32; 2],
    pub hum_buffer: f32,
    /// Lit phase length while the hum clip's duration is unknown.
    pub hum_fallback: f32,
    pub hum_volume: f32,
    pub visual_delay: f32,
    pub glitch: GlitchSettings,
    pub baselines: TubeBaselines,
}

impl Default for FlickerSettings {
    fn default() -> Self {
        Self {
            mode: FlickerMode::AudioSynced,
            initial_phase: 1.5,
            simple_range: [1.0, 4.0],
            unlit_range: [2.0, 8.0],
            hum_buffer: 0.1,
            hum_fallback: 2.0,
            hum_volume: 0.6,
            visual_delay: 0.05,
            glitch: GlitchSettings::default(),
            baselines: TubeBaselines::default(),
        }
    }
}

/// Lights and materials spawned around the tube mesh.
#[derive(Component, Clone, Debug)]
pub struct TubeLightRig {
    pub main: Entity,
    pub area: Vec<Entity>,
    pub fill: Entity,
    pub materials: Vec<Handle<StandardMaterial>>,
    /// Emissive color before the baseline strength is applied.
    pub emissive: LinearRgba,
}

/// Per-rig animator plus the last level written to the rig.
#[derive(Component, Clone, Debug)]
pub struct NeonFlicker {
    pub animator: FlickerAnimator,
    last_level: Option<f32>,
}

impl NeonFlicker {
    pub fn new(animator: FlickerAnimator) -> Self {
        Self {
            animator,
            last_level: None,
        }
    }
}

/// The hum clip and, once decoded, its length.
#[derive(Resource, Clone, Debug)]
pub struct HumClip {
    pub path: String,
    pub handle: Handle<AudioSource>,
    pub duration: Option<f32>,
    measured: bool,
    failure_reported: bool,
}

impl HumClip {
    pub fn new(path: impl Into<String>, handle: Handle<AudioSource>) -> Self {
        Self {
            path: path.into(),
            handle,
            duration: None,
            measured: false,
            failure_reported: false,
        }
    }

    /// The clip failed to load or decode; the tube flickers silently.
    pub fn failed(&self) -> bool {
        self.failure_reported
    }

    fn fail(&mut self, reason: String) {
        let err = AssetError::Audio {
            path: self.path.clone(),
            reason,
        };
        warn!("{err}; the neon will flicker silently");
        self.failure_reported = true;
        self.measured = true;
    }
}

/// The entity playing the hum of one tube rig.
#[derive(Component, Clone, Copy, Debug)]
pub struct HumVoice {
    pub rig: Entity,
}

/// Seed for rig animators; `None` seeds from entropy.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct FlickerSeed(pub Option<u64>);

pub fn flicker_plugin(app: &mut App) {
    app.init_resource::<FlickerSeed>().add_systems(
        Update,
        (measure_hum_clip, flicker_system)
            .chain()
            .in_set(WorkshopSet::Animate),
    );
}

/// Decodes the hum clip once it loads and records its length. A clip that
/// fails to load or decode is marked failed and its queued voices dropped.
pub fn measure_hum_clip(
    mut commands: Commands,
    hum: Option<ResMut<HumClip>>,
    sources: Option<Res<Assets<AudioSource>>>,
    asset_server: Option<Res<AssetServer>>,
    voices: Query<Entity, With<HumVoice>>,
) {
    let Some(mut hum) = hum else {
        return;
    };
    if hum.measured {
        return;
    }

    let failure = match sources.as_ref().and_then(|s| s.get(&hum.handle)) {
        Some(source) => match clip_length(source) {
            Ok(duration) => {
                hum.duration = duration;
                hum.measured = true;
                match duration {
                    Some(secs) => info!("hum clip {} lasts {secs:.2}s", hum.path),
                    None => warn!("hum clip {} is empty", hum.path),
                }
                None
            }
            Err(err) => Some(err.to_string()),
        },
        None => asset_server.and_then(|server| load_failure(&server, hum.handle.id())),
    };

    if let Some(reason) = failure {
        hum.fail(reason);
        for voice in &voices {
            commands.entity(voice).despawn();
        }
    }
}

type HumVoices<'w, 's> = Query<'w, 's, (Entity, &'static HumVoice, Option<&'static AudioSink>)>;

#[allow(clippy::too_many_arguments)]
pub fn flicker_system(
    mut commands: Commands,
    time: Res<Time>,
    settings: Res<WorkshopSettings>,
    hum: Option<Res<HumClip>>,
    mut rigs: Query<(Entity, &TubeLightRig, &mut NeonFlicker)>,
    mut points: Query<(&mut PointLight, &mut Visibility)>,
    mut fills: Query<(&mut DirectionalLight, &mut Visibility), Without<PointLight>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    voices: HumVoices,
) {
    let baselines = settings.flicker.baselines;

    for (rig_entity, rig, mut neon) in &mut rigs {
        if let Some(secs) = hum.as_ref().and_then(|h| h.duration) {
            if neon.animator.hum_duration().is_none() {
                neon.animator.set_hum_duration(secs);
            }
        }

        let finished: Vec<Entity> = voices
            .iter()
            .filter(|(_, voice, sink)| voice.rig == rig_entity && sink.is_some_and(|s| s.empty()))
            .map(|(entity, ..)| entity)
            .collect();
        if !finished.is_empty() {
            neon.animator.hum_finished();
            for entity in finished {
                commands.entity(entity).despawn();
            }
        }

        let frame = neon.animator.step(time.delta_secs());

        for cue in &frame.cues {
            match cue {
                FlickerCue::PlayHum => {
                    stop_voices(&mut commands, &voices, rig_entity);
                    if let Some(hum) = hum.as_ref().filter(|h| !h.failed()) {
                        commands.spawn((
                            HumVoice { rig: rig_entity },
                            AudioPlayer::new(hum.handle.clone()),
                            PlaybackSettings::ONCE
                                .with_volume(Volume::new(settings.flicker.hum_volume)),
                        ));
                    }
                }
                FlickerCue::StopHum => stop_voices(&mut commands, &voices, rig_entity),
            }
        }

        if neon.last_level == Some(frame.level) {
            continue;
        }
        neon.last_level = Some(frame.level);
        apply_level(rig, frame.level, &baselines, &mut points, &mut fills, &mut materials);
    }
}

/// Stops and drops the hum voices of one rig.
fn stop_voices(commands: &mut Commands, voices: &HumVoices, rig: Entity) {
    for (entity, voice, sink) in voices {
        if voice.rig != rig {
            continue;
        }
        if let Some(sink) = sink {
            sink.stop();
        }
        commands.entity(entity).despawn();
    }
}

/// Writes `level × baseline` to every light of the rig and its emissive.
/// At level zero the lights are hidden so they stop rendering shadows.
fn apply_level(
    rig: &TubeLightRig,
    level: f32,
    baselines: &TubeBaselines,
    points: &mut Query<(&mut PointLight, &mut Visibility)>,
    fills: &mut Query<(&mut DirectionalLight, &mut Visibility), Without<PointLight>>,
    materials: &mut Assets<StandardMaterial>,
) {
    let visibility = if level > 0.0 {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };

    if let Ok((mut light, mut vis)) = points.get_mut(rig.main) {
        light.intensity = baselines.main_intensity * level;
        *vis = visibility;
    }
    for &entity in &rig.area {
        if let Ok((mut light, mut vis)) = points.get_mut(entity) {
            light.intensity = baselines.area_intensity * level;
            *vis = visibility;
        }
    }
    if let Ok((mut light, mut vis)) = fills.get_mut(rig.fill) {
        light.illuminance = baselines.fill_illuminance * level;
        *vis = visibility;
    }

    let strength = baselines.emissive_strength * level;
    for handle in &rig.materials {
        if let Some(material) = materials.get_mut(handle) {
            material.emissive = LinearRgba::rgb(
                rig.emissive.red * strength,
                rig.emissive.green * strength,
                rig.emissive.blue * strength,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_rig(app: &mut App, mode: FlickerMode) -> (Entity, Entity, Handle<StandardMaterial>) {
        let material = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial::default());
        let world = app.world_mut();
        let main = world.spawn((PointLight::default(), Visibility::default())).id();
        let area: Vec<Entity> = (0..5)
            .map(|_| world.spawn((PointLight::default(), Visibility::default())).id())
            .collect();
        let fill = world
            .spawn((DirectionalLight::default(), Visibility::default()))
            .id();
        let settings = FlickerSettings {
            mode,
            ..FlickerSettings::default()
        };
        world.spawn((
            TubeLightRig {
                main,
                area,
                fill,
                materials: vec![material.clone()],
                emissive: LinearRgba::rgb(1.0, 0.53, 0.2),
            },
            NeonFlicker::new(FlickerAnimator::with_seed(settings, Some(9))),
        ));
        (main, fill, material)
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<Assets<StandardMaterial>>()
            .insert_resource(WorkshopSettings::default())
            .add_systems(Update, flicker_system);
        app
    }

    fn advance(app: &mut App, seconds: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(std::time::Duration::from_secs_f32(seconds));
        app.update();
    }

    #[test]
    fn lit_rig_gets_baseline_intensities() {
        let mut app = test_app();
        let (main, fill, material) = spawn_rig(&mut app, FlickerMode::Simple);

        advance(&mut app, 0.1);

        let baselines = TubeBaselines::default();
        let world = app.world();
        let light = world.get::<PointLight>(main).unwrap();
        assert_eq!(light.intensity, baselines.main_intensity);
        assert_eq!(world.get::<Visibility>(main), Some(&Visibility::Inherited));
        let fill_light = world.get::<DirectionalLight>(fill).unwrap();
        assert_eq!(fill_light.illuminance, baselines.fill_illuminance);
        let emissive = world
            .resource::<Assets<StandardMaterial>>()
            .get(&material)
            .unwrap()
            .emissive;
        assert!((emissive.red - 1.5).abs() < 1e-5);
    }

    #[test]
    fn unlit_rig_is_dark_and_hidden() {
        let mut app = test_app();
        let (main, fill, _) = spawn_rig(&mut app, FlickerMode::Simple);

        // First phase lasts 1.5s, then the tube switches off instantly.
        advance(&mut app, 0.1);
        advance(&mut app, 1.5);

        let world = app.world();
        assert_eq!(world.get::<PointLight>(main).unwrap().intensity, 0.0);
        assert_eq!(world.get::<Visibility>(main), Some(&Visibility::Hidden));
        assert_eq!(world.get::<DirectionalLight>(fill).unwrap().illuminance, 0.0);
        assert_eq!(world.get::<Visibility>(fill), Some(&Visibility::Hidden));
    }

    #[test]
    fn audio_cues_without_a_clip_keep_the_animation_running() {
        let mut app = test_app();
        let (main, _, _) = spawn_rig(&mut app, FlickerMode::AudioSynced);

        advance(&mut app, 1.5);
        advance(&mut app, 0.1);
        // Let the glitch jitter decay completely.
        advance(&mut app, 0.25);

        let world = app.world_mut();
        assert_eq!(world.get::<PointLight>(main).unwrap().intensity, 0.0);
        let voices = world.query::<&HumVoice>().iter(world).count();
        assert_eq!(voices, 0);
    }

    fn hum_voices(app: &mut App) -> Vec<HumVoice> {
        let world = app.world_mut();
        world.query::<&HumVoice>().iter(world).copied().collect()
    }

    #[test]
    fn switching_off_stops_only_its_own_hum() {
        let mut app = test_app();
        app.insert_resource(HumClip::new("sound/neon.ogg", Handle::default()));
        spawn_rig(&mut app, FlickerMode::AudioSynced);
        let other_rig = Entity::from_raw(900);
        app.world_mut().spawn(HumVoice { rig: other_rig });

        advance(&mut app, 0.1);
        assert_eq!(hum_voices(&mut app).len(), 2, "the lit tube starts humming");

        // Past the first phase and the visual delay: the tube goes dark.
        advance(&mut app, 1.5);
        advance(&mut app, 0.1);

        let voices = hum_voices(&mut app);
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].rig, other_rig);
    }

    fn measure_app(source: AudioSource) -> App {
        let mut app = App::new();
        app.init_resource::<Assets<AudioSource>>()
            .add_systems(Update, measure_hum_clip);
        let handle = app
            .world_mut()
            .resource_mut::<Assets<AudioSource>>()
            .add(source);
        app.insert_resource(HumClip::new("sound/neon.ogg", handle));
        app
    }

    #[test]
    fn loaded_hum_clip_is_measured() {
        let mut app = measure_app(crate::audio::tests::wav_clip(8_000, 8_000));
        app.update();

        let hum = app.world().resource::<HumClip>();
        assert!(!hum.failed());
        let secs = hum.duration.unwrap();
        assert!((secs - 1.0).abs() < 1e-3, "measured {secs}");
    }

    #[test]
    fn undecodable_hum_clip_is_reported_and_silenced() {
        let mut app = measure_app(crate::audio::tests::garbage_clip());
        let rig = Entity::from_raw(7);
        app.world_mut().spawn(HumVoice { rig });

        app.update();

        let hum = app.world().resource::<HumClip>();
        assert!(hum.failed());
        assert_eq!(hum.duration, None);
        assert!(hum_voices(&mut app).is_empty());
    }
}
