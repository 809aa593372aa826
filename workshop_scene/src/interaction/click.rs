use bevy::audio::Volume;
use bevy::prelude::*;

use super::{HoverState, PointerTarget};
use crate::audio::open_clip;
use crate::camera::ZoomController;
use crate::config::WorkshopSettings;
use crate::error::{load_failure, AssetError};

/// The click clip, shared by scene clicks and the HUD back button.
#[derive(Resource, Clone, Debug)]
pub struct ClickSound {
    pub path: String,
    pub handle: Handle<AudioSource>,
    failed: bool,
    verified: bool,
}

impl ClickSound {
    pub fn new(path: impl Into<String>, handle: Handle<AudioSource>) -> Self {
        Self {
            path: path.into(),
            handle,
            failed: false,
            verified: false,
        }
    }

    pub fn failed(&self) -> bool {
        self.failed
    }
}

/// Entity currently playing the click clip.
#[derive(Component)]
pub struct ClickVoice;

/// Restarts the click clip: any voice still playing is dropped first.
pub fn play_click(
    commands: &mut Commands,
    sound: Option<&ClickSound>,
    voices: &Query<Entity, With<ClickVoice>>,
    volume: f32,
) {
    let Some(sound) = sound.filter(|s| !s.failed) else {
        return;
    };
    for voice in voices {
        commands.entity(voice).despawn();
    }
    commands.spawn((
        ClickVoice,
        AudioPlayer::new(sound.handle.clone()),
        PlaybackSettings::DESPAWN.with_volume(Volume::new(volume)),
    ));
}

/// Decodes the click clip once it loads. A clip that fails to load or decode
/// silences clicks, and any voice queued for it is dropped before playback.
pub fn verify_click_sound(
    mut commands: Commands,
    sound: Option<ResMut<ClickSound>>,
    sources: Option<Res<Assets<AudioSource>>>,
    asset_server: Option<Res<AssetServer>>,
    voices: Query<Entity, With<ClickVoice>>,
) {
    let Some(mut sound) = sound else {
        return;
    };
    if sound.failed || sound.verified {
        return;
    }

    let failure = match sources.as_ref().and_then(|s| s.get(&sound.handle)) {
        Some(source) => match open_clip(source) {
            Ok(_) => {
                sound.verified = true;
                None
            }
            Err(err) => Some(err.to_string()),
        },
        None => asset_server.and_then(|s| load_failure(&s, sound.handle.id())),
    };

    if let Some(reason) = failure {
        let err = AssetError::Audio {
            path: sound.path.clone(),
            reason,
        };
        warn!("{err}; clicks will be silent");
        sound.failed = true;
        for voice in &voices {
            commands.entity(voice).despawn();
        }
    }
}

/// Left press on an interactive node: click sound, and a fly-to for zoom targets.
#[allow(clippy::too_many_arguments)]
pub fn click_system(
    mut commands: Commands,
    mouse: Res<ButtonInput<MouseButton>>,
    target: Res<PointerTarget>,
    settings: Res<WorkshopSettings>,
    sound: Option<Res<ClickSound>>,
    voices: Query<Entity, With<ClickVoice>>,
    mut controller: ResMut<ZoomController>,
    mut hover: ResMut<HoverState>,
) {
    if !mouse.just_pressed(MouseButton::Left) || target.over_ui {
        return;
    }
    let Some(hit) = target.hit.filter(|hit| hit.tags.interactive) else {
        return;
    };

    play_click(
        &mut commands,
        sound.as_deref(),
        &voices,
        settings.interaction.click_volume,
    );

    if hit.tags.zoom_target && controller.request_focus() {
        info!("flying to the screen from {}", hit.node);
        hover.reset();
    }
}

/// Detects two presses within a time window.
#[derive(Clone, Copy, Debug, Default)]
pub struct DoubleClickDetector {
    last_press: Option<f64>,
}

impl DoubleClickDetector {
    /// Records a press at `now` seconds. Returns true when it completes a double click.
    pub fn press(&mut self, now: f64, window: f64) -> bool {
        match self.last_press {
            Some(last) if now - last <= window => {
                self.last_press = None;
                true
            }
            _ => {
                self.last_press = Some(now);
                false
            }
        }
    }
}

/// Escape or a double click returns the camera to the overview.
/// Double clicks only count once the camera rests on the screen, so a quick
/// double click on the computer does not cancel its own fly-to.
pub fn zoom_back_input_system(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    target: Res<PointerTarget>,
    settings: Res<WorkshopSettings>,
    mut detector: Local<DoubleClickDetector>,
    mut controller: ResMut<ZoomController>,
) {
    let window = f64::from(settings.interaction.double_click_window);
    let double_click = mouse.just_pressed(MouseButton::Left)
        && !target.over_ui
        && controller.is_focused()
        && detector.press(time.elapsed_secs_f64(), window);

    if (keys.just_pressed(KeyCode::Escape) || double_click) && controller.zoom_back() {
        info!("zooming back to the overview");
    }
}
