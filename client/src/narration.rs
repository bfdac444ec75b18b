//! Voice-over chapters played once when the player first reaches each spot.

use bevy::{audio::PlaybackMode, prelude::*};
use storybook_shared::{TriggerZone, TriggerZones, Vec3 as SimVec3, ZoneId};

use crate::{AppState, PlayingSystems, player::Player};

/// Armed narration zones.
#[derive(Resource, Default)]
pub struct Narration(pub TriggerZones);

/// (center, radius, chapter asset)
const CHAPTERS: [([f32; 3], f32, &str); 9] = [
    ([-1.0, 1.3, 0.5], 1.0, "voiceover/01_inside_infirmary.ogg"),
    ([-3.0, 2.0, -16.0], 8.0, "voiceover/02_outside_infirmary.ogg"),
    ([-10.0, 4.0, -30.0], 6.0, "voiceover/03_toolbox.ogg"),
    ([-26.0, 4.6, -44.0], 10.0, "voiceover/04_mining_tracks.ogg"),
    ([-40.0, 9.0, -89.0], 16.0, "voiceover/05_three_skeletons.ogg"),
    ([-19.0, 108.0, -9.0], 12.0, "voiceover/06_industrial_parking.ogg"),
    ([40.0, 8.0, -55.0], 32.0, "voiceover/07_bloody_skeleton.ogg"),
    ([60.0, 18.0, -95.0], 32.0, "voiceover/08_city_view.ogg"),
    ([77.0, 23.0, -130.0], 32.0, "voiceover/09_revelation.ogg"),
];

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Narration>();
    app.add_systems(
        OnEnter(AppState::Playing),
        arm_zones.after(crate::player::reset_player),
    );
    app.add_systems(Update, evaluate_zones.in_set(PlayingSystems::Present));
}

fn arm_zones(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    player: Res<Player>,
    mut narration: ResMut<Narration>,
) {
    let position = player.0.position();
    let mut zones = TriggerZones::new();
    for (center, radius, asset) in CHAPTERS {
        zones.arm(
            TriggerZone::new(SimVec3::from(center), radius, asset),
            &position,
            |id, zone| play(&mut commands, &asset_server, id, zone),
        );
    }
    info!("armed {} narration zones", zones.len());
    narration.0 = zones;
}

fn evaluate_zones(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    player: Res<Player>,
    mut narration: ResMut<Narration>,
) {
    let position = player.0.position();
    narration
        .0
        .evaluate(&position, |id, zone| play(&mut commands, &asset_server, id, zone));
}

fn play(commands: &mut Commands, asset_server: &AssetServer, id: ZoneId, zone: &TriggerZone) {
    info!("narration zone {} fired: {}", id.0, zone.audio_asset);
    commands.spawn((
        AudioPlayer::new(asset_server.load(zone.audio_asset.clone())),
        PlaybackSettings {
            mode: PlaybackMode::Despawn,
            ..default()
        },
    ));
}
