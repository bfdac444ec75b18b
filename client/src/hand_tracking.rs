//! Webcam control: polls the hand-pose source off the main thread and
//! publishes the held hand signals for the control resolver.

use std::sync::Arc;

use bevy::{
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
};
use storybook_shared::{
    ControlMode, DetectedHand, DetectionScheduler, DetectorError, HandPoseAdapter, HandPoseSource,
    HandTrackingSettings, ReplayHandSource,
};

use crate::{ActiveMode, AppState, PlayingSystems, input::LatestHands};

/// Environment variable naming a hand-landmark recording to replay.
pub const REPLAY_ENV: &str = "STORYBOOK_HAND_REPLAY";

const NOTICE_SECONDS: f32 = 6.0;

type Detection = Result<Vec<DetectedHand>, DetectorError>;

/// Hand tracking tunables for this session.
#[derive(Resource, Default)]
pub struct HandTrackingTuning(pub HandTrackingSettings);

/// Live hand tracking session. Dropping it cancels any pending detection and
/// releases the source.
#[derive(Resource)]
pub struct HandTracker {
    source: Arc<dyn HandPoseSource>,
    settings: HandTrackingSettings,
    scheduler: DetectionScheduler,
    adapter: HandPoseAdapter,
    pending: Option<Task<Detection>>,
    released: bool,
}

impl HandTracker {
    pub fn new(source: Arc<dyn HandPoseSource>, settings: HandTrackingSettings) -> Self {
        Self {
            source,
            scheduler: DetectionScheduler::new(settings.poll_interval),
            adapter: HandPoseAdapter::from_settings(&settings),
            settings,
            pending: None,
            released: false,
        }
    }

    /// Cancel polling and release the source. Later calls do nothing.
    fn shutdown(&mut self) {
        self.scheduler.cancel();
        self.pending = None;
        if !self.released {
            self.released = true;
            self.source.release();
        }
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// On-screen note shown when webcam control could not start.
#[derive(Component)]
struct FallbackNotice(Timer);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<HandTrackingTuning>();

    app.add_systems(OnEnter(AppState::Loading), start_hand_tracking);
    app.add_systems(
        Update,
        (collect_detection, poll_detector)
            .chain()
            .in_set(PlayingSystems::Input)
            .before(crate::input::ResolveControl)
            .run_if(resource_exists::<HandTracker>),
    );
    app.add_systems(Update, expire_notice);
    app.add_systems(Last, stop_on_exit.run_if(resource_exists::<HandTracker>));
}

/// Open the configured hand-pose source.
fn open_source() -> Result<Arc<dyn HandPoseSource>, DetectorError> {
    let path = std::env::var_os(REPLAY_ENV).ok_or_else(|| {
        DetectorError::CameraUnavailable(format!(
            "no camera backend on this platform; set {REPLAY_ENV} to a hand recording"
        ))
    })?;
    Ok(Arc::new(ReplayHandSource::load(path)?))
}

fn start_hand_tracking(
    mut commands: Commands,
    mut mode: ResMut<ActiveMode>,
    tuning: Res<HandTrackingTuning>,
) {
    if mode.0 != ControlMode::Webcam {
        return;
    }
    match open_source() {
        Ok(source) => {
            info!("hand tracking started (polling every {:?})", tuning.0.poll_interval);
            commands.insert_resource(HandTracker::new(source, tuning.0));
        }
        Err(err) => {
            warn!("hand tracking unavailable, falling back to keyboard: {err}");
            mode.0 = ControlMode::Keyboard;
            spawn_fallback_notice(&mut commands, &err);
        }
    }
}

fn poll_detector(time: Res<Time>, mut tracker: ResMut<HandTracker>) {
    if !tracker.scheduler.tick(time.delta()) {
        return;
    }
    let source = Arc::clone(&tracker.source);
    let config = tracker.settings.estimation;
    let task = AsyncComputeTaskPool::get().spawn(async move { source.detect(&config) });
    tracker.pending = Some(task);
}

fn collect_detection(
    mut commands: Commands,
    mut tracker: ResMut<HandTracker>,
    mut hands: ResMut<LatestHands>,
    mut mode: ResMut<ActiveMode>,
) {
    let Some(task) = tracker.pending.as_mut() else {
        return;
    };
    let Some(result) = block_on(future::poll_once(task)) else {
        return;
    };
    tracker.pending = None;
    tracker.scheduler.complete();

    match result {
        Ok(detected) => {
            let signals = tracker.adapter.ingest(&detected);
            hands.0 = Some(signals);
        }
        Err(err) if err.is_fatal() => {
            error!("hand tracking stopped, falling back to keyboard: {err}");
            mode.0 = ControlMode::Keyboard;
            hands.0 = None;
            spawn_fallback_notice(&mut commands, &err);
            commands.remove_resource::<HandTracker>();
        }
        Err(err) => {
            // Treated like a frame without hands.
            warn!("{err}");
            hands.0 = Some(tracker.adapter.held());
        }
    }
}

fn stop_on_exit(mut commands: Commands, mut exits: MessageReader<AppExit>) {
    if exits.read().next().is_some() {
        info!("releasing hand tracking");
        commands.remove_resource::<HandTracker>();
    }
}

fn spawn_fallback_notice(commands: &mut Commands, err: &DetectorError) {
    commands.spawn((
        FallbackNotice(Timer::from_seconds(NOTICE_SECONDS, TimerMode::Once)),
        Text::new(format!(
            "Webcam control unavailable ({err}).\nUsing keyboard & mouse: click to look around."
        )),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::WHITE),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(16.0),
            left: Val::Px(16.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
    ));
}

fn expire_notice(
    mut commands: Commands,
    time: Res<Time>,
    mut notices: Query<(Entity, &mut FallbackNotice)>,
) {
    for (entity, mut notice) in &mut notices {
        if notice.0.tick(time.delta()).is_finished() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use storybook_shared::EstimationConfig;

    use super::*;

    #[derive(Default)]
    struct CountingSource {
        releases: AtomicUsize,
    }

    impl HandPoseSource for CountingSource {
        fn detect(&self, _: &EstimationConfig) -> Result<Vec<DetectedHand>, DetectorError> {
            Ok(Vec::new())
        }

        fn release(&self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn source_is_released_exactly_once() {
        let source = Arc::new(CountingSource::default());
        let mut tracker = HandTracker::new(source.clone(), HandTrackingSettings::default());

        tracker.shutdown();
        tracker.shutdown();
        drop(tracker);
        assert_eq!(source.releases.load(Ordering::SeqCst), 1);

        drop(HandTracker::new(source.clone(), HandTrackingSettings::default()));
        assert_eq!(source.releases.load(Ordering::SeqCst), 2);
    }
}
