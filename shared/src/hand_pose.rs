//! Hand-pose signal extraction.
//!
//! The pose detector is a black box returning, per camera frame, a list of
//! hands with 21 3D keypoints each (MediaPipe layout). This module turns those
//! noisy samples into two steady control signals:
//!
//! - aim direction: index fingertip toward index knuckle of the aim hand
//! - pinch distance: index fingertip to thumb tip of the other hand
//!
//! Each signal holds its last known value when its hand drops out.

use std::time::Duration;

use crate::{
    collision::Vec3,
    constants::{HAND_POLL_INTERVAL, MIN_HAND_KEYPOINTS},
    error::DetectorError,
    utils::normalize_or_zero,
};

pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;

/// Which hand the detector believes it saw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

impl Handedness {
    pub fn opposite(self) -> Self {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}

/// One detected hand as reported by the detector (image-style coordinates,
/// +Y down).
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    pub handedness: Handedness,
    pub keypoints: Vec<Vec3>,
}

impl DetectedHand {
    /// Keypoint `index` in world-style coordinates (+Y up), if present.
    #[inline]
    fn keypoint(&self, index: usize) -> Option<Vec3> {
        self.keypoints
            .get(index)
            .map(|p| Vec3::new(p.x, -p.y, p.z))
    }

    #[inline]
    fn has_keypoints(&self, min: usize) -> bool {
        self.keypoints.len() >= min
    }
}

/// Options forwarded to the detector on every estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimationConfig {
    /// Mirror the image so the on-screen hand matches the user's hand.
    pub flip_horizontal: bool,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            flip_horizontal: true,
        }
    }
}

/// Camera plus pose model, treated as a black box.
///
/// `detect` captures the current camera frame and runs inference on it. It may
/// block for a while, so callers run it off the render thread.
pub trait HandPoseSource: Send + Sync + 'static {
    fn detect(&self, config: &EstimationConfig) -> Result<Vec<DetectedHand>, DetectorError>;

    /// Stop the camera stream and free the model. Later `detect` calls fail
    /// with [`DetectorError::Released`].
    fn release(&self) {}
}

/// Tunables for hand tracking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandTrackingSettings {
    pub poll_interval: Duration,
    /// Hand whose index finger steers the camera. The other hand pinches.
    pub aim_hand: Handedness,
    /// Hands reporting fewer keypoints than this are degenerate samples.
    pub min_keypoints: usize,
    pub estimation: EstimationConfig,
}

impl Default for HandTrackingSettings {
    fn default() -> Self {
        Self {
            poll_interval: HAND_POLL_INTERVAL,
            aim_hand: Handedness::Right,
            min_keypoints: MIN_HAND_KEYPOINTS,
            estimation: EstimationConfig::default(),
        }
    }
}

/// Snapshot of the derived hand signals published once per detection.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct HandSignals {
    /// Unit aim direction, or zero before any aim hand was seen.
    pub aim_direction: Vec3,
    /// Pinch distance in detector units, or zero before any pinch hand was seen.
    pub pinch_distance: f32,
}

/// Hold-last-value filter over raw detector samples.
#[derive(Clone, Debug)]
pub struct HandPoseAdapter {
    aim_hand: Handedness,
    min_keypoints: usize,
    last_aim: Option<Vec3>,
    last_pinch: Option<f32>,
}

impl Default for HandPoseAdapter {
    fn default() -> Self {
        Self::from_settings(&HandTrackingSettings::default())
    }
}

impl HandPoseAdapter {
    pub fn new(aim_hand: Handedness) -> Self {
        Self {
            aim_hand,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &HandTrackingSettings) -> Self {
        Self {
            aim_hand: settings.aim_hand,
            min_keypoints: settings.min_keypoints,
            last_aim: None,
            last_pinch: None,
        }
    }

    /// Fold one detection result into the held signals and return the
    /// snapshot to publish.
    ///
    /// - A complete aim/pinch hand refreshes its signal.
    /// - A missing hand keeps the last known value.
    /// - A hand with too few keypoints yields zero for that signal in this
    ///   sample only; the held value is left untouched for later samples.
    pub fn ingest(&mut self, hands: &[DetectedHand]) -> HandSignals {
        let aim = match find_hand(hands, self.aim_hand) {
            Some(hand) if hand.has_keypoints(self.min_keypoints) => {
                let aim = aim_direction(hand);
                self.last_aim = Some(aim);
                aim
            }
            Some(_) => Vec3::zeros(),
            None => self.last_aim.unwrap_or_else(Vec3::zeros),
        };

        let pinch = match find_hand(hands, self.aim_hand.opposite()) {
            Some(hand) if hand.has_keypoints(self.min_keypoints) => {
                let pinch = pinch_distance(hand);
                self.last_pinch = Some(pinch);
                pinch
            }
            Some(_) => 0.0,
            None => self.last_pinch.unwrap_or(0.0),
        };

        HandSignals {
            aim_direction: aim,
            pinch_distance: pinch,
        }
    }

    /// Signals from the held values alone, used when a detection failed.
    pub fn held(&self) -> HandSignals {
        HandSignals {
            aim_direction: self.last_aim.unwrap_or_else(Vec3::zeros),
            pinch_distance: self.last_pinch.unwrap_or(0.0),
        }
    }
}

fn find_hand(hands: &[DetectedHand], handedness: Handedness) -> Option<&DetectedHand> {
    hands.iter().find(|h| h.handedness == handedness)
}

/// Unit vector from the index fingertip toward the index knuckle.
pub fn aim_direction(hand: &DetectedHand) -> Vec3 {
    match (hand.keypoint(INDEX_TIP), hand.keypoint(INDEX_MCP)) {
        (Some(tip), Some(knuckle)) => normalize_or_zero(&(knuckle - tip)),
        _ => Vec3::zeros(),
    }
}

/// Distance between the index fingertip and the thumb tip.
pub fn pinch_distance(hand: &DetectedHand) -> f32 {
    match (hand.keypoint(INDEX_TIP), hand.keypoint(THUMB_TIP)) {
        (Some(index), Some(thumb)) => (index - thumb).norm(),
        _ => 0.0,
    }
}

/// Fixed-period poll timer allowing at most one detection in flight.
///
/// Ticks that come due while a detection is pending are dropped, not queued.
#[derive(Clone, Debug)]
pub struct DetectionScheduler {
    period: Duration,
    elapsed: Duration,
    in_flight: bool,
    running: bool,
    dropped: u64,
}

impl DetectionScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            elapsed: Duration::ZERO,
            in_flight: false,
            running: true,
            dropped: 0,
        }
    }

    /// Advance the timer. Returns true when a new detection should start, in
    /// which case the scheduler considers it in flight until [`Self::complete`].
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed < self.period {
            return false;
        }
        // One tick per period at most, even after a long stall.
        self.elapsed = Duration::ZERO;

        if self.in_flight {
            self.dropped += 1;
            log::debug!("hand detection still pending, tick dropped ({} so far)", self.dropped);
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Mark the in-flight detection as finished.
    pub fn complete(&mut self) {
        self.in_flight = false;
    }

    /// Stop polling for good. Pending work is the caller's to drop.
    pub fn cancel(&mut self) {
        self.running = false;
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of ticks skipped because a detection was still pending.
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped
    }
}

impl Default for DetectionScheduler {
    fn default() -> Self {
        Self::new(HAND_POLL_INTERVAL)
    }
}
