//! Hand-pose source that replays recorded detector output.
//!
//! Text format, one detection sample per line:
//!
//! ```text
//! # comment
//! R 0.01,0.02,0.03 0.04,0.05,0.06 ... | L 0.1,0.2,0.3 ...
//!
//! ```
//!
//! Hands in a sample are separated by `|`. Each hand starts with its
//! handedness (`L` or `R`) followed by whitespace-separated `x,y,z`
//! keypoints in detector order. An empty line is a sample with no hands.
//! Playback loops.

use std::{
    path::Path,
    str::FromStr,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    collision::Vec3,
    error::DetectorError,
    hand_pose::{DetectedHand, EstimationConfig, HandPoseSource, Handedness},
};

#[derive(Debug)]
pub struct ReplayHandSource {
    frames: Vec<Vec<DetectedHand>>,
    cursor: AtomicUsize,
    released: AtomicBool,
}

impl ReplayHandSource {
    pub fn new(frames: Vec<Vec<DetectedHand>>) -> Result<Self, DetectorError> {
        if frames.is_empty() {
            return Err(DetectorError::ModelLoad("recording has no samples".into()));
        }
        Ok(Self {
            frames,
            cursor: AtomicUsize::new(0),
            released: AtomicBool::new(false),
        })
    }

    /// Read a recording from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            DetectorError::CameraUnavailable(format!("{}: {err}", path.display()))
        })?;
        let source: Self = text.parse()?;
        log::info!(
            "loaded hand recording {} ({} samples)",
            path.display(),
            source.len()
        );
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FromStr for ReplayHandSource {
    type Err = DetectorError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let frames = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim_start().starts_with('#'))
            .map(|(number, line)| {
                parse_sample(line)
                    .map_err(|msg| DetectorError::ModelLoad(format!("line {}: {msg}", number + 1)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(frames)
    }
}

impl HandPoseSource for ReplayHandSource {
    fn detect(&self, config: &EstimationConfig) -> Result<Vec<DetectedHand>, DetectorError> {
        if self.released.load(Ordering::Acquire) {
            return Err(DetectorError::Released);
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        let mut hands = self.frames[index].clone();
        if !config.flip_horizontal {
            // Recordings are stored mirrored; undo it.
            for hand in &mut hands {
                hand.handedness = hand.handedness.opposite();
                for point in &mut hand.keypoints {
                    point.x = -point.x;
                }
            }
        }
        Ok(hands)
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
    }
}

fn parse_sample(line: &str) -> Result<Vec<DetectedHand>, String> {
    if line.trim().is_empty() {
        return Ok(Vec::new());
    }
    line.split('|').map(parse_hand).collect()
}

fn parse_hand(text: &str) -> Result<DetectedHand, String> {
    let mut tokens = text.split_whitespace();
    let handedness = match tokens.next() {
        Some("L") => Handedness::Left,
        Some("R") => Handedness::Right,
        Some(other) => return Err(format!("unknown handedness {other:?}")),
        None => return Err("empty hand".into()),
    };
    let keypoints = tokens.map(parse_point).collect::<Result<Vec<_>, _>>()?;
    Ok(DetectedHand {
        handedness,
        keypoints,
    })
}

fn parse_point(token: &str) -> Result<Vec3, String> {
    let mut coords = token.split(',').map(|c| c.trim().parse::<f32>());
    match (coords.next(), coords.next(), coords.next(), coords.next()) {
        (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("bad keypoint {token:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = "\
# two samples and a dropout
R 0,0,0 0.1,0,0 | L 1,2,3

L 0.5,0.5,0.5
";

    #[test]
    fn parses_hands_and_dropouts() {
        let source: ReplayHandSource = RECORDING.parse().unwrap();
        assert_eq!(source.len(), 3);

        let config = EstimationConfig::default();
        let first = source.detect(&config).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].handedness, Handedness::Right);
        assert_eq!(first[0].keypoints[1], Vec3::new(0.1, 0.0, 0.0));
        assert_eq!(first[1].handedness, Handedness::Left);

        assert!(source.detect(&config).unwrap().is_empty());
        assert_eq!(source.detect(&config).unwrap().len(), 1);
        // Loops back to the start.
        assert_eq!(source.detect(&config).unwrap().len(), 2);
    }

    #[test]
    fn unflipped_playback_mirrors_hands() {
        let source: ReplayHandSource = RECORDING.parse().unwrap();
        let config = EstimationConfig {
            flip_horizontal: false,
        };
        let first = source.detect(&config).unwrap();
        assert_eq!(first[0].handedness, Handedness::Left);
        assert_eq!(first[0].keypoints[1], Vec3::new(-0.1, 0.0, 0.0));
    }

    #[test]
    fn rejects_malformed_recordings() {
        assert!(matches!(
            "X 1,2,3".parse::<ReplayHandSource>(),
            Err(DetectorError::ModelLoad(_))
        ));
        assert!(matches!(
            "R 1,2".parse::<ReplayHandSource>(),
            Err(DetectorError::ModelLoad(_))
        ));
        assert!("# nothing\n".parse::<ReplayHandSource>().is_err());
    }

    #[test]
    fn missing_file_means_no_camera() {
        let err = ReplayHandSource::load("/definitely/not/here.hands").unwrap_err();
        assert!(matches!(err, DetectorError::CameraUnavailable(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn released_source_stops_detecting() {
        let source: ReplayHandSource = RECORDING.parse().unwrap();
        source.release();
        assert!(matches!(
            source.detect(&EstimationConfig::default()),
            Err(DetectorError::Released)
        ));
    }
}
