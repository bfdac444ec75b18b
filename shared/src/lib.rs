pub mod collision;
pub mod constants;
pub mod error;
pub mod hand_pose;
pub mod input;
pub mod look;
pub mod movement;
pub mod replay;
pub mod trigger;
pub mod utils;

pub use collision::{CollisionResult, PlayerCapsule, TriangleMesh, Vec3, WorldCollider};
pub use error::{CapsuleError, DetectorError};
pub use hand_pose::{
    DetectedHand, DetectionScheduler, EstimationConfig, HandPoseAdapter, HandPoseSource,
    HandSignals, HandTrackingSettings, Handedness,
};
pub use input::{ControlMode, ControlSignal, InputSettings, InputState, ModeCapabilities, resolve};
pub use look::{LookCommand, ViewRig};
pub use movement::{FrameReport, PlayerSettings, PlayerState, step_player};
pub use replay::ReplayHandSource;
pub use trigger::{TriggerZone, TriggerZones, ZoneId};
