//! Host camera abstraction consumed by the follower.

use glam::{Quat, Vec3};

/// Opaque handle to a host camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub u32);

/// Output-eye mask of a host camera, distinguishing flat output from
/// stereo/VR rendering targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEye {
    Mono,
    Stereo,
}

/// The camera registry a host supplies to the follower.
///
/// Pose queries return `None` for handles the host no longer knows, which
/// the follower treats the same as an unbound reference.
pub trait CameraHost: Send {
    /// The host's current default/primary rendering camera, if any.
    fn main_camera(&self) -> Option<CameraId>;

    /// All currently known cameras.
    fn camera_ids(&self) -> Vec<CameraId>;

    /// World-space position and rotation of a camera.
    fn world_pose(&self, id: CameraId) -> Option<(Vec3, Quat)>;

    /// The camera's output-eye mask.
    fn target_eye(&self, id: CameraId) -> Option<TargetEye>;

    /// Write pose and field of view to a camera.
    fn apply(&mut self, id: CameraId, position: Vec3, rotation: Quat, fov: f32);

    /// Set a camera's output-eye mask, returning whether the host supports
    /// one. `false` is the correct, silent outcome for hosts without the
    /// stereo-mask feature; callers must not treat it as an error.
    fn set_target_eye(&mut self, _id: CameraId, _eye: TargetEye) -> bool {
        false
    }
}
