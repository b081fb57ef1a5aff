//! The pose follower: state machine and per-tick update.

use glam::{Quat, Vec3};
use tracing::{debug, warn};
use vantage_common::SpectatorSettings;
use vantage_vr::{HeadTracker, VrCapability};

use crate::camera::{CameraHost, CameraId, TargetEye};
use crate::filter;

/// Live-mutable follower configuration, read on every tick.
#[derive(Debug, Clone, Copy)]
pub struct FollowerConfig {
    /// Time constant for position smoothing, in seconds.
    pub position_smooth_time: f32,
    /// Time constant for rotation smoothing, in seconds.
    pub rotation_smooth_time: f32,
    /// Vertical field of view written to the output camera, in degrees.
    pub field_of_view: f32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            position_smooth_time: 0.25,
            rotation_smooth_time: 0.25,
            field_of_view: 60.0,
        }
    }
}

impl From<&SpectatorSettings> for FollowerConfig {
    fn from(settings: &SpectatorSettings) -> Self {
        Self {
            position_smooth_time: settings.position_smooth_time,
            rotation_smooth_time: settings.rotation_smooth_time,
            field_of_view: settings.field_of_view,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SmoothingState {
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    initialized: bool,
}

impl SmoothingState {
    fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            initialized: false,
        }
    }
}

/// Drives an output camera along a smoothed head trajectory.
///
/// Inactive until bound to an output camera and activated; activation is
/// refused while no VR surface is resolved. Each tick pulls a head pose,
/// composes it with the reference camera's world transform when one is
/// bound, and advances the smoothed pose toward that target. The first
/// successful tick snaps exactly, so activation never drags the camera in
/// from wherever it was parked.
///
/// Smoothing state survives deactivation; only [`reset_smoothing`]
/// (or the very first activation) re-arms the exact snap.
///
/// [`reset_smoothing`]: PoseFollower::reset_smoothing
pub struct PoseFollower {
    pub config: FollowerConfig,
    output: Option<CameraId>,
    reference: Option<CameraId>,
    active: bool,
    smoothing: SmoothingState,
}

impl Default for PoseFollower {
    fn default() -> Self {
        Self::new(FollowerConfig::default())
    }
}

impl PoseFollower {
    pub fn new(config: FollowerConfig) -> Self {
        Self {
            config,
            output: None,
            reference: None,
            active: false,
            smoothing: SmoothingState::new(),
        }
    }

    /// Bind the output camera and discover a reference camera.
    pub fn bind(&mut self, output: CameraId, host: &dyn CameraHost) {
        self.output = Some(output);
        self.refresh_reference(host);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn output(&self) -> Option<CameraId> {
        self.output
    }

    pub fn reference(&self) -> Option<CameraId> {
        self.reference
    }

    /// Start following. Returns whether the follower is now active.
    ///
    /// Refused, leaving prior state untouched, when no output camera is
    /// bound or no VR surface was resolved. On success the output camera's
    /// eye mask is forced to mono where the host supports one; hosts
    /// without the feature silently keep their default.
    pub fn activate(&mut self, tracker: &mut HeadTracker, host: &mut dyn CameraHost) -> bool {
        if self.active {
            return true;
        }
        let Some(output) = self.output else {
            warn!("cannot activate spectator camera: no output camera bound");
            return false;
        };
        if tracker.capability() == VrCapability::None {
            warn!("cannot activate spectator camera: no VR surface detected");
            return false;
        }
        self.set_target_eye_if_supported(host, output);
        self.active = true;
        debug!("spectator camera activated");
        true
    }

    /// Stop following. Smoothing state is preserved for reactivation.
    pub fn deactivate(&mut self) {
        if self.active {
            self.active = false;
            debug!("spectator camera deactivated");
        }
    }

    /// Re-arm the first-tick exact snap and clear the velocity accumulator.
    pub fn reset_smoothing(&mut self) {
        self.smoothing = SmoothingState::new();
    }

    /// Re-run reference-camera discovery.
    ///
    /// Preference order: the host's main camera when it is not the output;
    /// else the first camera whose eye mask is not mono; else any camera
    /// that is not the output. No match leaves the reference unbound.
    pub fn refresh_reference(&mut self, host: &dyn CameraHost) {
        self.reference = self.discover_reference(host);
    }

    /// Advance one frame. `dt` is the elapsed wall-clock time in seconds
    /// since the previous tick, independent of the host's simulation
    /// time-scale so the camera keeps tracking while the game is paused.
    pub fn tick(&mut self, host: &mut dyn CameraHost, tracker: &mut HeadTracker, dt: f32) {
        if !self.active {
            return;
        }
        let Some(output) = self.output else {
            return;
        };

        let head = tracker.try_head_pose();
        let reference = self.reference.and_then(|id| host.world_pose(id));

        let (target_position, target_rotation) = match (head, reference) {
            // Tracking-space pose composed into world space.
            (Some(pose), Some((ref_position, ref_rotation))) => (
                ref_position + ref_rotation * pose.position,
                ref_rotation * pose.rotation,
            ),
            (Some(pose), None) => (pose.position, pose.rotation),
            // Pass-through: follow the reference camera directly.
            (None, Some((ref_position, ref_rotation))) => (ref_position, ref_rotation),
            (None, None) => {
                // Nothing to follow this frame; try to find a reference for
                // the next one and leave the output camera untouched.
                self.refresh_reference(host);
                return;
            }
        };

        if !self.smoothing.initialized {
            self.smoothing.position = target_position;
            self.smoothing.rotation = target_rotation;
            self.smoothing.velocity = Vec3::ZERO;
            self.smoothing.initialized = true;
        } else {
            self.smoothing.position = filter::smooth_damp(
                self.smoothing.position,
                target_position,
                &mut self.smoothing.velocity,
                self.config.position_smooth_time,
                dt,
            );
            self.smoothing.rotation = filter::damp_slerp(
                self.smoothing.rotation,
                target_rotation,
                self.config.rotation_smooth_time,
                dt,
            );
        }

        host.apply(
            output,
            self.smoothing.position,
            self.smoothing.rotation,
            self.config.field_of_view,
        );
    }

    fn set_target_eye_if_supported(&self, host: &mut dyn CameraHost, output: CameraId) {
        // The silent no-op is the correct outcome for hosts without a
        // stereo mask.
        let _ = host.set_target_eye(output, TargetEye::Mono);
    }

    fn discover_reference(&self, host: &dyn CameraHost) -> Option<CameraId> {
        if let Some(main) = host.main_camera() {
            if Some(main) != self.output {
                return Some(main);
            }
        }
        let ids = host.camera_ids();
        if let Some(stereo) = ids.iter().copied().find(|id| {
            Some(*id) != self.output
                && host
                    .target_eye(*id)
                    .is_some_and(|eye| eye != TargetEye::Mono)
        }) {
            return Some(stereo);
        }
        ids.into_iter().find(|id| Some(*id) != self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vantage_vr::mock::{MockCatalog, ScriptedHead};
    use vantage_vr::Pose;

    const DT: f32 = 1.0 / 90.0;

    struct TestCamera {
        id: CameraId,
        position: Vec3,
        rotation: Quat,
        fov: f32,
        eye: TargetEye,
        applies: usize,
    }

    struct TestHost {
        cameras: Vec<TestCamera>,
        main: Option<CameraId>,
        has_eye_mask: bool,
    }

    impl TestHost {
        fn new() -> Self {
            Self {
                cameras: Vec::new(),
                main: None,
                has_eye_mask: true,
            }
        }

        fn add_camera(&mut self, id: u32, eye: TargetEye) -> CameraId {
            let id = CameraId(id);
            self.cameras.push(TestCamera {
                id,
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                fov: 90.0,
                eye,
                applies: 0,
            });
            id
        }

        fn set_main(&mut self, id: CameraId) {
            self.main = Some(id);
        }

        fn move_camera(&mut self, id: CameraId, position: Vec3, rotation: Quat) {
            let camera = self.camera_mut(id);
            camera.position = position;
            camera.rotation = rotation;
        }

        fn camera(&self, id: CameraId) -> &TestCamera {
            self.cameras.iter().find(|c| c.id == id).unwrap()
        }

        fn camera_mut(&mut self, id: CameraId) -> &mut TestCamera {
            self.cameras.iter_mut().find(|c| c.id == id).unwrap()
        }
    }

    impl CameraHost for TestHost {
        fn main_camera(&self) -> Option<CameraId> {
            self.main
        }

        fn camera_ids(&self) -> Vec<CameraId> {
            self.cameras.iter().map(|c| c.id).collect()
        }

        fn world_pose(&self, id: CameraId) -> Option<(Vec3, Quat)> {
            self.cameras
                .iter()
                .find(|c| c.id == id)
                .map(|c| (c.position, c.rotation))
        }

        fn target_eye(&self, id: CameraId) -> Option<TargetEye> {
            self.cameras.iter().find(|c| c.id == id).map(|c| c.eye)
        }

        fn apply(&mut self, id: CameraId, position: Vec3, rotation: Quat, fov: f32) {
            let camera = self.camera_mut(id);
            camera.position = position;
            camera.rotation = rotation;
            camera.fov = fov;
            camera.applies += 1;
        }

        fn set_target_eye(&mut self, id: CameraId, eye: TargetEye) -> bool {
            if !self.has_eye_mask {
                return false;
            }
            self.camera_mut(id).eye = eye;
            true
        }
    }

    fn tracker_with_head(head: &ScriptedHead) -> HeadTracker {
        HeadTracker::new(Arc::new(
            MockCatalog::new().with_modern(head.modern_table()),
        ))
    }

    fn head_pose(position: Vec3) -> Pose {
        Pose {
            position,
            rotation: Quat::from_rotation_y(0.5),
        }
    }

    #[test]
    fn first_tick_snaps_exactly_to_target() {
        let pose = head_pose(Vec3::new(1.0, 1.7, -0.5));
        let head = ScriptedHead::tracking(pose);
        let mut tracker = tracker_with_head(&head);
        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        assert!(follower.activate(&mut tracker, &mut host));
        follower.tick(&mut host, &mut tracker, DT);

        let camera = host.camera(output);
        assert_eq!(camera.position, pose.position);
        assert_eq!(camera.rotation, pose.rotation);
        assert_eq!(camera.fov, follower.config.field_of_view);
    }

    #[test]
    fn later_ticks_smooth_toward_a_moved_target() {
        let head = ScriptedHead::tracking(head_pose(Vec3::ZERO));
        let mut tracker = tracker_with_head(&head);
        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        follower.activate(&mut tracker, &mut host);
        follower.tick(&mut host, &mut tracker, DT);

        let target = Vec3::new(3.0, 0.0, 0.0);
        head.set_pose(head_pose(target));
        let mut last_distance = host.camera(output).position.distance(target);
        for _ in 0..200 {
            follower.tick(&mut host, &mut tracker, DT);
            let distance = host.camera(output).position.distance(target);
            assert!(distance <= last_distance + 1e-5);
            last_distance = distance;
        }
        assert!(last_distance < 0.05);
    }

    #[test]
    fn reset_smoothing_rearms_the_snap() {
        let head = ScriptedHead::tracking(head_pose(Vec3::ZERO));
        let mut tracker = tracker_with_head(&head);
        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        follower.activate(&mut tracker, &mut host);
        follower.tick(&mut host, &mut tracker, DT);

        let far = Vec3::new(10.0, 2.0, -4.0);
        head.set_pose(head_pose(far));
        follower.reset_smoothing();
        follower.tick(&mut host, &mut tracker, DT);
        assert_eq!(host.camera(output).position, far);
    }

    #[test]
    fn preserves_smoothing_across_reactivation() {
        let head = ScriptedHead::tracking(head_pose(Vec3::ZERO));
        let mut tracker = tracker_with_head(&head);
        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        follower.activate(&mut tracker, &mut host);
        follower.tick(&mut host, &mut tracker, DT);

        follower.deactivate();
        assert!(!follower.is_active());
        follower.activate(&mut tracker, &mut host);

        // Without a reset, the next tick smooths from the old state rather
        // than snapping to the moved target.
        let far = Vec3::new(10.0, 0.0, 0.0);
        head.set_pose(head_pose(far));
        follower.tick(&mut host, &mut tracker, DT);
        let position = host.camera(output).position;
        assert!(position.distance(far) > 5.0);
        assert!(position.distance(Vec3::ZERO) < 5.0);
    }

    #[test]
    fn composes_head_pose_with_the_reference_camera() {
        let local = Pose {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Quat::IDENTITY,
        };
        let head = ScriptedHead::tracking(local);
        let mut tracker = tracker_with_head(&head);

        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);
        let rig = host.add_camera(1, TargetEye::Stereo);
        host.set_main(rig);
        let rig_rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        host.move_camera(rig, Vec3::new(5.0, 0.0, 0.0), rig_rotation);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        assert_eq!(follower.reference(), Some(rig));
        follower.activate(&mut tracker, &mut host);
        follower.tick(&mut host, &mut tracker, DT);

        let camera = host.camera(output);
        let expected_position = Vec3::new(5.0, 0.0, 0.0) + rig_rotation * local.position;
        let expected_rotation = rig_rotation * local.rotation;
        assert!(camera.position.abs_diff_eq(expected_position, 1e-5));
        assert!((camera.rotation.dot(expected_rotation)).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn falls_back_to_reference_pass_through_without_a_pose() {
        let head = ScriptedHead::lost();
        let mut tracker = tracker_with_head(&head);

        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);
        let rig = host.add_camera(1, TargetEye::Stereo);
        host.set_main(rig);
        let rig_position = Vec3::new(-2.0, 3.0, 1.0);
        host.move_camera(rig, rig_position, Quat::IDENTITY);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        follower.activate(&mut tracker, &mut host);
        follower.tick(&mut host, &mut tracker, DT);

        assert_eq!(host.camera(output).position, rig_position);
    }

    #[test]
    fn skips_the_tick_and_rediscovers_when_nothing_is_available() {
        let head = ScriptedHead::lost();
        let mut tracker = tracker_with_head(&head);

        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);
        host.set_main(output);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        assert_eq!(follower.reference(), None);
        follower.activate(&mut tracker, &mut host);

        follower.tick(&mut host, &mut tracker, DT);
        assert_eq!(host.camera(output).applies, 0);

        // A rig appearing later is picked up by the rediscovery attempt.
        let rig = host.add_camera(1, TargetEye::Stereo);
        host.move_camera(rig, Vec3::ONE, Quat::IDENTITY);
        follower.tick(&mut host, &mut tracker, DT);
        assert_eq!(follower.reference(), Some(rig));
        follower.tick(&mut host, &mut tracker, DT);
        assert_eq!(host.camera(output).applies, 1);
        assert_eq!(host.camera(output).position, Vec3::ONE);
    }

    #[test]
    fn activation_is_refused_without_a_vr_surface() {
        let mut tracker = HeadTracker::new(Arc::new(MockCatalog::new()));
        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        assert!(!follower.activate(&mut tracker, &mut host));
        assert!(!follower.is_active());

        follower.tick(&mut host, &mut tracker, DT);
        assert_eq!(host.camera(output).applies, 0);
    }

    #[test]
    fn activation_is_refused_without_a_bound_output() {
        let head = ScriptedHead::tracking(Pose::default());
        let mut tracker = tracker_with_head(&head);
        let mut host = TestHost::new();

        let mut follower = PoseFollower::default();
        assert!(!follower.activate(&mut tracker, &mut host));
    }

    #[test]
    fn activation_forces_the_output_mask_to_mono() {
        let head = ScriptedHead::tracking(Pose::default());
        let mut tracker = tracker_with_head(&head);
        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Stereo);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        follower.activate(&mut tracker, &mut host);
        assert_eq!(host.camera(output).eye, TargetEye::Mono);
    }

    #[test]
    fn activation_tolerates_hosts_without_an_eye_mask() {
        let head = ScriptedHead::tracking(Pose::default());
        let mut tracker = tracker_with_head(&head);
        let mut host = TestHost::new();
        host.has_eye_mask = false;
        let output = host.add_camera(0, TargetEye::Stereo);

        let mut follower = PoseFollower::default();
        follower.bind(output, &host);
        assert!(follower.activate(&mut tracker, &mut host));
        assert_eq!(host.camera(output).eye, TargetEye::Stereo);
    }

    #[test]
    fn reference_discovery_prefers_main_then_stereo_then_any() {
        let mut host = TestHost::new();
        let output = host.add_camera(0, TargetEye::Mono);
        let mono = host.add_camera(1, TargetEye::Mono);
        let stereo = host.add_camera(2, TargetEye::Stereo);

        let mut follower = PoseFollower::default();

        // Main camera distinct from the output wins outright.
        host.set_main(mono);
        follower.bind(output, &host);
        assert_eq!(follower.reference(), Some(mono));

        // Main camera equal to the output falls through to the stereo scan.
        host.set_main(output);
        follower.refresh_reference(&host);
        assert_eq!(follower.reference(), Some(stereo));

        // Without any stereo camera, any non-output camera will do.
        host.camera_mut(stereo).eye = TargetEye::Mono;
        follower.refresh_reference(&host);
        assert_eq!(follower.reference(), Some(mono));
    }

    #[test]
    fn config_can_be_built_from_persisted_settings() {
        let settings = SpectatorSettings {
            position_smooth_time: 0.4,
            rotation_smooth_time: 0.2,
            field_of_view: 75.0,
            toggle_hotkey: "F9".to_string(),
        };
        let config = FollowerConfig::from(&settings);
        assert_eq!(config.position_smooth_time, 0.4);
        assert_eq!(config.rotation_smooth_time, 0.2);
        assert_eq!(config.field_of_view, 75.0);
    }
}
