//! Smoothed spectator camera following the VR head pose.
//!
//! [`PoseFollower`] consumes head poses from a
//! [`HeadTracker`](vantage_vr::HeadTracker) and drives an output camera
//! along a temporally smooth trajectory for desktop viewers: a
//! critically-damped spring for position, exponential slerp for rotation,
//! an exact snap on the first tick so activation never drags the camera in
//! from the origin, and a reference-camera fallback for frames where no
//! head pose is available.

#![forbid(unsafe_code)]

pub mod camera;
pub mod filter;
pub mod follower;

pub use camera::{CameraHost, CameraId, TargetEye};
pub use follower::{FollowerConfig, PoseFollower};
