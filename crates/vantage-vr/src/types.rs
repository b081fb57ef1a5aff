use glam::{Quat, Vec3};

/// Which head-tracking surface resolution settled on.
///
/// Recorded once per [`HeadTracker`](crate::HeadTracker); `None` means the
/// host exposes neither surface, which is a normal outcome for non-VR builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VrCapability {
    None,
    Legacy,
    Modern,
}

impl VrCapability {
    pub fn label(self) -> &'static str {
        match self {
            VrCapability::None => "none",
            VrCapability::Legacy => "legacy VR surface",
            VrCapability::Modern => "modern XR surface",
        }
    }
}

/// A tracked node within a capability surface.
///
/// Only `Head` is consumed by this crate; the rest exist because the modern
/// surface reports them alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedNode {
    Head,
    LeftEye,
    RightEye,
    LeftHand,
    RightHand,
}

/// A head pose sample. Produced fresh on every query; nothing is retained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// One node's sample from the modern surface.
///
/// Position and rotation carry independent validity: the runtime can know
/// where a node is without knowing which way it faces, and vice versa.
#[derive(Debug, Clone, Copy)]
pub struct NodeState {
    pub node: TrackedNode,
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
}

impl NodeState {
    pub fn new(node: TrackedNode) -> Self {
        Self {
            node,
            position: None,
            rotation: None,
        }
    }

    pub fn with_pose(node: TrackedNode, position: Vec3, rotation: Quat) -> Self {
        Self {
            node,
            position: Some(position),
            rotation: Some(rotation),
        }
    }
}
