//! Capability surfaces and their entry points.
//!
//! A surface is described to the resolver as a table of individually
//! optional entry points, mirroring the fact that the host may expose some
//! members of a surface without the rest. Resolution turns a table into an
//! accessor only when every required slot is filled; a partial table is
//! rejected wholesale so no half-bound surface is ever observable.

use std::sync::Arc;

use glam::{Quat, Vec3};
use thiserror::Error;

use crate::types::{NodeState, TrackedNode};

/// A fault raised by a surface lookup or entry-point call.
///
/// These never escape [`HeadTracker`](crate::HeadTracker): lookup faults
/// demote the candidate surface to absent, query faults demote the single
/// call to a negative result.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface lookup failed: {0}")]
    Lookup(String),
    #[error("entry point call failed: {0}")]
    Call(String),
}

impl SurfaceError {
    pub fn lookup(msg: impl std::fmt::Display) -> Self {
        Self::Lookup(msg.to_string())
    }

    pub fn call(msg: impl std::fmt::Display) -> Self {
        Self::Call(msg.to_string())
    }
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Entry point answering "is this surface currently enabled?".
pub type EnabledFn = Arc<dyn Fn() -> SurfaceResult<bool> + Send + Sync>;

/// Entry point returning the current set of tracked-node samples.
pub type NodeStatesFn = Arc<dyn Fn() -> SurfaceResult<Vec<NodeState>> + Send + Sync>;

/// Entry point for the legacy single-step local-position query.
pub type LocalPositionFn = Arc<dyn Fn(TrackedNode) -> SurfaceResult<Vec3> + Send + Sync>;

/// Entry point for the legacy single-step local-rotation query.
pub type LocalRotationFn = Arc<dyn Fn(TrackedNode) -> SurfaceResult<Quat> + Send + Sync>;

/// What a host build may expose of the modern tracked-node surface.
#[derive(Clone, Default)]
pub struct ModernSurfaceTable {
    pub is_enabled: Option<EnabledFn>,
    pub node_states: Option<NodeStatesFn>,
    pub head_node: Option<TrackedNode>,
}

/// What a host build may expose of the legacy surface.
///
/// The pose entry points are optional even after resolution: a host that
/// lacks one simply reports the zero-vector or identity default for that
/// component.
#[derive(Clone, Default)]
pub struct LegacySurfaceTable {
    pub is_enabled: Option<EnabledFn>,
    pub local_position: Option<LocalPositionFn>,
    pub local_rotation: Option<LocalRotationFn>,
    pub head_node: Option<TrackedNode>,
}

/// Host-supplied lookup of capability surfaces.
///
/// `Ok(None)` means the surface is absent from this build, which is the
/// expected outcome on one of the two candidates (or both, for non-VR
/// hosts). `Err` means the lookup itself faulted; the resolver treats that
/// the same as absence after logging it.
pub trait SurfaceCatalog: Send + Sync {
    fn modern(&self) -> SurfaceResult<Option<ModernSurfaceTable>>;
    fn legacy(&self) -> SurfaceResult<Option<LegacySurfaceTable>>;
}

/// Fully resolved modern-surface accessor. All slots required.
#[derive(Clone)]
pub struct ModernAccessor {
    pub is_enabled: EnabledFn,
    pub node_states: NodeStatesFn,
    pub head_node: TrackedNode,
}

impl ModernAccessor {
    /// Build from a table, rejecting any table with a missing slot.
    pub fn resolve(table: ModernSurfaceTable) -> Option<Self> {
        Some(Self {
            is_enabled: table.is_enabled?,
            node_states: table.node_states?,
            head_node: table.head_node?,
        })
    }
}

/// Fully resolved legacy-surface accessor.
///
/// The enabled-query and head sentinel are required; the pose entry points
/// stay optional and default to zero/identity when absent.
#[derive(Clone)]
pub struct LegacyAccessor {
    pub is_enabled: EnabledFn,
    pub local_position: Option<LocalPositionFn>,
    pub local_rotation: Option<LocalRotationFn>,
    pub head_node: TrackedNode,
}

impl LegacyAccessor {
    pub fn resolve(table: LegacySurfaceTable) -> Option<Self> {
        Some(Self {
            is_enabled: table.is_enabled?,
            local_position: table.local_position,
            local_rotation: table.local_rotation,
            head_node: table.head_node?,
        })
    }
}
