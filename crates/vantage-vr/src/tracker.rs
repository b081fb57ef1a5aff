//! One-time capability resolution and head-pose queries.

use std::sync::Arc;

use glam::{Quat, Vec3};
use tracing::{debug, info, warn};

use crate::surface::{
    LegacyAccessor, ModernAccessor, SurfaceCatalog,
};
use crate::types::{Pose, VrCapability};

enum Accessor {
    Modern(ModernAccessor),
    Legacy(LegacyAccessor),
}

struct Resolved {
    capability: VrCapability,
    accessor: Option<Accessor>,
}

/// Resolves, once, which head-tracking surface the host exposes and answers
/// all subsequent queries through the cached accessor.
///
/// Single-threaded by design: the host drives every query from its frame
/// callback, so the lazy-initialization check needs no lock. Resolution is
/// never repeated; a new tracker must be built to re-probe.
pub struct HeadTracker {
    catalog: Arc<dyn SurfaceCatalog>,
    resolved: Option<Resolved>,
}

impl HeadTracker {
    pub fn new(catalog: Arc<dyn SurfaceCatalog>) -> Self {
        Self {
            catalog,
            resolved: None,
        }
    }

    /// Probe the catalog and record the outcome. Idempotent: once any
    /// outcome is recorded, including `None`, later calls return at once.
    ///
    /// The modern surface is tried first, then the legacy surface. A
    /// candidate whose table is missing a required slot, or whose lookup
    /// faults, is abandoned whole; the next candidate is unaffected.
    pub fn initialize(&mut self) {
        if self.resolved.is_some() {
            return;
        }

        match self.catalog.modern() {
            Ok(Some(table)) => match ModernAccessor::resolve(table) {
                Some(accessor) => {
                    info!("resolved modern XR head-tracking surface");
                    self.record(VrCapability::Modern, Some(Accessor::Modern(accessor)));
                    return;
                }
                None => debug!("modern surface present but missing required entry points"),
            },
            Ok(None) => debug!("modern surface not present"),
            Err(err) => warn!(error = %err, "modern surface lookup faulted"),
        }

        match self.catalog.legacy() {
            Ok(Some(table)) => match LegacyAccessor::resolve(table) {
                Some(accessor) => {
                    info!("resolved legacy VR head-tracking surface");
                    self.record(VrCapability::Legacy, Some(Accessor::Legacy(accessor)));
                    return;
                }
                None => debug!("legacy surface present but missing required entry points"),
            },
            Ok(None) => debug!("legacy surface not present"),
            Err(err) => warn!(error = %err, "legacy surface lookup faulted"),
        }

        info!("no VR head-tracking surface found");
        self.record(VrCapability::None, None);
    }

    fn record(&mut self, capability: VrCapability, accessor: Option<Accessor>) {
        self.resolved = Some(Resolved {
            capability,
            accessor,
        });
    }

    /// The recorded capability, probing first if needed.
    pub fn capability(&mut self) -> VrCapability {
        self.initialize();
        self.resolved
            .as_ref()
            .map(|r| r.capability)
            .unwrap_or(VrCapability::None)
    }

    /// Whether the resolved surface currently reports itself enabled.
    ///
    /// `false` when no surface was resolved or the enabled-query faults;
    /// faults are logged and never propagated.
    pub fn is_active(&mut self) -> bool {
        self.initialize();
        let result = match self.accessor() {
            Some(Accessor::Modern(acc)) => (acc.is_enabled)(),
            Some(Accessor::Legacy(acc)) => (acc.is_enabled)(),
            None => return false,
        };
        match result {
            Ok(active) => active,
            Err(err) => {
                debug!(error = %err, "enabled query faulted");
                false
            }
        }
    }

    /// The current head pose, or `None` if tracking is unavailable.
    ///
    /// Modern surface: fetch the tracked-node set, find the head sentinel,
    /// and require both its position and rotation components. Legacy
    /// surface: single-step local position and rotation queries, with
    /// zero/identity standing in for absent entry points. Any faulted call
    /// yields `None` for this query only.
    pub fn try_head_pose(&mut self) -> Option<Pose> {
        self.initialize();
        if !self.is_active() {
            return None;
        }
        match self.accessor()? {
            Accessor::Modern(acc) => Self::modern_head_pose(acc),
            Accessor::Legacy(acc) => Self::legacy_head_pose(acc),
        }
    }

    /// Diagnostic summary of the resolved capability and its active flag.
    pub fn status_description(&mut self) -> String {
        let capability = self.capability();
        if capability == VrCapability::None {
            return "VR tracking: no surface detected".to_string();
        }
        let state = if self.is_active() { "active" } else { "inactive" };
        format!("VR tracking: {} ({state})", capability.label())
    }

    fn accessor(&self) -> Option<&Accessor> {
        self.resolved.as_ref()?.accessor.as_ref()
    }

    fn modern_head_pose(acc: &ModernAccessor) -> Option<Pose> {
        let states = match (acc.node_states)() {
            Ok(states) => states,
            Err(err) => {
                debug!(error = %err, "node-state query faulted");
                return None;
            }
        };
        let head = states.iter().find(|state| state.node == acc.head_node)?;
        // Both components must be individually valid for the sample to count.
        match (head.position, head.rotation) {
            (Some(position), Some(rotation)) => Some(Pose { position, rotation }),
            _ => None,
        }
    }

    fn legacy_head_pose(acc: &LegacyAccessor) -> Option<Pose> {
        let position = match &acc.local_position {
            Some(query) => match query(acc.head_node) {
                Ok(position) => position,
                Err(err) => {
                    debug!(error = %err, "local-position query faulted");
                    return None;
                }
            },
            None => Vec3::ZERO,
        };
        let rotation = match &acc.local_rotation {
            Some(query) => match query(acc.head_node) {
                Ok(rotation) => rotation,
                Err(err) => {
                    debug!(error = %err, "local-rotation query faulted");
                    return None;
                }
            },
            None => Quat::IDENTITY,
        };
        Some(Pose { position, rotation })
    }
}
