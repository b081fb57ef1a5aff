//! Scriptable surfaces and catalogs for tests.
//!
//! Hosts are awkward to stand up in unit tests, so this module provides a
//! catalog whose surfaces are driven from the test body: toggle the enabled
//! flag, move the head, drop the pose, or make lookups and queries fault.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use glam::{Quat, Vec3};

use crate::surface::{
    EnabledFn, LegacySurfaceTable, LocalPositionFn, LocalRotationFn, ModernSurfaceTable,
    NodeStatesFn, SurfaceCatalog, SurfaceError, SurfaceResult,
};
use crate::types::{NodeState, Pose, TrackedNode};

/// An entry point returning a fixed enabled flag.
pub fn enabled_entry(value: bool) -> EnabledFn {
    Arc::new(move || Ok(value))
}

/// An enabled entry point that always faults.
pub fn faulting_enabled_entry() -> EnabledFn {
    Arc::new(|| Err(SurfaceError::call("scripted enabled fault")))
}

/// An entry point returning a fixed tracked-node set.
pub fn node_states_entry(nodes: Vec<NodeState>) -> NodeStatesFn {
    Arc::new(move || Ok(nodes.clone()))
}

/// A node-state entry point that always faults.
pub fn faulting_node_states_entry() -> NodeStatesFn {
    Arc::new(|| Err(SurfaceError::call("scripted node-state fault")))
}

/// An entry point returning a fixed local position for any node.
pub fn local_position_entry(position: Vec3) -> LocalPositionFn {
    Arc::new(move |_| Ok(position))
}

/// An entry point returning a fixed local rotation for any node.
pub fn local_rotation_entry(rotation: Quat) -> LocalRotationFn {
    Arc::new(move |_| Ok(rotation))
}

/// A complete modern table over a fixed node set.
pub fn modern_table(enabled: bool, nodes: Vec<NodeState>) -> ModernSurfaceTable {
    ModernSurfaceTable {
        is_enabled: Some(enabled_entry(enabled)),
        node_states: Some(node_states_entry(nodes)),
        head_node: Some(TrackedNode::Head),
    }
}

/// A complete legacy table over a fixed pose.
pub fn legacy_table(enabled: bool, position: Vec3, rotation: Quat) -> LegacySurfaceTable {
    LegacySurfaceTable {
        is_enabled: Some(enabled_entry(enabled)),
        local_position: Some(local_position_entry(position)),
        local_rotation: Some(local_rotation_entry(rotation)),
        head_node: Some(TrackedNode::Head),
    }
}

struct ScriptedHeadState {
    enabled: bool,
    pose: Option<Pose>,
}

/// A head whose tracking state is shared between the test body and the
/// surface tables it hands out. Moving the head mid-test moves what the
/// tables report.
#[derive(Clone)]
pub struct ScriptedHead {
    inner: Arc<Mutex<ScriptedHeadState>>,
}

impl ScriptedHead {
    /// An enabled head tracking the given pose.
    pub fn tracking(pose: Pose) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScriptedHeadState {
                enabled: true,
                pose: Some(pose),
            })),
        }
    }

    /// An enabled head with no pose available (head node untracked).
    pub fn lost() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScriptedHeadState {
                enabled: true,
                pose: None,
            })),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.lock().unwrap().enabled = enabled;
    }

    pub fn set_pose(&self, pose: Pose) {
        self.inner.lock().unwrap().pose = Some(pose);
    }

    pub fn clear_pose(&self) {
        self.inner.lock().unwrap().pose = None;
    }

    /// A modern table backed by this head. When the pose is cleared the
    /// head node is simply absent from the tracked set.
    pub fn modern_table(&self) -> ModernSurfaceTable {
        let enabled = self.inner.clone();
        let nodes = self.inner.clone();
        ModernSurfaceTable {
            is_enabled: Some(Arc::new(move || Ok(enabled.lock().unwrap().enabled))),
            node_states: Some(Arc::new(move || {
                let state = nodes.lock().unwrap();
                Ok(state
                    .pose
                    .map(|pose| {
                        vec![NodeState::with_pose(
                            TrackedNode::Head,
                            pose.position,
                            pose.rotation,
                        )]
                    })
                    .unwrap_or_default())
            })),
            head_node: Some(TrackedNode::Head),
        }
    }

    /// A legacy table backed by this head. A cleared pose reads as the
    /// zero/identity defaults, matching the legacy surface's semantics.
    pub fn legacy_table(&self) -> LegacySurfaceTable {
        let enabled = self.inner.clone();
        let position = self.inner.clone();
        let rotation = self.inner.clone();
        LegacySurfaceTable {
            is_enabled: Some(Arc::new(move || Ok(enabled.lock().unwrap().enabled))),
            local_position: Some(Arc::new(move |_| {
                Ok(position
                    .lock()
                    .unwrap()
                    .pose
                    .map(|pose| pose.position)
                    .unwrap_or(Vec3::ZERO))
            })),
            local_rotation: Some(Arc::new(move |_| {
                Ok(rotation
                    .lock()
                    .unwrap()
                    .pose
                    .map(|pose| pose.rotation)
                    .unwrap_or(Quat::IDENTITY))
            })),
            head_node: Some(TrackedNode::Head),
        }
    }
}

/// A catalog assembled from scripted tables. Lookup calls are counted so
/// tests can assert the probe runs exactly once.
#[derive(Default)]
pub struct MockCatalog {
    modern: Option<ModernSurfaceTable>,
    legacy: Option<LegacySurfaceTable>,
    modern_faults: bool,
    legacy_faults: bool,
    modern_lookups: AtomicUsize,
    legacy_lookups: AtomicUsize,
}

impl MockCatalog {
    /// A catalog with neither surface, the non-VR host.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modern(mut self, table: ModernSurfaceTable) -> Self {
        self.modern = Some(table);
        self
    }

    pub fn with_legacy(mut self, table: LegacySurfaceTable) -> Self {
        self.legacy = Some(table);
        self
    }

    /// Make the modern lookup itself fault.
    pub fn with_faulting_modern(mut self) -> Self {
        self.modern_faults = true;
        self
    }

    /// Make the legacy lookup itself fault.
    pub fn with_faulting_legacy(mut self) -> Self {
        self.legacy_faults = true;
        self
    }

    pub fn modern_lookups(&self) -> usize {
        self.modern_lookups.load(Ordering::Relaxed)
    }

    pub fn legacy_lookups(&self) -> usize {
        self.legacy_lookups.load(Ordering::Relaxed)
    }
}

impl SurfaceCatalog for MockCatalog {
    fn modern(&self) -> SurfaceResult<Option<ModernSurfaceTable>> {
        self.modern_lookups.fetch_add(1, Ordering::Relaxed);
        if self.modern_faults {
            return Err(SurfaceError::lookup("scripted modern lookup fault"));
        }
        Ok(self.modern.clone())
    }

    fn legacy(&self) -> SurfaceResult<Option<LegacySurfaceTable>> {
        self.legacy_lookups.fetch_add(1, Ordering::Relaxed);
        if self.legacy_faults {
            return Err(SurfaceError::lookup("scripted legacy lookup fault"));
        }
        Ok(self.legacy.clone())
    }
}
