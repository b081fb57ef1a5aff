//! Runtime VR head-tracking capability resolution.
//!
//! A host build exposes at most one of two mutually exclusive head-tracking
//! surfaces: the modern tracked-node surface or the legacy single-step
//! surface. Which one (if either) is present is unknown until runtime, so
//! [`HeadTracker`] probes a host-supplied [`SurfaceCatalog`] once, caches
//! the resolved entry points, and answers "is VR active?" and "where is the
//! head?" behind a single interface from then on.
//!
//! Absence of VR is a normal outcome here, not an error: every public query
//! is total and reports unavailability as `false` or `None`.

#![forbid(unsafe_code)]

pub mod mock;
pub mod surface;
pub mod tracker;
pub mod types;

pub use surface::{
    LegacySurfaceTable, ModernSurfaceTable, SurfaceCatalog, SurfaceError,
};
pub use tracker::HeadTracker;
pub use types::{NodeState, Pose, TrackedNode, VrCapability};
