//! Persisted spectator settings.
//!
//! The UI layer reads and writes these values; the follower only consumes
//! them through its live config fields. Stored as a small JSON file next to
//! the host's other mod configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Spectator camera settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectatorSettings {
    /// Time constant for position smoothing, in seconds.
    pub position_smooth_time: f32,
    /// Time constant for rotation smoothing, in seconds.
    pub rotation_smooth_time: f32,
    /// Vertical field of view of the spectator camera, in degrees.
    pub field_of_view: f32,
    /// Key that toggles the spectator camera, as a host key name.
    pub toggle_hotkey: String,
}

impl Default for SpectatorSettings {
    fn default() -> Self {
        Self {
            position_smooth_time: 0.25,
            rotation_smooth_time: 0.25,
            field_of_view: 60.0,
            toggle_hotkey: "F9".to_string(),
        }
    }
}

impl SpectatorSettings {
    /// Load settings from a JSON file, falling back to defaults for any
    /// value that fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let settings: Self =
            serde_json::from_str(&data).map_err(Error::serialization)?;
        Ok(settings.validated())
    }

    /// Save settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).map_err(Error::serialization)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Clamp out-of-range values back to their defaults.
    ///
    /// Non-positive smoothing times or field of view would degenerate the
    /// filters, so they are replaced rather than propagated.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.position_smooth_time > 0.0) {
            warn!(
                value = self.position_smooth_time,
                "invalid position_smooth_time, using default"
            );
            self.position_smooth_time = defaults.position_smooth_time;
        }
        if !(self.rotation_smooth_time > 0.0) {
            warn!(
                value = self.rotation_smooth_time,
                "invalid rotation_smooth_time, using default"
            );
            self.rotation_smooth_time = defaults.rotation_smooth_time;
        }
        if !(self.field_of_view > 0.0) || self.field_of_view >= 180.0 {
            warn!(
                value = self.field_of_view,
                "invalid field_of_view, using default"
            );
            self.field_of_view = defaults.field_of_view;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let settings = SpectatorSettings {
            position_smooth_time: 0.5,
            rotation_smooth_time: 0.1,
            field_of_view: 75.0,
            toggle_hotkey: "F7".to_string(),
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: SpectatorSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position_smooth_time, 0.5);
        assert_eq!(back.rotation_smooth_time, 0.1);
        assert_eq!(back.field_of_view, 75.0);
        assert_eq!(back.toggle_hotkey, "F7");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let back: SpectatorSettings = serde_json::from_str("{}").unwrap();
        let defaults = SpectatorSettings::default();
        assert_eq!(back.position_smooth_time, defaults.position_smooth_time);
        assert_eq!(back.toggle_hotkey, defaults.toggle_hotkey);
    }

    #[test]
    fn validation_clamps_degenerate_values() {
        let settings = SpectatorSettings {
            position_smooth_time: 0.0,
            rotation_smooth_time: -1.0,
            field_of_view: f32::NAN,
            toggle_hotkey: "F9".to_string(),
        };
        let validated = settings.validated();
        let defaults = SpectatorSettings::default();
        assert_eq!(validated.position_smooth_time, defaults.position_smooth_time);
        assert_eq!(validated.rotation_smooth_time, defaults.rotation_smooth_time);
        assert_eq!(validated.field_of_view, defaults.field_of_view);
    }
}
