use std::collections::HashMap;
use tracing::debug;
use crate::config::AudioSettings;
use crate::world::ParticipantId;
use super::{AudioLayer, GainTable};

/// Per-participant output volume.
///
/// Holds the last gain table applied and scales it by the master volume. A
/// table replaces the previous one wholesale: participants missing from it
/// have no volume until the next recompute.
#[derive(Debug, Clone)]
pub struct VolumeMixer {
    enabled: bool,
    master_volume: f32,
    volumes: HashMap<ParticipantId, f32>,
    updates: u64,
}

impl VolumeMixer {
    pub fn new(settings: &AudioSettings) -> Self {
        Self {
            enabled: settings.enable_sound,
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            volumes: HashMap::new(),
            updates: 0,
        }
    }

    /// Volume actually sent to the participant's audio element
    pub fn volume(&self, id: &ParticipantId) -> Option<f32> {
        self.volumes.get(id).copied()
    }

    /// How many gain tables have been applied
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl Default for VolumeMixer {
    fn default() -> Self {
        Self::new(&AudioSettings::default())
    }
}

impl AudioLayer for VolumeMixer {
    fn apply_gains(&mut self, gains: &GainTable) {
        let scale = if self.enabled { self.master_volume } else { 0.0 };
        self.volumes = gains.iter().map(|(id, gain)| (id.clone(), gain * scale)).collect();
        self.updates += 1;
        debug!("🔊 Applied gains for {} participants (update #{})", self.volumes.len(), self.updates);
    }
}
