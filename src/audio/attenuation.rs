use std::collections::HashMap;
use cgmath::{InnerSpace, Vector3};
use crate::config::AttenuationSettings;
use crate::utils::math::is_finite_vec3;
use crate::world::{ParticipantId, Pose, PoseError, PresenceError, PresenceResult};

/// Gain per participant, always in `[0, 1]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GainTable {
    gains: HashMap<ParticipantId, f32>,
}

impl GainTable {
    pub fn get(&self, id: &ParticipantId) -> Option<f32> {
        self.gains.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, f32)> {
        self.gains.iter().map(|(id, gain)| (id, *gain))
    }

    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }
}

/// Heuristic distance falloff.
///
/// Works on squared distance throughout. Past `cutoff_sq` a participant is
/// silent; inside it the gain is `reference_sq / d2`, clamped to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttenuationEngine {
    cutoff_sq: f32,
    reference_sq: f32,
}

impl AttenuationEngine {
    pub fn new(cutoff_sq: f32, reference_sq: f32) -> Self {
        Self { cutoff_sq, reference_sq }
    }

    pub fn from_settings(settings: &AttenuationSettings) -> Self {
        Self::new(settings.cutoff_sq, settings.reference_sq)
    }

    /// Gain for one squared distance
    pub fn gain(&self, d2: f32) -> f32 {
        if d2 > self.cutoff_sq {
            0.0
        } else if d2 <= 0.0 {
            // Co-located: the clamp applies before the division could
            1.0
        } else {
            (self.reference_sq / d2).min(1.0)
        }
    }

    /// Recompute the whole table for the viewer at `viewer`.
    ///
    /// Pure: nothing is mutated. Fails only if the viewer position itself is
    /// unusable, in which case no gains are produced at all.
    pub fn compute_gains<'a, I>(&self, viewer: Vector3<f32>, poses: I) -> PresenceResult<GainTable>
    where
        I: IntoIterator<Item = (&'a ParticipantId, &'a Pose)>,
    {
        if !is_finite_vec3(&viewer) {
            return Err(PresenceError::MalformedPose {
                id: ParticipantId::local_viewer(),
                reason: PoseError::NonFinitePosition,
            });
        }

        let gains = poses
            .into_iter()
            .map(|(id, pose)| {
                let d2 = (viewer - pose.position()).magnitude2();
                (id.clone(), self.gain(d2))
            })
            .collect();
        Ok(GainTable { gains })
    }
}

impl Default for AttenuationEngine {
    fn default() -> Self {
        Self::from_settings(&AttenuationSettings::default())
    }
}
