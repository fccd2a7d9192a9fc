use crate::utils::math::{
    is_finite_quat, is_finite_vec3, quat_from_xyzw, quat_to_xyzw, vec3_from_array, vec3_to_array,
};
use cgmath::{InnerSpace, Quaternion, Vector3, Zero};
use thiserror::Error;

/// Below this length a quaternion has no usable direction
const MIN_QUATERNION_LENGTH: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoseError {
    #[error("position has non-finite components")]
    NonFinitePosition,
    #[error("orientation has non-finite components")]
    NonFiniteOrientation,
    #[error("orientation cannot be normalized")]
    DegenerateOrientation,
}

/// Position plus orientation of an object in the room.
///
/// A `Pose` can only be built through the validating constructors, so the
/// orientation is always a unit quaternion and every component is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    position: Vector3<f32>,
    orientation: Quaternion<f32>,
}

impl Pose {
    /// Origin, identity orientation
    pub fn neutral() -> Self {
        Self {
            position: Vector3::zero(),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    /// Validate and normalize.
    pub fn new(position: Vector3<f32>, orientation: Quaternion<f32>) -> Result<Self, PoseError> {
        if !is_finite_vec3(&position) {
            return Err(PoseError::NonFinitePosition);
        }
        if !is_finite_quat(&orientation) {
            return Err(PoseError::NonFiniteOrientation);
        }
        let length = orientation.magnitude();
        if !length.is_finite() || length < MIN_QUATERNION_LENGTH {
            return Err(PoseError::DegenerateOrientation);
        }
        Ok(Self {
            position,
            orientation: orientation / length,
        })
    }

    /// Build from the `[x, y, z]` / `[x, y, z, w]` arrays the server sends.
    pub fn from_wire(position: [f32; 3], rotation: [f32; 4]) -> Result<Self, PoseError> {
        Self::new(vec3_from_array(position), quat_from_xyzw(rotation))
    }

    pub fn to_wire(&self) -> ([f32; 3], [f32; 4]) {
        (vec3_to_array(self.position), quat_to_xyzw(self.orientation))
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn orientation(&self) -> Quaternion<f32> {
        self.orientation
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::neutral()
    }
}
