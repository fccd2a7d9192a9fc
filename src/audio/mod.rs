//! Distance-based volume for remote participants.

pub mod attenuation;
pub mod mixer;

pub use attenuation::{AttenuationEngine, GainTable};
pub use mixer::VolumeMixer;

/// Receives per-participant gains.
///
/// The audio layer owns the participants' audio elements; the core only
/// ever sets their volume.
pub trait AudioLayer {
    fn apply_gains(&mut self, gains: &GainTable);
}
