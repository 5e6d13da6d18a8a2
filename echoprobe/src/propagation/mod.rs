//! Directional sound propagation: path sampling and filter derivation.

pub mod filters;
mod paths;
mod propagator;

pub use filters::{FilterParameters, FilterTuning};
pub use paths::{SoundPathSample, trace_sound_paths};
pub use propagator::SoundPropagator;
