//! Configuration for EchoProbe

mod probe_desc;
mod propagator_desc;
mod world_desc;

pub use probe_desc::ProbeDesc;
pub use propagator_desc::PropagatorDesc;
pub use world_desc::EchoProbeWorldDesc;

/// Distance probe rays start from the probe position, along their own direction.
pub const PROBE_ORIGIN_OFFSET: f32 = 0.05;

/// Distance a reflected ray is pushed off the surface it bounced from.
pub const REFLECTION_EPSILON: f32 = 0.01;

/// Number of distinct surfaces at which the clutter estimate saturates.
pub const CLUTTER_NORMALIZATION: f32 = 20.0;

/// Speed of sound in meters per second.
pub const SPEED_OF_SOUND: f32 = 343.0;
