//! Event types for EchoProbe

use crate::context::AcousticContext;
use crate::propagation::SoundPathSample;
use crate::world::EmitterId;

/// Why a sampling pass did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// `ray_count` is zero
    NoRays,
    /// The geometry mask is empty
    NoGeometryFilter,
    /// `check_interval` is zero, negative or NaN
    InvalidInterval,
    /// No listener is present in the world
    NoListener,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoRays => "ray count is zero",
            Self::NoGeometryFilter => "no geometry filter configured",
            Self::InvalidInterval => "check interval is not positive",
            Self::NoListener => "no listener present",
        };
        f.write_str(text)
    }
}

/// Result of advancing a probe or propagator by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome<T> {
    /// The interval has not elapsed; nothing was sampled
    Idle,
    /// A sampling pass ran and produced `T`
    Sampled(T),
    /// The interval elapsed but the pass was skipped
    Skipped(SkipReason),
}

impl<T> TickOutcome<T> {
    pub fn sampled(self) -> Option<T> {
        match self {
            Self::Sampled(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EchoProbeEvent {
    ContextUpdated {
        context: AcousticContext,
    },
    PathSampled {
        emitter: EmitterId,
        sample: SoundPathSample,
    },
    SampleSkipped {
        /// None for the environment probe
        emitter: Option<EmitterId>,
        reason: SkipReason,
    },
}

impl EchoProbeEvent {
    pub fn emitter(&self) -> Option<EmitterId> {
        match self {
            Self::PathSampled { emitter, .. } => Some(*emitter),
            Self::SampleSkipped { emitter, .. } => *emitter,
            Self::ContextUpdated { .. } => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::SampleSkipped { .. })
    }
}
