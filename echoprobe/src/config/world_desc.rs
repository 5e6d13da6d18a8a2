use crate::config::ProbeDesc;
use crate::math::Vec3;

/// Configuration descriptor for an EchoProbe world
#[derive(Debug, Clone)]
pub struct EchoProbeWorldDesc {
    /// Environment probe settings
    pub probe: ProbeDesc,
    /// Where the environment probe samples from
    pub probe_position: Vec3,
    /// Maximum number of emitters the world accepts
    pub max_emitters: usize,
    /// Events kept until polled; newer events are dropped once full
    pub event_capacity: usize,
}

impl Default for EchoProbeWorldDesc {
    fn default() -> Self {
        Self {
            probe: ProbeDesc::default(),
            probe_position: Vec3::ZERO,
            max_emitters: 64,
            event_capacity: 1024,
        }
    }
}
