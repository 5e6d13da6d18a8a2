use crate::error::{EchoProbeError, Result};
use crate::scene::LayerMask;

/// Configuration descriptor for the environment probe
#[derive(Debug, Clone)]
pub struct ProbeDesc {
    /// Number of rays cast per sampling pass
    pub ray_count: u32,
    /// Maximum distance a probe ray travels before it counts as escaped (meters)
    pub probe_distance: f32,
    /// Layers probe rays may hit
    pub geometry_mask: LayerMask,
    /// Seconds between sampling passes
    pub check_interval: f32,
    /// EMA factor applied to each new sample, in `(0, 1]` (higher adapts faster)
    pub smoothing: f32,
    /// Record the rays of each pass for visualization
    pub draw_debug: bool,
    /// Fixed RNG seed (None seeds from entropy)
    pub seed: Option<u64>,
}

impl Default for ProbeDesc {
    fn default() -> Self {
        Self {
            ray_count: 64,
            probe_distance: 30.0,
            geometry_mask: LayerMask::ALL,
            check_interval: 0.25,
            smoothing: 0.2,
            draw_debug: false,
            seed: None,
        }
    }
}

impl ProbeDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ray_count(mut self, count: u32) -> Self {
        self.ray_count = count;
        self
    }

    pub fn probe_distance(mut self, distance: f32) -> Self {
        self.probe_distance = distance;
        self
    }

    pub fn geometry_mask(mut self, mask: LayerMask) -> Self {
        self.geometry_mask = mask;
        self
    }

    pub fn check_interval(mut self, seconds: f32) -> Self {
        self.check_interval = seconds;
        self
    }

    pub fn smoothing(mut self, alpha: f32) -> Self {
        self.smoothing = alpha;
        self
    }

    pub fn draw_debug(mut self, enable: bool) -> Self {
        self.draw_debug = enable;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Strict validation for hosts that want to reject bad settings up front.
    ///
    /// The probe itself never fails on these; it skips the affected passes.
    pub fn validate(&self) -> Result<()> {
        if self.ray_count == 0 {
            return Err(EchoProbeError::Configuration(
                "probe ray_count must be greater than 0".to_string(),
            ));
        }
        if !(self.probe_distance > 0.0) {
            return Err(EchoProbeError::Configuration(format!(
                "probe_distance must be positive, got {}",
                self.probe_distance
            )));
        }
        if !(self.check_interval > 0.0) {
            return Err(EchoProbeError::Configuration(format!(
                "probe check_interval must be positive, got {}",
                self.check_interval
            )));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(EchoProbeError::Configuration(format!(
                "smoothing must be in (0, 1], got {}",
                self.smoothing
            )));
        }
        if self.geometry_mask.is_empty() {
            return Err(EchoProbeError::Configuration(
                "probe geometry_mask is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ProbeDesc::default().validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let desc = ProbeDesc::new().ray_count(16).smoothing(1.0).seed(3);
        assert_eq!(desc.ray_count, 16);
        assert_eq!(desc.seed, Some(3));
        assert!(desc.validate().is_ok());

        assert!(ProbeDesc::new().ray_count(0).validate().is_err());
        assert!(ProbeDesc::new().smoothing(0.0).validate().is_err());
        assert!(ProbeDesc::new().smoothing(1.5).validate().is_err());
        assert!(ProbeDesc::new().check_interval(-1.0).validate().is_err());
        assert!(ProbeDesc::new().probe_distance(f32::NAN).validate().is_err());
        assert!(ProbeDesc::new().geometry_mask(LayerMask::NONE).validate().is_err());
    }
}
