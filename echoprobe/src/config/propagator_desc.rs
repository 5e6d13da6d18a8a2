use crate::error::{EchoProbeError, Result};
use crate::scene::LayerMask;

/// Configuration descriptor for one sound propagator (one emitter)
#[derive(Debug, Clone)]
pub struct PropagatorDesc {
    /// Number of sound rays per sampling pass
    pub ray_count: u32,
    /// Reflections allowed per ray
    pub max_bounces: u32,
    /// Maximum length of a single ray segment (meters)
    pub ray_distance: f32,
    /// Seconds between sampling passes
    pub check_interval: f32,
    /// Radius of the listener marker in debug output (meters)
    pub catch_radius: f32,
    /// Layers sound rays may hit
    pub geometry_mask: LayerMask,
    /// Low-pass cutoff when no ray reaches the listener (Hz)
    pub min_cutoff: f32,
    /// Low-pass cutoff when every ray reaches the listener (Hz)
    pub max_cutoff: f32,
    /// Rate at which the cutoff approaches its target (per second)
    pub smooth_speed: f32,
    /// End each ray's walk at its first arrival at the listener
    pub stop_at_first_arrival: bool,
    /// Record the rays of each pass for visualization
    pub draw_debug: bool,
    /// Fixed RNG seed (None seeds from entropy)
    pub seed: Option<u64>,
}

impl Default for PropagatorDesc {
    fn default() -> Self {
        Self {
            ray_count: 32,
            max_bounces: 3,
            ray_distance: 30.0,
            check_interval: 0.25,
            catch_radius: 0.5,
            geometry_mask: LayerMask::ALL,
            min_cutoff: 800.0,
            max_cutoff: 22000.0,
            smooth_speed: 5.0,
            stop_at_first_arrival: false,
            draw_debug: false,
            seed: None,
        }
    }
}

impl PropagatorDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ray_count(mut self, count: u32) -> Self {
        self.ray_count = count;
        self
    }

    pub fn max_bounces(mut self, bounces: u32) -> Self {
        self.max_bounces = bounces;
        self
    }

    pub fn ray_distance(mut self, distance: f32) -> Self {
        self.ray_distance = distance;
        self
    }

    pub fn check_interval(mut self, seconds: f32) -> Self {
        self.check_interval = seconds;
        self
    }

    pub fn geometry_mask(mut self, mask: LayerMask) -> Self {
        self.geometry_mask = mask;
        self
    }

    pub fn cutoff_range(mut self, min_hz: f32, max_hz: f32) -> Self {
        self.min_cutoff = min_hz;
        self.max_cutoff = max_hz;
        self
    }

    pub fn smooth_speed(mut self, speed: f32) -> Self {
        self.smooth_speed = speed;
        self
    }

    pub fn stop_at_first_arrival(mut self, enable: bool) -> Self {
        self.stop_at_first_arrival = enable;
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
    pub fn validate(&self) -> Result<()> {
        if self.ray_count == 0 {
            return Err(EchoProbeError::Configuration(
                "propagator ray_count must be greater than 0".to_string(),
            ));
        }
        if !(self.ray_distance > 0.0) {
            return Err(EchoProbeError::Configuration(format!(
                "ray_distance must be positive, got {}",
                self.ray_distance
            )));
        }
        if !(self.check_interval > 0.0) {
            return Err(EchoProbeError::Configuration(format!(
                "propagator check_interval must be positive, got {}",
                self.check_interval
            )));
        }
        if !(self.min_cutoff > 0.0 && self.min_cutoff <= self.max_cutoff) {
            return Err(EchoProbeError::Configuration(format!(
                "cutoff range must satisfy 0 < min <= max, got {}..{}",
                self.min_cutoff, self.max_cutoff
            )));
        }
        if !(self.smooth_speed >= 0.0) {
            return Err(EchoProbeError::Configuration(format!(
                "smooth_speed must not be negative, got {}",
                self.smooth_speed
            )));
        }
        if self.geometry_mask.is_empty() {
            return Err(EchoProbeError::Configuration(
                "propagator geometry_mask is empty".to_string(),
            ));
        }
        Ok(())
    }
}
