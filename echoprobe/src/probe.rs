//! Environment acoustic probe.
//!
//! Casts rays in every direction from a fixed point and turns the share of
//! blocked rays into a smoothed [`AcousticContext`] that all propagators read.

use crate::config::{PROBE_ORIGIN_OFFSET, ProbeDesc};
use crate::context::{AcousticContext, ContextPublisher, ContextReader};
use crate::debug::{DebugRay, DebugRayKind};
use crate::events::{SkipReason, TickOutcome};
use crate::math::{Vec3, lerp, random_unit_vector};
use crate::scene::RayTracer;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Ray classification of one probe pass. `blocked + escaped` equals the ray count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeSample {
    pub blocked: u32,
    pub escaped: u32,
}

impl ProbeSample {
    pub fn ray_count(&self) -> u32 {
        self.blocked + self.escaped
    }

    pub fn raw_muffling(&self) -> f32 {
        match self.ray_count() {
            0 => 0.0,
            n => self.blocked as f32 / n as f32,
        }
    }

    pub fn outdoor(&self) -> f32 {
        match self.ray_count() {
            0 => 0.0,
            n => self.escaped as f32 / n as f32,
        }
    }
}

pub struct EnvironmentProbe {
    desc: ProbeDesc,
    position: Vec3,
    publisher: ContextPublisher,
    smoothed: AcousticContext,
    timer: f32,
    rng: StdRng,
    debug_rays: Vec<DebugRay>,
    warned_skip: Option<SkipReason>,
}

impl EnvironmentProbe {
    pub fn new(desc: ProbeDesc, position: Vec3) -> Self {
        let rng = match desc.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::info!(
            "Environment probe at {:?} (rays: {}, distance: {}, interval: {}s, smoothing: {})",
            position,
            desc.ray_count,
            desc.probe_distance,
            desc.check_interval,
            desc.smoothing
        );
        Self {
            desc,
            position,
            publisher: ContextPublisher::new(),
            smoothed: AcousticContext::default(),
            timer: 0.0,
            rng,
            debug_rays: Vec::new(),
            warned_skip: None,
        }
    }

    pub fn desc(&self) -> &ProbeDesc {
        &self.desc
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Handle for propagators and other consumers of the context.
    pub fn reader(&self) -> ContextReader {
        self.publisher.reader()
    }

    pub fn context(&self) -> AcousticContext {
        self.smoothed
    }

    /// Rays recorded by the last pass (empty unless `draw_debug` is set).
    pub fn debug_rays(&self) -> &[DebugRay] {
        &self.debug_rays
    }

    /// Advances the interval timer and samples once `check_interval` has elapsed.
    pub fn tick(&mut self, dt: f32, tracer: &dyn RayTracer) -> TickOutcome<AcousticContext> {
        if !(self.desc.check_interval > 0.0) {
            self.note_skip(SkipReason::InvalidInterval);
            return TickOutcome::Skipped(SkipReason::InvalidInterval);
        }

        self.timer += dt.max(0.0);
        if self.timer < self.desc.check_interval {
            return TickOutcome::Idle;
        }
        self.timer = 0.0;

        match self.sample(tracer) {
            Ok(sample) => TickOutcome::Sampled(self.apply(sample)),
            Err(reason) => {
                self.note_skip(reason);
                TickOutcome::Skipped(reason)
            }
        }
    }

    /// Casts one batch of rays without touching the smoothed context.
    pub fn sample(&mut self, tracer: &dyn RayTracer) -> Result<ProbeSample, SkipReason> {
        if self.desc.ray_count == 0 {
            return Err(SkipReason::NoRays);
        }
        if self.desc.geometry_mask.is_empty() {
            return Err(SkipReason::NoGeometryFilter);
        }

        self.debug_rays.clear();
        let mut sample = ProbeSample::default();

        for _ in 0..self.desc.ray_count {
            let direction = random_unit_vector(&mut self.rng);
            let origin = self.position + direction * PROBE_ORIGIN_OFFSET;

            match tracer.cast_ray(
                origin,
                direction,
                self.desc.probe_distance,
                self.desc.geometry_mask,
            ) {
                Some(hit) => {
                    sample.blocked += 1;
                    if self.desc.draw_debug {
                        self.debug_rays.push(DebugRay::new(
                            origin,
                            direction * hit.distance,
                            DebugRayKind::Blocked,
                        ));
                    }
                }
                None => {
                    sample.escaped += 1;
                    if self.desc.draw_debug {
                        self.debug_rays.push(DebugRay::new(
                            origin,
                            direction * self.desc.probe_distance,
                            DebugRayKind::Escaped,
                        ));
                    }
                }
            }
        }

        log::debug!(
            "Probe pass: {} blocked, {} escaped",
            sample.blocked,
            sample.escaped
        );
        Ok(sample)
    }

    /// Blends a sample into the smoothed context and publishes it.
    pub fn apply(&mut self, sample: ProbeSample) -> AcousticContext {
        if sample.ray_count() == 0 {
            return self.smoothed;
        }

        let alpha = self.desc.smoothing;
        let raw_muffling = sample.raw_muffling();
        self.smoothed = AcousticContext {
            muffling: lerp(self.smoothed.muffling, raw_muffling, alpha),
            reverb_level: lerp(self.smoothed.reverb_level, 1.0 - raw_muffling, alpha),
            outdoor_factor: lerp(self.smoothed.outdoor_factor, sample.outdoor(), alpha),
        };
        self.publisher.publish(self.smoothed);
        self.warned_skip = None;
        self.smoothed
    }

    fn note_skip(&mut self, reason: SkipReason) {
        if self.warned_skip != Some(reason) {
            log::warn!("Environment probe skipped a pass: {}", reason);
            self.warned_skip = Some(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{LayerMask, RayHit, SurfaceId};
    use approx::assert_relative_eq;

    struct AllBlocked;

    impl RayTracer for AllBlocked {
        fn cast_ray(&self, origin: Vec3, direction: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
            Some(RayHit::new(1.0, origin + direction, -direction, SurfaceId(0)))
        }
    }

    struct NothingThere;

    impl RayTracer for NothingThere {
        fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
            None
        }
    }

    /// Ground plane at y = -1: blocks the downward hemisphere.
    struct Ground;

    impl RayTracer for Ground {
        fn cast_ray(&self, origin: Vec3, direction: Vec3, max: f32, _: LayerMask) -> Option<RayHit> {
            if direction.y >= 0.0 {
                return None;
            }
            let t = (-1.0 - origin.y) / direction.y;
            (t <= max).then(|| RayHit::new(t, origin + direction * t, Vec3::Y, SurfaceId(0)))
        }
    }

    fn probe(desc: ProbeDesc) -> EnvironmentProbe {
        EnvironmentProbe::new(desc.seed(42), Vec3::ZERO)
    }

    #[test]
    fn test_every_ray_classified_once() {
        let mut probe = probe(ProbeDesc::new().ray_count(37));
        let sample = probe.sample(&Ground).unwrap();
        assert_eq!(sample.blocked + sample.escaped, 37);
        assert!(sample.blocked > 0 && sample.escaped > 0);
    }

    #[test]
    fn test_all_blocked_single_step() {
        let mut probe = probe(ProbeDesc::new().ray_count(64).smoothing(0.2));
        let sample = probe.sample(&AllBlocked).unwrap();
        assert_eq!(sample.blocked, 64);
        assert_eq!(sample.raw_muffling(), 1.0);

        let context = probe.apply(sample);
        assert_relative_eq!(context.muffling, 0.2, epsilon = 1e-6);
        assert_relative_eq!(context.reverb_level, 0.0, epsilon = 1e-6);
        assert_relative_eq!(context.outdoor_factor, 0.0, epsilon = 1e-6);
        assert_eq!(probe.reader().current(), context);
    }

    #[test]
    fn test_ema_converges_within_expected_ticks() {
        let alpha = 0.2_f32;
        let epsilon = 1e-3_f32;
        let mut probe = probe(ProbeDesc::new().smoothing(alpha));
        let expected = (epsilon.ln() / (1.0 - alpha).ln()).ceil() as usize;

        let sample = ProbeSample {
            blocked: 48,
            escaped: 16,
        };
        for _ in 0..expected {
            probe.apply(sample);
        }
        let context = probe.context();
        assert!((context.muffling - 0.75).abs() <= epsilon);
        assert!((context.reverb_level - 0.25).abs() <= epsilon);
        assert!((context.outdoor_factor - 0.25).abs() <= epsilon);
    }

    #[test]
    fn test_alpha_one_snaps_to_sample() {
        let mut probe = probe(ProbeDesc::new().smoothing(1.0));
        let context = probe.apply(ProbeSample {
            blocked: 1,
            escaped: 3,
        });
        assert_eq!(context.muffling, 0.25);
        assert_eq!(context.reverb_level, 0.75);
        assert_eq!(context.outdoor_factor, 0.75);
    }

    #[test]
    fn test_tick_waits_for_interval() {
        let mut probe = probe(ProbeDesc::new().check_interval(0.25).smoothing(1.0));
        assert_eq!(probe.tick(0.1, &AllBlocked), TickOutcome::Idle);
        assert_eq!(probe.tick(0.1, &AllBlocked), TickOutcome::Idle);
        let context = probe.tick(0.1, &AllBlocked).sampled().unwrap();
        assert_eq!(context.muffling, 1.0);
        // Timer was reset.
        assert_eq!(probe.tick(0.1, &AllBlocked), TickOutcome::Idle);
    }

    #[test]
    fn test_zero_rays_keeps_previous_context() {
        let mut probe = probe(ProbeDesc::new().smoothing(1.0));
        probe.apply(ProbeSample {
            blocked: 2,
            escaped: 2,
        });
        let before = probe.context();

        let mut empty = EnvironmentProbe::new(ProbeDesc::new().ray_count(0), Vec3::ZERO);
        assert_eq!(
            empty.tick(1.0, &NothingThere),
            TickOutcome::Skipped(SkipReason::NoRays)
        );
        assert_eq!(empty.context(), AcousticContext::default());
        assert_eq!(probe.apply(ProbeSample::default()), before);
    }

    #[test]
    fn test_skips_without_filter_or_interval() {
        let mut probe = probe(ProbeDesc::new().geometry_mask(LayerMask::NONE));
        assert_eq!(
            probe.tick(1.0, &AllBlocked),
            TickOutcome::Skipped(SkipReason::NoGeometryFilter)
        );

        let mut probe = EnvironmentProbe::new(ProbeDesc::new().check_interval(0.0), Vec3::ZERO);
        assert_eq!(
            probe.tick(1.0, &AllBlocked),
            TickOutcome::Skipped(SkipReason::InvalidInterval)
        );
        assert_eq!(probe.context(), AcousticContext::default());
    }

    #[test]
    fn test_debug_rays_recorded_when_enabled() {
        let mut probe = probe(ProbeDesc::new().ray_count(8).draw_debug(true));
        probe.sample(&AllBlocked).unwrap();
        assert_eq!(probe.debug_rays().len(), 8);
        assert!(probe.debug_rays().iter().all(|r| r.kind == DebugRayKind::Blocked));

        probe.sample(&NothingThere).unwrap();
        assert_eq!(probe.debug_rays().len(), 8);
        for ray in probe.debug_rays() {
            assert_eq!(ray.kind, DebugRayKind::Escaped);
            assert_relative_eq!(ray.direction.length(), 30.0, epsilon = 1e-3);
        }
    }
}
