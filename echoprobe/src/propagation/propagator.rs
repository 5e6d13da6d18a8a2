use crate::config::PropagatorDesc;
use crate::context::ContextReader;
use crate::debug::{DebugRay, circle_segments};
use crate::events::{SkipReason, TickOutcome};
use crate::math::Vec3;
use crate::propagation::filters::{FilterParameters, FilterTuning};
use crate::propagation::paths::{SoundPathSample, trace_sound_paths};
use crate::scene::RayTracer;
use rand::SeedableRng;
use rand::rngs::StdRng;

const CATCH_RADIUS_SEGMENTS: u32 = 20;

/// Per-emitter sound propagation estimate.
///
/// Samples sound paths every `check_interval` seconds and moves its
/// [`FilterParameters`] every tick, reading the shared context through the
/// [`ContextReader`] it was built with. Propagators share nothing else.
pub struct SoundPropagator {
    desc: PropagatorDesc,
    context: ContextReader,
    rng: StdRng,
    timer: f32,
    sample: SoundPathSample,
    params: FilterParameters,
    debug_rays: Vec<DebugRay>,
    warned_skip: Option<SkipReason>,
}

impl SoundPropagator {
    pub fn new(desc: PropagatorDesc, context: ContextReader) -> Self {
        let rng = match desc.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let params = FilterParameters::new(desc.max_cutoff);
        Self {
            desc,
            context,
            rng,
            timer: 0.0,
            sample: SoundPathSample::default(),
            params,
            debug_rays: Vec::new(),
            warned_skip: None,
        }
    }

    pub fn desc(&self) -> &PropagatorDesc {
        &self.desc
    }

    /// Result of the last completed sampling pass.
    pub fn sample(&self) -> &SoundPathSample {
        &self.sample
    }

    pub fn filter_parameters(&self) -> &FilterParameters {
        &self.params
    }

    /// Rays recorded by the last pass (empty unless `draw_debug` is set).
    pub fn debug_rays(&self) -> &[DebugRay] {
        &self.debug_rays
    }

    /// Samples when the interval has elapsed, then updates the filter
    /// parameters from the latest sample.
    ///
    /// A skipped pass replaces the sample with a neutral one (nothing heard),
    /// except when the interval itself is invalid, in which case the last
    /// sample stays in effect.
    pub fn tick(
        &mut self,
        dt: f32,
        emitter: Vec3,
        listener: Option<Vec3>,
        tracer: &dyn RayTracer,
    ) -> TickOutcome<SoundPathSample> {
        let outcome = self.advance(dt, emitter, listener, tracer);
        self.update_filters(dt);
        outcome
    }

    fn advance(
        &mut self,
        dt: f32,
        emitter: Vec3,
        listener: Option<Vec3>,
        tracer: &dyn RayTracer,
    ) -> TickOutcome<SoundPathSample> {
        if !(self.desc.check_interval > 0.0) {
            self.note_skip(SkipReason::InvalidInterval);
            return TickOutcome::Skipped(SkipReason::InvalidInterval);
        }

        self.timer += dt.max(0.0);
        if self.timer < self.desc.check_interval {
            return TickOutcome::Idle;
        }
        self.timer = 0.0;

        match self.sample_paths(emitter, listener, tracer) {
            Ok(sample) => TickOutcome::Sampled(sample),
            Err(reason) => {
                self.note_skip(reason);
                TickOutcome::Skipped(reason)
            }
        }
    }

    /// Runs one sampling pass immediately and stores its result.
    pub fn sample_paths(
        &mut self,
        emitter: Vec3,
        listener: Option<Vec3>,
        tracer: &dyn RayTracer,
    ) -> Result<SoundPathSample, SkipReason> {
        self.debug_rays.clear();

        let listener = match self.check_ready(listener) {
            Ok(listener) => listener,
            Err(reason) => {
                self.sample = SoundPathSample::default();
                return Err(reason);
            }
        };

        let debug = self.desc.draw_debug.then_some(&mut self.debug_rays);
        let sample = trace_sound_paths(tracer, &mut self.rng, emitter, listener, &self.desc, debug);
        if self.desc.draw_debug && sample.rays_heard > 0 {
            self.debug_rays.extend(circle_segments(
                listener,
                self.desc.catch_radius,
                CATCH_RADIUS_SEGMENTS,
            ));
        }

        log::debug!(
            "Sound paths: heard {}/{} (avg path {:.2}m, avg bounces {:.2}, hit factor {:.2})",
            sample.rays_heard,
            sample.rays_cast,
            sample.avg_path_length,
            sample.avg_bounce_count,
            sample.object_hit_factor
        );

        self.sample = sample;
        self.warned_skip = None;
        Ok(sample)
    }

    /// Moves the filter parameters one tick toward the current estimate.
    pub fn update_filters(&mut self, dt: f32) -> &FilterParameters {
        let tuning = FilterTuning {
            min_cutoff: self.desc.min_cutoff,
            max_cutoff: self.desc.max_cutoff,
            smooth_speed: self.desc.smooth_speed,
            max_bounces: self.desc.max_bounces,
        };
        let context = self.context.current();
        self.params.update(&self.sample, &context, &tuning, dt);
        log::trace!("Filter parameters: {:?}", self.params);
        &self.params
    }

    fn check_ready(&self, listener: Option<Vec3>) -> Result<Vec3, SkipReason> {
        if self.desc.ray_count == 0 {
            return Err(SkipReason::NoRays);
        }
        if self.desc.geometry_mask.is_empty() {
            return Err(SkipReason::NoGeometryFilter);
        }
        listener.ok_or(SkipReason::NoListener)
    }

    fn note_skip(&mut self, reason: SkipReason) {
        if self.warned_skip != Some(reason) {
            log::warn!("Sound propagator skipped a pass: {}", reason);
            self.warned_skip = Some(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AcousticContext, ContextPublisher};
    use crate::debug::DebugRayKind;
    use crate::scene::{LayerMask, RayHit, SurfaceId};
    use approx::assert_relative_eq;

    struct EmptyScene;

    impl RayTracer for EmptyScene {
        fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
            None
        }
    }

    struct Sealed;

    impl RayTracer for Sealed {
        fn cast_ray(&self, origin: Vec3, direction: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
            Some(RayHit::new(1.5, origin + direction * 1.5, -direction, SurfaceId(2)))
        }

        fn is_occluded(&self, _: Vec3, _: Vec3, _: LayerMask) -> bool {
            true
        }
    }

    fn propagator(desc: PropagatorDesc) -> SoundPropagator {
        SoundPropagator::new(desc.seed(5), ContextReader::detached(AcousticContext::default()))
    }

    #[test]
    fn test_visible_listener_in_empty_scene() {
        let mut propagator = propagator(PropagatorDesc::new());
        let listener = Vec3::new(10.0, 0.0, 0.0);
        let sample = propagator
            .sample_paths(Vec3::ZERO, Some(listener), &EmptyScene)
            .unwrap();
        assert_eq!(sample.ratio_heard, 1.0);

        let params = *propagator.update_filters(0.016);
        assert_relative_eq!(params.echo_delay_ms, 10.0 / 343.0 * 1000.0, epsilon = 1e-3);
        assert!((20.0..=250.0).contains(&params.echo_delay_ms));
    }

    #[test]
    fn test_enclosed_emitter_resets_echo() {
        let mut propagator = propagator(PropagatorDesc::new());
        let sample = propagator
            .sample_paths(Vec3::ZERO, Some(Vec3::new(20.0, 0.0, 0.0)), &Sealed)
            .unwrap();
        assert_eq!(sample.ratio_heard, 0.0);

        let params = propagator.update_filters(0.016);
        assert_eq!(params.echo_delay_ms, 50.0);
        assert_eq!(params.echo_decay_ratio, 0.05);
        assert_eq!(params.echo_wet_mix, 0.0);
    }

    #[test]
    fn test_missing_listener_is_neutral() {
        let mut propagator = propagator(PropagatorDesc::new());
        propagator
            .sample_paths(Vec3::ZERO, Some(Vec3::X), &EmptyScene)
            .unwrap();
        assert_eq!(propagator.sample().ratio_heard, 1.0);

        assert_eq!(
            propagator.sample_paths(Vec3::ZERO, None, &EmptyScene),
            Err(SkipReason::NoListener)
        );
        assert_eq!(propagator.sample().ratio_heard, 0.0);
    }

    #[test]
    fn test_filters_update_every_tick_but_sample_on_interval() {
        let mut propagator = propagator(PropagatorDesc::new().check_interval(0.25));
        let listener = Some(Vec3::new(3.0, 0.0, 0.0));

        // Nothing sampled yet: ratio 0 pulls the cutoff down.
        assert_eq!(
            propagator.tick(0.1, Vec3::ZERO, listener, &EmptyScene),
            TickOutcome::Idle
        );
        let first = propagator.filter_parameters().low_pass_cutoff_hz;
        assert!(first < 22000.0);

        propagator.tick(0.1, Vec3::ZERO, listener, &EmptyScene);
        let outcome = propagator.tick(0.1, Vec3::ZERO, listener, &EmptyScene);
        assert_eq!(outcome.sampled().map(|s| s.ratio_heard), Some(1.0));

        // Fully heard: the cutoff climbs back toward the maximum.
        let before = propagator.filter_parameters().low_pass_cutoff_hz;
        propagator.tick(0.1, Vec3::ZERO, listener, &EmptyScene);
        assert!(propagator.filter_parameters().low_pass_cutoff_hz > before);
        assert_eq!(propagator.filter_parameters().echo_delay_ms, 20.0);
    }

    #[test]
    fn test_reads_shared_context() {
        let publisher = ContextPublisher::new();
        let mut propagator = SoundPropagator::new(PropagatorDesc::new().seed(1), publisher.reader());
        propagator
            .sample_paths(Vec3::ZERO, Some(Vec3::X * 5.0), &EmptyScene)
            .unwrap();

        assert_eq!(propagator.update_filters(0.016).reverb_decay_seconds, 0.5);

        publisher.publish(AcousticContext {
            muffling: 0.0,
            reverb_level: 1.0,
            outdoor_factor: 0.0,
        });
        assert_eq!(propagator.update_filters(0.016).reverb_decay_seconds, 2.5);
    }

    #[test]
    fn test_invalid_configuration_degrades() {
        let mut zero_rays = propagator(PropagatorDesc::new().ray_count(0));
        assert_eq!(
            zero_rays.tick(1.0, Vec3::ZERO, Some(Vec3::X), &EmptyScene),
            TickOutcome::Skipped(SkipReason::NoRays)
        );
        assert_eq!(zero_rays.sample().ratio_heard, 0.0);

        let mut no_mask = propagator(PropagatorDesc::new().geometry_mask(LayerMask::NONE));
        assert_eq!(
            no_mask.tick(1.0, Vec3::ZERO, Some(Vec3::X), &EmptyScene),
            TickOutcome::Skipped(SkipReason::NoGeometryFilter)
        );

        let mut no_interval = propagator(PropagatorDesc::new().check_interval(-1.0));
        assert_eq!(
            no_interval.tick(1.0, Vec3::ZERO, Some(Vec3::X), &EmptyScene),
            TickOutcome::Skipped(SkipReason::InvalidInterval)
        );
        // Filters still move every tick.
        assert!(no_interval.filter_parameters().low_pass_cutoff_hz < 22000.0);
    }

    #[test]
    fn test_debug_marks_listener_when_heard() {
        let mut propagator = propagator(PropagatorDesc::new().ray_count(3).draw_debug(true));
        propagator
            .sample_paths(Vec3::ZERO, Some(Vec3::X * 4.0), &EmptyScene)
            .unwrap();
        let markers = propagator
            .debug_rays()
            .iter()
            .filter(|r| r.kind == DebugRayKind::ListenerMarker)
            .count();
        assert_eq!(markers, CATCH_RADIUS_SEGMENTS as usize);

        propagator
            .sample_paths(Vec3::ZERO, Some(Vec3::X * 4.0), &Sealed)
            .unwrap();
        assert!(
            propagator
                .debug_rays()
                .iter()
                .all(|r| r.kind == DebugRayKind::Bounce)
        );
    }
}
