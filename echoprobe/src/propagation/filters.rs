//! Filter parameters derived from path samples and the shared context.

use crate::config::SPEED_OF_SOUND;
use crate::context::AcousticContext;
use crate::math::{clamp01, lerp};
use crate::propagation::SoundPathSample;

pub const REVERB_DECAY_SECONDS: (f32, f32) = (0.5, 2.5);
pub const REVERB_LEVEL_DB: (f32, f32) = (-10000.0, -2000.0);
pub const REFLECTIONS_LEVEL_DB: (f32, f32) = (-10000.0, -5000.0);
pub const ECHO_DELAY_MS: (f32, f32) = (20.0, 250.0);
pub const ECHO_DECAY_RATIO: (f32, f32) = (0.05, 0.5);
pub const ECHO_WET_MIX: (f32, f32) = (0.2, 0.7);

/// Echo settings used while no ray reaches the listener.
pub const SILENT_ECHO_DELAY_MS: f32 = 50.0;
pub const SILENT_ECHO_DECAY_RATIO: f32 = 0.05;
pub const SILENT_ECHO_WET_MIX: f32 = 0.0;

/// Settings for the audio backend's low-pass, reverb and echo filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParameters {
    pub low_pass_cutoff_hz: f32,
    pub reverb_decay_seconds: f32,
    pub reverb_level_db: f32,
    pub reflections_level_db: f32,
    pub echo_delay_ms: f32,
    pub echo_decay_ratio: f32,
    pub echo_wet_mix: f32,
}

/// The propagator settings the derivation depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterTuning {
    pub min_cutoff: f32,
    pub max_cutoff: f32,
    pub smooth_speed: f32,
    pub max_bounces: u32,
}

impl FilterParameters {
    /// Fully open low-pass, no reverb, silent echo.
    pub fn new(max_cutoff: f32) -> Self {
        Self {
            low_pass_cutoff_hz: max_cutoff,
            reverb_decay_seconds: REVERB_DECAY_SECONDS.0,
            reverb_level_db: REVERB_LEVEL_DB.0,
            reflections_level_db: REFLECTIONS_LEVEL_DB.0,
            echo_delay_ms: SILENT_ECHO_DELAY_MS,
            echo_decay_ratio: SILENT_ECHO_DECAY_RATIO,
            echo_wet_mix: SILENT_ECHO_WET_MIX,
        }
    }

    /// Moves the parameters one tick toward what `sample` and `context` call for.
    ///
    /// Only the cutoff is smoothed over time; reverb and echo follow the
    /// (already smoothed) context and the last sample directly.
    pub fn update(
        &mut self,
        sample: &SoundPathSample,
        context: &AcousticContext,
        tuning: &FilterTuning,
        dt: f32,
    ) {
        let target_cutoff = lerp(tuning.max_cutoff, tuning.min_cutoff, 1.0 - sample.ratio_heard);
        self.low_pass_cutoff_hz = lerp(
            self.low_pass_cutoff_hz,
            target_cutoff,
            dt.max(0.0) * tuning.smooth_speed,
        );

        // Fewer objects mean stronger reverb.
        let absorption = 1.0 - sample.object_hit_factor;
        let indoor_factor = context.indoor_factor();
        let ambience = context.reverb_level * indoor_factor * absorption;

        self.reverb_decay_seconds = lerp(REVERB_DECAY_SECONDS.0, REVERB_DECAY_SECONDS.1, ambience);
        self.reverb_level_db = lerp(REVERB_LEVEL_DB.0, REVERB_LEVEL_DB.1, ambience);
        self.reflections_level_db = lerp(REFLECTIONS_LEVEL_DB.0, REFLECTIONS_LEVEL_DB.1, ambience);

        if sample.avg_path_length > 0.0 {
            let delay_ms = sample.avg_path_length / SPEED_OF_SOUND * 1000.0;
            let bounce_ratio = if tuning.max_bounces > 0 {
                clamp01(sample.avg_bounce_count / tuning.max_bounces as f32)
            } else {
                0.0
            };

            self.echo_delay_ms = delay_ms.clamp(ECHO_DELAY_MS.0, ECHO_DELAY_MS.1);
            self.echo_decay_ratio =
                (bounce_ratio * absorption).clamp(ECHO_DECAY_RATIO.0, ECHO_DECAY_RATIO.1);
            self.echo_wet_mix = lerp(ECHO_WET_MIX.0, ECHO_WET_MIX.1, indoor_factor * absorption);
        } else {
            self.echo_delay_ms = SILENT_ECHO_DELAY_MS;
            self.echo_decay_ratio = SILENT_ECHO_DECAY_RATIO;
            self.echo_wet_mix = SILENT_ECHO_WET_MIX;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tuning() -> FilterTuning {
        FilterTuning {
            min_cutoff: 800.0,
            max_cutoff: 22000.0,
            smooth_speed: 5.0,
            max_bounces: 3,
        }
    }

    fn heard(ratio: f32, path: f32, bounces: f32, hit_factor: f32) -> SoundPathSample {
        SoundPathSample {
            ratio_heard: ratio,
            avg_path_length: path,
            avg_bounce_count: bounces,
            object_hit_factor: hit_factor,
            ..Default::default()
        }
    }

    #[test]
    fn test_cutoff_approaches_target_exponentially() {
        let mut params = FilterParameters::new(22000.0);
        let silent = SoundPathSample::default();
        let context = AcousticContext::default();

        params.update(&silent, &context, &tuning(), 0.1);
        // Halfway from 22000 toward 800.
        assert_relative_eq!(params.low_pass_cutoff_hz, 11400.0, epsilon = 1e-2);

        for _ in 0..200 {
            params.update(&silent, &context, &tuning(), 0.016);
        }
        assert_relative_eq!(params.low_pass_cutoff_hz, 800.0, epsilon = 1.0);
    }

    #[test]
    fn test_large_dt_does_not_overshoot() {
        let mut params = FilterParameters::new(22000.0);
        params.update(&SoundPathSample::default(), &AcousticContext::default(), &tuning(), 10.0);
        assert_eq!(params.low_pass_cutoff_hz, 800.0);
    }

    #[test]
    fn test_reverb_follows_context() {
        let mut params = FilterParameters::new(22000.0);
        let indoor = AcousticContext {
            muffling: 0.0,
            reverb_level: 1.0,
            outdoor_factor: 0.0,
        };
        params.update(&heard(1.0, 10.0, 0.0, 0.0), &indoor, &tuning(), 0.016);
        assert_relative_eq!(params.reverb_decay_seconds, 2.5);
        assert_relative_eq!(params.reverb_level_db, -2000.0);
        assert_relative_eq!(params.reflections_level_db, -5000.0);
        assert_relative_eq!(params.echo_wet_mix, 0.7);

        let outdoor = AcousticContext {
            outdoor_factor: 1.0,
            ..indoor
        };
        params.update(&heard(1.0, 10.0, 0.0, 0.0), &outdoor, &tuning(), 0.016);
        assert_relative_eq!(params.reverb_decay_seconds, 0.5);
        assert_relative_eq!(params.reverb_level_db, -10000.0);
        assert_relative_eq!(params.echo_wet_mix, 0.2);
    }

    #[test]
    fn test_echo_delay_from_path_length() {
        let mut params = FilterParameters::new(22000.0);
        let context = AcousticContext::default();

        params.update(&heard(1.0, 10.0, 0.0, 0.0), &context, &tuning(), 0.016);
        assert_relative_eq!(params.echo_delay_ms, 10.0 / 343.0 * 1000.0, epsilon = 1e-3);

        params.update(&heard(1.0, 3.0, 0.0, 0.0), &context, &tuning(), 0.016);
        assert_eq!(params.echo_delay_ms, 20.0);

        params.update(&heard(1.0, 500.0, 0.0, 0.0), &context, &tuning(), 0.016);
        assert_eq!(params.echo_delay_ms, 250.0);
    }

    #[test]
    fn test_echo_decay_from_bounces() {
        let mut params = FilterParameters::new(22000.0);
        let context = AcousticContext::default();

        params.update(&heard(0.5, 20.0, 3.0, 0.0), &context, &tuning(), 0.016);
        assert_eq!(params.echo_decay_ratio, 0.5);

        params.update(&heard(0.5, 20.0, 0.6, 0.0), &context, &tuning(), 0.016);
        assert_relative_eq!(params.echo_decay_ratio, 0.2, epsilon = 1e-6);

        params.update(&heard(0.5, 20.0, 0.0, 0.0), &context, &tuning(), 0.016);
        assert_eq!(params.echo_decay_ratio, 0.05);
    }

    #[test]
    fn test_silence_resets_echo() {
        let mut params = FilterParameters::new(22000.0);
        let context = AcousticContext::default();
        params.update(&heard(1.0, 40.0, 2.0, 0.1), &context, &tuning(), 0.016);
        assert!(params.echo_wet_mix > 0.0);

        params.update(&SoundPathSample::default(), &context, &tuning(), 0.016);
        assert_eq!(params.echo_delay_ms, 50.0);
        assert_eq!(params.echo_decay_ratio, 0.05);
        assert_eq!(params.echo_wet_mix, 0.0);
    }

    #[test]
    fn test_outputs_stay_in_range() {
        let contexts = [
            AcousticContext::default(),
            AcousticContext {
                muffling: 1.0,
                reverb_level: 1.0,
                outdoor_factor: 0.0,
            },
            AcousticContext {
                muffling: 0.3,
                reverb_level: 0.7,
                outdoor_factor: 0.5,
            },
        ];
        let samples = [
            heard(0.0, 0.0, 0.0, 0.0),
            heard(1.0, 0.01, 0.0, 1.0),
            heard(0.3, 1.0e6, 3.0, 0.2),
            heard(0.7, 45.0, 1.5, 0.6),
        ];
        let mut params = FilterParameters::new(22000.0);
        for context in &contexts {
            for sample in &samples {
                params.update(sample, context, &tuning(), 0.016);
                assert!((20.0..=250.0).contains(&params.echo_delay_ms) || params.echo_delay_ms == 50.0);
                assert!((0.05..=0.5).contains(&params.echo_decay_ratio));
                assert!((0.5..=2.5).contains(&params.reverb_decay_seconds));
                assert!((800.0..=22000.0).contains(&params.low_pass_cutoff_hz));
            }
        }
    }

    #[test]
    fn test_zero_bounce_budget_does_not_divide_by_zero() {
        let mut params = FilterParameters::new(22000.0);
        let tuning = FilterTuning {
            max_bounces: 0,
            ..tuning()
        };
        params.update(&heard(1.0, 10.0, 0.0, 0.0), &AcousticContext::default(), &tuning, 0.016);
        assert_eq!(params.echo_decay_ratio, 0.05);
    }
}
