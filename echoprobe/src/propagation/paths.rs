//! Sound path tracing from an emitter toward the listener.

use crate::config::{CLUTTER_NORMALIZATION, PropagatorDesc, REFLECTION_EPSILON};
use crate::debug::{DebugRay, DebugRayKind};
use crate::math::{Vec3, clamp01, random_unit_vector, reflect};
use crate::scene::{RayTracer, SurfaceId};
use rand::Rng;
use std::collections::HashSet;

/// Statistics of one sampling pass of a propagator.
///
/// All averages are zero when no ray reached the listener.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoundPathSample {
    /// Fraction of rays that reached the listener, in `[0, 1]`
    pub ratio_heard: f32,
    /// Mean path length (meters) over rays that reached the listener
    pub avg_path_length: f32,
    /// Mean reflection count over rays that reached the listener
    pub avg_bounce_count: f32,
    /// Absorption estimate from surface clutter and free-path density, in `[0, 1]`
    pub object_hit_factor: f32,
    pub rays_cast: u32,
    pub rays_heard: u32,
    /// Distinct surfaces hit by any ray of the pass
    pub unique_surfaces: u32,
    /// Number of reflections across all rays of the pass
    pub bounce_segments: u32,
}

#[derive(Default)]
struct PassTotals {
    heard: u32,
    path_length: f32,
    bounces: f32,
    segment_length: f32,
    segments: u32,
    surfaces: HashSet<SurfaceId>,
}

/// Traces `desc.ray_count` random rays from `emitter`, reflecting them off
/// geometry up to `desc.max_bounces` times and testing before each reflection
/// whether the listener is in plain sight. With `max_bounces == 0` only the
/// emitter's own position is checked.
///
/// A ray's arrival is the last unobstructed view of the listener it had before
/// its walk ended (escape or bounce budget), unless
/// `desc.stop_at_first_arrival` ends the walk at the first one. Either way a
/// ray counts at most once.
pub fn trace_sound_paths<R: Rng>(
    tracer: &dyn RayTracer,
    rng: &mut R,
    emitter: Vec3,
    listener: Vec3,
    desc: &PropagatorDesc,
    mut debug: Option<&mut Vec<DebugRay>>,
) -> SoundPathSample {
    if desc.ray_count == 0 {
        return SoundPathSample::default();
    }

    let mask = desc.geometry_mask;
    let mut totals = PassTotals::default();

    for _ in 0..desc.ray_count {
        let mut direction = random_unit_vector(rng);
        let mut origin = emitter;
        let mut traveled = 0.0_f32;
        let mut bounces = 0_u32;
        let mut arrival: Option<(f32, u32)> = None;

        // One listener check per step, taken before that step's reflection.
        // The point reached by the final reflection is never checked.
        for _ in 0..desc.max_bounces.max(1) {
            if !tracer.is_occluded(origin, listener, mask) {
                let to_listener = listener - origin;
                arrival = Some((traveled + to_listener.length(), bounces));
                if let Some(rays) = debug.as_deref_mut() {
                    let kind = if bounces == 0 {
                        DebugRayKind::DirectPath
                    } else {
                        DebugRayKind::ReflectedPath
                    };
                    rays.push(DebugRay::new(origin, to_listener, kind));
                }
                if desc.stop_at_first_arrival {
                    break;
                }
            }

            if desc.max_bounces == 0 {
                break;
            }

            match tracer.cast_ray(origin, direction, desc.ray_distance, mask) {
                Some(hit) => {
                    traveled += hit.distance;
                    bounces += 1;
                    totals.surfaces.insert(hit.surface_id);
                    totals.segment_length += hit.distance;
                    totals.segments += 1;
                    if let Some(rays) = debug.as_deref_mut() {
                        rays.push(DebugRay::new(
                            origin,
                            direction * hit.distance,
                            DebugRayKind::Bounce,
                        ));
                    }

                    direction = reflect(direction, hit.normal);
                    origin = hit.point + direction * REFLECTION_EPSILON;
                }
                None => {
                    if let Some(rays) = debug.as_deref_mut() {
                        rays.push(DebugRay::new(
                            origin,
                            direction * desc.ray_distance,
                            DebugRayKind::Outdoor,
                        ));
                    }
                    break;
                }
            }
        }

        if let Some((path_length, bounce_count)) = arrival {
            totals.heard += 1;
            totals.path_length += path_length;
            totals.bounces += bounce_count as f32;
        }
    }

    summarize(&totals, desc)
}

fn summarize(totals: &PassTotals, desc: &PropagatorDesc) -> SoundPathSample {
    let (avg_path_length, avg_bounce_count) = if totals.heard > 0 {
        let heard = totals.heard as f32;
        (totals.path_length / heard, totals.bounces / heard)
    } else {
        (0.0, 0.0)
    };

    let avg_segment_length = if totals.segments > 0 {
        totals.segment_length / totals.segments as f32
    } else {
        desc.ray_distance
    };

    // More clutter and shorter free paths mean stronger absorption.
    let clutter_factor = clamp01(totals.surfaces.len() as f32 / CLUTTER_NORMALIZATION);
    let density_factor = clamp01(1.0 - avg_segment_length / desc.ray_distance);

    SoundPathSample {
        ratio_heard: totals.heard as f32 / desc.ray_count as f32,
        avg_path_length,
        avg_bounce_count,
        object_hit_factor: clamp01((clutter_factor + density_factor) * 0.5),
        rays_cast: desc.ray_count,
        rays_heard: totals.heard,
        unique_surfaces: totals.surfaces.len() as u32,
        bounce_segments: totals.segments,
    }
}
