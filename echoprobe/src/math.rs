//! Math types and scalar helpers for EchoProbe

pub use glam::Vec3;

use rand::Rng;
use std::f32::consts::TAU;

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Reflects `direction` about a surface with the given (normalized) `normal`.
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Uniformly distributed direction on the unit sphere.
///
/// Samples `z` uniformly in `[-1, 1]` and the azimuth uniformly in `[0, 2π)`,
/// which yields an area-uniform distribution (Archimedes' hat-box theorem).
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let phi: f32 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}
