//! Debug ray capture.
//!
//! When `draw_debug` is enabled on a probe or propagator, each sampling pass
//! records the segments it traced. Hosts draw them however they like; the
//! library only produces geometry.

use crate::math::Vec3;

/// What a recorded segment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugRayKind {
    /// Probe ray that hit geometry
    Blocked,
    /// Probe ray that reached open space
    Escaped,
    /// Unobstructed segment from the emitter straight to the listener
    DirectPath,
    /// Unobstructed segment from a reflection point to the listener
    ReflectedPath,
    /// Sound ray segment ending on a surface
    Bounce,
    /// Sound ray segment that left the scene
    Outdoor,
    /// Segment of the listener catch-radius marker
    ListenerMarker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugRay {
    pub origin: Vec3,
    /// Not normalized: `origin + direction` is the segment end.
    pub direction: Vec3,
    pub kind: DebugRayKind,
}

impl DebugRay {
    pub fn new(origin: Vec3, direction: Vec3, kind: DebugRayKind) -> Self {
        Self {
            origin,
            direction,
            kind,
        }
    }

    pub fn end(&self) -> Vec3 {
        self.origin + self.direction
    }
}

/// Horizontal ring of `segments` line segments around `center`.
pub fn circle_segments(center: Vec3, radius: f32, segments: u32) -> Vec<DebugRay> {
    let segments = segments.max(3);
    let step = std::f32::consts::TAU / segments as f32;
    let point = |i: u32| {
        let angle = step * i as f32;
        center + Vec3::new(angle.sin(), 0.0, angle.cos()) * radius
    };

    (0..segments)
        .map(|i| {
            let start = point(i);
            DebugRay::new(start, point(i + 1) - start, DebugRayKind::ListenerMarker)
        })
        .collect()
}
