//! Ray query interface between the acoustic estimators and the host's geometry.
//!
//! The probe and the propagators never touch scene data directly. Everything
//! they learn about the world comes through [`RayTracer`], so any physics
//! engine, BVH or analytic scene can back them.

use crate::math::Vec3;

/// Bit set of geometry layers a query is allowed to hit.
///
/// [`LayerMask::NONE`] is treated as "no geometry filter configured"; the
/// estimators skip their sampling pass rather than trace against nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Mask containing the single layer `layer` (0..32).
    pub const fn layer(layer: u8) -> Self {
        Self(1 << (layer as u32 % 32))
    }

    pub fn contains(self, layer: u8) -> bool {
        self.0 & Self::layer(layer).0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Identifier of the surface (collider) a ray hit.
///
/// Used to count distinct objects encountered during a sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

/// Closest intersection returned by [`RayTracer::cast_ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from ray origin to hit point (in meters)
    pub distance: f32,

    /// World-space hit point
    pub point: Vec3,

    /// Surface normal at the hit point (normalized, facing the incoming ray)
    pub normal: Vec3,

    /// Surface that was hit
    pub surface_id: SurfaceId,
}

impl RayHit {
    pub fn new(distance: f32, point: Vec3, normal: Vec3, surface_id: SurfaceId) -> Self {
        Self {
            distance,
            point,
            normal,
            surface_id,
        }
    }
}

/// Geometry queries consumed by the acoustic estimators.
///
/// Implement this trait to plug a physics engine or custom acceleration
/// structure into EchoProbe.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so hosts can run sampling passes from
/// whichever thread owns the world.
///
/// # Performance
///
/// One propagator sampling pass issues up to
/// `ray_count * (2 * max_bounces + 1)` queries. Keep them cheap.
///
/// # Example
///
/// ```
/// use echoprobe::math::Vec3;
/// use echoprobe::scene::{LayerMask, RayHit, RayTracer, SurfaceId};
///
/// /// Infinite floor at y = 0.
/// struct Floor;
///
/// impl RayTracer for Floor {
///     fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, _filter: LayerMask)
///         -> Option<RayHit> {
///         if direction.y >= 0.0 {
///             return None;
///         }
///         let t = -origin.y / direction.y;
///         (t >= 0.0 && t <= max_distance)
///             .then(|| RayHit::new(t, origin + direction * t, Vec3::Y, SurfaceId(0)))
///     }
/// }
///
/// let hit = Floor.cast_ray(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 10.0, LayerMask::ALL);
/// assert_eq!(hit.map(|h| h.distance), Some(2.0));
/// ```
pub trait RayTracer: Send + Sync {
    /// Finds the closest hit along a ray.
    ///
    /// # Parameters
    ///
    /// * `origin` - Ray starting position in world space (meters)
    /// * `direction` - Ray direction (normalized)
    /// * `max_distance` - Maximum ray distance to test (meters)
    /// * `filter` - Layers the ray may hit
    ///
    /// # Notes
    ///
    /// - If multiple surfaces are hit, return the **closest** one
    /// - The normal should face the side the ray came from
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: LayerMask,
    ) -> Option<RayHit>;

    /// Returns true if geometry blocks the straight segment `from -> to`.
    ///
    /// The default implementation casts a single ray limited to the segment
    /// length. Override it when the backend has a cheaper any-hit query.
    fn is_occluded(&self, from: Vec3, to: Vec3, filter: LayerMask) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return false;
        }
        self.cast_ray(from, delta / distance, distance, filter)
            .is_some()
    }
}
