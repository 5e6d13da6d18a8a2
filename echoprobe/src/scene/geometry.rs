//! Analytic reference geometry.
//!
//! [`SceneGeometry`] is a small brute-force [`RayTracer`] over boxes and
//! spheres. It is what the demo and the integration tests trace against, and
//! a reasonable backend for tools that have no physics engine of their own.
//!
//! Colliders are surfaces, not solids: a ray that starts inside a box or a
//! sphere hits its inner wall. A box therefore doubles as a room.

use crate::math::Vec3;
use crate::scene::ray_tracer::{LayerMask, RayHit, RayTracer, SurfaceId};

const PARALLEL_EPSILON: f32 = 1e-8;

/// Hit points closer than this to a second wall of a box are treated as edge hits.
/// Must exceed the distance reflected rays are pushed off a surface.
const EDGE_TOLERANCE: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box spanning `min..max`.
    Box { min: Vec3, max: Vec3 },
    Sphere { center: Vec3, radius: f32 },
}

impl Shape {
    /// Returns `(distance, normal)` of the closest intersection in front of the origin.
    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        match *self {
            Shape::Box { min, max } => intersect_box(min, max, origin, direction),
            Shape::Sphere { center, radius } => {
                intersect_sphere(center, radius, origin, direction)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    pub surface_id: SurfaceId,
    pub layer: u8,
}

#[derive(Debug, Clone, Default)]
pub struct SceneGeometry {
    colliders: Vec<Collider>,
}

impl SceneGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an axis-aligned box on `layer` and returns its surface id.
    pub fn add_box(&mut self, min: Vec3, max: Vec3, layer: u8) -> SurfaceId {
        let shape = Shape::Box {
            min: min.min(max),
            max: min.max(max),
        };
        self.add(shape, layer)
    }

    /// Adds a sphere on `layer` and returns its surface id.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, layer: u8) -> SurfaceId {
        let shape = Shape::Sphere {
            center,
            radius: radius.abs(),
        };
        self.add(shape, layer)
    }

    fn add(&mut self, shape: Shape, layer: u8) -> SurfaceId {
        let surface_id = SurfaceId(self.colliders.len() as u32);
        self.colliders.push(Collider {
            shape,
            surface_id,
            layer,
        });
        surface_id
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl RayTracer for SceneGeometry {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.colliders
            .iter()
            .filter(|collider| filter.contains(collider.layer))
            .filter_map(|collider| {
                let (distance, normal) = collider.shape.intersect(origin, direction)?;
                (distance <= max_distance).then(|| {
                    RayHit::new(
                        distance,
                        origin + direction * distance,
                        normal,
                        collider.surface_id,
                    )
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Slab test. From outside, the entry face is hit; from inside, the exit face.
/// In both cases the normal opposes the ray along the hit axis.
fn intersect_box(min: Vec3, max: Vec3, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut near_axis = 0;
    let mut far_axis = 0;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < PARALLEL_EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (lo, hi) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if lo > t_near {
            t_near = lo;
            near_axis = axis;
        }
        if hi < t_far {
            t_far = hi;
            far_axis = axis;
        }
    }

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    if t_near >= 0.0 {
        let mut normal = Vec3::ZERO;
        normal[near_axis] = -direction[near_axis].signum();
        return Some((t_near, normal));
    }

    // Inside: every wall the hit point is about to cross contributes to the
    // normal, so reflections off edges and corners turn back into the box.
    let point = origin + direction * t_far;
    let mut normal = Vec3::ZERO;
    normal[far_axis] = -direction[far_axis].signum();
    for axis in 0..3 {
        let d = direction[axis];
        let gap = if d > 0.0 {
            max[axis] - point[axis]
        } else {
            point[axis] - min[axis]
        };
        if d.abs() >= PARALLEL_EPSILON && gap < EDGE_TOLERANCE {
            normal[axis] = -d.signum();
        }
    }
    Some((t_far, normal.normalize()))
}

fn intersect_sphere(
    center: Vec3,
    radius: f32,
    origin: Vec3,
    direction: Vec3,
) -> Option<(f32, Vec3)> {
    let oc = origin - center;
    let b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    let far = -b + sqrt_d;

    if near >= 0.0 {
        let point = origin + direction * near;
        Some((near, (point - center) / radius))
    } else if far >= 0.0 {
        // Inside the sphere: inner wall, normal points back toward the center.
        let point = origin + direction * far;
        Some((far, (center - point) / radius))
    } else {
        None
    }
}
