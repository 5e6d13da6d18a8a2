//! Geometry access for the acoustic estimators.

mod geometry;
mod ray_tracer;

pub use geometry::{Collider, SceneGeometry, Shape};
pub use ray_tracer::{LayerMask, RayHit, RayTracer, SurfaceId};
