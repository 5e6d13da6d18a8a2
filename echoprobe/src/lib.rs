//! # EchoProbe
//!
//! Engine-agnostic estimation of environmental acoustics by ray casting.
//!
//! EchoProbe turns scene geometry into settings for an audio backend's
//! low-pass, reverb and echo filters. It never renders audio itself: the host
//! supplies ray queries through [`RayTracer`](scene::RayTracer) and applies
//! the resulting [`FilterParameters`] however its audio pipeline likes.
//!
//! ## Quick Start
//!
//! ```
//! use echoprobe::*;
//! use echoprobe::scene::SceneGeometry;
//!
//! // A 12m x 4m x 12m room, seen from inside.
//! let mut scene = SceneGeometry::new();
//! scene.add_box(Vec3::new(-6.0, 0.0, -6.0), Vec3::new(6.0, 4.0, 6.0), 0);
//!
//! let mut world = EchoProbeWorld::new(EchoProbeWorldDesc {
//!     probe_position: Vec3::new(0.0, 2.0, 0.0),
//!     ..Default::default()
//! });
//! world.set_listener_position(Vec3::new(2.0, 1.7, 0.0));
//! let source = world.add_emitter(Vec3::new(-3.0, 1.0, 2.0), PropagatorDesc::default())?;
//!
//! // Filter updates go to the audio thread over a channel.
//! let (mut sink, updates) = ChannelFilterSink::unbounded();
//! for _ in 0..30 {
//!     world.tick(1.0 / 30.0, &scene, &mut sink);
//! }
//!
//! for update in updates.try_iter() {
//!     assert_eq!(update.emitter, source);
//! }
//! for event in world.poll_events() {
//!     if let EchoProbeEvent::ContextUpdated { context } = event {
//!         assert!(context.muffling > 0.0);
//!     }
//! }
//! # Ok::<(), EchoProbeError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`EnvironmentProbe`]**: Samples the space around a fixed point into a smoothed [`AcousticContext`]
//! - **[`SoundPropagator`]**: Traces reflected sound paths from one emitter toward the listener
//! - **[`FilterParameters`]**: Cutoff, reverb and echo settings derived every tick
//! - **[`EchoProbeWorld`]**: Owns the probe, the listener and all emitters; ticks them in order
//! - **[`FilterSink`]**: Where per-tick parameters are delivered
//!
//! ## Data Flow
//!
//! Probe → shared context → propagators → filter parameters → audio backend.
//! The context has a single writer (the probe) and any number of readers; each
//! propagator owns its own sample and smoothing state.

pub mod config;
pub mod context;
pub mod debug;
pub mod error;
pub mod events;
pub mod math;
pub mod probe;
pub mod propagation;
pub mod scene;
pub mod sink;
pub mod world;

pub use config::{EchoProbeWorldDesc, ProbeDesc, PropagatorDesc};
pub use context::{AcousticContext, ContextPublisher, ContextReader};
pub use error::EchoProbeError;
pub use events::{EchoProbeEvent, SkipReason, TickOutcome};
pub use math::Vec3;
pub use probe::{EnvironmentProbe, ProbeSample};
pub use propagation::{FilterParameters, SoundPathSample, SoundPropagator};
pub use sink::{ChannelFilterSink, FilterSink, FilterUpdate, NullSink};
pub use world::{EchoProbeWorld, EmitterId};
