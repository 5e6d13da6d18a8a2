use crate::config::{EchoProbeWorldDesc, PropagatorDesc};
use crate::context::AcousticContext;
use crate::error::{EchoProbeError, Result};
use crate::events::{EchoProbeEvent, SkipReason, TickOutcome};
use crate::math::Vec3;
use crate::probe::EnvironmentProbe;
use crate::propagation::{FilterParameters, SoundPathSample, SoundPropagator};
use crate::scene::RayTracer;
use crate::sink::FilterSink;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::collections::BTreeMap;

/// Lightweight, type-safe handle for sound emitters.
///
/// Returned by [`EchoProbeWorld::add_emitter`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(u64);

impl EmitterId {
    /// Wraps a raw id, for hosts that mirror ids across a channel.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmitterId({})", self.0)
    }
}

struct Emitter {
    position: Vec3,
    propagator: SoundPropagator,
    last_skip: Option<SkipReason>,
}

/// Owns the environment probe, the listener and every emitter's propagator.
///
/// The host calls [`tick`](Self::tick) once per frame with the elapsed time.
/// The probe runs first so propagators read the freshest context, then each
/// propagator samples (on its own interval) and hands its filter parameters
/// to the [`FilterSink`].
///
/// # Example
///
/// ```
/// use echoprobe::*;
/// use echoprobe::scene::SceneGeometry;
///
/// let mut scene = SceneGeometry::new();
/// scene.add_box(Vec3::splat(-10.0), Vec3::splat(10.0), 0);
///
/// let mut world = EchoProbeWorld::new(EchoProbeWorldDesc::default());
/// world.set_listener_position(Vec3::new(3.0, 0.0, 0.0));
/// let radio = world.add_emitter(Vec3::new(-3.0, 0.0, 0.0), PropagatorDesc::default())?;
///
/// let mut sink = NullSink;
/// for _ in 0..60 {
///     world.tick(1.0 / 60.0, &scene, &mut sink);
/// }
/// let params = world.filter_parameters(radio).unwrap();
/// assert!(params.low_pass_cutoff_hz > 800.0);
/// # Ok::<(), EchoProbeError>(())
/// ```
pub struct EchoProbeWorld {
    desc: EchoProbeWorldDesc,
    probe: EnvironmentProbe,
    probe_skip: Option<SkipReason>,
    listener: Option<Vec3>,
    emitters: BTreeMap<EmitterId, Emitter>,
    next_emitter_id: u64,
    event_sender: Sender<EchoProbeEvent>,
    event_receiver: Receiver<EchoProbeEvent>,
}

impl EchoProbeWorld {
    pub fn new(desc: EchoProbeWorldDesc) -> Self {
        if let Err(e) = desc.probe.validate() {
            log::warn!("Environment probe created with questionable settings: {}", e);
        }
        let probe = EnvironmentProbe::new(desc.probe.clone(), desc.probe_position);
        let (event_sender, event_receiver) = crossbeam_channel::bounded(desc.event_capacity);
        Self {
            desc,
            probe,
            probe_skip: None,
            listener: None,
            emitters: BTreeMap::new(),
            next_emitter_id: 0,
            event_sender,
            event_receiver,
        }
    }

    /// Registers an emitter and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns an error once `max_emitters` emitters are registered.
    pub fn add_emitter(&mut self, position: Vec3, desc: PropagatorDesc) -> Result<EmitterId> {
        if self.emitters.len() >= self.desc.max_emitters {
            return Err(EchoProbeError::EmitterLimit(self.desc.max_emitters));
        }
        if let Err(e) = desc.validate() {
            log::warn!("Emitter registered with questionable settings: {}", e);
        }

        let id = EmitterId(self.next_emitter_id);
        self.next_emitter_id += 1;

        let propagator = SoundPropagator::new(desc, self.probe.reader());
        self.emitters.insert(
            id,
            Emitter {
                position,
                propagator,
                last_skip: None,
            },
        );
        log::debug!("Added {} at {:?}", id, position);
        Ok(id)
    }

    /// Removes an emitter. Returns false if it did not exist.
    pub fn remove_emitter(&mut self, id: EmitterId) -> bool {
        let removed = self.emitters.remove(&id).is_some();
        if removed {
            log::debug!("Removed {}", id);
        }
        removed
    }

    pub fn contains_emitter(&self, id: EmitterId) -> bool {
        self.emitters.contains_key(&id)
    }

    pub fn emitter_ids(&self) -> Vec<EmitterId> {
        self.emitters.keys().copied().collect()
    }

    pub fn set_emitter_position(&mut self, id: EmitterId, position: Vec3) -> Result<()> {
        let emitter = self
            .emitters
            .get_mut(&id)
            .ok_or(EchoProbeError::UnknownEmitter(id))?;
        emitter.position = position;
        Ok(())
    }

    pub fn emitter_position(&self, id: EmitterId) -> Option<Vec3> {
        self.emitters.get(&id).map(|e| e.position)
    }

    pub fn set_listener_position(&mut self, position: Vec3) {
        self.listener = Some(position);
    }

    /// Removes the listener. Propagators report nothing heard until one is set again.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn listener_position(&self) -> Option<Vec3> {
        self.listener
    }

    pub fn set_probe_position(&mut self, position: Vec3) {
        self.probe.set_position(position);
    }

    pub fn probe(&self) -> &EnvironmentProbe {
        &self.probe
    }

    pub fn context(&self) -> AcousticContext {
        self.probe.context()
    }

    pub fn propagator(&self, id: EmitterId) -> Option<&SoundPropagator> {
        self.emitters.get(&id).map(|e| &e.propagator)
    }

    pub fn filter_parameters(&self, id: EmitterId) -> Option<&FilterParameters> {
        self.propagator(id).map(SoundPropagator::filter_parameters)
    }

    pub fn path_sample(&self, id: EmitterId) -> Option<&SoundPathSample> {
        self.propagator(id).map(SoundPropagator::sample)
    }

    /// Advances the probe and every propagator by `dt` seconds.
    ///
    /// Sink failures are logged and do not interrupt the tick.
    pub fn tick(&mut self, dt: f32, tracer: &dyn RayTracer, sink: &mut dyn FilterSink) {
        match self.probe.tick(dt, tracer) {
            TickOutcome::Idle => {}
            TickOutcome::Sampled(context) => {
                self.probe_skip = None;
                push_event(&self.event_sender, EchoProbeEvent::ContextUpdated { context });
            }
            TickOutcome::Skipped(reason) => {
                if self.probe_skip.replace(reason) != Some(reason) {
                    push_event(
                        &self.event_sender,
                        EchoProbeEvent::SampleSkipped {
                            emitter: None,
                            reason,
                        },
                    );
                }
            }
        }

        for (&id, emitter) in self.emitters.iter_mut() {
            let outcome = emitter
                .propagator
                .tick(dt, emitter.position, self.listener, tracer);
            match outcome {
                TickOutcome::Idle => {}
                TickOutcome::Sampled(sample) => {
                    emitter.last_skip = None;
                    push_event(
                        &self.event_sender,
                        EchoProbeEvent::PathSampled {
                            emitter: id,
                            sample,
                        },
                    );
                }
                // Reported once until the emitter samples again.
                TickOutcome::Skipped(reason) => {
                    if emitter.last_skip.replace(reason) != Some(reason) {
                        push_event(
                            &self.event_sender,
                            EchoProbeEvent::SampleSkipped {
                                emitter: Some(id),
                                reason,
                            },
                        );
                    }
                }
            }

            if let Err(e) = sink.apply(id, emitter.propagator.filter_parameters()) {
                log::warn!("Filter update for {} not delivered: {}", id, e);
            }
        }
    }

    /// Drains the events queued since the last poll.
    pub fn poll_events(&self) -> Vec<EchoProbeEvent> {
        self.event_receiver.try_iter().collect()
    }
}

fn push_event(sender: &Sender<EchoProbeEvent>, event: EchoProbeEvent) {
    if let Err(TrySendError::Full(event)) = sender.try_send(event) {
        log::trace!("Event queue full, dropping {:?}", event);
    }
}
