//! Delivery of filter parameters to the audio backend.

use crate::error::{EchoProbeError, Result};
use crate::propagation::FilterParameters;
use crate::world::EmitterId;
use crossbeam_channel::{Receiver, Sender};

/// Receives the filter parameters of every emitter once per tick.
pub trait FilterSink {
    fn apply(&mut self, emitter: EmitterId, params: &FilterParameters) -> Result<()>;
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FilterSink for NullSink {
    fn apply(&mut self, _emitter: EmitterId, _params: &FilterParameters) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterUpdate {
    pub emitter: EmitterId,
    pub params: FilterParameters,
}

/// Forwards updates to an audio thread over a channel.
///
/// The audio thread drains the paired [`Receiver`] and applies the latest
/// parameters for each emitter to its DSP chain.
#[derive(Debug, Clone)]
pub struct ChannelFilterSink {
    sender: Sender<FilterUpdate>,
}

impl ChannelFilterSink {
    /// Unbounded channel; the audio side should drain it every block.
    pub fn unbounded() -> (Self, Receiver<FilterUpdate>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Bounded channel; updates are dropped when the audio side falls behind.
    pub fn bounded(capacity: usize) -> (Self, Receiver<FilterUpdate>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl FilterSink for ChannelFilterSink {
    fn apply(&mut self, emitter: EmitterId, params: &FilterParameters) -> Result<()> {
        let update = FilterUpdate {
            emitter,
            params: *params,
        };
        match self.sender.try_send(update) {
            Ok(()) => Ok(()),
            Err(crossbeam_channel::TrySendError::Full(_)) => {
                log::trace!("Filter channel full, dropping update for {}", emitter);
                Ok(())
            }
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => Err(EchoProbeError::Backend(
                format!("Failed to send filter update for {}: receiver dropped", emitter),
            )),
        }
    }
}
