//! Published acoustic context.
//!
//! The environment probe is the only writer of the [`AcousticContext`]; every
//! propagator reads it once per tick. Instead of a process-wide static, the
//! context lives behind a [`ContextPublisher`] (owned by the probe, not
//! `Clone`) and any number of [`ContextReader`] handles (handed to propagators
//! at construction).
//!
//! Writes replace the whole snapshot under a write lock, so readers never see
//! a half-updated context even when the world is ticked from another thread.

use std::sync::{Arc, PoisonError, RwLock};

/// Smoothed description of the space around the probe.
///
/// Each field is an exponential moving average of its per-pass sample and
/// starts at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AcousticContext {
    /// 0 clear, 1 fully blocked
    pub muffling: f32,
    /// Baseline reflectivity (complement of the raw muffling)
    pub reverb_level: f32,
    /// Fraction of probe rays that escaped to open space
    pub outdoor_factor: f32,
}

impl AcousticContext {
    /// Indoor weight used by the filter derivation.
    pub fn indoor_factor(&self) -> f32 {
        1.0 - self.outdoor_factor
    }
}

/// Single writer of the shared context.
#[derive(Debug)]
pub struct ContextPublisher {
    shared: Arc<RwLock<AcousticContext>>,
}

impl ContextPublisher {
    pub fn new() -> Self {
        Self::with_initial(AcousticContext::default())
    }

    /// Starts from a known context, e.g. one restored from a save.
    pub fn with_initial(context: AcousticContext) -> Self {
        Self {
            shared: Arc::new(RwLock::new(context)),
        }
    }

    /// Atomically replaces the published snapshot.
    pub fn publish(&self, context: AcousticContext) {
        // The snapshot is plain data, so a poisoned lock still holds a usable value.
        *self.shared.write().unwrap_or_else(PoisonError::into_inner) = context;
    }

    /// Returns the last published snapshot.
    pub fn current(&self) -> AcousticContext {
        *self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a read-only handle to the published context.
    pub fn reader(&self) -> ContextReader {
        ContextReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for ContextPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle to the shared context.
#[derive(Debug, Clone)]
pub struct ContextReader {
    shared: Arc<RwLock<AcousticContext>>,
}

impl ContextReader {
    /// Reader over a fixed context with no publisher (useful for tests and tools).
    pub fn detached(context: AcousticContext) -> Self {
        Self {
            shared: Arc::new(RwLock::new(context)),
        }
    }

    pub fn current(&self) -> AcousticContext {
        *self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_context_is_zero() {
        let publisher = ContextPublisher::new();
        assert_eq!(publisher.current(), AcousticContext::default());
        assert_eq!(publisher.reader().current().muffling, 0.0);
    }

    #[test]
    fn test_initial_snapshot_reaches_readers() {
        let indoors = AcousticContext {
            muffling: 0.9,
            reverb_level: 0.1,
            outdoor_factor: 0.0,
        };
        let publisher = ContextPublisher::with_initial(indoors);
        let reader = publisher.reader();
        assert_eq!(reader.current(), indoors);

        publisher.publish(AcousticContext::default());
        assert_eq!(reader.current(), AcousticContext::default());
    }

    #[test]
    fn test_readers_see_published_snapshot() {
        let publisher = ContextPublisher::new();
        let a = publisher.reader();
        let b = a.clone();

        let context = AcousticContext {
            muffling: 0.4,
            reverb_level: 0.6,
            outdoor_factor: 0.25,
        };
        publisher.publish(context);

        assert_eq!(a.current(), context);
        assert_eq!(b.current(), context);
        assert_eq!(context.indoor_factor(), 0.75);
    }

    #[test]
    fn test_reader_across_threads() {
        let publisher = ContextPublisher::new();
        let reader = publisher.reader();
        publisher.publish(AcousticContext {
            muffling: 1.0,
            ..Default::default()
        });

        let seen = std::thread::spawn(move || reader.current().muffling)
            .join()
            .unwrap();
        assert_eq!(seen, 1.0);
    }
}
