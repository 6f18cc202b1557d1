//! The small set of seams between the signal path and whatever hosts it.
//!
//! The engine only ever sees a [`ParameterSource`] and explicit lifecycle calls, so it
//! can be driven by the `nih_plug` wrapper, by tests, or by any other host glue.

use crate::audio::constants::{clamp_gain_db, GAIN_DEFAULT_DB};
use atomic_float::AtomicF32;
use std::sync::{atomic::Ordering, Arc};

/// Processes one block of audio in place. Called from the audio thread.
pub trait BlockProcessor {
    /// `channels` holds one slice per channel, all of the same length.
    /// Must not allocate, lock or block.
    fn process_block(&mut self, channels: &mut [&mut [f32]]);
}

/// A live gain value in decibels that may be written from another thread.
pub trait ParameterSource {
    /// Current gain in dB. Read once per block by the audio thread.
    fn gain_db(&self) -> f32;
}

/// Host lifecycle notifications.
pub trait LifecycleHandler {
    /// Called before the first block and whenever the sample rate or maximum block size changes.
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize);

    /// Clears running state without changing the processing setup. May be called from the audio
    /// thread.
    fn reset(&mut self);
}

impl<T: ParameterSource + ?Sized> ParameterSource for Arc<T> {
    fn gain_db(&self) -> f32 {
        (**self).gain_db()
    }
}

impl<T: ParameterSource + ?Sized> ParameterSource for &T {
    fn gain_db(&self) -> f32 {
        (**self).gain_db()
    }
}

/// Standalone gain parameter: a single atomic cell, clamped to the declared range on write.
#[derive(Debug)]
pub struct GainCell {
    gain_db: AtomicF32,
}

impl GainCell {
    pub fn new(gain_db: f32) -> Self {
        Self {
            gain_db: AtomicF32::new(clamp_gain_db(gain_db)),
        }
    }

    /// Set the latest value. Called from the control thread.
    pub fn set_db(&self, gain_db: f32) {
        self.gain_db.store(clamp_gain_db(gain_db), Ordering::Relaxed);
    }
}

impl Default for GainCell {
    fn default() -> Self {
        Self::new(GAIN_DEFAULT_DB)
    }
}

impl ParameterSource for GainCell {
    fn gain_db(&self) -> f32 {
        self.gain_db.load(Ordering::Relaxed)
    }
}
