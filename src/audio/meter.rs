use crate::audio::constants::{
    METER_CHANNELS, METER_FLOOR_DB, METER_FLOOR_GAIN, RMS_SMOOTHING_SECONDS,
};
use crate::audio::smoother::LinearSmoother;
use atomic_float::AtomicF32;
use nih_plug::prelude::*;
use std::sync::{atomic::Ordering, Arc};

/// Returned by [`MeterConsumer::get_level`] for channels that are not metered
pub const INVALID_CHANNEL_LEVEL: f32 = 0.0;

/// Smoothed RMS levels published from the audio thread, one per metered channel
type PublishedLevels = [AtomicF32; METER_CHANNELS];

/// Audio thread side of the level meter.
/// Owns the smoothing state and is the only writer of the published levels.
pub struct MeterProducer {
    smoothers: [LinearSmoother; METER_CHANNELS],
    levels: Arc<PublishedLevels>,
}

impl MeterProducer {
    /// Recompute the smoothing ramp for `sample_rate` and drop back to silence
    pub fn prepare(&mut self, sample_rate: f32) {
        for smoother in self.smoothers.iter_mut() {
            smoother.reset(sample_rate, RMS_SMOOTHING_SECONDS);
        }
        self.reset();
    }

    /// Drop both channels back to silence, keeping the current ramp length
    pub fn reset(&mut self) {
        for (smoother, level) in self.smoothers.iter_mut().zip(self.levels.iter()) {
            smoother.set_current_and_target(METER_FLOOR_DB);
            level.store(METER_FLOOR_DB, Ordering::Relaxed);
        }
    }

    /// Meter one block that has already been through the gain stage.
    /// A single channel block feeds both meters. Must be real-time safe.
    pub fn update(&mut self, channels: &[&mut [f32]]) {
        let num_samples = match channels.first() {
            Some(channel) => channel.len(),
            None => 0,
        };

        for (channel_idx, smoother) in self.smoothers.iter_mut().enumerate() {
            smoother.skip(num_samples);

            let level_db = match channels.get(channel_idx).or(channels.first()) {
                Some(samples) => rms_to_db(calculate_rms(samples)),
                None => METER_FLOOR_DB,
            };

            // Falling levels decay over the smoothing time, anything else is shown at once
            if level_db < smoother.next_value() {
                smoother.set_target(level_db);
            } else {
                smoother.set_current_and_target(level_db);
            }

            self.levels[channel_idx].store(smoother.current(), Ordering::Relaxed);
        }
    }
}

/// Reader handle for the presentation thread
#[derive(Clone)]
pub struct MeterConsumer {
    levels: Arc<PublishedLevels>,
}

impl MeterConsumer {
    /// Current smoothed level in dB for channel 0 (left) or 1 (right).
    ///
    /// Any other channel returns [`INVALID_CHANNEL_LEVEL`]. Debug builds also log the bad index.
    pub fn get_level(&self, channel: usize) -> f32 {
        match self.levels.get(channel) {
            Some(level) => level.load(Ordering::Relaxed),
            None => {
                nih_debug_assert_failure!("Level requested for unmetered channel {}", channel);
                INVALID_CHANNEL_LEVEL
            }
        }
    }

    /// Both levels as (left, right)
    pub fn get_levels(&self) -> (f32, f32) {
        (self.get_level(0), self.get_level(1))
    }
}

/// Factory function to create meter communication pair
/// Returns (producer for audio thread, consumer for UI thread)
pub fn create_meter_channels() -> (MeterProducer, MeterConsumer) {
    let levels = Arc::new([
        AtomicF32::new(METER_FLOOR_DB),
        AtomicF32::new(METER_FLOOR_DB),
    ]);

    let producer = MeterProducer {
        smoothers: [
            LinearSmoother::new(METER_FLOOR_DB),
            LinearSmoother::new(METER_FLOOR_DB),
        ],
        levels: levels.clone(),
    };

    (producer, MeterConsumer { levels })
}

/// Root-mean-square amplitude of a block. Empty blocks are silent.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Convert an RMS amplitude to dB, floored at the meter's silence level.
/// Zero, denormal and NaN amplitudes all read as the floor.
pub fn rms_to_db(rms: f32) -> f32 {
    if rms > METER_FLOOR_GAIN {
        util::gain_to_db(rms).max(METER_FLOOR_DB)
    } else {
        METER_FLOOR_DB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;
    const BLOCK_SIZE: usize = 512;

    fn prepared() -> (MeterProducer, MeterConsumer) {
        let (mut producer, consumer) = create_meter_channels();
        producer.prepare(SAMPLE_RATE);
        (producer, consumer)
    }

    fn feed(producer: &mut MeterProducer, left: f32, right: f32) {
        let mut left = vec![left; BLOCK_SIZE];
        let mut right = vec![right; BLOCK_SIZE];
        let channels: [&mut [f32]; 2] = [&mut left, &mut right];
        producer.update(&channels);
    }

    #[test]
    fn test_rms_of_constant_block() {
        assert!((calculate_rms(&[0.5; 256]) - 0.5).abs() < 1e-6);
        assert!((calculate_rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
        assert_eq!(calculate_rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_to_db_floors_silence() {
        assert_eq!(rms_to_db(0.0), METER_FLOOR_DB);
        assert_eq!(rms_to_db(f32::NAN), METER_FLOOR_DB);
        assert_eq!(rms_to_db(1e-9), METER_FLOOR_DB);
        assert!((rms_to_db(0.5) - -6.0206).abs() < 1e-3);
    }

    #[test]
    fn test_starts_at_floor() {
        let (_producer, consumer) = create_meter_channels();
        assert_eq!(consumer.get_levels(), (METER_FLOOR_DB, METER_FLOOR_DB));
    }

    #[test]
    fn test_silent_block_reads_floor() {
        let (mut producer, consumer) = prepared();
        feed(&mut producer, 0.0, 0.0);

        let (left, right) = consumer.get_levels();
        assert!(left.is_finite() && right.is_finite());
        assert_eq!(left, METER_FLOOR_DB);
        assert_eq!(right, METER_FLOOR_DB);
    }

    #[test]
    fn test_rising_level_snaps_immediately() {
        let (mut producer, consumer) = prepared();
        feed(&mut producer, 0.5, 0.5);

        let expected = 20.0 * 0.5f32.log10();
        assert!((consumer.get_level(0) - expected).abs() < 1e-3);
        assert!((consumer.get_level(1) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_falling_level_decays_monotonically() {
        let (mut producer, consumer) = prepared();
        feed(&mut producer, 0.5, 0.5);
        let loud = consumer.get_level(0);

        let mut previous = loud;
        let mut moved = false;
        // 0.3 s at 48 kHz is a bit over 28 blocks of 512
        for _ in 0..40 {
            feed(&mut producer, 0.0, 0.0);
            let level = consumer.get_level(0);
            assert!(level <= previous);
            assert!(level >= METER_FLOOR_DB);
            moved |= level < loud;
            previous = level;
        }

        assert!(moved);
        assert_eq!(consumer.get_level(0), METER_FLOOR_DB);
    }

    #[test]
    fn test_decay_is_gradual() {
        let (mut producer, consumer) = prepared();
        feed(&mut producer, 0.5, 0.5);
        feed(&mut producer, 0.0, 0.0);
        feed(&mut producer, 0.0, 0.0);

        let level = consumer.get_level(0);
        assert!(level < -6.0);
        assert!(level > -20.0);
    }

    #[test]
    fn test_rise_interrupts_decay() {
        let (mut producer, consumer) = prepared();
        feed(&mut producer, 0.5, 0.5);
        for _ in 0..5 {
            feed(&mut producer, 0.0, 0.0);
        }
        assert!(consumer.get_level(0) < -10.0);

        feed(&mut producer, 1.0, 1.0);
        assert!(consumer.get_level(0).abs() < 1e-3);
    }

    #[test]
    fn test_channels_are_independent() {
        let (mut producer, consumer) = prepared();
        feed(&mut producer, 0.5, 0.0);

        assert!((consumer.get_level(0) - -6.0206).abs() < 1e-3);
        assert_eq!(consumer.get_level(1), METER_FLOOR_DB);

        feed(&mut producer, 0.0, 0.25);
        assert!(consumer.get_level(0) > METER_FLOOR_DB);
        assert!((consumer.get_level(1) - -12.0412).abs() < 1e-3);
    }

    #[test]
    fn test_mono_block_feeds_both_meters() {
        let (mut producer, consumer) = prepared();
        let mut mono = vec![0.5; BLOCK_SIZE];
        let channels: [&mut [f32]; 1] = [&mut mono];
        producer.update(&channels);

        let (left, right) = consumer.get_levels();
        assert_eq!(left, right);
        assert!((left - -6.0206).abs() < 1e-3);
    }

    #[test]
    fn test_prepare_resets_to_floor() {
        let (mut producer, consumer) = prepared();
        feed(&mut producer, 1.0, 0.5);
        feed(&mut producer, 0.0, 0.0);

        producer.prepare(44100.0);

        assert_eq!(consumer.get_levels(), (METER_FLOOR_DB, METER_FLOOR_DB));
        for smoother in producer.smoothers.iter() {
            assert_eq!(smoother.current(), METER_FLOOR_DB);
            assert_eq!(smoother.target(), METER_FLOOR_DB);
            assert_eq!(smoother.ramp_length(), 13230);
        }
    }

    #[test]
    fn test_invalid_channel_returns_sentinel() {
        let (mut producer, consumer) = prepared();
        feed(&mut producer, 0.5, 0.5);

        assert_eq!(consumer.get_level(2), INVALID_CHANNEL_LEVEL);
        assert_eq!(consumer.get_level(usize::MAX), INVALID_CHANNEL_LEVEL);
    }

    #[test]
    fn test_reader_on_another_thread() {
        let (mut producer, consumer) = prepared();

        let reader = std::thread::spawn(move || {
            for _ in 0..1000 {
                let (left, right) = consumer.get_levels();
                assert!(left.is_finite() && right.is_finite());
                assert!(left >= METER_FLOOR_DB && right >= METER_FLOOR_DB);
            }
        });

        for i in 0..200 {
            let amplitude = if i % 3 == 0 { 0.8 } else { 0.0 };
            feed(&mut producer, amplitude, amplitude * 0.5);
        }

        assert!(reader.join().is_ok());
    }
}
