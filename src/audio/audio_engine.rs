use crate::audio::capabilities::{BlockProcessor, LifecycleHandler, ParameterSource};
use crate::audio::gain::apply_gain;
use crate::audio::meter::{create_meter_channels, MeterConsumer, MeterProducer};

/// Gain stage followed by post-gain RMS metering.
///
/// Runs entirely on the audio thread. The only state shared with other threads is the gain
/// parameter (read once per block) and the published meter levels behind [`MeterConsumer`].
pub struct GainMeterEngine<P: ParameterSource> {
    gain_param: P,
    meter: MeterProducer,
    meter_output: MeterConsumer,
}

impl<P: ParameterSource> GainMeterEngine<P> {
    /// The meters start at the silence floor. Call [`LifecycleHandler::prepare`] before the first
    /// block so the smoothing time matches the sample rate.
    pub fn new(gain_param: P) -> Self {
        let (meter, meter_output) = create_meter_channels();
        Self {
            gain_param,
            meter,
            meter_output,
        }
    }

    /// Handle for reading the smoothed levels from another thread
    pub fn meter_output(&self) -> MeterConsumer {
        self.meter_output.clone()
    }
}

impl<P: ParameterSource> BlockProcessor for GainMeterEngine<P> {
    fn process_block(&mut self, channels: &mut [&mut [f32]]) {
        let num_samples = channels.first().map_or(0, |channel| channel.len());
        if num_samples == 0 {
            return;
        }

        // Once per block, so a parameter change never steps within a block
        let gain_db = self.gain_param.gain_db();
        apply_gain(channels, gain_db);

        // Meters read the buffer after gain so they show the output level
        self.meter.update(channels);
    }
}

impl<P: ParameterSource> LifecycleHandler for GainMeterEngine<P> {
    fn prepare(&mut self, sample_rate: f32, _max_block_size: usize) {
        self.meter.prepare(sample_rate);
    }

    fn reset(&mut self) {
        self.meter.reset();
    }
}
