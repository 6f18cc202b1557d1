pub mod audio;

use audio::audio_engine::GainMeterEngine;
use audio::capabilities::{BlockProcessor, LifecycleHandler, ParameterSource};
use audio::constants::{GAIN_DEFAULT_DB, GAIN_MAX_DB, GAIN_MIN_DB, GAIN_STEP_DB};
use audio::meter::MeterConsumer;
use nih_plug::prelude::*;
use std::sync::Arc;

pub struct CambadaGain {
    params: Arc<CambadaGainParams>,
    engine: GainMeterEngine<Arc<CambadaGainParams>>,
}

#[derive(Params)]
pub struct CambadaGainParams {
    /// Output gain, stored and displayed in decibels. The audio thread reads it once per block.
    #[id = "gain"]
    pub gain: FloatParam,
}

impl Default for CambadaGain {
    fn default() -> Self {
        let params = Arc::new(CambadaGainParams::default());
        Self {
            engine: GainMeterEngine::new(params.clone()),
            params,
        }
    }
}

impl Default for CambadaGainParams {
    fn default() -> Self {
        Self {
            gain: FloatParam::new(
                "Output Gain",
                GAIN_DEFAULT_DB,
                FloatRange::Linear {
                    min: GAIN_MIN_DB,
                    max: GAIN_MAX_DB,
                },
            )
            .with_step_size(GAIN_STEP_DB)
            .with_unit(" dB")
            .with_value_to_string(formatters::v2s_f32_rounded(1)),
        }
    }
}

impl ParameterSource for CambadaGainParams {
    fn gain_db(&self) -> f32 {
        // The unsmoothed value; gain changes are applied at block boundaries
        self.gain.value()
    }
}

impl CambadaGain {
    /// Smoothed output levels for display, readable from any thread
    pub fn meter(&self) -> MeterConsumer {
        self.engine.meter_output()
    }
}

impl Plugin for CambadaGain {
    const NAME: &'static str = "Cambada Gain";
    const VENDOR: &'static str = "CambadaDev";
    const URL: &'static str = "https://cambada.dev";
    const EMAIL: &'static str = "info@cambada.dev";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo is the default layout. Mono is accepted as long as input and output match.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),

            aux_input_ports: &[],
            aux_output_ports: &[],

            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const MIDI_OUTPUT: MidiConfig = MidiConfig::None;

    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = buffer_config.sample_rate;
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            nih_error!("Refusing to initialize with sample rate {}", sample_rate);
            return false;
        }

        nih_log!(
            "Initializing at {} Hz, max block size {}, {} channel(s)",
            sample_rate,
            buffer_config.max_buffer_size,
            audio_io_layout
                .main_output_channels
                .map_or(0, NonZeroU32::get)
        );

        // `reset()` follows right after this, so the meters start from silence either way
        self.engine
            .prepare(sample_rate, buffer_config.max_buffer_size as usize);

        true
    }

    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        self.engine.process_block(buffer.as_slice());
        ProcessStatus::Normal
    }

    fn deactivate(&mut self) {
        nih_log!("Deactivated, current gain {} dB", self.params.gain_db());
    }
}

impl ClapPlugin for CambadaGain {
    const CLAP_ID: &'static str = "com.cambada.gain";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Output gain with smoothed RMS level metering");
    const CLAP_MANUAL_URL: Option<&'static str> = Some(Self::URL);
    const CLAP_SUPPORT_URL: Option<&'static str> = None;

    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Utility,
    ];
}

impl Vst3Plugin for CambadaGain {
    const VST3_CLASS_ID: [u8; 16] = *b"CambadaGainMeter";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Tools];
}

nih_export_clap!(CambadaGain);
nih_export_vst3!(CambadaGain);
