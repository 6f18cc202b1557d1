/// Audio processing constants and helper functions
/// Shared by the gain stage, the level meter and the plugin parameters

/// Gain parameter range
pub const GAIN_MIN_DB: f32 = -36.0;
pub const GAIN_MAX_DB: f32 = 12.0;
pub const GAIN_DEFAULT_DB: f32 = 0.0;
pub const GAIN_STEP_DB: f32 = 0.1;

/// Level meter floor, used both as the seeded value and as the silence reading
pub const METER_FLOOR_DB: f32 = -100.0;
/// `METER_FLOOR_DB` as a linear amplitude
pub const METER_FLOOR_GAIN: f32 = 1e-5;

/// Time the RMS smoother takes to fall to a lower reading
pub const RMS_SMOOTHING_SECONDS: f64 = 0.3;

/// Left and right
pub const METER_CHANNELS: usize = 2;

// === HELPER FUNCTIONS ===

/// Clamp a dB value to the declared gain parameter range
pub fn clamp_gain_db(gain_db: f32) -> f32 {
    gain_db.clamp(GAIN_MIN_DB, GAIN_MAX_DB)
}

/// Number of smoother steps a ramp of `seconds` spans at `sample_rate`
pub fn ramp_length_in_samples(sample_rate: f32, seconds: f64) -> usize {
    let steps = (seconds * sample_rate as f64).floor();
    if steps.is_finite() && steps > 0.0 {
        steps as usize
    } else {
        0
    }
}
