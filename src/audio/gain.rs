use nih_plug::prelude::*;

/// Convert a gain in decibels to the linear multiplier `10^(dB/20)`
#[inline]
pub fn db_to_linear(gain_db: f32) -> f32 {
    util::db_to_gain(gain_db)
}

/// Scale every sample of every channel by the multiplier for `gain_db`, in place.
///
/// The value is not clamped here; the parameter's declared bounds are what keep it in range.
/// Works for any channel count and any block length, including empty ones.
pub fn apply_gain(channels: &mut [&mut [f32]], gain_db: f32) {
    let gain = db_to_linear(gain_db);

    for channel in channels.iter_mut() {
        for sample in channel.iter_mut() {
            *sample *= gain;
        }
    }
}
