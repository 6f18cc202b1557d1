pub mod audio_engine;
pub mod capabilities;
pub mod constants;
pub mod gain;
pub mod meter;
pub mod smoother;
